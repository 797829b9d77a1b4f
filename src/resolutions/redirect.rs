use crate::context::ResolutionContext;
use crate::dispatcher::{Handler, HandlerRequest, HandlerResponse, Next};
use crate::ids::HandlerId;
use anyhow::bail;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Target {
    Url(String),
    Handler(HandlerId),
}

/// Sends a `302 Found` to a URL or to the URI of another handler.
///
/// ```rust
/// use chainroute::resolutions::Redirect;
///
/// let redirect = Redirect::to_handler("app.actions.user.ShowAction")
///     .with_param("id", "42")
///     .with_param("tab", "settings & privacy");
/// # let _ = redirect;
/// ```
///
/// Handler targets are prefixed with the request's mount prefix; URL targets
/// are used verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirect {
    target: Target,
    params: Vec<(String, String)>,
}

impl Redirect {
    pub fn to_url(url: impl Into<String>) -> Self {
        Self {
            target: Target::Url(url.into()),
            params: Vec::new(),
        }
    }

    pub fn to_handler(identifier: impl Into<HandlerId>) -> Self {
        Self {
            target: Target::Handler(identifier.into()),
            params: Vec::new(),
        }
    }

    /// Append a query parameter. Parameters keep their insertion order.
    ///
    /// Every distinct `Location` line stays in memory for the life of the
    /// process (see [`MAX_INTERNED_HEADER_LINES`]). Per-request values such as
    /// ids or search terms each cost one entry; once the cap is reached such
    /// redirects are answered with a `500`.
    ///
    /// [`MAX_INTERNED_HEADER_LINES`]: crate::server::response::MAX_INTERNED_HEADER_LINES
    #[must_use]
    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((name.into(), value.into()));
        self
    }

    /// The `Location` this redirect produces for `req`.
    pub fn location(&self, req: &HandlerRequest, ctx: &ResolutionContext) -> anyhow::Result<String> {
        let mut location = match &self.target {
            Target::Url(url) => {
                if url.trim().is_empty() {
                    bail!("cannot redirect to blank URL");
                }
                url.clone()
            }
            Target::Handler(identifier) => {
                let uri = ctx.get_uri(identifier)?;
                let mut location = String::with_capacity(req.mount_prefix.len() + uri.len());
                location.push_str(&req.mount_prefix);
                location.push_str(&uri);
                location
            }
        };

        for (index, (name, value)) in self.params.iter().enumerate() {
            location.push(if index == 0 { '?' } else { '&' });
            location.push_str(&urlencoding::encode(name));
            location.push('=');
            location.push_str(&urlencoding::encode(value));
        }
        Ok(location)
    }
}

impl Handler for Redirect {
    fn execute(
        &mut self,
        req: &mut HandlerRequest,
        res: &mut HandlerResponse,
        ctx: &ResolutionContext,
    ) -> anyhow::Result<Next> {
        let location = self.location(req, ctx)?;
        debug!(uri = %req.uri, location = %location, "Redirecting request");
        res.send_redirect(location);
        Ok(None)
    }

    fn name(&self) -> &str {
        "Redirect"
    }
}
