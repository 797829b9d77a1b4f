use crate::context::ResolutionContext;
use crate::dispatcher::{Handler, HandlerRequest, HandlerResponse, Next};
use crate::ids::HandlerId;
use anyhow::bail;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Source {
    Path(String),
    Beside { dir: HandlerId, name: String },
}

/// Forwards the request to a dynamic template.
///
/// The template is rendered after the chain ends, with the request
/// attributes (see [`HandlerRequest::push`]) as its context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct View {
    source: Source,
}

impl View {
    /// Template at `path`, relative to the dynamic asset path.
    pub fn at(path: impl Into<String>) -> Self {
        Self {
            source: Source::Path(path.into()),
        }
    }

    /// Template `name` in the directory the handler `dir` is mapped to.
    ///
    /// For `app.actions.user.ShowAction` (URI `/user/show`) and `show.html`
    /// the template is `<dynamic asset path>/user/show.html`.
    pub fn beside(dir: impl Into<HandlerId>, name: impl Into<String>) -> Self {
        Self {
            source: Source::Beside {
                dir: dir.into(),
                name: name.into(),
            },
        }
    }

    /// Dynamic asset path of the template.
    pub fn path(&self, ctx: &ResolutionContext) -> anyhow::Result<String> {
        match &self.source {
            Source::Path(path) => {
                if path.trim().is_empty() {
                    bail!("cannot forward to blank path");
                }
                Ok(ctx.dynamic_path(path))
            }
            Source::Beside { dir, name } => {
                if name.trim().trim_start_matches('/').is_empty() {
                    bail!("cannot forward to a file with blank name");
                }
                Ok(ctx.view_path(dir, name)?)
            }
        }
    }
}

impl Handler for View {
    fn execute(
        &mut self,
        req: &mut HandlerRequest,
        res: &mut HandlerResponse,
        ctx: &ResolutionContext,
    ) -> anyhow::Result<Next> {
        let path = self.path(ctx)?;
        debug!(uri = %req.uri, template = %path, "Forwarding request to view");
        res.forward(path);
        Ok(None)
    }

    fn name(&self) -> &str {
        "View"
    }
}
