use crate::context::ResolutionContext;
use crate::dispatcher::{Handler, HandlerRequest, HandlerResponse, Next};
use tracing::debug;

/// Content type written when the response has none yet.
pub const TEXT_CONTENT_TYPE: &str = "text/plain; charset=utf-8";

/// Responds with a plain-text body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Text {
    text: String,
}

impl Text {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

impl Handler for Text {
    fn execute(
        &mut self,
        req: &mut HandlerRequest,
        res: &mut HandlerResponse,
        _ctx: &ResolutionContext,
    ) -> anyhow::Result<Next> {
        debug!(uri = %req.uri, bytes = self.text.len(), "Responding with plain text");
        if res.get_header("content-type").is_none() {
            res.set_header("content-type", TEXT_CONTENT_TYPE.to_string());
        }
        res.write_str(&self.text);
        Ok(None)
    }

    fn name(&self) -> &str {
        "Text"
    }
}
