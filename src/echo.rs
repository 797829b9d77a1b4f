use crate::context::ResolutionContext;
use crate::dispatcher::{Handler, HandlerRequest, HandlerResponse, Next};
use serde_json::json;

/// Demo handler: echoes back what the dispatcher saw as JSON.
///
/// Registered by `chainroute serve` under the identifier of the index URI so a
/// freshly configured application answers something useful.
#[derive(Debug, Default)]
pub struct EchoAction;

impl Handler for EchoAction {
    fn execute(
        &mut self,
        req: &mut HandlerRequest,
        res: &mut HandlerResponse,
        ctx: &ResolutionContext,
    ) -> anyhow::Result<Next> {
        let logical = req.logical_path();
        let params: Vec<_> = req
            .params
            .iter()
            .map(|(k, v)| json!({ "name": k.as_ref(), "value": v }))
            .collect();
        let body = json!({
            "request_id": req.request_id.to_string(),
            "method": req.method.as_str(),
            "uri": req.uri,
            "logical_path": logical,
            "handler": ctx.resolve(&logical).ok(),
            "params": params,
        });
        res.set_header("content-type", "application/json".to_string());
        res.write_bytes(&serde_json::to_vec(&body)?);
        Ok(None)
    }
}
