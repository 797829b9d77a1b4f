use super::core::{Handler, HandlerRequest, HandlerResponse};
use crate::codec::PATH_SEPARATOR;
use crate::context::ResolutionContext;
use crate::error::{ChainLimitExceeded, DispatchError, HandlerExecutionError, HandlerNotFoundError};
use crate::ids::HandlerId;
use crate::runtime_config::RuntimeConfig;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, info_span, warn};

/// Default loop guard for handler chains.
pub const DEFAULT_MAX_CHAIN: usize = 64;

/// How the filter disposed of a request.
#[derive(Debug)]
pub enum FilterOutcome {
    /// Root path; `302` to the index URI was written.
    Redirected { location: String },
    /// Path is below the static asset path; the response is untouched and the
    /// static backend must serve it.
    PassThrough,
    /// The path lies outside the mount prefix; `404` was written.
    OutsideMount,
    /// No handler for the path; `404` was written.
    NotFound(HandlerNotFoundError),
    /// The chain ran to completion.
    Completed {
        handler: HandlerId,
        invocations: usize,
    },
    /// Instantiation or execution failed; `500` was written. Only produced by
    /// [`DispatchFilter::serve`].
    Failed(DispatchError),
}

/// Entry point for every request: root redirect, static passthrough, resolution
/// and the handler chain.
#[derive(Debug, Clone)]
pub struct DispatchFilter {
    context: Arc<ResolutionContext>,
    max_chain: Option<usize>,
}

impl DispatchFilter {
    /// Filter with the default loop guard.
    pub fn new(context: Arc<ResolutionContext>) -> Self {
        Self {
            context,
            max_chain: Some(DEFAULT_MAX_CHAIN),
        }
    }

    /// Filter whose loop guard comes from the runtime configuration.
    pub fn with_runtime_config(context: Arc<ResolutionContext>, config: &RuntimeConfig) -> Self {
        Self {
            context,
            max_chain: config.max_chain,
        }
    }

    /// Override the loop guard; `None` lets chains run unbounded.
    #[must_use]
    pub fn max_chain(mut self, limit: Option<usize>) -> Self {
        self.max_chain = limit;
        self
    }

    #[must_use]
    pub fn context(&self) -> &Arc<ResolutionContext> {
        &self.context
    }

    /// Dispatch one request.
    ///
    /// Redirects, passthroughs and resolution misses are ordinary outcomes.
    /// Only instantiation and execution failures are returned as errors; the
    /// response is left as the failing handler left it.
    pub fn filter(
        &self,
        req: &mut HandlerRequest,
        res: &mut HandlerResponse,
    ) -> Result<FilterOutcome, DispatchError> {
        let logical = req.logical_path();
        let span = info_span!(
            "dispatch",
            request_id = %req.request_id,
            uri = %logical,
            handler = tracing::field::Empty
        );
        let _enter = span.enter();

        if !req.is_within_mount_prefix() {
            debug!(path = %req.uri, mount_prefix = %req.mount_prefix, "Request outside mount prefix");
            *res = HandlerResponse::error(404, "Not Found");
            return Ok(FilterOutcome::OutsideMount);
        }

        if logical.trim_matches(PATH_SEPARATOR).is_empty() {
            let mut location = String::with_capacity(req.mount_prefix.len() + self.context.index_uri().len());
            location.push_str(&req.mount_prefix);
            location.push_str(self.context.index_uri());
            debug!(location = %location, "Root path redirected to index");
            res.send_redirect(location.clone());
            return Ok(FilterOutcome::Redirected { location });
        }

        if logical.starts_with(self.context.static_asset_path()) {
            debug!(static_asset_path = %self.context.static_asset_path(), "Static asset passthrough");
            return Ok(FilterOutcome::PassThrough);
        }

        let identifier = match self.context.resolve(&logical) {
            Ok(identifier) => identifier,
            Err(e) => {
                warn!(candidate = %e.candidate, "No handler for request");
                *res = HandlerResponse::error(404, "Not Found");
                return Ok(FilterOutcome::NotFound(e));
            }
        };
        span.record("handler", tracing::field::display(&identifier));

        let handler = self.context.registry().instantiate(&identifier)?;
        let invocations = self.run_chain(handler, &identifier, &logical, req, res)?;

        Ok(FilterOutcome::Completed {
            handler: identifier,
            invocations,
        })
    }

    /// [`filter`](Self::filter), with failures converted to a `500` response.
    ///
    /// This is the single place where dispatch errors stop propagating.
    pub fn serve(&self, req: &mut HandlerRequest, res: &mut HandlerResponse) -> FilterOutcome {
        match self.filter(req, res) {
            Ok(outcome) => outcome,
            Err(e) => {
                error!(
                    request_id = %req.request_id,
                    uri = %req.uri,
                    error = %e,
                    cause = %error_chain(&e),
                    "Request failed"
                );
                *res = HandlerResponse::error(e.status(), "Internal Server Error");
                FilterOutcome::Failed(e)
            }
        }
    }

    fn run_chain(
        &self,
        first: Box<dyn Handler>,
        identifier: &HandlerId,
        uri: &str,
        req: &mut HandlerRequest,
        res: &mut HandlerResponse,
    ) -> Result<usize, HandlerExecutionError> {
        let start = Instant::now();
        let mut current = first;
        let mut invocations = 0usize;

        info!(handler = %identifier, "Handler chain started");
        loop {
            if let Some(limit) = self.max_chain {
                if invocations >= limit {
                    return Err(HandlerExecutionError {
                        failing: current.name().to_string(),
                        first: identifier.clone(),
                        uri: uri.to_string(),
                        source: Box::new(ChainLimitExceeded { limit }),
                    });
                }
            }

            invocations += 1;
            debug!(step = invocations, current = current.name(), "Executing handler");

            match current.execute(req, res, &self.context) {
                Ok(Some(next)) => current = next,
                Ok(None) => break,
                Err(e) => {
                    return Err(HandlerExecutionError {
                        failing: current.name().to_string(),
                        first: identifier.clone(),
                        uri: uri.to_string(),
                        source: e.into(),
                    });
                }
            }
        }

        info!(
            handler = %identifier,
            invocations,
            status = res.status,
            latency_ms = start.elapsed().as_millis() as u64,
            "Handler chain finished"
        );
        Ok(invocations)
    }
}

fn error_chain(err: &dyn std::error::Error) -> String {
    let mut out = String::new();
    let mut source = err.source();
    while let Some(cause) = source {
        if !out.is_empty() {
            out.push_str(": ");
        }
        out.push_str(&cause.to_string());
        source = cause.source();
    }
    out
}
