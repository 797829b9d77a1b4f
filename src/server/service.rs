use super::request::parse_request;
use super::response::{write_bytes, write_handler_response, write_json_error};
use crate::dispatcher::{
    normalize_mount_prefix, DispatchFilter, FilterOutcome, HandlerRequest, HandlerResponse,
};
use crate::static_files::StaticFiles;
use may_minihttp::{HttpService, Request, Response};
use serde_json::{json, Value};
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, error};

/// `may_minihttp` service that runs every request through the [`DispatchFilter`].
///
/// Static passthroughs are served from `static_files`; views forwarded to by
/// handlers are rendered from `views`.
#[derive(Clone)]
pub struct AppService {
    pub filter: Arc<DispatchFilter>,
    pub static_files: Option<StaticFiles>,
    pub views: Option<StaticFiles>,
    pub mount_prefix: String,
}

impl AppService {
    pub fn new(
        filter: Arc<DispatchFilter>,
        static_dir: Option<PathBuf>,
        dynamic_dir: Option<PathBuf>,
    ) -> Self {
        Self {
            filter,
            static_files: static_dir.map(StaticFiles::new),
            views: dynamic_dir.map(StaticFiles::new),
            mount_prefix: String::new(),
        }
    }

    /// Serve the application below `prefix` instead of the server root.
    #[must_use]
    pub fn with_mount_prefix(mut self, prefix: &str) -> Self {
        self.mount_prefix = normalize_mount_prefix(prefix);
        self
    }

    fn serve_static(&self, req: &HandlerRequest, res: &mut Response) {
        let logical = req.logical_path();
        let relative = logical
            .strip_prefix(self.filter.context().static_asset_path())
            .unwrap_or(&logical);

        let loaded = match &self.static_files {
            Some(sf) => sf.load(relative),
            None => Err(io::Error::new(io::ErrorKind::NotFound, "static files not configured")),
        };
        match loaded {
            Ok((bytes, ct)) => {
                debug!(path = %logical, content_type = ct, "Static asset served");
                write_bytes(res, 200, bytes, ct);
            }
            Err(e) => {
                debug!(path = %logical, error = %e, "Static asset not found");
                write_json_error(res, 404, json!({ "error": "Not Found", "path": req.uri }));
            }
        }
    }

    fn render_view(
        &self,
        req: &HandlerRequest,
        path: &str,
        mut hr: HandlerResponse,
        res: &mut Response,
    ) {
        let relative = path
            .strip_prefix(self.filter.context().dynamic_asset_path())
            .unwrap_or(path);
        let attributes = Value::Object(req.attributes.clone());

        let rendered = match &self.views {
            Some(views) => views.render(relative, &attributes),
            None => Err(io::Error::new(io::ErrorKind::NotFound, "views not configured")),
        };
        match rendered {
            Ok((bytes, ct)) => {
                debug!(request_id = %req.request_id, template = %path, "View rendered");
                if hr.get_header("content-type").is_none() {
                    hr.set_header("content-type", ct.to_string());
                }
                hr.body = bytes;
                write_handler_response(res, hr);
            }
            Err(e) => {
                error!(
                    request_id = %req.request_id,
                    uri = %req.uri,
                    template = %path,
                    error = %e,
                    "View rendering failed"
                );
                write_json_error(res, 500, json!({ "error": "Internal Server Error" }));
            }
        }
    }
}

impl HttpService for AppService {
    fn call(&mut self, req: Request, res: &mut Response) -> io::Result<()> {
        let mut request = parse_request(req, &self.mount_prefix);
        let mut response = HandlerResponse::new();

        match self.filter.serve(&mut request, &mut response) {
            FilterOutcome::PassThrough => self.serve_static(&request, res),
            FilterOutcome::Completed { .. } => match response.forward.take() {
                Some(path) => self.render_view(&request, &path, response, res),
                None => write_handler_response(res, response),
            },
            FilterOutcome::Redirected { .. }
            | FilterOutcome::OutsideMount
            | FilterOutcome::NotFound(_)
            | FilterOutcome::Failed(_) => write_handler_response(res, response),
        }
        Ok(())
    }
}
