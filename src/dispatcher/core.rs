//! Dispatcher core module - request/response types and the handler contract.
//!
//! # JSF Compliance (Rule 206)
//!
//! Request parameters, headers and cookies use `SmallVec` so the common case
//! never touches the heap for the containers themselves.

#![deny(clippy::inefficient_to_string)]
#![deny(clippy::format_push_string)]

use crate::context::ResolutionContext;
use crate::ids::RequestId;
use http::Method;
use serde_json::{Map, Value};
use smallvec::SmallVec;
use std::sync::Arc;

/// Maximum inline parameters before heap allocation.
pub const MAX_INLINE_PARAMS: usize = 8;

/// Maximum inline headers/cookies before heap allocation.
/// Most requests have ≤16 headers (JSF: no heap in hot path)
pub const MAX_INLINE_HEADERS: usize = 16;

/// Stack-allocated parameter storage. Repeated names are kept in arrival order.
pub type ParamVec = SmallVec<[(Arc<str>, String); MAX_INLINE_PARAMS]>;

/// Stack-allocated header/cookie storage for the hot path
///
/// Header names use `Arc<str>` because they repeat across requests
/// (`content-type`, `cookie`, ...) and `Arc::clone()` is O(1).
pub type HeaderVec = SmallVec<[(Arc<str>, String); MAX_INLINE_HEADERS]>;

/// What a handler hands back: the next handler to run, or `None` to end the chain.
pub type Next = Option<Box<dyn Handler>>;

/// A unit of request-fulfillment logic.
///
/// Every dispatch gets a fresh instance (built by the registry factory, or
/// already constructed by the previous handler in the chain), so handlers may
/// keep request-scoped state in `self`.
///
/// ```rust
/// use chainroute::context::ResolutionContext;
/// use chainroute::dispatcher::{Handler, HandlerRequest, HandlerResponse, Next};
/// use chainroute::resolutions::Text;
///
/// #[derive(Default)]
/// struct GreetAction;
///
/// impl Handler for GreetAction {
///     fn execute(
///         &mut self,
///         req: &mut HandlerRequest,
///         _res: &mut HandlerResponse,
///         _ctx: &ResolutionContext,
///     ) -> anyhow::Result<Next> {
///         let name = req.param("name").unwrap_or("world").to_string();
///         Ok(Some(Box::new(Text::new(format!("hello {name}")))))
///     }
/// }
/// ```
pub trait Handler: Send {
    /// Fulfill (part of) the request. Returning `Ok(Some(next))` runs `next`
    /// immediately in the same request; `Ok(None)` ends the chain.
    fn execute(
        &mut self,
        req: &mut HandlerRequest,
        res: &mut HandlerResponse,
        ctx: &ResolutionContext,
    ) -> anyhow::Result<Next>;

    /// Name used in logs and error diagnostics. Defaults to the Rust type name.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// Request data handed to every handler in the chain.
#[derive(Debug, Clone)]
pub struct HandlerRequest {
    /// Unique request ID for tracing and correlation
    pub request_id: RequestId,
    /// HTTP method (GET, POST, etc.)
    pub method: Method,
    /// Request path as received, without the query string
    pub uri: String,
    /// Application mount prefix (`""` when mounted at the server root)
    pub mount_prefix: String,
    /// Query string and form body parameters
    pub params: ParamVec,
    /// HTTP headers (lowercase names)
    pub headers: HeaderVec,
    /// Cookies parsed from the Cookie header
    pub cookies: HeaderVec,
    /// Raw request body
    pub body: Vec<u8>,
    /// Values pushed by handlers for the view that renders the response
    pub attributes: Map<String, Value>,
}

impl HandlerRequest {
    pub fn new(method: Method, uri: impl Into<String>) -> Self {
        Self {
            request_id: RequestId::new(),
            method,
            uri: uri.into(),
            mount_prefix: String::new(),
            params: ParamVec::new(),
            headers: HeaderVec::new(),
            cookies: HeaderVec::new(),
            body: Vec::new(),
            attributes: Map::new(),
        }
    }

    /// Builder-style mount prefix, normalized to `""` or `/prefix`.
    #[must_use]
    pub fn with_mount_prefix(mut self, prefix: &str) -> Self {
        self.mount_prefix = normalize_mount_prefix(prefix);
        self
    }

    /// Builder-style parameter.
    #[must_use]
    pub fn with_param(mut self, name: &str, value: impl Into<String>) -> Self {
        self.params.push((Arc::from(name), value.into()));
        self
    }

    /// Builder-style header (name is lowercased).
    #[must_use]
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers
            .push((Arc::from(name.to_ascii_lowercase()), value.into()));
        self
    }

    /// The mount prefix as a path: `/` when mounted at the server root.
    #[must_use]
    pub fn context_path(&self) -> &str {
        if self.mount_prefix.is_empty() {
            "/"
        } else {
            &self.mount_prefix
        }
    }

    /// Remainder of the request path below the mount prefix; `None` when the
    /// path lies outside it. `/shopping` is outside `/shop`.
    fn path_below_mount(&self) -> Option<&str> {
        if self.mount_prefix.is_empty() {
            return Some(&self.uri);
        }
        self.uri
            .strip_prefix(self.mount_prefix.as_str())
            .filter(|rest| rest.is_empty() || rest.starts_with('/'))
    }

    /// Whether the request path is the mount prefix or lies below it.
    #[must_use]
    pub fn is_within_mount_prefix(&self) -> bool {
        self.path_below_mount().is_some()
    }

    /// Request path with the mount prefix removed. Always starts with `/`.
    ///
    /// Paths outside the mount prefix are returned whole; check
    /// [`is_within_mount_prefix`](Self::is_within_mount_prefix) first.
    #[must_use]
    pub fn logical_path(&self) -> String {
        let rest = self.path_below_mount().unwrap_or(&self.uri);
        if rest.starts_with('/') {
            rest.to_string()
        } else {
            let mut path = String::with_capacity(rest.len() + 1);
            path.push('/');
            path.push_str(rest);
            path
        }
    }

    /// First value of the named parameter.
    #[inline]
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }

    /// All values of the named parameter; empty when absent.
    #[must_use]
    pub fn params(&self, name: &str) -> Vec<String> {
        self.params
            .iter()
            .filter(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.clone())
            .collect()
    }

    #[inline]
    #[must_use]
    pub fn is_param_set(&self, name: &str) -> bool {
        self.param(name).is_some()
    }

    /// Get a header by name (case-insensitive per RFC 7230)
    #[inline]
    #[must_use]
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    #[inline]
    #[must_use]
    pub fn get_cookie(&self, name: &str) -> Option<&str> {
        self.cookies
            .iter()
            .find(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }

    /// Make a value available to the view rendered later in the chain.
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.attributes.insert(name.into(), value.into());
    }

    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    /// Push the first value of a parameter back as an attribute, if it is set.
    ///
    /// Lets a re-rendered form keep what the user typed.
    pub fn repush_single(&mut self, name: &str) {
        if let Some(value) = self.param(name).map(str::to_string) {
            self.push(name, value);
        }
    }

    /// Push all values of a parameter back as a list attribute, if any are set.
    pub fn repush_multiple(&mut self, name: &str) {
        let values = self.params(name);
        if !values.is_empty() {
            self.push(name, values);
        }
    }
}

/// Response under construction. Handlers write into it; the server serializes it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerResponse {
    /// HTTP status code (200, 302, 404, 500, etc.)
    pub status: u16,
    /// HTTP response headers
    pub headers: HeaderVec,
    /// Response body
    pub body: Vec<u8>,
    /// Dynamic asset path the request was forwarded to for rendering
    pub forward: Option<String>,
}

impl Default for HandlerResponse {
    fn default() -> Self {
        Self::new()
    }
}

impl HandlerResponse {
    /// Empty `200 OK` response.
    #[must_use]
    pub fn new() -> Self {
        Self {
            status: 200,
            headers: HeaderVec::new(),
            body: Vec::new(),
            forward: None,
        }
    }

    /// JSON error response, matching the shape of every framework-generated error.
    #[must_use]
    pub fn error(status: u16, message: &str) -> Self {
        let mut res = Self::new();
        res.status = status;
        res.set_header("content-type", "application/json".to_string());
        res.body = serde_json::json!({ "error": message }).to_string().into_bytes();
        res
    }

    /// Get a header by name
    #[inline]
    #[must_use]
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Add or update a header
    pub fn set_header(&mut self, name: &str, value: String) {
        self.headers.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
        self.headers.push((Arc::from(name), value));
    }

    pub fn set_status(&mut self, status: u16) {
        self.status = status;
    }

    pub fn write_str(&mut self, text: &str) {
        self.body.extend_from_slice(text.as_bytes());
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.body.extend_from_slice(bytes);
    }

    /// `302 Found` to `location`; discards anything written so far.
    pub fn send_redirect(&mut self, location: impl Into<String>) {
        self.status = 302;
        self.body.clear();
        self.forward = None;
        self.set_header("location", location.into());
    }

    /// Error status with an empty body; discards anything written so far.
    pub fn send_error(&mut self, status: u16) {
        self.status = status;
        self.body.clear();
        self.forward = None;
    }

    /// Hand the request to the view backend to render `path` (a dynamic asset path).
    pub fn forward(&mut self, path: impl Into<String>) {
        self.forward = Some(path.into());
    }

    #[must_use]
    pub fn is_redirect(&self) -> bool {
        (300..400).contains(&self.status) && self.get_header("location").is_some()
    }
}

/// `""` for the server root, otherwise `/prefix` without a trailing slash.
#[must_use]
pub fn normalize_mount_prefix(prefix: &str) -> String {
    let trimmed = prefix.trim().trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        let mut out = String::with_capacity(trimmed.len() + 1);
        out.push('/');
        out.push_str(trimmed);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logical_path_strips_mount_prefix() {
        let req = HandlerRequest::new(Method::GET, "/shop/sub/someTest").with_mount_prefix("/shop/");
        assert_eq!(req.mount_prefix, "/shop");
        assert_eq!(req.context_path(), "/shop");
        assert_eq!(req.logical_path(), "/sub/someTest");

        let root = HandlerRequest::new(Method::GET, "/shop");
        assert_eq!(root.context_path(), "/");
        assert_eq!(root.logical_path(), "/shop");

        let bare = HandlerRequest::new(Method::GET, "/shop").with_mount_prefix("shop");
        assert_eq!(bare.logical_path(), "/");
        assert!(bare.is_within_mount_prefix());

        let sibling = HandlerRequest::new(Method::GET, "/shopping/list").with_mount_prefix("/shop");
        assert!(!sibling.is_within_mount_prefix());
        assert_eq!(sibling.logical_path(), "/shopping/list");

        let elsewhere = HandlerRequest::new(Method::GET, "/elsewhere/x").with_mount_prefix("/shop");
        assert!(!elsewhere.is_within_mount_prefix());
        assert!(root.is_within_mount_prefix());
    }

    #[test]
    fn test_params_and_repush() {
        let mut req = HandlerRequest::new(Method::GET, "/search")
            .with_param("query", "rust")
            .with_param("filter", "red")
            .with_param("filter", "green");

        assert_eq!(req.param("query"), Some("rust"));
        assert_eq!(req.params("filter"), vec!["red", "green"]);
        assert!(req.params("missing").is_empty());
        assert!(req.is_param_set("query"));
        assert!(!req.is_param_set("user"));

        req.repush_single("query");
        req.repush_multiple("filter");
        req.repush_single("missing");
        req.repush_multiple("missing");

        assert_eq!(req.attribute("query"), Some(&Value::from("rust")));
        assert_eq!(req.attribute("filter"), Some(&serde_json::json!(["red", "green"])));
        assert!(req.attribute("missing").is_none());
    }

    #[test]
    fn test_response_redirect_resets_body() {
        let mut res = HandlerResponse::new();
        res.write_str("partial");
        res.send_redirect("/index");
        assert_eq!(res.status, 302);
        assert!(res.body.is_empty());
        assert_eq!(res.get_header("Location"), Some("/index"));
        assert!(res.is_redirect());
    }

    #[test]
    fn test_status_and_error_reset() {
        let mut res = HandlerResponse::new();
        res.set_status(201);
        res.write_str("created");
        assert_eq!(res.status, 201);
        assert_eq!(res.body, b"created");

        res.forward("/assets/dynamic/page.html");
        res.send_error(403);
        assert_eq!(res.status, 403);
        assert!(res.body.is_empty());
        assert!(res.forward.is_none());
        assert!(!res.is_redirect());
    }

    #[test]
    fn test_set_header_replaces_case_insensitively() {
        let mut res = HandlerResponse::new();
        res.set_header("Content-Type", "text/html".to_string());
        res.set_header("content-type", "text/plain".to_string());
        assert_eq!(res.headers.len(), 1);
        assert_eq!(res.get_header("CONTENT-TYPE"), Some("text/plain"));
    }

    #[test]
    fn test_normalize_mount_prefix() {
        assert_eq!(normalize_mount_prefix(""), "");
        assert_eq!(normalize_mount_prefix("/"), "");
        assert_eq!(normalize_mount_prefix("app"), "/app");
        assert_eq!(normalize_mount_prefix("/app/"), "/app");
    }
}
