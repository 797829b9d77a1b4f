use crate::dispatcher::{normalize_mount_prefix, HandlerRequest, HeaderVec, ParamVec};
use crate::ids::RequestId;
use http::Method;
use may_minihttp::Request;
use serde_json::Map;
use std::io::Read;
use std::sync::Arc;
use tracing::{debug, info, warn};

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Parse cookies from the `cookie` header.
pub fn parse_cookies(headers: &HeaderVec) -> HeaderVec {
    let mut cookies = HeaderVec::new();
    for header in headers
        .iter()
        .filter(|(name, _)| name.as_ref() == "cookie")
        .map(|(_, value)| value)
    {
        for pair in header.split(';') {
            let mut parts = pair.trim().splitn(2, '=');
            let name = parts.next().unwrap_or("").trim();
            if name.is_empty() {
                continue;
            }
            let value = parts.next().unwrap_or("").trim();
            cookies.push((Arc::from(name), value.to_string()));
        }
    }
    cookies
}

/// Append URL-encoded `name=value` pairs to `params`, keeping repeated names.
pub fn parse_form_params(encoded: &str, params: &mut ParamVec) {
    for (k, v) in url::form_urlencoded::parse(encoded.as_bytes()) {
        params.push((Arc::from(k.as_ref()), v.into_owned()));
    }
}

/// Split a raw request target into path and query string.
pub fn split_target(raw: &str) -> (&str, &str) {
    match raw.split_once('?') {
        Some((path, query)) => (path, query),
        None => (raw, ""),
    }
}

/// Build a [`HandlerRequest`] from a `may_minihttp::Request`.
///
/// Query parameters come first, then `application/x-www-form-urlencoded`
/// body parameters.
pub fn parse_request(req: Request, mount_prefix: &str) -> HandlerRequest {
    let method = Method::from_bytes(req.method().as_bytes()).unwrap_or_default();
    let raw_path = req.path().to_string();
    let (path, query) = split_target(&raw_path);

    let mut headers = HeaderVec::new();
    for h in req.headers().iter() {
        headers.push((
            Arc::from(h.name.to_ascii_lowercase()),
            String::from_utf8_lossy(h.value).into_owned(),
        ));
    }
    debug!(header_count = headers.len(), "Headers extracted");

    let cookies = parse_cookies(&headers);

    let mut params = ParamVec::new();
    parse_form_params(query, &mut params);

    let is_form = headers
        .iter()
        .find(|(k, _)| k.as_ref() == "content-type")
        .is_some_and(|(_, v)| v.starts_with(FORM_CONTENT_TYPE));

    let mut body = Vec::new();
    if let Err(e) = req.body().read_to_end(&mut body) {
        warn!(error = %e, "Failed to read request body");
        body.clear();
    }
    if is_form && !body.is_empty() {
        parse_form_params(&String::from_utf8_lossy(&body), &mut params);
    }

    let request_id = RequestId::from_header_or_new(
        headers
            .iter()
            .find(|(k, _)| k.as_ref() == "x-request-id")
            .map(|(_, v)| v.as_str()),
    );

    info!(
        request_id = %request_id,
        method = %method,
        path = %path,
        param_count = params.len(),
        body_size_bytes = body.len(),
        "HTTP request parsed"
    );

    HandlerRequest {
        request_id,
        method,
        uri: path.to_string(),
        mount_prefix: normalize_mount_prefix(mount_prefix),
        params,
        headers,
        cookies,
        body,
        attributes: Map::new(),
    }
}
