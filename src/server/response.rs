use crate::dispatcher::HandlerResponse;
use may_minihttp::Response;
use serde_json::{json, Value};
use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard, OnceLock, PoisonError};
use tracing::{error, warn};

/// Interned header lines above this count are reported once.
const INTERN_WARN_THRESHOLD: usize = 4096;

/// Distinct header lines ever leaked. Past this, new lines are refused.
pub const MAX_INTERNED_HEADER_LINES: usize = 16_384;

/// `may_minihttp` only accepts `'static` header lines.
///
/// Each distinct line is leaked once and reused afterwards, so memory grows
/// with the number of distinct header lines, not with the number of requests.
/// Once `cap` lines are held, unseen lines are refused instead of leaked.
#[derive(Debug)]
struct HeaderInterner {
    lines: HashSet<&'static str>,
    cap: usize,
}

impl HeaderInterner {
    fn new(cap: usize) -> Self {
        Self {
            lines: HashSet::new(),
            cap,
        }
    }

    fn intern(&mut self, line: String) -> Option<&'static str> {
        if let Some(existing) = self.lines.get(line.as_str()) {
            return Some(*existing);
        }
        if self.lines.len() >= self.cap {
            return None;
        }
        let leaked: &'static str = Box::leak(line.into_boxed_str());
        self.lines.insert(leaked);
        if self.lines.len() == INTERN_WARN_THRESHOLD {
            warn!(
                distinct_header_lines = self.lines.len(),
                cap = self.cap,
                "Many distinct response header lines; redirect targets may carry per-request data"
            );
        }
        Some(leaked)
    }

    /// `'static` lines for every header of `hr`, or `None` if any was refused.
    fn header_lines(&mut self, hr: &HandlerResponse) -> Option<Vec<&'static str>> {
        hr.headers
            .iter()
            .map(|(name, value)| {
                if name.eq_ignore_ascii_case("content-type") {
                    static_content_type_line(value)
                        .or_else(|| self.intern(format!("Content-Type: {value}")))
                } else {
                    self.intern(format!("{name}: {value}"))
                }
            })
            .collect()
    }
}

fn interner() -> MutexGuard<'static, HeaderInterner> {
    static INTERNER: OnceLock<Mutex<HeaderInterner>> = OnceLock::new();
    INTERNER
        .get_or_init(|| Mutex::new(HeaderInterner::new(MAX_INTERNED_HEADER_LINES)))
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
}

fn static_content_type_line(ct: &str) -> Option<&'static str> {
    match ct {
        "application/json" => Some("Content-Type: application/json"),
        "text/plain; charset=utf-8" => Some("Content-Type: text/plain; charset=utf-8"),
        "text/html; charset=utf-8" => Some("Content-Type: text/html; charset=utf-8"),
        "text/css" => Some("Content-Type: text/css"),
        "application/javascript" => Some("Content-Type: application/javascript"),
        "application/octet-stream" => Some("Content-Type: application/octet-stream"),
        _ => None,
    }
}

fn content_type_line(ct: &str) -> &'static str {
    static_content_type_line(ct)
        .or_else(|| interner().intern(format!("Content-Type: {ct}")))
        .unwrap_or("Content-Type: application/octet-stream")
}

/// Write a handler-populated response.
///
/// If its header lines cannot be interned any more, a generic `500` is
/// written instead.
pub fn write_handler_response(res: &mut Response, hr: HandlerResponse) {
    let Some(lines) = interner().header_lines(&hr) else {
        error!(
            status = hr.status,
            cap = MAX_INTERNED_HEADER_LINES,
            "Response header lines exhausted; sending 500"
        );
        write_json_error(res, 500, json!({ "error": "Internal Server Error" }));
        return;
    };
    res.status_code(hr.status as usize, status_reason(hr.status));
    for line in lines {
        res.header(line);
    }
    res.body_vec(hr.body);
}

/// Write raw bytes with a content type (static assets and rendered views).
pub fn write_bytes(res: &mut Response, status: u16, bytes: Vec<u8>, content_type: &str) {
    res.status_code(status as usize, status_reason(status));
    res.header(content_type_line(content_type));
    res.body_vec(bytes);
}

pub fn write_json_error(res: &mut Response, status: u16, body: Value) {
    res.status_code(status as usize, status_reason(status));
    res.header("Content-Type: application/json");
    res.body_vec(body.to_string().into_bytes());
}
