//! # Server Module
//!
//! HTTP integration on top of `may_minihttp`:
//!
//! - [`request`]: raw request → [`HandlerRequest`](crate::dispatcher::HandlerRequest)
//! - [`response`]: [`HandlerResponse`](crate::dispatcher::HandlerResponse) → wire
//! - [`service`]: [`AppService`], the `HttpService` running the dispatch filter
//! - [`http_server`]: [`HttpServer`] / [`ServerHandle`] lifecycle

pub mod http_server;
pub mod request;
pub mod response;
pub mod service;

pub use http_server::{HttpServer, ServerHandle};
pub use request::parse_request;
pub use service::AppService;
