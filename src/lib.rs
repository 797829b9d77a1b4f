//! # chainroute
//!
//! **chainroute** is a convention-based request dispatcher for Rust. Instead of
//! a route table, the request path *is* the handler's name: `/sub/someTest`
//! is served by the handler registered as `app.actions.sub.SomeTestAction`.
//! Handlers run in a chain, each returning the next handler to run until one
//! returns `None`. Served over `may_minihttp` on the `may` coroutine runtime.
//!
//! ## Architecture
//!
//! - **[`codec`]** - Pure, validated mapping between URIs and handler identifiers
//! - **[`registry`]** - Identifier → factory table populated at startup
//! - **[`context`]** - Dispatch configuration plus a two-way identifier/URI cache
//! - **[`dispatcher`]** - Handler contract, request/response types and the dispatch filter
//! - **[`resolutions`]** - Built-in leaf handlers: redirects, views, plain text
//! - **[`server`]** - HTTP service and server lifecycle on `may_minihttp`
//! - **[`static_files`]** - Static assets and template rendering
//! - **[`config`]**, **[`runtime_config`]**, **[`logging`]** - Startup configuration
//!
//! ### Request Handling Flow
//!
//! ```mermaid
//! sequenceDiagram
//!     participant Client
//!     participant Service as server::AppService
//!     participant Filter as dispatcher::DispatchFilter
//!     participant Ctx as context::ResolutionContext
//!     participant Registry as registry::HandlerRegistry
//!     participant Handler
//!
//!     Client->>Service: GET /shop/sub/someTest
//!     Service->>Filter: serve(request, response)
//!     Filter->>Filter: logical path = /sub/someTest
//!     alt root path
//!         Filter-->>Client: 302 Location: /shop/index
//!     else static asset path
//!         Filter-->>Service: PassThrough
//!         Service-->>Client: file bytes
//!     else
//!         Filter->>Ctx: resolve("/sub/someTest")
//!         Ctx-->>Filter: app.actions.sub.SomeTestAction (or 404)
//!         Filter->>Registry: instantiate(identifier)
//!         loop until None
//!             Filter->>Handler: execute(req, res, ctx)
//!             Handler-->>Filter: Some(next) / None
//!         end
//!         Filter-->>Service: Completed
//!         Service-->>Client: response (or rendered view)
//!     end
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use chainroute::context::{ContextSettings, ResolutionContext};
//! use chainroute::dispatcher::{DispatchFilter, Handler, HandlerRequest, HandlerResponse, Next};
//! use chainroute::registry::HandlerRegistry;
//! use chainroute::resolutions::Text;
//!
//! #[derive(Default)]
//! struct IndexAction;
//!
//! impl Handler for IndexAction {
//!     fn execute(
//!         &mut self,
//!         _req: &mut HandlerRequest,
//!         _res: &mut HandlerResponse,
//!         _ctx: &ResolutionContext,
//!     ) -> anyhow::Result<Next> {
//!         Ok(Some(Box::new(Text::new("welcome"))))
//!     }
//! }
//!
//! let mut registry = HandlerRegistry::new();
//! registry.register_default::<IndexAction>("app.actions.IndexAction");
//!
//! let context = ResolutionContext::new(ContextSettings::new("app.actions"), Arc::new(registry))?;
//! let filter = DispatchFilter::new(Arc::new(context));
//!
//! let mut req = HandlerRequest::new(http::Method::GET, "/index");
//! let mut res = HandlerResponse::new();
//! filter.serve(&mut req, &mut res);
//! assert_eq!(res.body, b"welcome");
//! # Ok::<(), chainroute::error::ConfigurationError>(())
//! ```
//!
//! To serve over HTTP, wrap the filter in a [`server::AppService`] and start it
//! with [`server::HttpServer`], or run `chainroute serve --config app.yaml`.

pub mod cli;
pub mod codec;
pub mod config;
pub mod context;
pub mod dispatcher;
mod echo;
pub mod error;
pub mod ids;
pub mod logging;
pub mod registry;
pub mod resolutions;
pub mod runtime_config;
pub mod server;
pub mod static_files;

pub use codec::{identifier_to_uri, uri_to_identifier};
pub use context::{ContextSettings, ResolutionContext};
pub use dispatcher::{DispatchFilter, Handler, HandlerRequest, HandlerResponse, Next};
pub use ids::HandlerId;
pub use registry::HandlerRegistry;
