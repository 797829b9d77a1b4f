//! # Dispatcher Module
//!
//! The dispatcher turns an incoming request into a chain of handler
//! invocations.
//!
//! ## Request Flow
//!
//! [`DispatchFilter::filter`] runs for every request:
//!
//! 1. Compute the logical path (request path minus the mount prefix)
//! 2. Root path (`/`, `//`, ...) → `302` to the configured index URI,
//!    prefixed with the mount prefix
//! 3. Path below the static asset path → pass through to the static backend
//! 4. Resolve a handler identifier through the
//!    [`ResolutionContext`](crate::context::ResolutionContext); a miss is a `404`
//! 5. Instantiate a fresh handler from the registry
//! 6. Execute the chain: each handler returns the next one to run, or `None`
//!
//! ## Handler Chains
//!
//! A handler that has done its part hands over to another, already
//! constructed handler:
//!
//! ```rust,ignore
//! fn execute(&mut self, req: &mut HandlerRequest, res: &mut HandlerResponse, ctx: &ResolutionContext)
//!     -> anyhow::Result<Next>
//! {
//!     req.push("user", self.load_user(req.param("id"))?);
//!     Ok(Some(Box::new(View::beside(ctx.resolve("/user/show")?, "show.html"))))
//! }
//! ```
//!
//! The chain is never re-resolved: the returned handler runs as is.
//!
//! ## Error Handling
//!
//! - Unknown paths return `404` and are not errors
//! - Factory failures and handler failures abort the request with `500`; the
//!   log entry names the failing handler, the first handler and the URI
//! - A configurable loop guard aborts chains that never terminate

mod core;
mod filter;

pub use core::{
    normalize_mount_prefix, Handler, HandlerRequest, HandlerResponse, HeaderVec, Next, ParamVec,
    MAX_INLINE_HEADERS, MAX_INLINE_PARAMS,
};
pub use filter::{DispatchFilter, FilterOutcome, DEFAULT_MAX_CHAIN};
