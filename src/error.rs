//! # Error Module
//!
//! Every failure the dispatch engine can produce, grouped by how it surfaces:
//!
//! | Error | Raised by | HTTP |
//! |---|---|---|
//! | [`InvalidIdentifierError`] | [`crate::codec`] when code hands in a malformed identifier | 500 (via the handler that asked) |
//! | [`HandlerNotFoundError`] | [`crate::context::ResolutionContext::resolve`] | 404 |
//! | [`InstantiationError`] | [`crate::registry::HandlerRegistry::instantiate`] | 500 |
//! | [`HandlerExecutionError`] | the chain loop in [`crate::dispatcher::DispatchFilter`] | 500 |
//! | [`ConfigurationError`] | startup ([`crate::context::ResolutionContext::new`], [`crate::config`]) | service does not start |
//!
//! Resolution misses are expected and never escape the filter. Everything
//! else is wrapped with request and handler context and converted to a 500
//! at the single top-level boundary ([`crate::dispatcher::DispatchFilter::serve`]).

use crate::ids::HandlerId;
use std::path::PathBuf;
use thiserror::Error;

/// Boxed cause retained inside wrapping errors.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// A handler identifier violates one of the structural naming rules.
///
/// Never produced for identifiers the resolver synthesizes itself; only for
/// identifiers supplied directly by code (e.g. redirecting to a named handler).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidIdentifierError {
    /// The identifier contains the inner-type marker (`$`).
    #[error("handlers are not allowed to be inner types; '{identifier}' is therefore invalid")]
    InnerType { identifier: String },
    /// The last segment is exactly the handler suffix, which would map to an empty URI name.
    #[error("handlers which are just called '{suffix}' are disallowed; '{identifier}' is therefore invalid")]
    BareSuffix {
        identifier: String,
        suffix: &'static str,
    },
    /// The identifier does not end with the handler suffix.
    #[error("handlers must end with '{suffix}'; '{identifier}' is therefore invalid")]
    MissingSuffix {
        identifier: String,
        suffix: &'static str,
    },
    /// The identifier does not live below the configured base namespace.
    #[error("cannot retrieve URI of handler '{identifier}' because it is not inside the base namespace '{namespace}'")]
    OutsideNamespace {
        identifier: String,
        namespace: String,
    },
}

/// No handler is registered under the identifier synthesized for a URI.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot find handler '{candidate}' for request to '{uri}'")]
pub struct HandlerNotFoundError {
    /// The effective (normalized) URI that was requested
    pub uri: String,
    /// The identifier the resolver expected the handler to be registered under
    pub candidate: HandlerId,
}

/// A registered handler factory failed to produce an instance.
#[derive(Debug, Error)]
#[error("unable to construct new instance of handler '{identifier}'")]
pub struct InstantiationError {
    pub identifier: HandlerId,
    #[source]
    pub source: BoxError,
}

/// A handler failed while executing; the chain was aborted.
#[derive(Debug, Error)]
#[error("error while calling handler '{failing}'; first handler was '{first}', request URI is '{uri}'")]
pub struct HandlerExecutionError {
    /// Name of the handler whose `execute` failed
    pub failing: String,
    /// Identifier of the handler resolved for the request
    pub first: HandlerId,
    /// Logical request path
    pub uri: String,
    #[source]
    pub source: BoxError,
}

/// The handler chain ran longer than the configured loop guard allows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("handler chain exceeded {limit} invocations")]
pub struct ChainLimitExceeded {
    pub limit: usize,
}

/// Failures of a single request that surface as HTTP 500.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error(transparent)]
    Instantiation(#[from] InstantiationError),
    #[error(transparent)]
    Execution(#[from] HandlerExecutionError),
}

impl DispatchError {
    /// HTTP status this failure is reported with.
    #[must_use]
    pub fn status(&self) -> u16 {
        500
    }
}

/// Invalid startup configuration. Prevents the application from starting.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("handler base namespace cannot be blank")]
    BlankNamespace,
    #[error("provided handler base namespace ('{namespace}') is a handler and not a namespace")]
    NamespaceIsHandler { namespace: String },
    #[error("failed to read configuration file '{}'", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse configuration file '{}'", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}
