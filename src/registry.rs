//! # Handler Registry
//!
//! Maps handler identifiers to factories that produce fresh handler instances.
//!
//! The registry is populated once at startup and is read-only afterwards.
//! Resolution asks it whether a candidate identifier exists; the dispatch
//! filter asks it for a new instance per request.
//!
//! ```rust
//! use chainroute::dispatcher::{Handler, HandlerRequest, HandlerResponse, Next};
//! use chainroute::context::ResolutionContext;
//! use chainroute::registry::HandlerRegistry;
//!
//! #[derive(Default)]
//! struct IndexAction;
//!
//! impl Handler for IndexAction {
//!     fn execute(
//!         &mut self,
//!         _req: &mut HandlerRequest,
//!         res: &mut HandlerResponse,
//!         _ctx: &ResolutionContext,
//!     ) -> anyhow::Result<Next> {
//!         res.write_str("hello");
//!         Ok(None)
//!     }
//! }
//!
//! let mut registry = HandlerRegistry::new();
//! registry.register_default::<IndexAction>("app.actions.IndexAction");
//! assert!(registry.contains("app.actions.IndexAction"));
//! ```

use crate::dispatcher::Handler;
use crate::error::InstantiationError;
use crate::ids::HandlerId;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Produces a new handler instance, or fails if the handler cannot be constructed.
pub type HandlerFactory = Arc<dyn Fn() -> anyhow::Result<Box<dyn Handler>> + Send + Sync>;

/// Identifier -> factory table consulted by resolution and instantiation.
#[derive(Clone, Default)]
pub struct HandlerRegistry {
    factories: HashMap<HandlerId, HandlerFactory>,
}

impl HandlerRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a factory under the given identifier.
    ///
    /// **IMPORTANT**: registering the same identifier twice replaces the
    /// earlier factory.
    pub fn register<F>(&mut self, identifier: impl Into<HandlerId>, factory: F)
    where
        F: Fn() -> anyhow::Result<Box<dyn Handler>> + Send + Sync + 'static,
    {
        let identifier = identifier.into();
        if self.factories.contains_key(&identifier) {
            warn!(
                handler = %identifier,
                total_handlers = self.factories.len(),
                "Replaced existing handler factory"
            );
        }
        self.factories.insert(identifier.clone(), Arc::new(factory));
        info!(
            handler = %identifier,
            total_handlers = self.factories.len(),
            "Handler registered successfully"
        );
    }

    /// Register a handler type that is constructed through `Default`.
    pub fn register_default<H>(&mut self, identifier: impl Into<HandlerId>)
    where
        H: Handler + Default + 'static,
    {
        self.register(identifier, || Ok(Box::new(H::default()) as Box<dyn Handler>));
    }

    #[must_use]
    pub fn contains(&self, identifier: &str) -> bool {
        self.factories.contains_key(identifier)
    }

    /// Construct a fresh instance of the handler registered under `identifier`.
    pub fn instantiate(&self, identifier: &HandlerId) -> Result<Box<dyn Handler>, InstantiationError> {
        let factory = self
            .factories
            .get(identifier)
            .ok_or_else(|| InstantiationError {
                identifier: identifier.clone(),
                source: "no factory registered".into(),
            })?;

        let handler = factory().map_err(|e| InstantiationError {
            identifier: identifier.clone(),
            source: e.into(),
        })?;
        debug!(handler = %identifier, "Handler instantiated");
        Ok(handler)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.factories.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    /// Registered identifiers in no particular order.
    pub fn identifiers(&self) -> impl Iterator<Item = &HandlerId> {
        self.factories.keys()
    }
}

impl std::fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut ids: Vec<&str> = self.factories.keys().map(HandlerId::as_str).collect();
        ids.sort_unstable();
        f.debug_struct("HandlerRegistry").field("handlers", &ids).finish()
    }
}
