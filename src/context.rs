//! # Resolution Context
//!
//! Holds the dispatch configuration and a memoizing two-way cache over the
//! [`crate::codec`] functions.
//!
//! One context is built at startup and shared (behind an `Arc`) by the
//! dispatch filter and every handler invocation. The configuration is
//! immutable after construction; only the cache grows.
//!
//! ## Cache
//!
//! Both directions (identifier -> URI and URI -> identifier) live behind a
//! single `RwLock`, so a pair is always inserted atomically and neither map can
//! hold an entry without its partner. Entries are insert-once and never
//! evicted; the number of entries is bounded by the number of registered
//! handlers.
//!
//! Two requests that miss on the same key at the same time both compute the
//! pair and both insert. The computation is deterministic, so the second
//! insert finds an identical entry and leaves it alone.

use crate::codec::{effective_uri, ConventionCodec, IdentifierCodec, PATH_SEPARATOR};
use crate::error::{ConfigurationError, HandlerNotFoundError, InvalidIdentifierError};
use crate::ids::HandlerId;
use crate::registry::HandlerRegistry;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, warn};

/// Default path prefix of static assets.
pub const DEFAULT_STATIC_ASSET_PATH: &str = "/static";

/// Default path prefix of dynamic (rendered) assets.
pub const DEFAULT_DYNAMIC_ASSET_PATH: &str = "/assets/dynamic";

/// Default target of the root redirect.
pub const DEFAULT_INDEX_URI: &str = "/index";

/// Startup settings for a [`ResolutionContext`].
///
/// Path-like values are normalized to start with `/` and never end with `/`;
/// `None` or blank values fall back to the defaults above.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContextSettings {
    pub base_namespace: String,
    pub static_asset_path: Option<String>,
    pub dynamic_asset_path: Option<String>,
    pub index_uri: Option<String>,
}

impl ContextSettings {
    pub fn new(base_namespace: impl Into<String>) -> Self {
        Self {
            base_namespace: base_namespace.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn static_asset_path(mut self, path: impl Into<String>) -> Self {
        self.static_asset_path = Some(path.into());
        self
    }

    #[must_use]
    pub fn dynamic_asset_path(mut self, path: impl Into<String>) -> Self {
        self.dynamic_asset_path = Some(path.into());
        self
    }

    #[must_use]
    pub fn index_uri(mut self, uri: impl Into<String>) -> Self {
        self.index_uri = Some(uri.into());
        self
    }

    /// Normalized static asset path, or the default.
    #[must_use]
    pub fn effective_static_asset_path(&self) -> String {
        path_or_default(self.static_asset_path.as_deref(), DEFAULT_STATIC_ASSET_PATH)
    }

    /// Normalized dynamic asset path, or the default.
    #[must_use]
    pub fn effective_dynamic_asset_path(&self) -> String {
        path_or_default(self.dynamic_asset_path.as_deref(), DEFAULT_DYNAMIC_ASSET_PATH)
    }

    /// Normalized index URI, or the default.
    #[must_use]
    pub fn effective_index_uri(&self) -> String {
        path_or_default(self.index_uri.as_deref(), DEFAULT_INDEX_URI)
    }
}

#[derive(Debug, Default)]
struct UriCache {
    ids_to_uris: HashMap<HandlerId, String>,
    uris_to_ids: HashMap<String, HandlerId>,
}

impl UriCache {
    fn insert_pair(&mut self, identifier: &HandlerId, uri: &str) {
        self.ids_to_uris
            .entry(identifier.clone())
            .or_insert_with(|| uri.to_string());
        self.uris_to_ids
            .entry(uri.to_string())
            .or_insert_with(|| identifier.clone());
    }
}

/// Configuration plus the identifier <-> URI cache.
pub struct ResolutionContext {
    base_namespace: String,
    static_asset_path: String,
    dynamic_asset_path: String,
    index_uri: String,
    registry: Arc<HandlerRegistry>,
    codec: Arc<dyn IdentifierCodec>,
    cache: RwLock<UriCache>,
}

impl ResolutionContext {
    /// Build a context using the naming convention codec.
    pub fn new(
        settings: ContextSettings,
        registry: Arc<HandlerRegistry>,
    ) -> Result<Self, ConfigurationError> {
        Self::with_codec(settings, registry, Arc::new(ConventionCodec))
    }

    /// Build a context with an explicit codec.
    ///
    /// Fails when the base namespace is blank or is itself a registered
    /// handler identifier.
    pub fn with_codec(
        settings: ContextSettings,
        registry: Arc<HandlerRegistry>,
        codec: Arc<dyn IdentifierCodec>,
    ) -> Result<Self, ConfigurationError> {
        let base_namespace = settings.base_namespace.trim().to_string();
        if base_namespace.is_empty() {
            return Err(ConfigurationError::BlankNamespace);
        }
        if registry.contains(&base_namespace) {
            return Err(ConfigurationError::NamespaceIsHandler {
                namespace: base_namespace,
            });
        }

        let ctx = Self {
            static_asset_path: settings.effective_static_asset_path(),
            dynamic_asset_path: settings.effective_dynamic_asset_path(),
            index_uri: settings.effective_index_uri(),
            base_namespace,
            registry,
            codec,
            cache: RwLock::new(UriCache::default()),
        };

        for identifier in ctx.registry.identifiers() {
            if let Err(e) = ctx.codec.identifier_to_uri(&ctx.base_namespace, identifier) {
                warn!(
                    handler = %identifier,
                    error = %e,
                    "Registered handler is not reachable by any URI"
                );
            }
        }

        debug!(
            base_namespace = %ctx.base_namespace,
            static_asset_path = %ctx.static_asset_path,
            dynamic_asset_path = %ctx.dynamic_asset_path,
            index_uri = %ctx.index_uri,
            handlers = ctx.registry.len(),
            "Resolution context created"
        );
        Ok(ctx)
    }

    /// URI of the given handler identifier. Memoized; repeated calls never recompute.
    pub fn get_uri(&self, identifier: &HandlerId) -> Result<String, InvalidIdentifierError> {
        if let Some(uri) = self.read_cache().ids_to_uris.get(identifier) {
            debug!(handler = %identifier, uri = %uri, "URI cache hit");
            return Ok(uri.clone());
        }

        let uri = self.codec.identifier_to_uri(&self.base_namespace, identifier)?;
        self.write_cache().insert_pair(identifier, &uri);
        debug!(handler = %identifier, uri = %uri, "URI computed and cached");
        Ok(uri)
    }

    /// Identifier of the registered handler serving `uri`.
    ///
    /// `uri` is normalized first (see [`effective_uri`]). Only the URI the
    /// handler maps back to resolves: `/SomeRootTest` is not found even when
    /// `/someRootTest` is. A miss is not cached.
    pub fn resolve(&self, uri: &str) -> Result<HandlerId, HandlerNotFoundError> {
        let effective = effective_uri(uri);

        if let Some(identifier) = self.read_cache().uris_to_ids.get(&effective) {
            debug!(uri = %effective, handler = %identifier, "Handler cache hit");
            return Ok(identifier.clone());
        }

        let candidate = self.codec.uri_to_identifier(&self.base_namespace, &effective);
        if !self.registry.contains(candidate.as_str()) {
            debug!(uri = %effective, candidate = %candidate, "No handler registered for URI");
            return Err(HandlerNotFoundError {
                uri: effective,
                candidate,
            });
        }

        let canonical = self.codec.identifier_to_uri(&self.base_namespace, &candidate).ok();
        if canonical.as_deref() != Some(effective.as_str()) {
            debug!(
                uri = %effective,
                candidate = %candidate,
                canonical = ?canonical,
                "URI is not the canonical URI of its handler"
            );
            return Err(HandlerNotFoundError {
                uri: effective,
                candidate,
            });
        }

        self.write_cache().insert_pair(&candidate, &effective);
        debug!(uri = %effective, handler = %candidate, "Handler resolved and cached");
        Ok(candidate)
    }

    /// Dynamic asset path of a template that lives beside the handler `dir`.
    ///
    /// `app.actions.sub.SomeTestAction` + `page.html` -> `/assets/dynamic/sub/page.html`
    pub fn view_path(&self, dir: &HandlerId, name: &str) -> Result<String, InvalidIdentifierError> {
        let uri = self.get_uri(dir)?;
        let directory = uri.rsplit_once(PATH_SEPARATOR).map_or("", |(d, _)| d);
        let mut path = String::with_capacity(
            self.dynamic_asset_path.len() + directory.len() + name.len() + 2,
        );
        path.push_str(&self.dynamic_asset_path);
        path.push_str(directory);
        path.push(PATH_SEPARATOR);
        path.push_str(name.trim_start_matches(PATH_SEPARATOR));
        Ok(path)
    }

    /// `path` placed below the dynamic asset path.
    #[must_use]
    pub fn dynamic_path(&self, path: &str) -> String {
        let relative = path.trim_matches(PATH_SEPARATOR);
        let mut out = String::with_capacity(self.dynamic_asset_path.len() + relative.len() + 1);
        out.push_str(&self.dynamic_asset_path);
        out.push(PATH_SEPARATOR);
        out.push_str(relative);
        out
    }

    #[must_use]
    pub fn base_namespace(&self) -> &str {
        &self.base_namespace
    }

    #[must_use]
    pub fn static_asset_path(&self) -> &str {
        &self.static_asset_path
    }

    #[must_use]
    pub fn dynamic_asset_path(&self) -> &str {
        &self.dynamic_asset_path
    }

    #[must_use]
    pub fn index_uri(&self) -> &str {
        &self.index_uri
    }

    #[must_use]
    pub fn registry(&self) -> &HandlerRegistry {
        &self.registry
    }

    /// Cached URI of `identifier`, without computing it.
    #[must_use]
    pub fn cached_uri(&self, identifier: &str) -> Option<String> {
        self.read_cache().ids_to_uris.get(identifier).cloned()
    }

    /// Cached identifier for an (already effective) URI, without resolving it.
    #[must_use]
    pub fn cached_identifier(&self, uri: &str) -> Option<HandlerId> {
        self.read_cache().uris_to_ids.get(uri).cloned()
    }

    /// Number of cached pairs as `(identifiers, uris)`.
    #[must_use]
    pub fn cache_len(&self) -> (usize, usize) {
        let cache = self.read_cache();
        (cache.ids_to_uris.len(), cache.uris_to_ids.len())
    }

    // Entries are write-once, so a writer that panicked cannot have left a
    // half-updated pair behind.
    fn read_cache(&self) -> RwLockReadGuard<'_, UriCache> {
        self.cache.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_cache(&self) -> RwLockWriteGuard<'_, UriCache> {
        self.cache.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for ResolutionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (ids, uris) = self.cache_len();
        f.debug_struct("ResolutionContext")
            .field("base_namespace", &self.base_namespace)
            .field("static_asset_path", &self.static_asset_path)
            .field("dynamic_asset_path", &self.dynamic_asset_path)
            .field("index_uri", &self.index_uri)
            .field("registry", &self.registry)
            .field("cached_identifiers", &ids)
            .field("cached_uris", &uris)
            .finish()
    }
}

fn path_or_default(value: Option<&str>, default: &str) -> String {
    match value {
        Some(v) if !v.trim().trim_matches(PATH_SEPARATOR).is_empty() => effective_uri(v.trim()),
        _ => default.to_string(),
    }
}
