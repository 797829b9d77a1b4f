//! # Identifier Codec
//!
//! Pure, stateless conversion between URI paths and handler identifiers.
//!
//! ## Mapping Rules
//!
//! A handler identifier is a namespaced name ending in [`HANDLER_SUFFIX`].
//! Once the configured base namespace is removed, namespace segments become
//! path segments and the last segment loses its suffix and is uncapitalized:
//!
//! ```text
//! base namespace: app.actions
//!
//! app.actions.sub1.sub2.SomeTestAction  <->  /sub1/sub2/someTest
//! app.actions.SomeRootTestAction        <->  /someRootTest
//! ```
//!
//! The reverse direction only *constructs* a candidate identifier. Whether a
//! handler exists under it is the registry's business; see
//! [`crate::context::ResolutionContext::resolve`].
//!
//! ## Validation
//!
//! [`identifier_to_uri`] rejects identifiers that
//! - contain the inner-type marker `$`
//! - are named exactly `Action` (the URI name would be empty)
//! - do not end with `Action`
//! - do not live below the base namespace
//!
//! ## Usage
//!
//! ```rust
//! use chainroute::codec::{identifier_to_uri, uri_to_identifier};
//! use chainroute::ids::HandlerId;
//!
//! let id = HandlerId::new("app.actions.sub.SomeTestAction");
//! assert_eq!(identifier_to_uri("app.actions", &id).unwrap(), "/sub/someTest");
//! assert_eq!(uri_to_identifier("app.actions", "/sub/someTest"), id);
//! ```

use crate::error::InvalidIdentifierError;
use crate::ids::{HandlerId, NAMESPACE_SEPARATOR};

/// Mandatory suffix of every handler identifier.
pub const HANDLER_SUFFIX: &str = "Action";

/// Marker that denotes a nested/inner type inside an identifier.
pub const INNER_TYPE_MARKER: char = '$';

/// Separator between URI path segments.
pub const PATH_SEPARATOR: char = '/';

/// Seam between the resolution cache and the naming convention.
///
/// [`ConventionCodec`] is the only production implementation; the trait exists
/// so the cache can be observed (and counted) in tests.
pub trait IdentifierCodec: Send + Sync {
    /// Map a handler identifier to its URI.
    fn identifier_to_uri(
        &self,
        base_namespace: &str,
        identifier: &HandlerId,
    ) -> Result<String, InvalidIdentifierError>;

    /// Construct the candidate handler identifier for a URI.
    fn uri_to_identifier(&self, base_namespace: &str, uri: &str) -> HandlerId;
}

/// The `SomeTestAction` <-> `someTest` naming convention.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConventionCodec;

impl IdentifierCodec for ConventionCodec {
    fn identifier_to_uri(
        &self,
        base_namespace: &str,
        identifier: &HandlerId,
    ) -> Result<String, InvalidIdentifierError> {
        identifier_to_uri(base_namespace, identifier)
    }

    fn uri_to_identifier(&self, base_namespace: &str, uri: &str) -> HandlerId {
        uri_to_identifier(base_namespace, uri)
    }
}

/// Returns the URI the given handler identifier is mapped to.
///
/// The result always starts with `/` and never ends with `/`.
pub fn identifier_to_uri(
    base_namespace: &str,
    identifier: &HandlerId,
) -> Result<String, InvalidIdentifierError> {
    let id = identifier.as_str();

    if id.contains(INNER_TYPE_MARKER) {
        return Err(InvalidIdentifierError::InnerType {
            identifier: id.to_string(),
        });
    }
    if identifier.simple_name() == HANDLER_SUFFIX {
        return Err(InvalidIdentifierError::BareSuffix {
            identifier: id.to_string(),
            suffix: HANDLER_SUFFIX,
        });
    }
    if !id.ends_with(HANDLER_SUFFIX) {
        return Err(InvalidIdentifierError::MissingSuffix {
            identifier: id.to_string(),
            suffix: HANDLER_SUFFIX,
        });
    }

    let relative = id
        .strip_prefix(base_namespace)
        .and_then(|rest| rest.strip_prefix(NAMESPACE_SEPARATOR))
        .ok_or_else(|| InvalidIdentifierError::OutsideNamespace {
            identifier: id.to_string(),
            namespace: base_namespace.to_string(),
        })?;

    // "path.to.SomeTestAction" -> ("path/to", "someTest")
    let (dir, name) = split_at_last(relative, NAMESPACE_SEPARATOR);
    let uri_dir = dir.replace(NAMESPACE_SEPARATOR, "/");
    let uri_name = uncapitalize(name.strip_suffix(HANDLER_SUFFIX).unwrap_or(name));

    let mut uri = String::with_capacity(relative.len() + 1);
    uri.push(PATH_SEPARATOR);
    uri.push_str(&join_non_blank(PATH_SEPARATOR, &[uri_dir.as_str(), uri_name.as_str()]));
    Ok(uri)
}

/// Constructs the candidate handler identifier for the given URI.
///
/// Leading and trailing `/` are ignored, so `/foo`, `foo` and `//foo/` all
/// yield the same identifier.
#[must_use]
pub fn uri_to_identifier(base_namespace: &str, uri: &str) -> HandlerId {
    let trimmed = uri.trim_matches(PATH_SEPARATOR);

    // "path/to/someTest" -> ("path.to", "SomeTestAction")
    let (dir, name) = split_at_last(trimmed, PATH_SEPARATOR);
    let namespace = dir.replace(PATH_SEPARATOR, ".");
    let mut type_name = capitalize(name);
    type_name.push_str(HANDLER_SUFFIX);

    HandlerId::new(join_non_blank(
        NAMESPACE_SEPARATOR,
        &[base_namespace, namespace.as_str(), type_name.as_str()],
    ))
}

/// Canonical form of a URI or configured path: exactly one leading `/`, no trailing `/`.
///
/// Every cache lookup goes through this so `/foo`, `foo` and `//foo/` occupy a
/// single slot.
#[must_use]
pub fn effective_uri(uri: &str) -> String {
    let trimmed = uri.trim_matches(PATH_SEPARATOR);
    let mut out = String::with_capacity(trimmed.len() + 1);
    out.push(PATH_SEPARATOR);
    out.push_str(trimmed);
    out
}

fn split_at_last(s: &str, separator: char) -> (&str, &str) {
    s.rsplit_once(separator).unwrap_or(("", s))
}

fn join_non_blank(separator: char, items: &[&str]) -> String {
    let mut out = String::new();
    for item in items.iter().filter(|item| !item.trim().is_empty()) {
        if !out.is_empty() {
            out.push(separator);
        }
        out.push_str(item);
    }
    out
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn uncapitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NS: &str = "app.actions";

    fn uri_of(id: &str) -> Result<String, InvalidIdentifierError> {
        identifier_to_uri(NS, &HandlerId::new(id))
    }

    #[test]
    fn test_identifier_to_uri_nested() {
        assert_eq!(uri_of("app.actions.sub1.sub2.SomeTestAction").unwrap(), "/sub1/sub2/someTest");
        assert_eq!(uri_of("app.actions.sub.SomeTestAction").unwrap(), "/sub/someTest");
    }

    #[test]
    fn test_identifier_to_uri_root_level() {
        assert_eq!(uri_of("app.actions.SomeRootTestAction").unwrap(), "/someRootTest");
    }

    #[test]
    fn test_identifier_to_uri_rejects_inner_type() {
        assert!(matches!(
            uri_of("app.actions.Outer$InnerAction"),
            Err(InvalidIdentifierError::InnerType { .. })
        ));
    }

    #[test]
    fn test_identifier_to_uri_rejects_bare_suffix() {
        assert!(matches!(
            uri_of("app.actions.sub.Action"),
            Err(InvalidIdentifierError::BareSuffix { .. })
        ));
    }

    #[test]
    fn test_identifier_to_uri_rejects_missing_suffix() {
        assert!(matches!(
            uri_of("app.actions.sub.SomeTest"),
            Err(InvalidIdentifierError::MissingSuffix { .. })
        ));
    }

    #[test]
    fn test_identifier_to_uri_rejects_foreign_namespace() {
        assert!(matches!(
            uri_of("other.actions.SomeTestAction"),
            Err(InvalidIdentifierError::OutsideNamespace { .. })
        ));
        // A shared textual prefix is not a namespace boundary
        assert!(matches!(
            uri_of("app.actionsextra.SomeTestAction"),
            Err(InvalidIdentifierError::OutsideNamespace { .. })
        ));
    }

    #[test]
    fn test_uri_to_identifier() {
        assert_eq!(
            uri_to_identifier(NS, "/sub1/sub2/someTest").as_str(),
            "app.actions.sub1.sub2.SomeTestAction"
        );
        assert_eq!(
            uri_to_identifier(NS, "/someRootTest").as_str(),
            "app.actions.SomeRootTestAction"
        );
    }

    #[test]
    fn test_uri_to_identifier_ignores_surrounding_slashes() {
        let expected = uri_to_identifier(NS, "/sub1/sub2/someTest");
        assert_eq!(uri_to_identifier(NS, "sub1/sub2/someTest"), expected);
        assert_eq!(uri_to_identifier(NS, "//sub1/sub2/someTest//"), expected);
    }

    #[test]
    fn test_round_trip() {
        for id in [
            "app.actions.IndexAction",
            "app.actions.sub.SomeTestAction",
            "app.actions.a.b.c.DeeplyNestedAction",
            "app.actions.admin.UserListAction",
        ] {
            let id = HandlerId::new(id);
            let uri = identifier_to_uri(NS, &id).unwrap();
            assert_eq!(uri_to_identifier(NS, &uri), id, "round trip via {uri}");
        }
    }

    #[test]
    fn test_effective_uri() {
        assert_eq!(effective_uri("/foo"), "/foo");
        assert_eq!(effective_uri("foo"), "/foo");
        assert_eq!(effective_uri("//foo/"), "/foo");
        assert_eq!(effective_uri("static/"), "/static");
        assert_eq!(effective_uri(""), "/");
    }

    #[test]
    fn test_capitalization_helpers() {
        assert_eq!(capitalize("someTest"), "SomeTest");
        assert_eq!(uncapitalize("SomeTest"), "someTest");
        assert_eq!(capitalize(""), "");
        assert_eq!(uncapitalize("Émile"), "émile");
    }
}
