//! Capability annotations.
//!
//! An annotation is a flat record attached to a location in a source file:
//! a capability name from a fixed vocabulary, an optional identifier that
//! binds it to a specific execution unit, and any extra directives written
//! in its body. Annotations are immutable once parsed; all matching is done
//! with plain predicates rather than by file subtype.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

/// Marks a file's constructs as members of the unit named by the identifier.
pub const EXECUTION_UNIT_CAPABILITY: &str = "execution_unit";

/// Marks a file as externally reachable, independent of unit membership.
pub const EXPOSE_CAPABILITY: &str = "expose";

/// Marks a persistence binding (key-value stores, ORMs, secrets).
pub const PERSIST_CAPABILITY: &str = "persist";

/// Marks a directory of static assets served as its own unit.
pub const STATIC_UNIT_CAPABILITY: &str = "static_unit";

/// Marks a file whose contents are runtime configuration.
pub const CONFIG_CAPABILITY: &str = "config";

/// Marks assets embedded into the owning unit's package.
pub const EMBED_ASSETS_CAPABILITY: &str = "embed_assets";

/// The full capability vocabulary understood by the compiler.
pub const KNOWN_CAPABILITIES: &[&str] = &[
    EXECUTION_UNIT_CAPABILITY,
    EXPOSE_CAPABILITY,
    PERSIST_CAPABILITY,
    STATIC_UNIT_CAPABILITY,
    CONFIG_CAPABILITY,
    EMBED_ASSETS_CAPABILITY,
];

/// Check whether a capability name is part of the vocabulary.
pub fn is_known_capability(name: &str) -> bool {
    KNOWN_CAPABILITIES.contains(&name)
}

/// The capability carried by an annotation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Capability {
    /// Capability name (e.g., "execution_unit")
    pub name: String,

    /// Identifier binding the capability to a unit or resource
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Remaining key/value pairs from the annotation body
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub directives: BTreeMap<String, toml::Value>,
}

impl Capability {
    /// Create a capability without an identifier.
    pub fn new(name: impl Into<String>) -> Self {
        Capability {
            name: name.into(),
            id: None,
            directives: BTreeMap::new(),
        }
    }

    /// Set the identifier.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.id {
            Some(id) => write!(f, "@quay::{} {{ id = \"{}\" }}", self.name, id),
            None => write!(f, "@quay::{}", self.name),
        }
    }
}

/// A capability marker found in a source file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Annotation {
    /// The capability this annotation declares
    pub capability: Capability,

    /// Project-relative path of the owning file
    pub file: String,

    /// 1-based line the annotation was found on
    pub line: usize,
}

impl Annotation {
    /// Create a new annotation.
    pub fn new(capability: Capability, file: impl Into<String>, line: usize) -> Self {
        Annotation {
            capability,
            file: file.into(),
            line,
        }
    }

    /// The capability name.
    pub fn name(&self) -> &str {
        &self.capability.name
    }

    /// The identifier, if any.
    pub fn id(&self) -> Option<&str> {
        self.capability.id.as_deref()
    }

    /// Check whether this annotation carries the given capability.
    pub fn is(&self, capability: &str) -> bool {
        self.capability.name == capability
    }

    /// Check whether this annotation binds to `unit` under `capability`.
    ///
    /// An annotation without an identifier never binds to a unit.
    pub fn binds_to(&self, capability: &str, unit: &str) -> bool {
        self.is(capability) && self.id() == Some(unit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binds_to_requires_name_and_id() {
        let annot = Annotation::new(
            Capability::new(EXECUTION_UNIT_CAPABILITY).with_id("api"),
            "api/handler.py",
            3,
        );

        assert!(annot.binds_to(EXECUTION_UNIT_CAPABILITY, "api"));
        assert!(!annot.binds_to(EXECUTION_UNIT_CAPABILITY, "worker"));
        assert!(!annot.binds_to(EXPOSE_CAPABILITY, "api"));
    }

    #[test]
    fn test_annotation_without_id_never_binds() {
        let annot = Annotation::new(Capability::new(EXPOSE_CAPABILITY), "app.py", 1);
        assert!(annot.is(EXPOSE_CAPABILITY));
        assert!(!annot.binds_to(EXPOSE_CAPABILITY, ""));
        assert_eq!(annot.id(), None);
    }

    #[test]
    fn test_vocabulary() {
        assert!(is_known_capability("expose"));
        assert!(is_known_capability("execution_unit"));
        assert!(!is_known_capability("teleport"));
    }

    #[test]
    fn test_capability_display() {
        let cap = Capability::new(EXECUTION_UNIT_CAPABILITY).with_id("api");
        assert_eq!(cap.to_string(), "@quay::execution_unit { id = \"api\" }");
        assert_eq!(Capability::new("expose").to_string(), "@quay::expose");
    }
}
