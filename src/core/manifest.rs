//! Dependency manifests attached to execution units.
//!
//! A manifest is an opaque dependency declaration (e.g. `requirements.txt`)
//! identified by its conventional file name. The core never parses its
//! contents. Units receive their own clone of a manifest so that later
//! customisation never aliases the project-wide default.

use serde::Serialize;

/// A dependency manifest loaded from the project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DependencyManifest {
    /// Project-relative path
    path: String,

    /// Raw contents
    #[serde(skip)]
    content: String,
}

impl DependencyManifest {
    /// Create a manifest from its path and raw contents.
    pub fn new(path: impl Into<String>, content: impl Into<String>) -> Self {
        DependencyManifest {
            path: path.into(),
            content: content.into(),
        }
    }

    /// Project-relative path.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The conventional file name (last path component).
    pub fn file_name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }

    /// Raw contents.
    pub fn content(&self) -> &str {
        &self.content
    }
}
