//! Source files as seen by the compiler core.

use serde::{Deserialize, Serialize};

use crate::core::annotation::Annotation;

/// Language of a source file, as detected by a front end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// Python sources (`*.py`)
    Python,
}

impl Language {
    /// Get the language name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Python => "python",
        }
    }

    /// Detect a language from a file path's extension.
    pub fn from_path(path: &str) -> Option<Self> {
        match path.rsplit_once('.').map(|(_, ext)| ext) {
            Some("py") => Some(Language::Python),
            _ => None,
        }
    }

    /// The line-comment prefix for this language.
    pub fn comment_prefix(&self) -> &'static str {
        match self {
            Language::Python => "#",
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parsed source file.
///
/// References are project-relative paths this file depends on. They are
/// produced by the language front end and may name files that do not exist;
/// the dependency graph records those as dangling.
#[derive(Debug, Clone)]
pub struct SourceFile {
    path: String,
    language: Language,
    content: String,
    annotations: Vec<Annotation>,
    references: Vec<String>,
}

impl SourceFile {
    /// Create a source file with no annotations or references.
    pub fn new(path: impl Into<String>, language: Language, content: impl Into<String>) -> Self {
        SourceFile {
            path: path.into(),
            language,
            content: content.into(),
            annotations: Vec::new(),
            references: Vec::new(),
        }
    }

    /// Attach annotations found in this file.
    pub fn with_annotations(mut self, annotations: Vec<Annotation>) -> Self {
        self.annotations = annotations;
        self
    }

    /// Attach outgoing references.
    pub fn with_references(mut self, references: Vec<String>) -> Self {
        self.references = references;
        self
    }

    /// Project-relative path.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn language(&self) -> Language {
        self.language
    }

    /// Raw file contents.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Annotations in source order.
    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    /// Paths this file references.
    pub fn references(&self) -> &[String] {
        &self.references
    }

    /// Check whether any annotation carries the capability.
    pub fn is_annotated_with(&self, capability: &str) -> bool {
        self.annotations.iter().any(|a| a.is(capability))
    }

    /// Check whether any annotation binds this file to `unit` under `capability`.
    pub fn is_bound_to(&self, capability: &str, unit: &str) -> bool {
        self.annotations.iter().any(|a| a.binds_to(capability, unit))
    }
}
