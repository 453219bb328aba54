//! Python support: the source front end and the executable plugin.

pub mod executable;
pub mod imports;

pub use executable::PythonExecutable;

use crate::core::source_file::{Language, SourceFile};
use crate::lang::comment::{parse_annotations, AnnotationError};

/// Parse a Python file into a [`SourceFile`] with annotations and references.
///
/// `exists` reports whether a project-relative path is part of the project;
/// it decides which imports are local.
pub fn parse_source(
    path: &str,
    content: &str,
    exists: impl Fn(&str) -> bool,
) -> Result<SourceFile, AnnotationError> {
    let annotations = parse_annotations(path, content, Language::Python.comment_prefix())?;

    let mut references: Vec<String> = Vec::new();
    for import in imports::extract_imports(content) {
        for reference in imports::resolve_import(path, &import, &exists) {
            if reference != path && !references.contains(&reference) {
                references.push(reference);
            }
        }
    }

    Ok(SourceFile::new(path, Language::Python, content)
        .with_annotations(annotations)
        .with_references(references))
}
