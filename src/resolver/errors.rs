//! Resolution error types and diagnostics.

use thiserror::Error;

use crate::util::diagnostic::{suggestions, Diagnostic};

/// Error during file dependency resolution.
#[derive(Debug, Error)]
pub enum ResolutionError {
    #[error("file `{path}` is not in the project index")]
    MissingFile {
        path: String,
        /// The file whose reference could not be located
        referenced_by: Option<String>,
    },

    #[error("file dependency resolution failed for execution unit `{unit}`")]
    Unit {
        unit: String,
        #[source]
        source: Box<ResolutionError>,
    },
}

impl ResolutionError {
    /// Wrap an error with the unit it occurred in.
    pub fn in_unit(unit: impl Into<String>, err: ResolutionError) -> Self {
        ResolutionError::Unit {
            unit: unit.into(),
            source: Box::new(err),
        }
    }

    /// The unit this error was raised for, if known.
    pub fn unit(&self) -> Option<&str> {
        match self {
            ResolutionError::Unit { unit, .. } => Some(unit),
            ResolutionError::MissingFile { .. } => None,
        }
    }

    /// The innermost missing path.
    pub fn missing_path(&self) -> &str {
        match self {
            ResolutionError::MissingFile { path, .. } => path,
            ResolutionError::Unit { source, .. } => source.missing_path(),
        }
    }

    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            ResolutionError::MissingFile {
                path,
                referenced_by,
            } => {
                let mut diag =
                    Diagnostic::error(format!("could not find `{}` in the project", path));
                if let Some(referrer) = referenced_by {
                    diag = diag
                        .at_file(referrer)
                        .with_note(format!("referenced by `{}`", referrer));
                }
                diag.with_suggestion(suggestions::MISSING_FILE)
                    .with_suggestion(suggestions::CHECK_IGNORES)
            }

            ResolutionError::Unit { unit, source } => {
                let mut diag = source.to_diagnostic();
                diag.notes.insert(0, diag.message.clone());
                diag.message = format!(
                    "file dependency resolution failed for execution unit `{}`",
                    unit
                );
                diag.in_unit(unit)
            }
        }
    }
}
