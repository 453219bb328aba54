//! The language transform plugin contract.
//!
//! A plugin claims the execution units that belong to its ecosystem and
//! fills in their executable descriptor. Plugins must leave units they do
//! not claim untouched, and must never modify a unit whose executable type
//! is already set.

use thiserror::Error;

use crate::core::result::{CompilationResult, Dependencies};
use crate::resolver::errors::ResolutionError;
use crate::util::diagnostic::{suggestions, Diagnostic};

/// Error returned by a plugin's transform.
#[derive(Debug, Error)]
pub enum PluginError {
    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    #[error(
        "plugin `{plugin}` left unit `{unit}` with entrypoints that are not owned files: {}",
        .entrypoints.join(", ")
    )]
    Inconsistent {
        plugin: String,
        unit: String,
        entrypoints: Vec<String>,
    },
}

impl PluginError {
    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            PluginError::Resolution(err) => err.to_diagnostic(),
            PluginError::Inconsistent {
                plugin,
                unit,
                entrypoints,
            } => Diagnostic::error(format!(
                "plugin `{}` produced an inconsistent execution unit `{}`",
                plugin, unit
            ))
            .in_unit(unit)
            .with_note(format!("unowned entrypoints: {}", entrypoints.join(", ")))
            .with_suggestion(suggestions::NOT_OWNED),
        }
    }
}

/// A language-specific transform over the compilation result.
pub trait LanguagePlugin: Send + Sync {
    /// Stable plugin name (e.g., "python_executable").
    fn name(&self) -> &str;

    /// Claim and populate the execution units belonging to this ecosystem.
    ///
    /// Invoked once per compilation pass. Returning an error aborts the rest
    /// of this invocation; the caller decides whether the compilation fails.
    fn transform(
        &self,
        result: &mut CompilationResult,
        dependencies: &mut Dependencies,
    ) -> Result<(), PluginError>;
}
