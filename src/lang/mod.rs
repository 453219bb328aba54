//! Language front ends and transform plugins.
//!
//! Front ends turn raw files into annotated [`SourceFile`]s with references;
//! plugins claim execution units and populate their executables.
//!
//! [`SourceFile`]: crate::core::SourceFile

pub mod comment;
pub mod plugin;
pub mod python;
pub mod registry;

pub use comment::AnnotationError;
pub use plugin::{LanguagePlugin, PluginError};
pub use registry::PluginRegistry;
