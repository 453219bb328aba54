//! Quay - partitions an annotated source tree into execution units
//!
//! This crate provides the compiler core: the annotation model, the source
//! dependency graph, the boundary-aware file resolver, execution units, and
//! the language transform plugins that claim and populate them.

pub mod core;
pub mod lang;
pub mod ops;
pub mod resolver;
pub mod util;

/// Test utilities for Quay unit tests.
///
/// This module is only available when compiling with `--cfg test` or
/// running tests. It provides an in-memory project builder.
#[cfg(test)]
pub mod test_support;

pub use core::{
    annotation::Annotation, input::InputFiles, result::CompilationResult, result::Dependencies,
    unit::ExecutionUnit,
};

pub use lang::{LanguagePlugin, PluginRegistry};
pub use resolver::SourceFilesResolver;
pub use util::context::GlobalContext;
