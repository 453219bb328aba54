//! Core data structures for Quay.
//!
//! This module contains the foundational types used throughout the compiler:
//! - Capability annotations and the source files carrying them
//! - The arena-indexed project file index
//! - Dependency manifests
//! - Execution units and the compilation result that owns them

pub mod annotation;
pub mod input;
pub mod manifest;
pub mod result;
pub mod source_file;
pub mod unit;

pub use annotation::{Annotation, Capability, EXECUTION_UNIT_CAPABILITY, EXPOSE_CAPABILITY};
pub use input::{FileId, InputFile, InputFiles};
pub use manifest::DependencyManifest;
pub use result::{CompilationResult, Dependencies, ProjectIndex, ResourceKey};
pub use source_file::{Language, SourceFile};
pub use unit::{EntrypointSource, Executable, ExecutableType, ExecutionUnit, UnitResource};
