//! File dependency resolution.
//!
//! This module builds the project-wide file dependency graph and computes
//! each execution unit's owned-file closure over it. Resolution is pure: it
//! reads the shared graph and returns a closure without touching the unit.

pub mod errors;
pub mod files;
pub mod graph;

pub use errors::ResolutionError;
pub use files::SourceFilesResolver;
pub use graph::DependencyGraph;
