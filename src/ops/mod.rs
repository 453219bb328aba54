//! High-level operations.
//!
//! This module contains the implementation of Quay commands.

pub mod discover;
pub mod load;
pub mod quay_compile;
pub mod quay_explain;

pub use discover::discover_units;
pub use load::load_project;
pub use quay_compile::{
    compile, compile_with, format_report, run_plugins, Compilation, CompileReport, EdgeReport,
    EntrypointReport, UnitReport,
};
pub use quay_explain::{explain, format_explanation, Ownership};
