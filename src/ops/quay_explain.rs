//! Implementation of `quay explain`.
//!
//! Reports which execution units own a file, and for each one the shortest
//! reference chain from one of the unit's entrypoints to the file.

use anyhow::{bail, Result};
use serde::Serialize;

use crate::core::input::{normalize_path, FileId};
use crate::core::result::CompilationResult;
use crate::core::unit::EntrypointSource;

/// Why a unit owns a file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Ownership {
    /// Owning unit
    pub unit: String,

    /// Set when the file is itself one of the unit's entrypoints
    pub entrypoint: Option<EntrypointSource>,

    /// Reference chain from an entrypoint to the file, both ends included
    pub chain: Vec<String>,
}

/// Explain the ownership of `path` across all units.
///
/// Returns an empty list when the file exists but no unit owns it.
pub fn explain(result: &CompilationResult, path: &str) -> Result<Vec<Ownership>> {
    let input = result.input();
    let Some(target) = normalize_path(path).and_then(|p| input.id_of(&p)) else {
        bail!(
            "`{}` is not part of the project\n\
             help: paths are relative to the project root",
            path
        );
    };
    let target_path = input.file(target).path();

    let mut owners = Vec::new();
    for unit in result.units() {
        if !unit.owns(target_path) {
            continue;
        }

        let starts: Vec<FileId> = unit
            .entrypoints()
            .filter_map(|ep| input.id_of(ep))
            .collect();
        let chain = result
            .graph()
            .shortest_chain(&starts, target, |f| unit.owns(input.file(f).path()))
            .unwrap_or_default()
            .into_iter()
            .map(|f| input.file(f).path().to_string())
            .collect();

        owners.push(Ownership {
            unit: unit.name().to_string(),
            entrypoint: unit.entrypoint_source(target_path),
            chain,
        });
    }

    Ok(owners)
}

/// Format an explanation for terminal output.
pub fn format_explanation(path: &str, owners: &[Ownership]) -> String {
    if owners.is_empty() {
        return format!("{} is not owned by any execution unit\n", path);
    }

    let mut out = String::new();
    for owner in owners {
        match owner.entrypoint {
            Some(source) => out.push_str(&format!(
                "{}: entrypoint of '{}' ({})\n",
                path, owner.unit, source
            )),
            None if owner.chain.is_empty() => {
                out.push_str(&format!("{}: owned by '{}'\n", path, owner.unit))
            }
            None => out.push_str(&format!(
                "{}: owned by '{}' via {}\n",
                path,
                owner.unit,
                owner.chain.join(" -> ")
            )),
        }
    }
    out
}
