//! Implementation of `quay compile`.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::core::result::{CompilationResult, Dependencies, ResourceKey};
use crate::core::unit::{EntrypointSource, ExecutionUnit};
use crate::lang::plugin::PluginError;
use crate::lang::registry::PluginRegistry;
use crate::ops::discover::discover_units;
use crate::ops::load::load_project;
use crate::util::config::Config;

/// Output of a compilation run.
#[derive(Debug)]
pub struct Compilation {
    pub result: CompilationResult,
    pub dependencies: Dependencies,
}

/// Compile the project at `root` with the default plugins.
pub fn compile(root: &Path, config: &Config) -> Result<Compilation> {
    let registry = PluginRegistry::with_defaults(config);
    compile_with(root, config, &registry)
}

/// Compile the project at `root` with an explicit plugin registry.
pub fn compile_with(root: &Path, config: &Config, registry: &PluginRegistry) -> Result<Compilation> {
    let input = load_project(root, config)?;
    let mut result = CompilationResult::new(input);

    for unit in discover_units(result.input(), config) {
        let name = unit.name().to_string();
        if !result.add_unit(unit) {
            tracing::warn!("Duplicate execution unit '{}'", name);
        }
    }

    tracing::debug!(
        "Dependency graph: {} files, {} references",
        result.graph().file_count(),
        result.graph().reference_count()
    );

    let mut dependencies = Dependencies::new();

    match config.jobs() {
        Some(jobs) => {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(jobs)
                .build()
                .context("failed to create worker pool")?;
            pool.install(|| run_plugins(registry, &mut result, &mut dependencies))?;
        }
        None => run_plugins(registry, &mut result, &mut dependencies)?,
    }

    Ok(Compilation {
        result,
        dependencies,
    })
}

/// Run every registered plugin, in registration order, over the result.
///
/// After each plugin the result is checked for units whose entrypoints are
/// not among their owned files.
pub fn run_plugins(
    registry: &PluginRegistry,
    result: &mut CompilationResult,
    dependencies: &mut Dependencies,
) -> Result<(), PluginError> {
    for plugin in registry.iter() {
        tracing::debug!("Running plugin '{}'", plugin.name());
        plugin.transform(result, dependencies)?;

        if let Some((unit, entrypoints)) = result.inconsistent_units().into_iter().next() {
            return Err(PluginError::Inconsistent {
                plugin: plugin.name().to_string(),
                unit: unit.to_string(),
                entrypoints: entrypoints.into_iter().map(String::from).collect(),
            });
        }
    }
    Ok(())
}

/// Serializable summary of a compilation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompileReport {
    pub units: Vec<UnitReport>,
    pub dependencies: Vec<EdgeReport>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnitReport {
    pub name: String,
    pub directory: String,
    pub executable_type: Option<String>,
    pub manifest: Option<String>,
    pub entrypoints: Vec<EntrypointReport>,
    pub source_files: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntrypointReport {
    pub path: String,
    pub source: EntrypointSource,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EdgeReport {
    pub from: ResourceKey,
    pub to: ResourceKey,
}

impl UnitReport {
    fn from_unit(unit: &ExecutionUnit) -> Self {
        UnitReport {
            name: unit.name().to_string(),
            directory: unit.directory().to_string(),
            executable_type: unit.executable.ty.map(|t| t.to_string()),
            manifest: unit.manifest().map(|m| m.path().to_string()),
            entrypoints: unit
                .executable
                .entrypoints
                .iter()
                .map(|(path, source)| EntrypointReport {
                    path: path.clone(),
                    source: *source,
                })
                .collect(),
            source_files: unit.source_files().keys().cloned().collect(),
        }
    }
}

impl Compilation {
    /// Build the serializable summary.
    pub fn report(&self) -> CompileReport {
        CompileReport {
            units: self.result.units().map(UnitReport::from_unit).collect(),
            dependencies: self
                .dependencies
                .iter()
                .map(|(from, to)| EdgeReport {
                    from: from.clone(),
                    to: to.clone(),
                })
                .collect(),
        }
    }
}

/// Format a report for terminal output.
pub fn format_report(report: &CompileReport) -> String {
    let mut out = String::new();

    for unit in &report.units {
        match &unit.executable_type {
            Some(ty) => out.push_str(&format!("{} ({})\n", unit.name, ty)),
            None => {
                out.push_str(&format!("{} (unclaimed)\n", unit.name));
                continue;
            }
        }
        if let Some(manifest) = &unit.manifest {
            out.push_str(&format!("  manifest: {}\n", manifest));
        }
        for ep in &unit.entrypoints {
            out.push_str(&format!("  entrypoint: {} [{}]\n", ep.path, ep.source));
        }
        out.push_str(&format!("  {} source files\n", unit.source_files.len()));
        for file in &unit.source_files {
            out.push_str(&format!("    {}\n", file));
        }
    }

    out
}
