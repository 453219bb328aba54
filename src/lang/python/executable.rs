//! The Python executable plugin.
//!
//! Claims every unclaimed execution unit that has a `requirements.txt`
//! (unit-scoped first, then the project default), seeds its entrypoints from
//! membership annotations or the fallback path convention, resolves its
//! owned-file closure, and promotes exposed files to entrypoints.

use rayon::prelude::*;

use crate::core::annotation::{EXECUTION_UNIT_CAPABILITY, EXPOSE_CAPABILITY};
use crate::core::manifest::DependencyManifest;
use crate::core::result::{CompilationResult, Dependencies, ProjectIndex, ResourceKey};
use crate::core::source_file::Language;
use crate::core::unit::{EntrypointSource, ExecutableType, ExecutionUnit, UnitResource};
use crate::lang::plugin::{LanguagePlugin, PluginError};
use crate::resolver::errors::ResolutionError;
use crate::resolver::files::SourceFilesResolver;
use crate::util::config::{
    Config, DEFAULT_BOUNDARIES, DEFAULT_PYTHON_ENTRYPOINTS, DEFAULT_PYTHON_MANIFEST,
};

type Edges = Vec<(ResourceKey, ResourceKey)>;

/// Transform plugin for Python execution units.
#[derive(Debug, Clone)]
pub struct PythonExecutable {
    /// Conventional manifest file name
    manifest_name: String,

    /// Ordered fallback entrypoint paths
    fallback_entrypoints: Vec<String>,

    /// Closure resolver with the upstream boundary capabilities
    resolver: SourceFilesResolver,

    /// Process units in parallel
    parallel: bool,
}

impl Default for PythonExecutable {
    fn default() -> Self {
        PythonExecutable {
            manifest_name: DEFAULT_PYTHON_MANIFEST.to_string(),
            fallback_entrypoints: DEFAULT_PYTHON_ENTRYPOINTS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            resolver: SourceFilesResolver::new(DEFAULT_BOUNDARIES.iter().copied()),
            parallel: false,
        }
    }
}

impl PythonExecutable {
    /// Create the plugin with default settings, processing units in sequence.
    pub fn new() -> Self {
        PythonExecutable::default()
    }

    /// Create the plugin from configuration.
    pub fn from_config(config: &Config) -> Self {
        PythonExecutable {
            manifest_name: config.python_manifest().to_string(),
            fallback_entrypoints: config.python_fallback_entrypoints(),
            resolver: SourceFilesResolver::new(config.boundaries()),
            parallel: config.parallel(),
        }
    }

    /// Process units in parallel.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    fn transform_unit(
        &self,
        unit: &mut ExecutionUnit,
        project: ProjectIndex<'_>,
        default_manifest: Option<&DependencyManifest>,
    ) -> Result<Edges, ResolutionError> {
        if let Some(ty) = unit.executable.ty {
            tracing::debug!(
                "Skipping execution unit '{}': executable type is already set to '{}'",
                unit.name(),
                ty
            );
            return Ok(Vec::new());
        }

        let manifest = unit
            .check_for_project_file(&self.manifest_name)
            .and_then(|path| project.input.manifest(&path))
            .or(default_manifest);
        let Some(manifest) = manifest else {
            tracing::debug!(
                "{} not found for execution unit: {}",
                self.manifest_name,
                unit.name()
            );
            return Ok(Vec::new());
        };

        let unit_key = ResourceKey::Unit(unit.name().to_string());
        let mut edges = vec![(
            unit_key.clone(),
            ResourceKey::Manifest(manifest.path().to_string()),
        )];

        unit.add_resource(UnitResource::Manifest(manifest.clone()));
        unit.claim(ExecutableType::Python);
        tracing::debug!(
            "Claimed execution unit '{}' as {} using {}",
            unit.name(),
            ExecutableType::Python,
            manifest.path()
        );

        self.add_annotated_entrypoints(unit, project);
        if unit.entrypoints().next().is_none() {
            self.add_default_entrypoints(unit, project);
        }
        if unit.entrypoints().next().is_none() {
            tracing::warn!("Execution unit '{}' has no entrypoints", unit.name());
        }

        let closure = self.resolver.resolve(unit, project)?;
        let added = unit.merge_source_files(closure);
        tracing::debug!(
            "Resolved {} source files for execution unit '{}' ({} new)",
            unit.source_files().len(),
            unit.name(),
            added
        );

        edges.extend(
            refresh_upstream_entrypoints(unit, project)
                .into_iter()
                .map(|path| (unit_key.clone(), ResourceKey::File(path))),
        );

        Ok(edges)
    }

    fn add_annotated_entrypoints(&self, unit: &mut ExecutionUnit, project: ProjectIndex<'_>) {
        let bound: Vec<String> = unit
            .files_of_lang(project.input, Language::Python)
            .filter(|f| f.is_bound_to(EXECUTION_UNIT_CAPABILITY, unit.name()))
            .map(|f| f.path().to_string())
            .collect();

        for path in bound {
            tracing::debug!(
                "Adding execution unit entrypoint: [@quay::{}] -> [{}] -> {}",
                EXECUTION_UNIT_CAPABILITY,
                unit.name(),
                path
            );
            unit.add_entrypoint(path, EntrypointSource::Annotation);
        }
    }

    fn add_default_entrypoints(&self, unit: &mut ExecutionUnit, project: ProjectIndex<'_>) {
        for fallback in &self.fallback_entrypoints {
            let Some(file) = unit.get(project.input, fallback) else {
                continue;
            };
            if self.resolver.is_foreign_boundary(file, unit.name()) {
                tracing::debug!(
                    "Skipping default entrypoint {} for execution unit '{}': bound to another unit",
                    fallback,
                    unit.name()
                );
                continue;
            }
            tracing::debug!(
                "Adding execution unit entrypoint: [default] -> [{}] -> {}",
                unit.name(),
                fallback
            );
            unit.add_entrypoint(fallback.clone(), EntrypointSource::Default);
        }
    }
}

/// Promote every owned file carrying an exposure annotation to an entrypoint.
/// Returns the newly promoted paths.
fn refresh_upstream_entrypoints(unit: &mut ExecutionUnit, project: ProjectIndex<'_>) -> Vec<String> {
    let exposed: Vec<String> = unit
        .source_files()
        .keys()
        .filter(|path| {
            project
                .input
                .source(path)
                .is_some_and(|f| f.is_annotated_with(EXPOSE_CAPABILITY))
        })
        .cloned()
        .collect();

    exposed
        .into_iter()
        .filter(|path| {
            let added = unit.add_entrypoint(path.clone(), EntrypointSource::Exposure);
            if added {
                tracing::debug!(
                    "Adding execution unit entrypoint: [@quay::{}] -> [{}] -> {}",
                    EXPOSE_CAPABILITY,
                    unit.name(),
                    path
                );
            }
            added
        })
        .collect()
}

impl LanguagePlugin for PythonExecutable {
    fn name(&self) -> &str {
        "python_executable"
    }

    fn transform(
        &self,
        result: &mut CompilationResult,
        dependencies: &mut Dependencies,
    ) -> Result<(), PluginError> {
        let (project, units) = result.split_mut();
        let default_manifest = project.input.manifest(&self.manifest_name);

        if self.parallel {
            let outcomes: Vec<Result<Edges, ResolutionError>> = units
                .par_iter_mut()
                .map(|(_, unit)| self.transform_unit(unit, project, default_manifest))
                .collect();

            let mut first_error = None;
            for outcome in outcomes {
                match outcome {
                    Ok(edges) => dependencies.extend(edges),
                    Err(err) if first_error.is_none() => first_error = Some(err),
                    Err(err) => tracing::warn!("{}", err),
                }
            }
            if let Some(err) = first_error {
                return Err(err.into());
            }
        } else {
            for unit in units.values_mut() {
                let edges = self.transform_unit(unit, project, default_manifest)?;
                dependencies.extend(edges);
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::ProjectBuilder;

    fn compile_one(builder: ProjectBuilder, unit: ExecutionUnit) -> (CompilationResult, Dependencies) {
        let mut result = builder.compilation();
        result.add_unit(unit);
        let mut deps = Dependencies::new();
        PythonExecutable::new()
            .transform(&mut result, &mut deps)
            .unwrap();
        (result, deps)
    }

    fn entrypoints(result: &CompilationResult, unit: &str) -> Vec<String> {
        result
            .unit(unit)
            .unwrap()
            .entrypoints()
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn test_default_entrypoint() {
        let builder = ProjectBuilder::new()
            .manifest("requirements.txt", "fastapi\n")
            .python("app/main.py", "from app import routes\n")
            .python("app/routes.py", "");
        let unit = builder.unit("main");

        let (result, _) = compile_one(builder, unit);
        let unit = result.unit("main").unwrap();

        assert_eq!(entrypoints(&result, "main"), vec!["app/main.py"]);
        assert_eq!(unit.entrypoint_source("app/main.py"), Some(EntrypointSource::Default));
        assert_eq!(unit.executable.ty, Some(ExecutableType::Python));
        assert!(unit.owns("app/routes.py"));
    }

    #[test]
    fn test_all_fallback_matches_are_added() {
        let builder = ProjectBuilder::new()
            .manifest("requirements.txt", "")
            .python("main.py", "")
            .python("app/main.py", "");
        let unit = builder.unit("main");

        let (result, _) = compile_one(builder, unit);
        assert_eq!(entrypoints(&result, "main"), vec!["app/main.py", "main.py"]);
    }

    #[test]
    fn test_annotated_entrypoints_suppress_defaults() {
        let builder = ProjectBuilder::new()
            .manifest("requirements.txt", "")
            .python("main.py", "")
            .python("api/server.py", "# @quay::execution_unit { id = \"api\" }\n")
            .python("api/other.py", "# @quay::execution_unit { id = \"worker\" }\n");
        let unit = builder.unit("api");

        let (result, _) = compile_one(builder, unit);
        assert_eq!(entrypoints(&result, "api"), vec!["api/server.py"]);
    }

    #[test]
    fn test_no_entrypoints_is_tolerated() {
        let builder = ProjectBuilder::new()
            .manifest("requirements.txt", "")
            .python("lib/util.py", "");
        let unit = builder.unit("main");

        let (result, _) = compile_one(builder, unit);
        let unit = result.unit("main").unwrap();
        assert!(unit.is_claimed());
        assert_eq!(unit.entrypoints().count(), 0);
        assert!(unit.source_files().is_empty());
    }

    #[test]
    fn test_manifest_fallback_clones_default() {
        let builder = ProjectBuilder::new()
            .manifest("requirements.txt", "flask==3.0\n")
            .python("main.py", "");
        let unit = builder.unit("main");

        let (result, deps) = compile_one(builder, unit);
        let attached = result.unit("main").unwrap().manifest().unwrap();
        let default = result.input().manifest("requirements.txt").unwrap();

        assert_eq!(attached, default);
        assert!(!std::ptr::eq(attached, default));
        assert!(deps
            .downstream(&ResourceKey::Unit("main".into()))
            .any(|k| *k == ResourceKey::Manifest("requirements.txt".into())));
    }

    #[test]
    fn test_unit_scoped_manifest_wins() {
        let builder = ProjectBuilder::new()
            .manifest("requirements.txt", "flask\n")
            .manifest("api/requirements.txt", "fastapi\n")
            .python("api/main.py", "# @quay::execution_unit { id = \"api\" }\n");
        let unit = builder.unit("api").with_directory("api");

        let (result, _) = compile_one(builder, unit);
        let attached = result.unit("api").unwrap().manifest().unwrap();
        assert_eq!(attached.path(), "api/requirements.txt");
        assert_eq!(attached.content(), "fastapi\n");
    }

    #[test]
    fn test_declines_without_manifest() {
        let builder = ProjectBuilder::new().python("main.py", "");
        let unit = builder.unit("main");

        let (result, deps) = compile_one(builder, unit);
        let unit = result.unit("main").unwrap();
        assert!(!unit.is_claimed());
        assert!(unit.manifest().is_none());
        assert_eq!(unit.entrypoints().count(), 0);
        assert!(deps.is_empty());
    }

    #[test]
    fn test_decline_is_per_unit() {
        let builder = ProjectBuilder::new()
            .manifest("b/requirements.txt", "")
            .python("b/main.py", "# @quay::execution_unit { id = \"b\" }\n")
            .python("a/main.py", "# @quay::execution_unit { id = \"a\" }\n");

        let mut result = builder.compilation();
        result.add_unit(builder.unit("a").with_directory("a"));
        result.add_unit(builder.unit("b").with_directory("b"));
        PythonExecutable::new()
            .transform(&mut result, &mut Dependencies::new())
            .unwrap();

        assert!(!result.unit("a").unwrap().is_claimed());
        assert!(result.unit("b").unwrap().is_claimed());
    }

    #[test]
    fn test_exposed_files_become_entrypoints() {
        let builder = ProjectBuilder::new()
            .manifest("requirements.txt", "")
            .python("main.py", "import routes\n")
            .python("routes.py", "# @quay::expose { id = \"main\" }\n");
        let unit = builder.unit("main");

        let (result, deps) = compile_one(builder, unit);
        let unit = result.unit("main").unwrap();

        assert_eq!(entrypoints(&result, "main"), vec!["main.py", "routes.py"]);
        assert_eq!(unit.entrypoint_source("routes.py"), Some(EntrypointSource::Exposure));
        assert!(deps
            .downstream(&ResourceKey::Unit("main".into()))
            .any(|k| *k == ResourceKey::File("routes.py".into())));
    }

    #[test]
    fn test_foreign_exposed_file_is_cut() {
        let builder = ProjectBuilder::new()
            .manifest("requirements.txt", "")
            .python("main.py", "import gateway\n")
            .python("gateway.py", "# @quay::expose { id = \"public\" }\nimport deep\n")
            .python("deep.py", "");
        let unit = builder.unit("main");

        let (result, _) = compile_one(builder, unit);
        let unit = result.unit("main").unwrap();
        assert!(!unit.owns("gateway.py"));
        assert!(!unit.owns("deep.py"));
        assert_eq!(entrypoints(&result, "main"), vec!["main.py"]);
    }

    #[test]
    fn test_other_units_member_is_cut() {
        let builder = ProjectBuilder::new()
            .manifest("requirements.txt", "")
            .python("main.py", "import worker\n")
            .python(
                "worker.py",
                "# @quay::execution_unit { id = \"worker\" }\nimport jobs\n",
            )
            .python("jobs.py", "");

        let mut result = builder.compilation();
        result.add_unit(builder.unit("main"));
        result.add_unit(builder.unit("worker"));
        PythonExecutable::new()
            .transform(&mut result, &mut Dependencies::new())
            .unwrap();

        assert_eq!(
            result.unit("main").unwrap().source_files().keys().collect::<Vec<_>>(),
            vec!["main.py"]
        );
        assert_eq!(
            result.unit("worker").unwrap().source_files().keys().collect::<Vec<_>>(),
            vec!["jobs.py", "worker.py"]
        );
    }

    #[test]
    fn test_default_entrypoint_bound_elsewhere_is_skipped() {
        let builder = ProjectBuilder::new()
            .manifest("requirements.txt", "")
            .python(
                "main.py",
                "# @quay::execution_unit { id = \"api\" }\nimport secret\n",
            )
            .python("secret.py", "");

        let mut result = builder.compilation();
        result.add_unit(builder.unit("main"));
        result.add_unit(builder.unit("api"));
        PythonExecutable::new()
            .transform(&mut result, &mut Dependencies::new())
            .unwrap();

        let main = result.unit("main").unwrap();
        assert_eq!(main.entrypoints().count(), 0);
        assert!(!main.owns("main.py"));
        assert!(!main.owns("secret.py"));

        let api = result.unit("api").unwrap();
        assert_eq!(entrypoints(&result, "api"), vec!["main.py"]);
        assert!(api.owns("secret.py"));
    }

    #[test]
    fn test_skip_when_already_claimed() {
        let builder = ProjectBuilder::new()
            .manifest("requirements.txt", "")
            .python("main.py", "");
        let mut unit = builder.unit("main");
        unit.claim(ExecutableType::NodeJs);

        let (result, deps) = compile_one(builder, unit);
        let unit = result.unit("main").unwrap();
        assert_eq!(unit.executable.ty, Some(ExecutableType::NodeJs));
        assert!(unit.manifest().is_none());
        assert_eq!(unit.entrypoints().count(), 0);
        assert!(deps.is_empty());
    }

    #[test]
    fn test_resolution_error_names_unit() {
        let builder = ProjectBuilder::new()
            .manifest("requirements.txt", "")
            .python("main.py", "from .missing import thing\n");
        let mut result = builder.compilation();
        result.add_unit(builder.unit("main"));

        let err = PythonExecutable::new()
            .transform(&mut result, &mut Dependencies::new())
            .unwrap_err();
        let PluginError::Resolution(err) = err else {
            panic!("expected a resolution error, got {err:?}");
        };
        assert_eq!(err.unit(), Some("main"));
        assert_eq!(err.missing_path(), "missing.py");

        // Claimed and seeded, but the closure was never merged.
        let unit = result.unit("main").unwrap();
        assert!(unit.is_claimed());
        assert!(unit.source_files().is_empty());
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let builder = ProjectBuilder::new()
            .manifest("requirements.txt", "")
            .python("a/main.py", "# @quay::execution_unit { id = \"a\" }\nimport shared\n")
            .python("b/main.py", "# @quay::execution_unit { id = \"b\" }\nimport shared\n")
            .python("shared.py", "");

        let run = |parallel: bool| {
            let mut result = builder.compilation();
            result.add_unit(builder.unit("a"));
            result.add_unit(builder.unit("b"));
            PythonExecutable::new()
                .with_parallel(parallel)
                .transform(&mut result, &mut Dependencies::new())
                .unwrap();
            result
                .units()
                .map(|u| (u.name().to_string(), u.source_files().keys().cloned().collect::<Vec<_>>()))
                .collect::<Vec<_>>()
        };

        assert_eq!(run(true), run(false));
        assert_eq!(run(false)[0].1, vec!["a/main.py", "shared.py"]);
    }
}
