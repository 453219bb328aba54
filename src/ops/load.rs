//! Load a project directory into an input file index.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use glob::Pattern;
use walkdir::{DirEntry, WalkDir};

use crate::core::input::{InputFile, InputFiles};
use crate::core::manifest::DependencyManifest;
use crate::core::source_file::Language;
use crate::lang::python;
use crate::util::config::Config;

/// Walk `root` and classify every file into source, manifest, or other.
///
/// Hidden files and directories are skipped, as are paths matching the
/// configured ignore globs. Python sources are parsed for annotations and
/// imports; a malformed annotation fails the load.
pub fn load_project(root: &Path, config: &Config) -> Result<InputFiles> {
    let ignores = config
        .ignore_patterns()
        .iter()
        .map(|p| Pattern::new(p).with_context(|| format!("invalid ignore pattern `{}`", p)))
        .collect::<Result<Vec<_>>>()?;

    let mut files: Vec<(String, PathBuf)> = Vec::new();
    let walker = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_hidden(e));

    for entry in walker {
        let entry = entry.with_context(|| format!("failed to read {}", root.display()))?;
        if !entry.file_type().is_file() {
            continue;
        }

        let rel = relative_path(root, entry.path())?;
        if ignores.iter().any(|p| p.matches(&rel)) {
            tracing::debug!("Ignoring {}", rel);
            continue;
        }
        files.push((rel, entry.into_path()));
    }

    let known: HashSet<&str> = files.iter().map(|(rel, _)| rel.as_str()).collect();
    let manifest_name = config.python_manifest();
    let mut input = InputFiles::new();

    for (rel, abs) in &files {
        let file_name = rel.rsplit('/').next().unwrap_or(rel.as_str());
        let file = if file_name == manifest_name {
            InputFile::Manifest(DependencyManifest::new(rel.as_str(), read(abs)?))
        } else if Language::from_path(rel) == Some(Language::Python) {
            let content = read(abs)?;
            InputFile::Source(python::parse_source(rel, &content, |p| known.contains(p))?)
        } else {
            InputFile::Other { path: rel.clone() }
        };
        input.add(file);
    }

    tracing::info!(
        "Loaded {} files ({} sources) from {}",
        input.len(),
        input.sources().count(),
        root.display()
    );

    Ok(input)
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.file_name().to_string_lossy().starts_with('.')
}

fn relative_path(root: &Path, path: &Path) -> Result<String> {
    let rel = path
        .strip_prefix(root)
        .with_context(|| format!("{} is outside {}", path.display(), root.display()))?;
    Ok(rel
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/"))
}

fn read(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::annotation::EXECUTION_UNIT_CAPABILITY;
    use crate::lang::comment::AnnotationError;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    #[test]
    fn test_load_classifies_files() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "requirements.txt", "flask\n");
        write(tmp.path(), "app/main.py", "from app import util\n");
        write(tmp.path(), "app/__init__.py", "");
        write(tmp.path(), "app/util.py", "# @quay::execution_unit { id = \"app\" }\n");
        write(tmp.path(), "static/logo.svg", "<svg/>");

        let input = load_project(tmp.path(), &Config::default()).unwrap();

        assert_eq!(
            input.paths().collect::<Vec<_>>(),
            vec![
                "app/__init__.py",
                "app/main.py",
                "app/util.py",
                "requirements.txt",
                "static/logo.svg"
            ]
        );
        assert!(input.manifest("requirements.txt").is_some());
        assert!(matches!(input.get("static/logo.svg"), Some(InputFile::Other { .. })));

        let main = input.source("app/main.py").unwrap();
        assert_eq!(main.references(), &["app/__init__.py", "app/util.py"]);
        assert!(input
            .source("app/util.py")
            .unwrap()
            .is_bound_to(EXECUTION_UNIT_CAPABILITY, "app"));
    }

    #[test]
    fn test_load_skips_hidden_and_ignored() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "main.py", "");
        write(tmp.path(), ".git/config", "");
        write(tmp.path(), ".env", "SECRET=1");
        write(tmp.path(), "pkg/__pycache__/mod.cpython-312.pyc", "");
        write(tmp.path(), "scripts/dev.py", "");

        let mut config = Config::default();
        config.project.ignore.push("scripts/**".to_string());

        let input = load_project(tmp.path(), &config).unwrap();
        assert_eq!(input.paths().collect::<Vec<_>>(), vec!["main.py"]);
    }

    #[test]
    fn test_load_rejects_malformed_annotation() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "main.py", "# @quay::execution_unit { id = }\n");

        let err = load_project(tmp.path(), &Config::default()).unwrap_err();
        let annot = err.downcast_ref::<AnnotationError>().unwrap();
        assert_eq!(annot.path, "main.py");
    }

    #[test]
    fn test_load_respects_manifest_name() {
        let tmp = TempDir::new().unwrap();
        write(tmp.path(), "deps.txt", "flask\n");
        write(tmp.path(), "requirements.txt", "django\n");

        let mut config = Config::default();
        config.python.manifest = Some("deps.txt".to_string());

        let input = load_project(tmp.path(), &config).unwrap();
        assert!(input.manifest("deps.txt").is_some());
        assert!(input.manifest("requirements.txt").is_none());
    }
}
