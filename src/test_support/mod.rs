//! Test utilities for Quay unit tests.
//!
//! [`ProjectBuilder`] assembles an input file index in memory, running the
//! real Python front end over each source so tests exercise the same
//! annotations and references the loader would produce.
//!
//! ```rust,ignore
//! let builder = ProjectBuilder::new()
//!     .manifest("requirements.txt", "flask\n")
//!     .python("main.py", "import routes\n")
//!     .python("routes.py", "# @quay::expose { id = \"main\" }\n");
//! let mut result = builder.compilation();
//! result.add_unit(builder.unit("main"));
//! ```

use crate::core::input::{InputFile, InputFiles};
use crate::core::manifest::DependencyManifest;
use crate::core::result::CompilationResult;
use crate::core::unit::ExecutionUnit;
use crate::lang::python;

#[derive(Debug, Clone)]
enum Spec {
    Python(String),
    Manifest(String),
    Other,
}

/// In-memory project fixture.
#[derive(Debug, Clone, Default)]
pub struct ProjectBuilder {
    files: Vec<(String, Spec)>,
}

impl ProjectBuilder {
    pub fn new() -> Self {
        ProjectBuilder::default()
    }

    /// Add a Python source file.
    pub fn python(mut self, path: &str, content: &str) -> Self {
        self.files
            .push((path.to_string(), Spec::Python(content.to_string())));
        self
    }

    /// Add a dependency manifest.
    pub fn manifest(mut self, path: &str, content: &str) -> Self {
        self.files
            .push((path.to_string(), Spec::Manifest(content.to_string())));
        self
    }

    /// Add an opaque file.
    pub fn other(mut self, path: &str) -> Self {
        self.files.push((path.to_string(), Spec::Other));
        self
    }

    /// Build the input index.
    ///
    /// # Panics
    ///
    /// Panics if a Python fixture contains a malformed annotation.
    pub fn build(&self) -> InputFiles {
        let known: Vec<&str> = self.files.iter().map(|(p, _)| p.as_str()).collect();
        let mut input = InputFiles::new();

        for (path, spec) in &self.files {
            let file = match spec {
                Spec::Python(content) => InputFile::Source(
                    python::parse_source(path, content, |p| known.contains(&p))
                        .unwrap_or_else(|e| panic!("bad fixture {}: {}", path, e)),
                ),
                Spec::Manifest(content) => {
                    InputFile::Manifest(DependencyManifest::new(path.as_str(), content.as_str()))
                }
                Spec::Other => InputFile::Other { path: path.clone() },
            };
            input.add(file);
        }

        input
    }

    /// Build a compilation result with no units.
    pub fn compilation(&self) -> CompilationResult {
        CompilationResult::new(self.build())
    }

    /// An unclaimed unit that sees every fixture file.
    pub fn unit(&self, name: &str) -> ExecutionUnit {
        ExecutionUnit::new(name).with_files(self.files.iter().map(|(p, _)| p.clone()))
    }
}
