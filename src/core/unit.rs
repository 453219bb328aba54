//! Execution units.
//!
//! An execution unit is an independently deployable grouping of source files.
//! Units start unclaimed; exactly one language plugin claims a unit by
//! assigning its executable type, after which the unit's entrypoints and
//! owned source files are filled in.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::Serialize;

use crate::core::input::{join_path, FileId, InputFile, InputFiles};
use crate::core::manifest::DependencyManifest;
use crate::core::source_file::{Language, SourceFile};

/// Executable type assigned by the plugin that claims a unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
#[non_exhaustive]
pub enum ExecutableType {
    Python,
    NodeJs,
}

impl ExecutableType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExecutableType::Python => "python",
            ExecutableType::NodeJs => "nodejs",
        }
    }
}

impl fmt::Display for ExecutableType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a file became an entrypoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntrypointSource {
    /// The file carries a membership annotation bound to the unit
    Annotation,
    /// The file matched the plugin's fallback path convention
    Default,
    /// The file is owned by the unit and carries an exposure annotation
    Exposure,
}

impl fmt::Display for EntrypointSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntrypointSource::Annotation => f.write_str("annotation"),
            EntrypointSource::Default => f.write_str("default"),
            EntrypointSource::Exposure => f.write_str("exposure"),
        }
    }
}

/// The executable descriptor of a unit.
#[derive(Debug, Clone, Default)]
pub struct Executable {
    /// Executable type; `None` until a plugin claims the unit
    pub ty: Option<ExecutableType>,

    /// Entrypoint paths, with the rule that first added each
    pub entrypoints: BTreeMap<String, EntrypointSource>,

    /// Owned source files (the resolved closure)
    pub source_files: BTreeMap<String, FileId>,
}

/// A resource attached to a unit. Opaque to the core.
#[derive(Debug, Clone, PartialEq)]
pub enum UnitResource {
    Manifest(DependencyManifest),
}

/// An execution unit.
#[derive(Debug, Clone)]
pub struct ExecutionUnit {
    /// Unit name, unique within a compilation
    name: String,

    /// Directory scoping unit-local lookups (`""` is the project root)
    directory: String,

    /// Project files visible to this unit
    files: BTreeSet<String>,

    /// Executable descriptor
    pub executable: Executable,

    /// Attached resources
    resources: Vec<UnitResource>,
}

impl ExecutionUnit {
    /// Create an unclaimed unit scoped to the project root.
    pub fn new(name: impl Into<String>) -> Self {
        ExecutionUnit {
            name: name.into(),
            directory: String::new(),
            files: BTreeSet::new(),
            executable: Executable::default(),
            resources: Vec::new(),
        }
    }

    /// Scope unit-local lookups to a directory.
    pub fn with_directory(mut self, directory: impl Into<String>) -> Self {
        self.directory = directory.into();
        self
    }

    /// Make project files visible to this unit.
    pub fn with_files<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.files.extend(paths.into_iter().map(Into::into));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn directory(&self) -> &str {
        &self.directory
    }

    /// Paths visible to this unit.
    pub fn files(&self) -> impl Iterator<Item = &str> + '_ {
        self.files.iter().map(String::as_str)
    }

    /// Check whether a project file is visible to this unit.
    pub fn has_file(&self, path: &str) -> bool {
        self.files.contains(path)
    }

    /// Get a project file by path, if it is visible to this unit.
    pub fn get<'a>(&self, input: &'a InputFiles, path: &str) -> Option<&'a InputFile> {
        if self.has_file(path) {
            input.get(path)
        } else {
            None
        }
    }

    /// Visible source files of one language.
    pub fn files_of_lang<'a>(
        &'a self,
        input: &'a InputFiles,
        lang: Language,
    ) -> impl Iterator<Item = &'a SourceFile> + 'a {
        self.files
            .iter()
            .filter_map(move |p| input.source(p))
            .filter(move |f| f.language() == lang)
    }

    /// Look for a unit-scoped project file with a conventional name.
    ///
    /// Only the unit's own directory is searched; a unit scoped to the
    /// project root has no unit-local files distinct from the defaults.
    pub fn check_for_project_file(&self, file_name: &str) -> Option<String> {
        if self.directory.is_empty() {
            return None;
        }
        let path = join_path(&self.directory, file_name);
        self.has_file(&path).then_some(path)
    }

    /// Whether a plugin has claimed this unit.
    pub fn is_claimed(&self) -> bool {
        self.executable.ty.is_some()
    }

    /// Assign the executable type. Returns `false` if it was already set.
    pub fn claim(&mut self, ty: ExecutableType) -> bool {
        if self.executable.ty.is_some() {
            return false;
        }
        self.executable.ty = Some(ty);
        true
    }

    /// Add an entrypoint. Returns `false` if the path already was one.
    pub fn add_entrypoint(&mut self, path: impl Into<String>, source: EntrypointSource) -> bool {
        use std::collections::btree_map::Entry;

        match self.executable.entrypoints.entry(path.into()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(source);
                true
            }
        }
    }

    /// Entrypoint paths in order.
    pub fn entrypoints(&self) -> impl Iterator<Item = &str> + '_ {
        self.executable.entrypoints.keys().map(String::as_str)
    }

    /// The rule that made `path` an entrypoint.
    pub fn entrypoint_source(&self, path: &str) -> Option<EntrypointSource> {
        self.executable.entrypoints.get(path).copied()
    }

    /// Owned source files.
    pub fn source_files(&self) -> &BTreeMap<String, FileId> {
        &self.executable.source_files
    }

    /// Check whether the unit owns a file.
    pub fn owns(&self, path: &str) -> bool {
        self.executable.source_files.contains_key(path)
    }

    /// Merge a resolved closure into the owned files. Existing entries are kept.
    pub fn merge_source_files(&mut self, files: BTreeMap<String, FileId>) -> usize {
        let before = self.executable.source_files.len();
        for (path, id) in files {
            self.executable.source_files.entry(path).or_insert(id);
        }
        self.executable.source_files.len() - before
    }

    /// Attach a resource.
    pub fn add_resource(&mut self, resource: UnitResource) {
        self.resources.push(resource);
    }

    pub fn resources(&self) -> &[UnitResource] {
        &self.resources
    }

    /// The attached dependency manifest, if any.
    pub fn manifest(&self) -> Option<&DependencyManifest> {
        self.resources.iter().find_map(|r| match r {
            UnitResource::Manifest(m) => Some(m),
        })
    }

    /// Entrypoints that are not owned source files.
    pub fn unowned_entrypoints(&self) -> Vec<&str> {
        self.entrypoints().filter(|p| !self.owns(p)).collect()
    }
}
