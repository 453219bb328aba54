//! The project file index.
//!
//! All input files for one compilation live in a single arena. Files are
//! addressed by a stable [`FileId`] and looked up by normalized,
//! project-relative path. The index is never mutated while units are being
//! resolved, so resolver passes share it by reference.

use std::collections::BTreeMap;

use crate::core::manifest::DependencyManifest;
use crate::core::source_file::{Language, SourceFile};

/// Stable index of a file in the [`InputFiles`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FileId(u32);

impl FileId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// A file discovered in the project.
#[derive(Debug, Clone)]
pub enum InputFile {
    /// A source file recognized by a language front end
    Source(SourceFile),

    /// A dependency manifest
    Manifest(DependencyManifest),

    /// Any other file (assets, configs) tracked by path only
    Other { path: String },
}

impl InputFile {
    /// Project-relative path.
    pub fn path(&self) -> &str {
        match self {
            InputFile::Source(f) => f.path(),
            InputFile::Manifest(m) => m.path(),
            InputFile::Other { path } => path,
        }
    }

    /// Get the source file, if this is one.
    pub fn as_source(&self) -> Option<&SourceFile> {
        match self {
            InputFile::Source(f) => Some(f),
            _ => None,
        }
    }

    /// Get the manifest, if this is one.
    pub fn as_manifest(&self) -> Option<&DependencyManifest> {
        match self {
            InputFile::Manifest(m) => Some(m),
            _ => None,
        }
    }
}

/// Arena of all input files, keyed by project-relative path.
#[derive(Debug, Clone, Default)]
pub struct InputFiles {
    files: Vec<InputFile>,
    by_path: BTreeMap<String, FileId>,
}

impl InputFiles {
    /// Create an empty index.
    pub fn new() -> Self {
        InputFiles::default()
    }

    /// Add a file. Re-adding a path replaces the file in place and keeps its id.
    pub fn add(&mut self, file: InputFile) -> FileId {
        let path = file.path().to_string();
        if let Some(&id) = self.by_path.get(&path) {
            self.files[id.index()] = file;
            return id;
        }

        let id = FileId(self.files.len() as u32);
        self.files.push(file);
        self.by_path.insert(path, id);
        id
    }

    /// Look up a file id by path.
    pub fn id_of(&self, path: &str) -> Option<FileId> {
        self.by_path.get(path).copied()
    }

    /// Get a file by path.
    pub fn get(&self, path: &str) -> Option<&InputFile> {
        self.id_of(path).map(|id| &self.files[id.index()])
    }

    /// Get a file by id.
    pub fn file(&self, id: FileId) -> &InputFile {
        &self.files[id.index()]
    }

    /// Check whether a path exists in the project.
    pub fn contains(&self, path: &str) -> bool {
        self.by_path.contains_key(path)
    }

    /// Get a source file by path.
    pub fn source(&self, path: &str) -> Option<&SourceFile> {
        self.get(path).and_then(InputFile::as_source)
    }

    /// Get a manifest by path.
    pub fn manifest(&self, path: &str) -> Option<&DependencyManifest> {
        self.get(path).and_then(InputFile::as_manifest)
    }

    /// Iterate over files in path order.
    pub fn iter(&self) -> impl Iterator<Item = (FileId, &InputFile)> + '_ {
        self.by_path
            .values()
            .map(move |&id| (id, &self.files[id.index()]))
    }

    /// Iterate over source files in path order.
    pub fn sources(&self) -> impl Iterator<Item = (FileId, &SourceFile)> + '_ {
        self.iter()
            .filter_map(|(id, f)| f.as_source().map(|s| (id, s)))
    }

    /// All paths in order.
    pub fn paths(&self) -> impl Iterator<Item = &str> + '_ {
        self.by_path.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// Normalize a path to the index's form: `/`-separated, relative, without
/// `.` components. `..` pops a component; escaping the root yields `None`.
pub fn normalize_path(path: &str) -> Option<String> {
    let mut parts: Vec<&str> = Vec::new();
    for part in path.split(['/', '\\']) {
        match part {
            "" | "." => {}
            ".." => {
                parts.pop()?;
            }
            p => parts.push(p),
        }
    }
    Some(parts.join("/"))
}

/// The directory portion of a project-relative path (`""` at the root).
pub fn parent_dir(path: &str) -> &str {
    path.rsplit_once('/').map(|(dir, _)| dir).unwrap_or("")
}

/// Join a directory and a relative path.
pub fn join_path(dir: &str, rel: &str) -> String {
    if dir.is_empty() {
        rel.to_string()
    } else {
        format!("{}/{}", dir, rel)
    }
}
