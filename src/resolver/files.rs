//! Boundary-aware source file resolution.
//!
//! Starting from a unit's entrypoints and already-owned files, the resolver
//! walks the dependency graph breadth-first and collects every reachable
//! file. A referenced file that carries a boundary capability bound to some
//! other identifier belongs to (or is exposed toward) a different unit: it is
//! not admitted, and traversal does not continue through it.

use std::collections::{BTreeMap, VecDeque};

use crate::core::input::{FileId, InputFile};
use crate::core::result::ProjectIndex;
use crate::core::unit::ExecutionUnit;
use crate::resolver::errors::ResolutionError;

/// Resolves the owned source-file closure of an execution unit.
#[derive(Debug, Clone)]
pub struct SourceFilesResolver {
    /// Capability names that cut traversal at another unit's files
    boundaries: Vec<String>,
}

impl SourceFilesResolver {
    /// Create a resolver with the given upstream boundary capabilities.
    pub fn new<I, S>(boundaries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        SourceFilesResolver {
            boundaries: boundaries.into_iter().map(Into::into).collect(),
        }
    }

    pub fn boundaries(&self) -> &[String] {
        &self.boundaries
    }

    /// Compute the unit's closure.
    ///
    /// The result contains the starting files plus everything admitted
    /// transitively. The unit itself is not modified; callers merge the
    /// result, so a failed resolution leaves the unit as it was.
    pub fn resolve(
        &self,
        unit: &ExecutionUnit,
        project: ProjectIndex<'_>,
    ) -> Result<BTreeMap<String, FileId>, ResolutionError> {
        self.walk(unit, project)
            .map_err(|e| ResolutionError::in_unit(unit.name(), e))
    }

    fn walk(
        &self,
        unit: &ExecutionUnit,
        project: ProjectIndex<'_>,
    ) -> Result<BTreeMap<String, FileId>, ResolutionError> {
        let mut closure = BTreeMap::new();
        let mut queue = VecDeque::new();

        let starts = unit
            .entrypoints()
            .chain(unit.source_files().keys().map(String::as_str));
        for path in starts {
            let id = project
                .input
                .id_of(path)
                .ok_or_else(|| ResolutionError::MissingFile {
                    path: path.to_string(),
                    referenced_by: None,
                })?;
            if closure.insert(path.to_string(), id).is_none() {
                queue.push_back(id);
            }
        }

        while let Some(current) = queue.pop_front() {
            let current_path = project.input.file(current).path();

            if let Some(missing) = project.graph.dangling(current).first() {
                return Err(ResolutionError::MissingFile {
                    path: missing.clone(),
                    referenced_by: Some(current_path.to_string()),
                });
            }

            for next in project.graph.references(current) {
                let file = project.input.file(next);
                if closure.contains_key(file.path()) {
                    continue;
                }
                if self.is_foreign_boundary(file, unit.name()) {
                    tracing::debug!(
                        "Stopping at boundary: [{}] {} -> {}",
                        unit.name(),
                        current_path,
                        file.path()
                    );
                    continue;
                }
                closure.insert(file.path().to_string(), next);
                queue.push_back(next);
            }
        }

        Ok(closure)
    }

    /// A file is a foreign boundary when it carries a boundary capability
    /// whose identifier is not this unit's name.
    pub fn is_foreign_boundary(&self, file: &InputFile, unit: &str) -> bool {
        let Some(source) = file.as_source() else {
            return false;
        };
        source.annotations().iter().any(|a| {
            self.boundaries.iter().any(|b| a.is(b)) && a.id() != Some(unit)
        })
    }
}
