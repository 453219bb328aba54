//! Execution unit discovery.

use std::collections::BTreeMap;

use crate::core::annotation::EXECUTION_UNIT_CAPABILITY;
use crate::core::input::{parent_dir, InputFiles};
use crate::core::unit::ExecutionUnit;
use crate::util::config::Config;

/// Create the execution units declared by a project.
///
/// Every distinct `execution_unit` identifier becomes a unit rooted at the
/// directory of the first file (in path order) that declares it. The
/// configured default unit is added as a catch-all at the project root
/// unless an annotation already uses its name. All units see every input
/// file; ownership is decided later by the language plugins.
pub fn discover_units(input: &InputFiles, config: &Config) -> Vec<ExecutionUnit> {
    let mut declared: BTreeMap<&str, &str> = BTreeMap::new();

    for (_, source) in input.sources() {
        for annot in source.annotations() {
            if !annot.is(EXECUTION_UNIT_CAPABILITY) {
                continue;
            }
            match annot.id() {
                Some(id) if !id.is_empty() => {
                    declared
                        .entry(id)
                        .or_insert_with(|| parent_dir(source.path()));
                }
                _ => tracing::warn!(
                    "{}:{}: execution_unit annotation has no id; ignoring",
                    annot.file,
                    annot.line
                ),
            }
        }
    }

    let mut units = Vec::with_capacity(declared.len() + 1);

    if let Some(default) = config.default_unit() {
        if declared.contains_key(default) {
            tracing::debug!(
                "Default unit '{}' is declared by an annotation; not adding a catch-all",
                default
            );
        } else {
            units.push(ExecutionUnit::new(default).with_files(input.paths()));
        }
    }

    for (name, dir) in declared {
        tracing::debug!("Discovered execution unit '{}' in '{}'", name, dir);
        units.push(
            ExecutionUnit::new(name)
                .with_directory(dir)
                .with_files(input.paths()),
        );
    }

    units
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::ProjectBuilder;

    fn names(units: &[ExecutionUnit]) -> Vec<&str> {
        units.iter().map(|u| u.name()).collect()
    }

    #[test]
    fn test_default_unit_only() {
        let input = ProjectBuilder::new()
            .python("main.py", "")
            .manifest("requirements.txt", "")
            .build();

        let units = discover_units(&input, &Config::default());
        assert_eq!(names(&units), vec!["main"]);
        assert_eq!(units[0].directory(), "");
        assert!(units[0].has_file("requirements.txt"));
    }

    #[test]
    fn test_annotated_units() {
        let input = ProjectBuilder::new()
            .python(
                "services/api/app.py",
                "# @quay::execution_unit { id = \"api\" }\n",
            )
            .python(
                "services/api/routes.py",
                "# @quay::execution_unit { id = \"api\" }\n",
            )
            .python("worker/run.py", "# @quay::execution_unit { id = \"worker\" }\n")
            .build();

        let units = discover_units(&input, &Config::default());
        assert_eq!(names(&units), vec!["main", "api", "worker"]);
        assert_eq!(units[1].directory(), "services/api");
        assert_eq!(units[2].directory(), "worker");
        assert!(units[2].has_file("services/api/app.py"));
    }

    #[test]
    fn test_default_unit_name_clash() {
        let input = ProjectBuilder::new()
            .python("main.py", "# @quay::execution_unit { id = \"main\" }\n")
            .build();

        let units = discover_units(&input, &Config::default());
        assert_eq!(names(&units), vec!["main"]);
    }

    #[test]
    fn test_default_unit_disabled() {
        let input = ProjectBuilder::new()
            .python("api.py", "# @quay::execution_unit\n")
            .build();

        let mut config = Config::default();
        config.project.default_unit = Some(String::new());

        assert!(discover_units(&input, &config).is_empty());
    }
}
