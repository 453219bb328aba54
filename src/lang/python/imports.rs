//! Python import extraction.
//!
//! Finds `import` and `from ... import` statements and maps them onto
//! project-relative file paths. Modules that are not part of the project
//! (stdlib, third-party) resolve to nothing. An explicit relative import
//! that names no file is kept as a reference to its most likely path so the
//! resolver can report it as missing.

use std::sync::LazyLock;

use regex::Regex;

use crate::core::input::{join_path, normalize_path, parent_dir};

static IMPORT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*import\s+(.+)$").expect("import regex"));

static FROM_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*from\s+(\.*)([A-Za-z_][A-Za-z0-9_.]*)?\s+import\s+(.+)$")
        .expect("from-import regex")
});

/// A single import statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Import {
    /// Number of leading dots (0 for absolute imports)
    pub level: usize,

    /// Dotted module path, empty for `from . import x`
    pub module: String,

    /// Imported names for `from` imports
    pub names: Vec<String>,

    /// 1-based line of the statement
    pub line: usize,
}

/// Extract import statements from Python source.
pub fn extract_imports(content: &str) -> Vec<Import> {
    let lines: Vec<&str> = content.lines().collect();
    let mut imports = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        let start = i;
        let mut statement = strip_comment(lines[i]).to_string();
        i += 1;

        if !statement.split(';').any(is_import_statement) {
            continue;
        }

        // Backslash continuations and parenthesized name lists
        while i < lines.len()
            && (statement.trim_end().ends_with('\\')
                || statement.matches('(').count() > statement.matches(')').count())
        {
            let trimmed = statement.trim_end().trim_end_matches('\\').to_string();
            statement = format!("{} {}", trimmed, strip_comment(lines[i]).trim());
            i += 1;
        }

        // `import a; import b` holds several statements on one logical line
        for simple in statement.split(';').filter(|s| is_import_statement(s)) {
            if let Some(caps) = FROM_RE.captures(simple) {
                imports.push(Import {
                    level: caps[1].len(),
                    module: caps.get(2).map(|m| m.as_str().to_string()).unwrap_or_default(),
                    names: split_names(&caps[3]),
                    line: start + 1,
                });
            } else if let Some(caps) = IMPORT_RE.captures(simple) {
                for module in split_names(&caps[1]) {
                    imports.push(Import {
                        level: 0,
                        module,
                        names: Vec::new(),
                        line: start + 1,
                    });
                }
            }
        }
    }

    imports
}

fn is_import_statement(statement: &str) -> bool {
    let head = statement.trim_start();
    head.starts_with("import ") || head.starts_with("from ")
}

fn strip_comment(line: &str) -> &str {
    line.split_once('#').map(|(code, _)| code).unwrap_or(line)
}

/// Split `a as b, (c, d)` into `["a", "c", "d"]`.
fn split_names(list: &str) -> Vec<String> {
    list.replace(['(', ')', '\\'], " ")
        .split(',')
        .filter_map(|item| item.split_whitespace().next())
        .map(str::to_string)
        .collect()
}

/// Map an import onto the project files it references.
///
/// `exists` reports whether a normalized project-relative path is present.
pub fn resolve_import(importer: &str, import: &Import, exists: impl Fn(&str) -> bool) -> Vec<String> {
    let mut dir = if import.level == 0 {
        String::new()
    } else {
        parent_dir(importer).to_string()
    };
    for _ in 1..import.level {
        dir = join_path(&dir, "..");
    }

    let found = |candidate: &str| normalize_path(candidate).filter(|p| exists(p.as_str()));
    let mut refs = Vec::new();

    // Importing `a.b.c` runs every enclosing package's __init__.py
    let components: Vec<&str> = import.module.split('.').filter(|c| !c.is_empty()).collect();
    let mut module_path = dir.clone();
    for (i, component) in components.iter().enumerate() {
        module_path = join_path(&module_path, component);
        if i + 1 < components.len() {
            refs.extend(found(&format!("{}/__init__.py", module_path)));
        }
    }

    let module_hit = if components.is_empty() {
        found(&join_path(&dir, "__init__.py"))
    } else {
        found(&format!("{}.py", module_path))
            .or_else(|| found(&format!("{}/__init__.py", module_path)))
    };
    let mut resolved = module_hit.is_some();
    refs.extend(module_hit);

    for name in import.names.iter().filter(|n| n.as_str() != "*") {
        let submodule = join_path(&module_path, name);
        let hit = found(&format!("{}.py", submodule))
            .or_else(|| found(&format!("{}/__init__.py", submodule)));
        resolved |= hit.is_some();
        refs.extend(hit);
    }

    if !resolved && import.level > 0 {
        let guess = match (components.is_empty(), import.names.first()) {
            (true, Some(name)) => format!("{}.py", join_path(&module_path, name)),
            _ => format!("{}.py", module_path),
        };
        refs.push(normalize_path(&guess).unwrap_or(guess));
    }

    let mut seen = std::collections::HashSet::new();
    refs.retain(|r| seen.insert(r.clone()));
    refs
}
