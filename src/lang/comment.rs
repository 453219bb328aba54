//! Comment annotation front end.
//!
//! Annotations live in line comments as `@quay::<capability>`, optionally
//! followed on the same line by a TOML inline table:
//!
//! ```text
//! # @quay::execution_unit { id = "api" }
//! # @quay::expose { id = "public", target = "gateway" }
//! ```

use std::collections::BTreeMap;
use std::sync::LazyLock;

use miette::{Diagnostic as MietteDiagnostic, NamedSource, SourceSpan};
use regex::Regex;
use thiserror::Error;

use crate::core::annotation::{is_known_capability, Annotation, Capability};

static ANNOTATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"@quay::([A-Za-z_][A-Za-z0-9_]*)").expect("annotation regex")
});

/// A malformed annotation body.
#[derive(Debug, Error, MietteDiagnostic)]
#[error("malformed `@quay::{capability}` annotation in {path}:{line}: {reason}")]
#[diagnostic(
    code(quay::annotation::malformed),
    help("annotation bodies are TOML inline tables, e.g. `{{ id = \"api\" }}`")
)]
pub struct AnnotationError {
    pub path: String,
    pub line: usize,
    pub capability: String,
    pub reason: String,
    #[source_code]
    pub src: NamedSource<String>,
    #[label("invalid annotation body")]
    pub span: SourceSpan,
}

/// Extract annotations from the line comments of a file.
///
/// A body extends to its matching closing brace, so several annotations and
/// trailing prose may share a line. Unknown capability names are skipped with
/// a warning. Comment detection is per line: a prefix inside a single-line
/// string literal is ignored, but multi-line (triple-quoted) strings are not
/// tracked.
pub fn parse_annotations(
    path: &str,
    content: &str,
    comment_prefix: &str,
) -> Result<Vec<Annotation>, AnnotationError> {
    let mut annotations = Vec::new();
    let mut offset = 0;

    for (index, raw) in content.split_inclusive('\n').enumerate() {
        let line_start = offset;
        offset += raw.len();

        let line = raw.trim_end_matches(['\n', '\r']);
        let Some(comment_at) = find_comment(line, comment_prefix) else {
            continue;
        };
        let comment_start = comment_at + comment_prefix.len();
        let comment = &line[comment_start..];

        let error = |capability: &str, reason: String, start: usize, len: usize| AnnotationError {
            path: path.to_string(),
            line: index + 1,
            capability: capability.to_string(),
            reason,
            src: NamedSource::new(path, content.to_string()),
            span: (line_start + comment_start + start, len).into(),
        };

        let mut cursor = 0;
        while let Some(caps) = ANNOTATION_RE.captures_at(comment, cursor) {
            let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
                break;
            };
            let name = name.as_str();
            cursor = whole.end();

            let rest = &comment[cursor..];
            let body_start = cursor + (rest.len() - rest.trim_start_matches([' ', '\t']).len());
            let body = if comment[body_start..].starts_with('{') {
                let len = body_len(&comment[body_start..]).ok_or_else(|| {
                    error(
                        name,
                        "unterminated annotation body".to_string(),
                        body_start,
                        comment.len() - body_start,
                    )
                })?;
                cursor = body_start + len;
                Some((body_start, len))
            } else {
                None
            };

            if !is_known_capability(name) {
                tracing::warn!(
                    "Ignoring unknown capability `@quay::{}` in {}:{}",
                    name,
                    path,
                    index + 1
                );
                continue;
            }

            let mut capability = Capability::new(name);
            if let Some((start, len)) = body {
                let (id, directives) = parse_body(&comment[start..start + len])
                    .map_err(|reason| error(name, reason, start, len))?;
                capability.id = id;
                capability.directives = directives;
            }

            annotations.push(Annotation::new(capability, path, index + 1));
        }
    }

    Ok(annotations)
}

/// Byte offset of the comment prefix, skipping prefixes inside quoted strings.
fn find_comment(line: &str, prefix: &str) -> Option<usize> {
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for (at, ch) in line.char_indices() {
        match quote {
            Some(_) if escaped => escaped = false,
            Some(_) if ch == '\\' => escaped = true,
            Some(q) if ch == q => quote = None,
            Some(_) => {}
            None if ch == '"' || ch == '\'' => quote = Some(ch),
            None if line[at..].starts_with(prefix) => return Some(at),
            None => {}
        }
    }

    None
}

/// Length of a `{ ... }` body up to its matching brace, honoring TOML strings.
fn body_len(body: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for (at, ch) in body.char_indices() {
        match quote {
            Some(_) if escaped => escaped = false,
            Some('"') if ch == '\\' => escaped = true,
            Some(q) if ch == q => quote = None,
            Some(_) => {}
            None => match ch {
                '"' | '\'' => quote = Some(ch),
                '{' => depth += 1,
                '}' => {
                    depth -= 1;
                    if depth == 0 {
                        return Some(at + 1);
                    }
                }
                _ => {}
            },
        }
    }

    None
}

type Body = (Option<String>, BTreeMap<String, toml::Value>);

fn parse_body(body: &str) -> Result<Body, String> {
    let mut doc: toml::Table =
        toml::from_str(&format!("body = {}", body)).map_err(|e| e.message().to_string())?;

    let Some(toml::Value::Table(mut table)) = doc.remove("body") else {
        return Err("expected an inline table".to_string());
    };

    let id = match table.remove("id") {
        None => None,
        Some(toml::Value::String(id)) => Some(id),
        Some(other) => {
            return Err(format!("`id` must be a string, found {}", other.type_str()));
        }
    };

    Ok((id, table.into_iter().collect()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::annotation::{EXECUTION_UNIT_CAPABILITY, EXPOSE_CAPABILITY};

    #[test]
    fn test_parse_with_body() {
        let src = "import os\n# @quay::execution_unit { id = \"api\" }\ndef handler():\n    pass\n";
        let annots = parse_annotations("api.py", src, "#").unwrap();

        assert_eq!(annots.len(), 1);
        assert!(annots[0].binds_to(EXECUTION_UNIT_CAPABILITY, "api"));
        assert_eq!(annots[0].line, 2);
        assert_eq!(annots[0].file, "api.py");
    }

    #[test]
    fn test_parse_without_body_and_directives() {
        let src = "# @quay::expose\napp = App()  # @quay::expose { id = \"public\", target = \"gateway\" }\n";
        let annots = parse_annotations("app.py", src, "#").unwrap();

        assert_eq!(annots.len(), 2);
        assert!(annots[0].is(EXPOSE_CAPABILITY));
        assert_eq!(annots[0].id(), None);
        assert_eq!(annots[1].id(), Some("public"));
        assert_eq!(
            annots[1].capability.directives.get("target"),
            Some(&toml::Value::String("gateway".into()))
        );
    }

    #[test]
    fn test_unknown_capability_is_skipped() {
        let src = "# @quay::teleport { id = \"x\" }\n";
        assert!(parse_annotations("x.py", src, "#").unwrap().is_empty());
    }

    #[test]
    fn test_annotations_outside_comments_are_ignored() {
        let src = "doc = \"@quay::expose\"\n";
        assert!(parse_annotations("x.py", src, "#").unwrap().is_empty());
    }

    #[test]
    fn test_body_ends_at_matching_brace() {
        let src = "# @quay::execution_unit { id = \"api\" } see {docs}\n";
        let annots = parse_annotations("api.py", src, "#").unwrap();

        assert_eq!(annots.len(), 1);
        assert_eq!(annots[0].id(), Some("api"));
    }

    #[test]
    fn test_two_annotations_on_one_line() {
        let src = "# @quay::execution_unit { id = \"api\" } @quay::expose { id = \"api\", route = \"/{id}\" }\n";
        let annots = parse_annotations("api.py", src, "#").unwrap();

        assert_eq!(annots.len(), 2);
        assert!(annots[0].binds_to(EXECUTION_UNIT_CAPABILITY, "api"));
        assert!(annots[1].binds_to(EXPOSE_CAPABILITY, "api"));
        assert_eq!(
            annots[1].capability.directives.get("route"),
            Some(&toml::Value::String("/{id}".into()))
        );
    }

    #[test]
    fn test_nested_inline_table_body() {
        let src = "# @quay::persist { id = \"db\", opts = { pool = 4 } }\n";
        let annots = parse_annotations("db.py", src, "#").unwrap();
        assert_eq!(annots[0].id(), Some("db"));
        assert!(annots[0].capability.directives.contains_key("opts"));
    }

    #[test]
    fn test_unterminated_body_is_rejected() {
        let src = "# @quay::execution_unit { id = \"api\"\n";
        let err = parse_annotations("api.py", src, "#").unwrap_err();
        assert_eq!(err.reason, "unterminated annotation body");
    }

    #[test]
    fn test_prefix_inside_string_is_not_a_comment() {
        let src = "s = \"# @quay::expose\"\nt = 'it''s'  # @quay::expose { id = \"public\" }\n";
        let annots = parse_annotations("x.py", src, "#").unwrap();

        assert_eq!(annots.len(), 1);
        assert_eq!(annots[0].line, 2);
        assert_eq!(annots[0].id(), Some("public"));
    }

    #[test]
    fn test_malformed_body_points_at_span() {
        let src = "x = 1\n# @quay::execution_unit { id = api }\n";
        let err = parse_annotations("bad.py", src, "#").unwrap_err();

        assert_eq!(err.line, 2);
        assert_eq!(err.capability, "execution_unit");
        let start = src.find('{').unwrap();
        assert_eq!(err.span.offset(), start);
        assert_eq!(err.span.len(), "{ id = api }".len());
    }

    #[test]
    fn test_non_string_id_is_rejected() {
        let src = "# @quay::execution_unit { id = 3 }\n";
        let err = parse_annotations("bad.py", src, "#").unwrap_err();
        assert!(err.reason.contains("`id` must be a string"));
    }
}
