//! User-facing diagnostic messages.
//!
//! Every error surfaced by the CLI names the root cause, the file or unit it
//! concerns, and at least one suggested fix.

use std::fmt;

/// Common suggestion messages for consistent error handling.
pub mod suggestions {
    /// A referenced file is not part of the project.
    pub const MISSING_FILE: &str =
        "Create the missing module or remove the import that references it";

    /// A referenced file may have been excluded by configuration.
    pub const CHECK_IGNORES: &str = "Check `[project] ignore` in quay.toml";

    /// No dependency manifest was found for any unit.
    pub const NO_MANIFEST: &str =
        "Add a requirements.txt at the project root or in the unit's directory";

    /// A file is not owned by any unit.
    pub const NOT_OWNED: &str =
        "Run `quay compile` to see each unit's entrypoints and owned files";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

impl Severity {
    fn label(self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
        }
    }

    fn ansi(self) -> &'static str {
        match self {
            Severity::Error => "1;31",
            Severity::Warning => "1;33",
        }
    }
}

/// A diagnostic tied to a project file and/or an execution unit.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub message: String,
    pub severity: Severity,

    /// Execution unit the problem was found in
    pub unit: Option<String>,

    /// Project-relative file the problem points at
    pub file: Option<String>,

    /// Notes rendered under the message
    pub notes: Vec<String>,

    /// Suggested fixes, rendered as a numbered list
    pub suggestions: Vec<String>,
}

impl Diagnostic {
    fn new(severity: Severity, message: impl Into<String>) -> Self {
        Diagnostic {
            message: message.into(),
            severity,
            unit: None,
            file: None,
            notes: Vec::new(),
            suggestions: Vec::new(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Severity::Error, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, message)
    }

    pub fn in_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    pub fn at_file(mut self, file: impl Into<String>) -> Self {
        self.file = Some(file.into());
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    /// Render for a terminal, with ANSI colors when `color` is set.
    pub fn format(&self, color: bool) -> String {
        let paint = |code: &str, text: &str| {
            if color {
                format!("\x1b[{}m{}\x1b[0m", code, text)
            } else {
                text.to_string()
            }
        };

        let mut out = format!(
            "{}: {}\n",
            paint(self.severity.ansi(), self.severity.label()),
            self.message
        );

        match (&self.file, &self.unit) {
            (Some(file), Some(unit)) => out.push_str(&format!("  --> {} (unit `{}`)\n", file, unit)),
            (Some(file), None) => out.push_str(&format!("  --> {}\n", file)),
            (None, Some(unit)) => out.push_str(&format!("  --> unit `{}`\n", unit)),
            (None, None) => {}
        }

        for note in &self.notes {
            out.push_str(&format!("  = {}\n", note));
        }

        if !self.suggestions.is_empty() {
            out.push_str(&format!("\n{}: consider:\n", paint("1;32", "help")));
            for (i, suggestion) in self.suggestions.iter().enumerate() {
                out.push_str(&format!("  {}. {}\n", i + 1, suggestion));
            }
        }

        out
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format(false))
    }
}

/// Print a diagnostic to stderr.
pub fn emit(diagnostic: &Diagnostic, color: bool) {
    eprint!("{}", diagnostic.format(color));
}
