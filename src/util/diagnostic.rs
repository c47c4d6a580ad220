//! User-friendly diagnostic messages.
//!
//! Every user-facing failure should say what went wrong, what was looked at,
//! and what to try next.

use std::fmt;

/// Common suggestion messages for consistent error handling.
pub mod suggestions {
    /// Suggestion when no manifest file is found.
    pub const NO_MANIFEST: &str = "Create a `Slipway.toml` or pass `--manifest-path`";

    /// Suggestion when a build unit is not found.
    pub const UNIT_NOT_FOUND: &str = "Run `slipway units` to see the build units of this workspace";

    /// Suggestion when a library is not found in a unit.
    pub const LIBRARY_NOT_FOUND: &str = "Run `slipway libraries` to see the declared libraries";

    /// Suggestion when a unit has no library registry.
    pub const NOT_NATIVE: &str =
        "Declare the unit's libraries with `[[unit.library]]` (and drop `native = false`)";

    /// Suggestion when nothing in any repository matches.
    pub const NO_PREBUILT: &str = "Add the library to a `[[repository]]` in Slipway.toml";
}

/// Severity level for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

impl Severity {
    fn label(&self, color: bool) -> &'static str {
        match (self, color) {
            (Severity::Error, true) => "\x1b[1;31merror\x1b[0m",
            (Severity::Error, false) => "error",
            (Severity::Warning, true) => "\x1b[1;33mwarning\x1b[0m",
            (Severity::Warning, false) => "warning",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label(false))
    }
}

/// A diagnostic message with optional code, context and suggestions.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    /// Primary message
    pub message: String,
    pub severity: Severity,
    /// Stable error code, e.g. `slipway::locate::no_libraries`
    pub code: Option<String>,
    /// Additional context lines
    pub context: Vec<String>,
    /// Suggested fixes
    pub suggestions: Vec<String>,
}

impl Diagnostic {
    /// Create a new error diagnostic.
    pub fn error(message: impl Into<String>) -> Self {
        Diagnostic {
            message: message.into(),
            severity: Severity::Error,
            code: None,
            context: Vec::new(),
            suggestions: Vec::new(),
        }
    }

    /// Create a new warning diagnostic.
    pub fn warning(message: impl Into<String>) -> Self {
        Diagnostic {
            severity: Severity::Warning,
            ..Diagnostic::error(message)
        }
    }

    /// Take the message and code from a miette diagnostic.
    pub fn from_miette(err: &dyn miette::Diagnostic) -> Self {
        let mut diag = Diagnostic::error(err.to_string());
        diag.code = err.code().map(|c| c.to_string());
        if let Some(help) = err.help() {
            diag.suggestions.push(help.to_string());
        }
        diag
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// Add context to the diagnostic.
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context.push(context.into());
        self
    }

    /// Add a suggestion for fixing the issue.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestions.push(suggestion.into());
        self
    }

    /// Format the diagnostic for terminal output.
    pub fn format(&self, color: bool) -> String {
        let mut output = String::new();

        output.push_str(self.severity.label(color));
        if let Some(ref code) = self.code {
            output.push_str(&format!("[{}]", code));
        }
        output.push_str(&format!(": {}\n", self.message));

        for ctx in &self.context {
            output.push_str(&format!("  = {}\n", ctx));
        }

        if !self.suggestions.is_empty() {
            let help = if color { "\x1b[1;32mhelp\x1b[0m" } else { "help" };
            if self.suggestions.len() == 1 {
                output.push_str(&format!("{}: {}\n", help, self.suggestions[0]));
            } else {
                output.push_str(&format!("{}: consider:\n", help));
                for (i, suggestion) in self.suggestions.iter().enumerate() {
                    output.push_str(&format!("  {}. {}\n", i + 1, suggestion));
                }
            }
        }

        output
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format(false))
    }
}

/// Print a diagnostic to stderr.
pub fn emit(diagnostic: &Diagnostic, color: bool) {
    eprint!("{}", diagnostic.format(color));
}
