//! Diagnostic formatting for better error messages
//!
//! This module renders errors for a terminal: the header, the location and
//! the offending source lines with carets underneath the reported span.

use super::{Position, UniformError};
use colored::Colorize;

/// Reproduce the source lines covered by `start..end`, each followed by a
/// line of carets under the covered columns.
///
/// At least one caret is drawn per line so zero-width spans (end of input)
/// stay visible.
pub fn string_with_arrows(text: &str, start: &Position, end: &Position) -> String {
    let lines: Vec<&str> = text.split('\n').collect();
    let last_line = end.line.max(start.line);
    let mut output = Vec::new();

    for line_no in start.line..=last_line {
        let Some(line) = lines.get(line_no) else {
            break;
        };
        let width = line.chars().count();

        let col_start = if line_no == start.line { start.column } else { 0 };
        let col_end = if line_no == last_line { end.column } else { width };
        let carets = col_end.saturating_sub(col_start).max(1);

        output.push(format!(
            "{}\n{}{}",
            line,
            " ".repeat(col_start),
            "^".repeat(carets)
        ));
    }

    output.join("\n").replace('\t', "")
}

/// Diagnostic information for displaying errors with context
pub struct Diagnostic {
    error: UniformError,
}

impl Diagnostic {
    /// Create a new diagnostic from an error
    pub fn new(error: UniformError) -> Self {
        Self { error }
    }

    pub fn error(&self) -> &UniformError {
        &self.error
    }

    /// Format the diagnostic with color and context
    pub fn format(&self) -> String {
        let mut output = String::new();

        if matches!(self.error, UniformError::Runtime { .. }) {
            output.push_str(&self.error.traceback().dimmed().to_string());
        }

        // Error header
        let name = self.error.name().red().bold();
        output.push_str(&format!("{}: {}\n", name, self.error.details()));

        let span = self.error.span();
        output.push_str(&format!("  {} {}\n", "-->".blue().bold(), span.start));

        let excerpt = string_with_arrows(&span.start.source_text, &span.start, &span.end);
        for line in excerpt.lines() {
            if !line.is_empty() && line.trim_start().chars().all(|c| c == '^') {
                output.push_str(&format!("  {}\n", line.red().bold()));
            } else {
                output.push_str(&format!("  {}\n", line));
            }
        }

        output
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.format())
    }
}
