//! Strict layout checks for `.kd` files.
//!
//! Structural issues come from the shared scanner in strict mode; this module
//! adds the layout rules that the formatter's output always satisfies.

use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::discover::kd_files_under;
use crate::error::{LangError, Result};
use crate::grammar::{Line, LineKind, Strictness, scan};

/// One rule violation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LintViolation {
    pub file: PathBuf,
    pub line: usize,
    pub message: String,
}

impl fmt::Display for LintViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}: {}", self.file.display(), self.line, self.message)
    }
}

pub const MSG_INDENT: &str = "bead content must be indented with exactly two spaces";
pub const MSG_OPENER_COLUMN: &str = "bead declaration must start at column 0";
pub const MSG_CLOSE_COLUMN: &str = "closing brace must stand alone at column 0";
pub const MSG_OUTSIDE_INDENTED: &str = "content outside a bead must not be indented";
pub const MSG_OUTSIDE_BLOCK: &str = "unexpected content outside a bead block";
pub const MSG_BLANK_RUN: &str = "multiple consecutive blank lines";
pub const MSG_UNCLOSED: &str = "unclosed bead block at end of file";

/// Lints `text`, labelling violations with `file`.
pub fn lint_source(file: &Path, text: &str) -> Vec<LintViolation> {
    let scanned = scan(text, Strictness::Strict);
    let mut violations = Vec::new();
    let mut push = |line: usize, message: &str| {
        violations.push(LintViolation {
            file: file.to_path_buf(),
            line,
            message: message.to_owned(),
        });
    };

    let mut previous_blank = false;
    for line in &scanned.lines {
        if let Some(issue) = line.issue {
            push(line.number, issue.message());
        }
        if let Some(message) = layout_violation(line, previous_blank) {
            push(line.number, message);
        }
        previous_blank = line.kind == LineKind::Blank;
    }

    if scanned.unclosed {
        push(scanned.last_line(), MSG_UNCLOSED);
    }
    violations
}

fn layout_violation(line: &Line<'_>, previous_blank: bool) -> Option<&'static str> {
    let raw = line.raw;
    let indented = raw.starts_with(char::is_whitespace);
    match line.kind {
        LineKind::Blank => previous_blank.then_some(MSG_BLANK_RUN),
        LineKind::Open { .. } => indented.then_some(MSG_OPENER_COLUMN),
        LineKind::Close => (raw != "}").then_some(MSG_CLOSE_COLUMN),
        LineKind::Assignment { .. } | LineKind::Body | LineKind::Comment if line.in_block => {
            (!has_two_space_indent(raw)).then_some(MSG_INDENT)
        }
        LineKind::Comment => indented.then_some(MSG_OUTSIDE_INDENTED),
        LineKind::Stray if indented => Some(MSG_OUTSIDE_INDENTED),
        LineKind::Stray => Some(MSG_OUTSIDE_BLOCK),
        LineKind::Assignment { .. } | LineKind::Body => None,
    }
}

fn has_two_space_indent(raw: &str) -> bool {
    raw.strip_prefix("  ")
        .is_some_and(|rest| !rest.starts_with(char::is_whitespace))
}

/// Lints one file.
pub fn lint_file(path: &Path) -> Result<Vec<LintViolation>> {
    let text = std::fs::read_to_string(path).map_err(|source| LangError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(lint_source(path, &text))
}

/// Lints every `.kd` file under `dir`, recursively, in path order. `skip`
/// directories are not searched.
pub fn lint_dir(dir: &Path, skip: &[PathBuf]) -> Result<Vec<LintViolation>> {
    let mut all = Vec::new();
    for path in kd_files_under(dir, skip)? {
        let found = lint_file(&path)?;
        tracing::debug!(file = %path.display(), violations = found.len(), "linted");
        all.extend(found);
    }
    Ok(all)
}
