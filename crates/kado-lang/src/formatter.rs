//! Canonical layout for `.kd` files.
//!
//! The formatter only changes layout: openers become `bead "<name>" {`,
//! assignments become `  key = "value"`, other in-block lines are indented by
//! two spaces, runs of blank lines collapse to one and leading/trailing blank
//! lines are dropped. A block left open (by a re-open or by end of input) is
//! closed explicitly. Loading the output yields the same declarations as
//! loading the input, and formatting the output again changes nothing.

use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::discover::kd_files_under;
use crate::error::{LangError, Result};
use crate::grammar::{LineKind, Strictness, scan};

const INDENT: &str = "  ";

/// Returns the canonical form of `text`.
pub fn format_source(text: &str) -> String {
    let scanned = scan(text, Strictness::Lenient);
    let mut out: Vec<String> = Vec::with_capacity(scanned.lines.len());

    for line in &scanned.lines {
        let trimmed = line.trimmed();
        match line.kind {
            LineKind::Blank => {
                if out.last().is_some_and(|prev| !prev.is_empty()) {
                    out.push(String::new());
                }
            }
            LineKind::Open { name } => {
                if line.in_block {
                    out.push("}".to_owned());
                }
                out.push(format!("bead \"{name}\" {{"));
            }
            LineKind::Close => out.push("}".to_owned()),
            LineKind::Assignment { key, value } => {
                out.push(format!("{INDENT}{key} = \"{value}\""));
            }
            LineKind::Comment | LineKind::Body if line.in_block => {
                out.push(format!("{INDENT}{trimmed}"));
            }
            LineKind::Comment | LineKind::Body | LineKind::Stray => out.push(trimmed.to_owned()),
        }
    }

    if scanned.unclosed {
        while out.last().is_some_and(String::is_empty) {
            out.pop();
        }
        out.push("}".to_owned());
    }
    while out.last().is_some_and(String::is_empty) {
        out.pop();
    }

    if out.is_empty() {
        return String::new();
    }
    let mut formatted = out.join("\n");
    formatted.push('\n');
    formatted
}

/// Outcome of formatting one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormatOutcome {
    pub path: PathBuf,
    pub changed: bool,
}

/// Formats a file in place. Returns whether its content changed.
pub fn format_file(path: &Path) -> Result<bool> {
    let original = std::fs::read_to_string(path).map_err(|source| LangError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let formatted = format_source(&original);
    if formatted == original {
        return Ok(false);
    }
    std::fs::write(path, formatted).map_err(|source| LangError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!(file = %path.display(), "formatted");
    Ok(true)
}

/// Formats every `.kd` file under `dir`, recursively, leaving `skip`
/// directories alone.
pub fn format_dir(dir: &Path, skip: &[PathBuf]) -> Result<Vec<FormatOutcome>> {
    kd_files_under(dir, skip)?
        .into_iter()
        .map(|path| {
            let changed = format_file(&path)?;
            Ok(FormatOutcome { path, changed })
        })
        .collect()
}
