//! Output formatting helpers for the `kado` CLI.

use serde::Serialize;
use std::fmt::Write as _;
use std::io::{self, Write};

use kado_core::bead::Bead;
use kado_ui::styles::{render_bold, render_header};

/// Print a value as pretty-printed JSON to stdout.
///
/// Terminates the process with exit code 1 if serialization fails.
pub fn output_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            // Ignore broken pipe errors (e.g., piped to `head`)
            let _ = writeln!(handle, "{}", json);
        }
        Err(e) => {
            eprintln!("Error: failed to serialize JSON: {}", e);
            std::process::exit(1);
        }
    }
}

/// A titled bullet list, preceded by a blank line. Empty lists render as
/// nothing.
pub fn format_list(title: &str, items: &[String]) -> String {
    if items.is_empty() {
        return String::new();
    }
    let mut out = format!("\n{}\n", render_header(&format!("{title}:")));
    for item in items {
        let _ = writeln!(out, "  - {item}");
    }
    out
}

/// `Bead: <name>` followed by one `  key = value` line per field.
pub fn format_bead(bead: &Bead) -> String {
    let mut out = format!("Bead: {}\n", render_bold(bead.name()));
    for (key, value) in &bead.fields {
        let _ = writeln!(out, "  {key} = {value}");
    }
    out
}
