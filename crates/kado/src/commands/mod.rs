//! Command handlers, one module per subcommand.

pub mod completion;
pub mod config_cmd;
pub mod fmt;
pub mod lint;
pub mod run;
pub mod version;

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use kado_core::graph::{Assembly, assemble};
use kado_lang::discover::kd_files_under;
use kado_lang::loader::load_files;

/// Loads every `.kd` file under `dir`, outside the `skip` directories, and
/// assembles the graph.
pub fn load_assembly(dir: &Path, skip: &[PathBuf]) -> Result<Assembly> {
    let files = kd_files_under(dir, skip)
        .with_context(|| format!("failed to list .kd files in {}", dir.display()))?;
    tracing::debug!(count = files.len(), "bead files found");
    let sources = load_files(&files)?;
    let assembly = assemble(&sources);
    tracing::debug!(beads = assembly.graph.len(), skipped = assembly.skipped.len(), "graph assembled");
    Ok(assembly)
}
