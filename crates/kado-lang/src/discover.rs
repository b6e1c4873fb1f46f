//! Finding `.kd` files.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::{LangError, Result};

/// File extension of bead configuration files.
pub const KD_EXTENSION: &str = "kd";

/// Returns `true` if `path` has the `.kd` extension.
pub fn is_kd_file(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == KD_EXTENSION)
}

/// Lists `.kd` files anywhere under `dir`, sorted by path.
///
/// Directories listed in `skip` (such as the landing zone, which holds cloned
/// sources) are not entered.
pub fn kd_files_under(dir: &Path, skip: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    let walker = WalkDir::new(dir)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| entry.depth() == 0 || !skip.iter().any(|s| s == entry.path()));
    for entry in walker {
        let entry = entry.map_err(|source| LangError::Walk {
            path: dir.to_path_buf(),
            source,
        })?;
        if entry.file_type().is_file() && is_kd_file(entry.path()) {
            files.push(entry.into_path());
        }
    }
    files.sort();
    Ok(files)
}
