//! Materializing a bead's `source` repository.

use std::path::Path;

use crate::commands::{Result, git_command};

/// Clones `source` into `dest`, then checks out `refs` when given.
///
/// `dest` must not exist or be empty; callers reset bead directories
/// before materializing.
pub fn clone_repo(source: &str, dest: &Path, refs: Option<&str>) -> Result<()> {
    if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let cwd = Path::new(".");
    let dest_str = dest.to_string_lossy();
    git_command(&["clone", "--quiet", source, &dest_str], cwd)?;

    if let Some(refs) = refs.map(str::trim).filter(|r| !r.is_empty()) {
        git_command(&["-C", &dest_str, "checkout", "--quiet", refs], cwd)?;
    }

    tracing::info!(source, dest = %dest.display(), refs = refs.unwrap_or(""), "repository cloned");
    Ok(())
}
