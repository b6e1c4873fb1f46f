//! The landing zone: the per-run working area.
//!
//! Every bead gets `<landing_zone>/<name>` for its checked-out sources and
//! outputs. Rendered templates and policy artifacts live at the root.

use std::path::{Path, PathBuf};

use kado_core::kind::BeadKind;

use crate::error::{ConfigError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LandingZone {
    root: PathBuf,
}

impl LandingZone {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Working directory of one bead.
    pub fn bead_dir(&self, kind: BeadKind) -> PathBuf {
        self.root.join(kind.as_str())
    }

    /// Resolves a path relative to the landing zone root.
    pub fn join(&self, relative: impl AsRef<Path>) -> PathBuf {
        self.root.join(relative)
    }

    /// Removes any previous content and recreates the root directory.
    pub fn setup(&self) -> Result<()> {
        if self.root.exists() {
            tracing::debug!(path = %self.root.display(), "cleaning landing zone");
            std::fs::remove_dir_all(&self.root).map_err(|source| self.error(source))?;
        }
        std::fs::create_dir_all(&self.root).map_err(|source| self.error(source))
    }

    /// Removes a bead's working directory. Returns whether anything was
    /// removed.
    pub fn reset_bead_dir(&self, kind: BeadKind) -> Result<bool> {
        let dir = self.bead_dir(kind);
        if !dir.exists() {
            return Ok(false);
        }
        tracing::info!(path = %dir.display(), "removing existing bead directory");
        std::fs::remove_dir_all(&dir).map_err(|source| ConfigError::LandingZone {
            path: dir.clone(),
            source,
        })?;
        Ok(true)
    }

    fn error(&self, source: std::io::Error) -> ConfigError {
        ConfigError::LandingZone {
            path: self.root.clone(),
            source,
        }
    }
}
