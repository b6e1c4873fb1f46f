//! User settings, layered with figment.
//!
//! Precedence, lowest first: built-in defaults, `.kado.yaml` in the working
//! directory, `KADO_*` environment variables. Command-line flags are applied
//! on top by the binary.

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Yaml};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::Result;

/// Name of the optional settings file.
pub const SETTINGS_FILE: &str = ".kado.yaml";

/// Prefix of environment variables that override settings.
pub const ENV_PREFIX: &str = "KADO_";

/// Query used when an opa bead does not set `package`.
pub const DEFAULT_POLICY_QUERY: &str = "data.terraform.allow";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KadoSettings {
    /// Per-run working area, relative to the working directory.
    pub landing_zone: PathBuf,

    /// YAML data file rendered into templates.
    pub data_file: PathBuf,

    /// The `opa` executable.
    pub opa_binary: String,

    pub default_policy_query: String,
}

impl Default for KadoSettings {
    fn default() -> Self {
        Self {
            landing_zone: PathBuf::from("LandingZone"),
            data_file: PathBuf::from("cluster.yaml"),
            opa_binary: "opa".to_string(),
            default_policy_query: DEFAULT_POLICY_QUERY.to_string(),
        }
    }
}

impl KadoSettings {
    /// The provider stack for `dir`, before extraction.
    pub fn figment(dir: &Path) -> Figment {
        Figment::from(Serialized::defaults(Self::default()))
            .merge(Yaml::file(dir.join(SETTINGS_FILE)))
            .merge(Env::prefixed(ENV_PREFIX))
    }

    /// Loads settings for a working directory.
    ///
    /// A missing `.kado.yaml` is not an error.
    pub fn load(dir: &Path) -> Result<Self> {
        let settings: Self = Self::figment(dir).extract()?;
        tracing::debug!(?settings, "settings loaded");
        Ok(settings)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
