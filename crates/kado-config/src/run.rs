//! The read-only configuration of one run.

use std::path::{Path, PathBuf};

use crate::landing_zone::LandingZone;
use crate::settings::KadoSettings;

/// Everything the engine needs to know about the current run.
///
/// Built once by the binary and passed by reference; nothing mutates it
/// after construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    /// Directory the `.kd` files and templates are resolved against.
    pub work_dir: PathBuf,
    pub landing_zone: LandingZone,
    pub data_file: PathBuf,
    /// Mutating actions may run (the `set` command).
    pub apply: bool,
    pub opa_binary: String,
    pub default_policy_query: String,
}

impl RunConfig {
    /// Resolves `settings` against `work_dir`.
    pub fn new(work_dir: &Path, settings: &KadoSettings, apply: bool) -> Self {
        Self {
            work_dir: work_dir.to_path_buf(),
            landing_zone: LandingZone::new(work_dir.join(&settings.landing_zone)),
            data_file: work_dir.join(&settings.data_file),
            apply,
            opa_binary: settings.opa_binary.clone(),
            default_policy_query: settings.default_policy_query.clone(),
        }
    }

    /// Resolves a path from a data file or bead field against the working
    /// directory.
    pub fn resolve(&self, path: impl AsRef<Path>) -> PathBuf {
        self.work_dir.join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn relative_settings_resolve_against_work_dir() {
        let cfg = RunConfig::new(Path::new("/srv/infra"), &KadoSettings::default(), false);
        assert_eq!(cfg.landing_zone.root(), Path::new("/srv/infra/LandingZone"));
        assert_eq!(cfg.data_file, PathBuf::from("/srv/infra/cluster.yaml"));
        assert!(!cfg.apply);
        assert_eq!(cfg.resolve("templates/a.tmpl"), PathBuf::from("/srv/infra/templates/a.tmpl"));
    }

    #[test]
    fn absolute_settings_are_kept() {
        let settings = KadoSettings {
            landing_zone: PathBuf::from("/tmp/lz"),
            ..KadoSettings::default()
        };
        let cfg = RunConfig::new(Path::new("/srv/infra"), &settings, true);
        assert_eq!(cfg.landing_zone.root(), Path::new("/tmp/lz"));
        assert!(cfg.apply);
    }
}
