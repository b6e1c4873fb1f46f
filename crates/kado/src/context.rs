//! Runtime context for command execution.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use kado_config::run::RunConfig;
use kado_config::settings::KadoSettings;

use crate::cli::GlobalArgs;

/// Runtime context passed to every command handler.
///
/// Constructed once in `main` after CLI parsing, before command dispatch.
#[derive(Debug)]
pub struct RuntimeContext {
    /// Absolute working directory; `.kd` files and relative settings resolve
    /// against it.
    pub work_dir: PathBuf,

    /// Settings after file, environment and flag layering.
    pub settings: KadoSettings,

    pub json: bool,
    pub quiet: bool,
}

impl RuntimeContext {
    /// Resolves the working directory and loads settings from it.
    pub fn from_global_args(global: &GlobalArgs) -> Result<Self> {
        let cwd = std::env::current_dir().context("failed to determine current directory")?;
        let work_dir = match &global.dir {
            Some(dir) => cwd.join(dir),
            None => cwd,
        };

        let mut settings = KadoSettings::load(&work_dir)
            .with_context(|| format!("failed to load settings from {}", work_dir.display()))?;
        if let Some(landing_zone) = &global.landing_zone {
            settings.landing_zone = landing_zone.clone();
        }

        Ok(Self {
            work_dir,
            settings,
            json: global.json,
            quiet: global.quiet,
        })
    }

    /// The configuration of one run. `data_file` overrides the setting.
    pub fn run_config(&self, apply: bool, data_file: Option<&Path>) -> RunConfig {
        let mut config = RunConfig::new(&self.work_dir, &self.settings, apply);
        if let Some(data_file) = data_file {
            config.data_file = self.resolve(data_file);
        }
        config
    }

    /// The configured landing zone, which discovery never searches.
    pub fn landing_zone_dir(&self) -> PathBuf {
        self.work_dir.join(&self.settings.landing_zone)
    }

    /// Resolves a command-line path against the working directory.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path == Path::new(".") {
            self.work_dir.clone()
        } else {
            self.work_dir.join(path)
        }
    }

    /// `path` relative to the working directory, for display.
    pub fn relative(&self, path: &Path) -> PathBuf {
        path.strip_prefix(&self.work_dir)
            .map(Path::to_path_buf)
            .unwrap_or_else(|_| path.to_path_buf())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn ctx(dir: &Path) -> RuntimeContext {
        RuntimeContext {
            work_dir: dir.to_path_buf(),
            settings: KadoSettings::default(),
            json: false,
            quiet: false,
        }
    }

    #[test]
    fn data_file_argument_overrides_setting() {
        let c = ctx(Path::new("/srv/infra"));
        assert_eq!(
            c.run_config(false, None).data_file,
            PathBuf::from("/srv/infra/cluster.yaml")
        );
        let config = c.run_config(true, Some(Path::new("prod.yaml")));
        assert_eq!(config.data_file, PathBuf::from("/srv/infra/prod.yaml"));
        assert!(config.apply);
    }

    #[test]
    fn paths_resolve_and_relativize() {
        let c = ctx(Path::new("/srv/infra"));
        assert_eq!(c.resolve(Path::new(".")), PathBuf::from("/srv/infra"));
        assert_eq!(c.resolve(Path::new("sub")), PathBuf::from("/srv/infra/sub"));
        assert_eq!(c.resolve(Path::new("/abs")), PathBuf::from("/abs"));
        assert_eq!(
            c.relative(Path::new("/srv/infra/sub/a.kd")),
            PathBuf::from("sub/a.kd")
        );
        assert_eq!(c.relative(Path::new("/other/a.kd")), PathBuf::from("/other/a.kd"));
    }

    #[test]
    fn landing_zone_flag_overrides_settings() {
        let dir = tempfile::tempdir().unwrap();
        let global = GlobalArgs {
            dir: Some(dir.path().to_path_buf()),
            landing_zone: Some(PathBuf::from("out")),
            ..GlobalArgs::default()
        };
        let c = RuntimeContext::from_global_args(&global).unwrap();
        assert_eq!(c.work_dir, dir.path());
        assert_eq!(c.run_config(false, None).landing_zone.root(), dir.path().join("out"));
    }
}
