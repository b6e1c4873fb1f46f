use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while loading configuration or preparing the
/// landing zone.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Layered settings could not be extracted.
    #[error("invalid settings")]
    Settings(#[source] Box<figment::Error>),

    /// A configuration file could not be read.
    #[error("failed to read {}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A configuration file contained invalid YAML.
    #[error("failed to parse {}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// The data file has no usable `kado.templates` list.
    #[error("no templates defined under kado.templates in {}", .path.display())]
    MissingTemplates { path: PathBuf },

    /// The landing zone could not be created or cleaned.
    #[error("failed to prepare landing zone {}", .path.display())]
    LandingZone {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Settings(Box::new(err))
    }
}

/// A specialized `Result` type for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;
