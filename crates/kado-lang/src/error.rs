//! Errors for reading and writing `.kd` files.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LangError {
    /// A source file could not be read.
    #[error("failed to read {}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A formatted file could not be written back.
    #[error("failed to write {}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Directory traversal failed.
    #[error("failed to walk {}", .path.display())]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },
}

pub type Result<T> = std::result::Result<T, LangError>;
