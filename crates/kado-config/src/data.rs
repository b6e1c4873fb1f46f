//! The YAML data file.
//!
//! Templates render against its flattened key space. The reserved section
//! `kado.templates` lists the template files to render.

use serde_yaml::Value;
use std::path::{Path, PathBuf};

use kado_core::flatten::{FlatMap, flatten};

use crate::error::{ConfigError, Result};

#[derive(Debug, Clone, PartialEq)]
pub struct DataFile {
    path: PathBuf,
    text: String,
    value: Value,
}

impl DataFile {
    /// Reads and parses the data file at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(path, text)
    }

    /// Parses `text` as the data file found at `path`.
    pub fn parse(path: &Path, text: String) -> Result<Self> {
        let value = if text.trim().is_empty() {
            Value::Null
        } else {
            serde_yaml::from_str(&text).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?
        };
        Ok(Self {
            path: path.to_path_buf(),
            text,
            value,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The file content as read.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn flatten(&self) -> FlatMap {
        flatten(&self.value)
    }

    /// Template paths listed under `kado.templates`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingTemplates`] when the section is absent
    /// or is not a list of strings.
    pub fn templates(&self) -> Result<Vec<PathBuf>> {
        let missing = || ConfigError::MissingTemplates {
            path: self.path.clone(),
        };
        let list = self
            .value
            .get("kado")
            .and_then(|kado| kado.get("templates"))
            .and_then(Value::as_sequence)
            .ok_or_else(missing)?;
        list.iter()
            .map(|entry| entry.as_str().map(PathBuf::from).ok_or_else(missing))
            .collect()
    }
}
