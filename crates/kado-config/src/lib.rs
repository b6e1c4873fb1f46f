//! Configuration for kado runs.
//!
//! [`settings`] holds the layered user settings, [`data`] the YAML data file
//! that templates render against, [`landing_zone`] the per-run working area
//! and [`run`] the immutable [`RunConfig`](run::RunConfig) handed to the
//! engine.

pub mod data;
pub mod error;
pub mod landing_zone;
pub mod run;
pub mod settings;

pub use error::{ConfigError, Result};
