//! The `.kd` bead configuration language.
//!
//! A `.kd` file is a sequence of blocks:
//!
//! ```text
//! # comment
//! bead "terraform" {
//!   source = "git@example.com:infra/tf.git"
//!   relay = "opa"
//! }
//! ```
//!
//! All consumers share one line scanner ([`grammar`]). The [`loader`] runs it
//! leniently and builds declarations; the [`formatter`] re-emits scanned lines
//! in canonical layout; the [`linter`] runs it strictly and adds layout checks.

pub mod discover;
pub mod error;
pub mod formatter;
pub mod grammar;
pub mod linter;
pub mod loader;

pub use error::{LangError, Result};
