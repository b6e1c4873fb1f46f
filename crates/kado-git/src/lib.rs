//! Git integration for kado.
//!
//! Beads with a `source` field get their repository cloned into their
//! landing-zone directory before their handler runs.

pub mod clone;
pub mod commands;

pub use clone::clone_repo;
pub use commands::{GitError, Result};
