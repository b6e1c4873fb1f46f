//! Error types for handlers, the policy gate and the engine.

use std::path::PathBuf;
use thiserror::Error;

use kado_config::ConfigError;
use kado_core::kind::BeadKind;
use kado_git::GitError;

use crate::template::TemplateError;

/// A handler (provisioning step) failed.
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("failed to execute {program}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{command}` exited with status {code:?}")]
    CommandFailed { command: String, code: Option<i32> },

    #[error("playbook file does not exist: {}", .0.display())]
    MissingPlaybook(PathBuf),

    #[error("failed to render template {}", .path.display())]
    Template {
        path: PathBuf,
        #[source]
        source: TemplateError,
    },

    #[error("failed to materialize source")]
    Git(#[from] GitError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("I/O error on {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// The policy gate could not reach a decision.
///
/// A denial is not an error.
#[derive(Debug, Error)]
pub enum PolicyError {
    #[error("{0} path not specified in bead")]
    MissingField(&'static str),

    #[error("failed to read {}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse YAML input {}", .path.display())]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("failed to parse JSON input {}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to execute {program}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} eval failed (exit code {code:?})")]
    Failed { program: String, code: Option<i32> },

    #[error("policy evaluation failed: {0}")]
    Evaluation(String),
}

/// A run was aborted.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("failed to process bead {bead}")]
    Handler {
        bead: BeadKind,
        #[source]
        source: HandlerError,
    },

    #[error("failed to process bead {bead}")]
    Policy {
        bead: BeadKind,
        #[source]
        source: PolicyError,
    },

    #[error("failed to reset workspace of bead {bead}")]
    Workspace {
        bead: BeadKind,
        #[source]
        source: ConfigError,
    },

    #[error("relay cycle detected: {}", render_path(.path))]
    RelayCycle { path: Vec<BeadKind> },
}

impl EngineError {
    /// The bead the failure is attributed to.
    pub fn bead(&self) -> Option<BeadKind> {
        match self {
            Self::Handler { bead, .. } | Self::Policy { bead, .. } | Self::Workspace { bead, .. } => {
                Some(*bead)
            }
            Self::RelayCycle { path } => path.last().copied(),
        }
    }
}

fn render_path(path: &[BeadKind]) -> String {
    path.iter()
        .map(BeadKind::as_str)
        .collect::<Vec<_>>()
        .join(" -> ")
}

pub type Result<T> = std::result::Result<T, EngineError>;
