//! Relay execution for kado.
//!
//! The [`relay::RelayEngine`] walks a [`BeadGraph`](kado_core::graph::BeadGraph)
//! depth-first, dispatching each bead to a [`Provisioner`] and routing `opa`
//! beads through the [`policy`] gate. [`toolchain::Toolchain`] is the
//! process-backed provisioner used by the binary; tests substitute fakes.

pub mod error;
pub mod policy;
pub mod process;
pub mod provisioner;
pub mod relay;
pub mod state;
pub mod template;
pub mod toolchain;

pub use error::{EngineError, HandlerError, PolicyError};
pub use policy::{OpaCli, PolicyDecision, PolicyEvaluator, PolicyRequest};
pub use provisioner::{Action, Provisioner};
pub use relay::RelayEngine;
pub use state::ExecutionState;
pub use toolchain::Toolchain;
