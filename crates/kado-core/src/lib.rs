//! Core types for the kado system.
//!
//! Beads are the named provisioning units declared in `.kd` files. This crate
//! holds the bead model, the graph assembler that merges declarations from
//! several files into one name-keyed graph, and the flattening utility used
//! by template rendering.

pub mod bead;
pub mod flatten;
pub mod graph;
pub mod kind;
