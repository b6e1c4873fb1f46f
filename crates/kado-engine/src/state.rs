//! Per-run execution bookkeeping.

use serde::Serialize;
use std::collections::HashMap;

use kado_core::bead::{Bead, Fields};
use kado_core::kind::BeadKind;

use crate::policy::PolicyDecision;

/// What has run so far in this run.
///
/// Lives only for the duration of one run; nothing is persisted.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ExecutionState {
    #[serde(skip)]
    counts: HashMap<BeadKind, usize>,
    executed: Vec<BeadKind>,
    decisions: Vec<PolicyDecision>,
    /// Effective configurations on the current relay path.
    #[serde(skip)]
    path: Vec<PathEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct PathEntry {
    kind: BeadKind,
    fields: Fields,
    enabled: bool,
}

impl PathEntry {
    fn of(bead: &Bead) -> Self {
        Self {
            kind: bead.kind,
            fields: bead.fields.clone(),
            enabled: bead.enabled,
        }
    }
}

impl ExecutionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self, kind: BeadKind) -> usize {
        self.counts.get(&kind).copied().unwrap_or(0)
    }

    /// Beads in the order they executed, repeats included.
    pub fn executed(&self) -> &[BeadKind] {
        &self.executed
    }

    pub fn decisions(&self) -> &[PolicyDecision] {
        &self.decisions
    }

    pub(crate) fn record(&mut self, kind: BeadKind) {
        *self.counts.entry(kind).or_insert(0) += 1;
        self.executed.push(kind);
    }

    pub(crate) fn record_decision(&mut self, decision: PolicyDecision) {
        self.decisions.push(decision);
    }

    /// Pushes `bead` onto the relay path. If the same effective
    /// configuration is already on the path, returns the cycle instead.
    pub(crate) fn enter(&mut self, bead: &Bead) -> Result<(), Vec<BeadKind>> {
        let entry = PathEntry::of(bead);
        if let Some(start) = self.path.iter().position(|e| *e == entry) {
            let mut cycle: Vec<BeadKind> = self.path[start..].iter().map(|e| e.kind).collect();
            cycle.push(bead.kind);
            return Err(cycle);
        }
        self.path.push(entry);
        Ok(())
    }

    pub(crate) fn leave(&mut self) {
        self.path.pop();
    }
}
