//! The handler capability the engine dispatches to.

use std::path::Path;

use kado_core::bead::Bead;

use crate::error::HandlerError;

/// What a mutating handler should do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Plan or dry-run only; nothing changes.
    Plan,
    /// Plan, then apply the plan.
    PlanAndApply,
    /// Apply a plan produced earlier in this run.
    Apply,
}

impl Action {
    pub fn plans(&self) -> bool {
        matches!(self, Self::Plan | Self::PlanAndApply)
    }

    pub fn applies(&self) -> bool {
        matches!(self, Self::PlanAndApply | Self::Apply)
    }
}

/// One method per provisioning step. Implementations run the external tools;
/// the engine decides when and with which [`Action`].
pub trait Provisioner {
    /// Fetches the bead's `source` repository into `dest`.
    fn materialize(&mut self, bead: &Bead, dest: &Path) -> Result<(), HandlerError>;

    /// Renders the data-file templates into the landing zone.
    fn render_templates(&mut self, bead: &Bead) -> Result<(), HandlerError>;

    /// Runs the bead's playbook. Only called when `playbook` is set.
    fn ansible(&mut self, bead: &Bead, action: Action) -> Result<(), HandlerError>;

    fn terraform(&mut self, bead: &Bead, action: Action) -> Result<(), HandlerError>;

    fn terragrunt(&mut self, bead: &Bead, action: Action) -> Result<(), HandlerError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_phases() {
        assert!(Action::Plan.plans() && !Action::Plan.applies());
        assert!(Action::PlanAndApply.plans() && Action::PlanAndApply.applies());
        assert!(!Action::Apply.plans() && Action::Apply.applies());
    }
}
