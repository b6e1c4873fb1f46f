//! The relay engine.
//!
//! Every bead in the graph is invoked once at top level, in load order. A bead
//! with a `relay` field hands off to its target afterwards, passing its
//! `relay_field` overrides on a copy of the target. Relay invocations always
//! execute, even when the target already ran; top-level invocations of a bead
//! that already ran are skipped.
//!
//! A mutating bead whose relay target is an enabled `opa` bead is gated: it
//! only plans, and the gate applies it when the policy allows and the run is
//! in apply mode.

use kado_config::run::RunConfig;
use kado_core::bead::{Bead, keys};
use kado_core::graph::BeadGraph;
use kado_core::kind::BeadKind;

use crate::error::{EngineError, HandlerError, PolicyError, Result};
use crate::policy::{PolicyDecision, PolicyEvaluator, PolicyRequest};
use crate::provisioner::{Action, Provisioner};
use crate::state::ExecutionState;

pub struct RelayEngine<'a> {
    graph: &'a BeadGraph,
    config: &'a RunConfig,
    provisioner: &'a mut dyn Provisioner,
    evaluator: &'a mut dyn PolicyEvaluator,
    state: ExecutionState,
}

impl<'a> RelayEngine<'a> {
    pub fn new(
        graph: &'a BeadGraph,
        config: &'a RunConfig,
        provisioner: &'a mut dyn Provisioner,
        evaluator: &'a mut dyn PolicyEvaluator,
    ) -> Self {
        Self {
            graph,
            config,
            provisioner,
            evaluator,
            state: ExecutionState::new(),
        }
    }

    /// Runs every bead in the graph. Stops at the first failure.
    pub fn run(&mut self) -> Result<()> {
        let graph = self.graph;
        for bead in graph.iter() {
            self.process(bead, None)?;
        }
        Ok(())
    }

    pub fn into_state(self) -> ExecutionState {
        self.state
    }

    /// Invokes one bead. `origin` is the bead that relayed here, `None` for
    /// top-level invocations.
    fn process(&mut self, bead: &Bead, origin: Option<&Bead>) -> Result<()> {
        let kind = bead.kind;
        if !bead.enabled {
            tracing::debug!(bead = %kind, "bead disabled, not running");
            return Ok(());
        }
        if origin.is_none() && self.state.count(kind) > 0 {
            tracing::debug!(bead = %kind, "already executed through a relay, skipping");
            return Ok(());
        }
        self.state
            .enter(bead)
            .map_err(|path| EngineError::RelayCycle { path })?;
        let result = self.execute(bead, origin);
        self.state.leave();
        result
    }

    fn execute(&mut self, bead: &Bead, origin: Option<&Bead>) -> Result<()> {
        let kind = bead.kind;
        tracing::info!(
            bead = %kind,
            origin = origin.map(Bead::name).unwrap_or("-"),
            "processing bead"
        );

        if origin.is_some() {
            self.config
                .landing_zone
                .reset_bead_dir(kind)
                .map_err(|source| EngineError::Workspace { bead: kind, source })?;
        }

        if bead.source().is_some() {
            let dest = self.config.landing_zone.bead_dir(kind);
            self.provisioner
                .materialize(bead, &dest)
                .map_err(handler_error(kind))?;
        }

        self.dispatch(bead, origin)?;
        self.state.record(kind);
        self.relay(bead)
    }

    fn dispatch(&mut self, bead: &Bead, origin: Option<&Bead>) -> Result<()> {
        let kind = bead.kind;
        if !kind.is_mutating() {
            return self.gate(bead, origin);
        }

        self.provisioner
            .render_templates(bead)
            .map_err(handler_error(kind))?;
        let action = self.action_for(bead);
        match kind {
            BeadKind::Ansible => {
                let from_opa = origin.is_some_and(|o| o.kind == BeadKind::Opa);
                if from_opa && !self.config.apply {
                    tracing::info!(bead = %kind, "relayed from opa without apply, skipping playbook");
                    return Ok(());
                }
                self.run_ansible(bead, action).map_err(handler_error(kind))
            }
            BeadKind::Terraform => self
                .provisioner
                .terraform(bead, action)
                .map_err(handler_error(kind)),
            BeadKind::Terragrunt => self
                .provisioner
                .terragrunt(bead, action)
                .map_err(handler_error(kind)),
            BeadKind::Opa => Ok(()),
        }
    }

    /// Evaluates an opa bead and applies its origin when allowed.
    fn gate(&mut self, bead: &Bead, origin: Option<&Bead>) -> Result<()> {
        let kind = bead.kind;
        let request = PolicyRequest::from_bead(
            bead,
            &self.config.landing_zone,
            &self.config.default_policy_query,
        )
        .map_err(policy_error(kind))?;
        let allow = self
            .evaluator
            .evaluate(&request)
            .map_err(policy_error(kind))?;
        self.state.record_decision(PolicyDecision {
            allow,
            origin: origin
                .map(|o| o.kind)
                .filter(|k| matches!(k, BeadKind::Terraform | BeadKind::Ansible)),
        });

        if !allow {
            tracing::info!(bead = %kind, query = %request.query, "input denied by policy");
            return Ok(());
        }
        tracing::info!(bead = %kind, query = %request.query, "input allowed by policy");
        if !self.config.apply {
            tracing::info!(bead = %kind, "apply not requested, nothing applied");
            return Ok(());
        }

        match origin {
            Some(o) if o.kind == BeadKind::Terraform => self
                .provisioner
                .terraform(o, Action::Apply)
                .map_err(handler_error(kind)),
            Some(o) if o.kind == BeadKind::Ansible => {
                self.run_ansible(o, Action::Apply).map_err(handler_error(kind))
            }
            _ => {
                tracing::info!(bead = %kind, "no gated origin to apply");
                Ok(())
            }
        }
    }

    fn run_ansible(&mut self, bead: &Bead, action: Action) -> std::result::Result<(), HandlerError> {
        if bead.field(keys::PLAYBOOK).is_none() {
            tracing::debug!(bead = %bead.kind, "no playbook set");
            return Ok(());
        }
        self.provisioner.ansible(bead, action)
    }

    /// Follows `bead`'s relay edge, if it leads anywhere runnable.
    fn relay(&mut self, bead: &Bead) -> Result<()> {
        let Some(name) = bead.relay() else {
            return Ok(());
        };
        let Some(target) = self.graph.by_name(name) else {
            tracing::debug!(bead = %bead.kind, relay = name, "relay target not loaded, chain stops");
            return Ok(());
        };
        let overrides = bead.relay_overrides();
        if !overrides.is_empty() {
            tracing::debug!(bead = %bead.kind, relay = name, "applying relay overrides");
        }
        let effective = overrides.apply(target);
        if !effective.enabled {
            tracing::info!(bead = %bead.kind, relay = name, "relay target disabled by overrides, chain stops");
            return Ok(());
        }
        self.process(&effective, Some(bead))
    }

    fn action_for(&self, bead: &Bead) -> Action {
        if !self.config.apply || self.is_gated(bead) {
            Action::Plan
        } else {
            Action::PlanAndApply
        }
    }

    /// Terraform and ansible beads relaying into an enabled opa bead are
    /// applied by the gate, never by their own handler.
    fn is_gated(&self, bead: &Bead) -> bool {
        matches!(bead.kind, BeadKind::Terraform | BeadKind::Ansible)
            && bead.relay_kind() == Some(BeadKind::Opa)
            && self
                .graph
                .get(BeadKind::Opa)
                .is_some_and(|opa| bead.relay_overrides().apply(opa).enabled)
    }
}

fn handler_error(bead: BeadKind) -> impl FnOnce(HandlerError) -> EngineError {
    move |source| EngineError::Handler { bead, source }
}

fn policy_error(bead: BeadKind) -> impl FnOnce(PolicyError) -> EngineError {
    move |source| EngineError::Policy { bead, source }
}
