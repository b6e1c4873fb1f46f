//! `kado run` / `kado set` -- execute the bead graph.
//!
//! `run` plans only. `set` turns apply mode on: ungated beads apply their
//! own plans and the policy gate applies the beads it allows.

use anyhow::{Context, Result};
use serde::Serialize;

use kado_config::data::DataFile;
use kado_core::graph::{Assembly, Discarded, Skipped};
use kado_core::kind::BeadKind;
use kado_engine::{ExecutionState, OpaCli, PolicyDecision, RelayEngine, Toolchain};
use kado_ui::styles::{render_decision, render_kind};

use crate::cli::RunArgs;
use crate::commands::load_assembly;
use crate::context::RuntimeContext;
use crate::output::{format_list, output_json};

pub fn run(ctx: &RuntimeContext, args: &RunArgs, apply: bool) -> Result<()> {
    let config = ctx.run_config(apply, args.data_file.as_deref());
    tracing::info!(apply, work_dir = %config.work_dir.display(), "starting run");

    let assembly = load_assembly(&config.work_dir, &[config.landing_zone.root().to_path_buf()])?;
    if assembly.graph.is_empty() {
        tracing::warn!(dir = %config.work_dir.display(), "no runnable beads found");
    }
    let data = DataFile::load(&config.data_file)
        .with_context(|| format!("failed to load data file {}", config.data_file.display()))?;
    config
        .landing_zone
        .setup()
        .context("failed to set up landing zone")?;

    let mut toolchain = Toolchain::new(&config, &data);
    let mut opa = OpaCli::new(config.opa_binary.clone());
    let mut engine = RelayEngine::new(&assembly.graph, &config, &mut toolchain, &mut opa);
    engine.run()?;
    let state = engine.into_state();

    let summary = RunSummary::new(apply, &state, &assembly);
    if ctx.json {
        output_json(&summary);
    } else if !ctx.quiet {
        print!("{}", summary.render());
    }
    Ok(())
}

/// What a finished run reports.
#[derive(Debug, Serialize)]
struct RunSummary<'a> {
    apply: bool,
    processed: &'a [BeadKind],
    decisions: &'a [PolicyDecision],
    skipped: &'a [Skipped],
    discarded: &'a [Discarded],
}

impl<'a> RunSummary<'a> {
    fn new(apply: bool, state: &'a ExecutionState, assembly: &'a Assembly) -> Self {
        Self {
            apply,
            processed: state.executed(),
            decisions: state.decisions(),
            skipped: &assembly.skipped,
            discarded: &assembly.discarded,
        }
    }

    fn render(&self) -> String {
        let processed: Vec<String> = self.processed.iter().map(|k| render_kind(*k)).collect();
        let decisions: Vec<String> = self
            .decisions
            .iter()
            .map(|d| match d.origin {
                Some(origin) => format!("{} (origin {})", render_decision(d.allow), origin),
                None => render_decision(d.allow),
            })
            .collect();
        let skipped: Vec<String> = self.skipped.iter().map(ToString::to_string).collect();

        let mut out = format_list("Processed beads", &processed);
        out.push_str(&format_list("Policy decisions", &decisions));
        out.push_str(&format_list("Skipped beads", &skipped));
        out
    }
}
