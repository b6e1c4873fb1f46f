//! `kado config` -- print the assembled bead chains.
//!
//! Each chain starts at a bead not yet shown and follows `relay` edges,
//! so the output reads in execution order.

use anyhow::Result;

use kado_core::bead::Bead;
use kado_ui::styles::{render_header, render_relay_arrow};

use crate::commands::load_assembly;
use crate::context::RuntimeContext;
use crate::output::{format_bead, format_list, output_json};

pub fn run(ctx: &RuntimeContext) -> Result<()> {
    let assembly = load_assembly(&ctx.work_dir, &[ctx.landing_zone_dir()])?;
    let chains = assembly.graph.chains();

    if ctx.json {
        output_json(&serde_json::json!({
            "chains": chains,
            "skipped": assembly.skipped,
        }));
        return Ok(());
    }

    println!("{}", render_header("Bead Configuration and Order of Execution:"));
    print!("{}", render_chains(&chains, &render_relay_arrow()));
    let skipped: Vec<String> = assembly.skipped.iter().map(ToString::to_string).collect();
    print!("{}", format_list("Skipped beads", &skipped));
    Ok(())
}

/// Chains separated by a blank line, beads within a chain by `arrow`.
fn render_chains(chains: &[Vec<&Bead>], arrow: &str) -> String {
    let mut out = String::new();
    for (i, chain) in chains.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        for (j, bead) in chain.iter().enumerate() {
            if j > 0 {
                out.push_str(arrow);
                out.push('\n');
            }
            out.push_str(&format_bead(bead));
        }
    }
    out
}
