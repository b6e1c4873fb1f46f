//! `kado fmt` -- rewrite `.kd` files into canonical layout.

use anyhow::{Context, Result};

use kado_lang::formatter::{FormatOutcome, format_dir};
use kado_ui::styles::{render_muted, render_pass_icon};

use crate::cli::FmtArgs;
use crate::context::RuntimeContext;
use crate::output::output_json;

pub fn run(ctx: &RuntimeContext, args: &FmtArgs) -> Result<()> {
    let dir = ctx.resolve(&args.dir);
    let outcomes: Vec<FormatOutcome> = format_dir(&dir, &[ctx.landing_zone_dir()])
        .with_context(|| format!("failed to format .kd files in {}", dir.display()))?
        .into_iter()
        .map(|o| FormatOutcome {
            path: ctx.relative(&o.path),
            changed: o.changed,
        })
        .collect();

    if ctx.json {
        output_json(&outcomes);
        return Ok(());
    }
    if ctx.quiet {
        return Ok(());
    }

    for outcome in outcomes.iter().filter(|o| o.changed) {
        println!("{} formatted {}", render_pass_icon(), outcome.path.display());
    }
    let changed = outcomes.iter().filter(|o| o.changed).count();
    println!(
        "{}",
        render_muted(&format!("{changed} of {} file(s) reformatted", outcomes.len()))
    );
    Ok(())
}
