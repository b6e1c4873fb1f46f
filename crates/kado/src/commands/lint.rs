//! `kado lint` -- check `.kd` files for layout violations.
//!
//! Searches the directory recursively, skipping the landing zone, and never
//! modifies a file. Violations
//! are printed as `file:line: message`; any violation makes the command fail.

use anyhow::{Context, Result, bail};

use kado_lang::linter::{LintViolation, lint_dir};
use kado_ui::styles::{render_fail_icon, render_pass_icon};

use crate::cli::LintArgs;
use crate::context::RuntimeContext;
use crate::output::output_json;

pub fn run(ctx: &RuntimeContext, args: &LintArgs) -> Result<()> {
    let dir = ctx.resolve(&args.dir);
    let violations: Vec<LintViolation> = lint_dir(&dir, &[ctx.landing_zone_dir()])
        .with_context(|| format!("failed to lint .kd files in {}", dir.display()))?
        .into_iter()
        .map(|v| LintViolation {
            file: ctx.relative(&v.file),
            ..v
        })
        .collect();

    if ctx.json {
        output_json(&violations);
    } else if violations.is_empty() {
        if !ctx.quiet {
            println!("{} no lint violations", render_pass_icon());
        }
    } else {
        for violation in &violations {
            println!("{} {}", render_fail_icon(), violation);
        }
    }

    if !violations.is_empty() {
        bail!("{} lint violation(s) found", violations.len());
    }
    Ok(())
}
