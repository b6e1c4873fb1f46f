//! `kado` -- relay infrastructure beads through a policy gate.
//!
//! Parses CLI arguments with clap, installs logging, resolves the runtime
//! context, and dispatches to command handlers.

mod cli;
mod commands;
mod context;
mod output;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands, GlobalArgs, RunArgs};
use context::RuntimeContext;

fn main() {
    let cli = Cli::parse();
    init_tracing(&cli.global);

    let json = cli.global.json;
    if let Err(e) = dispatch(cli) {
        if json {
            let err_json = serde_json::json!({
                "error": format!("{:#}", e),
            });
            if let Ok(s) = serde_json::to_string_pretty(&err_json) {
                eprintln!("{}", s);
            }
        } else {
            eprintln!("Error: {:#}", e);
        }
        std::process::exit(1);
    }
}

/// Logs go to stderr. `RUST_LOG` wins over `-v`/`-q`.
fn init_tracing(global: &GlobalArgs) {
    let level = if global.quiet {
        "warn"
    } else if global.verbose {
        "debug"
    } else {
        "info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn dispatch(cli: Cli) -> Result<()> {
    let ctx = RuntimeContext::from_global_args(&cli.global)?;
    match cli.command {
        None => commands::run::run(&ctx, &RunArgs::default(), false),
        Some(Commands::Run(args)) => commands::run::run(&ctx, &args, false),
        Some(Commands::Set(args)) => commands::run::run(&ctx, &args, true),
        Some(Commands::Config) => commands::config_cmd::run(&ctx),
        Some(Commands::Fmt(args)) => commands::fmt::run(&ctx, &args),
        Some(Commands::Lint(args)) => commands::lint::run(&ctx, &args),
        Some(Commands::Version) => commands::version::run(&ctx),
        Some(Commands::Completion(args)) => commands::completion::run(&ctx, &args),
    }
}
