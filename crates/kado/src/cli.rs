//! Clap CLI definitions for the `kado` command.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// kado -- relay infrastructure beads through a policy gate.
///
/// Beads declared in `.kd` files run in order; each may relay into the next,
/// and an `opa` bead gates whether mutating changes are applied.
#[derive(Parser, Debug)]
#[command(
    name = "kado",
    about = "Relay infrastructure beads through a policy gate",
    version,
    propagate_version = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Global flags available to all subcommands.
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalArgs {
    /// Working directory holding the `.kd` files (default: current directory).
    #[arg(short = 'C', long = "dir", global = true, value_name = "DIR")]
    pub dir: Option<PathBuf>,

    /// Landing zone directory, relative to the working directory.
    #[arg(long, global = true, value_name = "PATH")]
    pub landing_zone: Option<PathBuf>,

    /// Output in JSON format.
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable debug logging.
    #[arg(short = 'v', long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only log warnings and errors.
    #[arg(short = 'q', long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Plan every bead without applying changes (the default).
    Run(RunArgs),

    /// Run every bead and apply changes the policy gate allows.
    Set(RunArgs),

    /// Print the assembled bead chains in execution order.
    Config,

    /// Rewrite .kd files into canonical layout.
    Fmt(FmtArgs),

    /// Check .kd files for layout violations.
    Lint(LintArgs),

    /// Print version information.
    Version,

    /// Generate shell completions.
    Completion(CompletionArgs),
}

#[derive(Args, Debug, Clone, Default)]
pub struct RunArgs {
    /// YAML data file (default: `data_file` setting, `cluster.yaml`).
    #[arg(value_name = "DATA_FILE")]
    pub data_file: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct FmtArgs {
    /// Directory whose .kd files are formatted.
    #[arg(default_value = ".")]
    pub dir: PathBuf,
}

#[derive(Args, Debug)]
pub struct LintArgs {
    /// Directory searched recursively for .kd files.
    #[arg(default_value = ".")]
    pub dir: PathBuf,
}

#[derive(Args, Debug)]
pub struct CompletionArgs {
    #[command(subcommand)]
    pub command: CompletionCommands,
}

#[derive(Subcommand, Debug)]
pub enum CompletionCommands {
    /// Generate Bash completions.
    Bash,
    /// Generate Zsh completions.
    Zsh,
    /// Generate Fish completions.
    Fish,
    /// Generate PowerShell completions.
    Powershell,
}
