//! External process execution for handlers.
//!
//! Tools run synchronously with their output streamed to ours; there is no
//! timeout or cancellation.

use std::path::Path;
use std::process::{Command, Stdio};

use crate::error::HandlerError;

/// Runs `program args..` in `cwd`, streaming stdout and stderr.
pub fn run_streaming(program: &str, args: &[&str], cwd: &Path) -> Result<(), HandlerError> {
    let command_line = render(program, args);
    tracing::info!(command = %command_line, cwd = %cwd.display(), "executing");
    let status = Command::new(program)
        .args(args)
        .current_dir(cwd)
        .stdin(Stdio::null())
        .status()
        .map_err(|source| HandlerError::Spawn {
            program: program.to_string(),
            source,
        })?;

    if !status.success() {
        return Err(HandlerError::CommandFailed {
            command: command_line,
            code: status.code(),
        });
    }
    Ok(())
}

/// Runs `program args..` in `cwd` and returns its stdout; stderr is streamed.
pub fn run_captured(program: &str, args: &[&str], cwd: &Path) -> Result<Vec<u8>, HandlerError> {
    let command_line = render(program, args);
    tracing::info!(command = %command_line, cwd = %cwd.display(), "executing");
    let output = Command::new(program)
        .args(args)
        .current_dir(cwd)
        .stdin(Stdio::null())
        .stderr(Stdio::inherit())
        .output()
        .map_err(|source| HandlerError::Spawn {
            program: program.to_string(),
            source,
        })?;

    if !output.status.success() {
        return Err(HandlerError::CommandFailed {
            command: command_line,
            code: output.status.code(),
        });
    }
    Ok(output.stdout)
}

fn render(program: &str, args: &[&str]) -> String {
    std::iter::once(program)
        .chain(args.iter().copied())
        .collect::<Vec<_>>()
        .join(" ")
}
