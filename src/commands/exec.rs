//! `scripter exec` command.

use std::path::PathBuf;

use crate::config::Settings;
use crate::context::ServiceContext;
use crate::ports::ProcessRequest;

/// Execute the `exec` command: one command, no splitting and no `cd` tracking.
///
/// # Errors
///
/// Returns the failure message if the command fails or cannot be run.
pub fn run(
    ctx: &ServiceContext,
    settings: &Settings,
    command: &str,
    cwd: Option<PathBuf>,
) -> Result<(), String> {
    let request = ProcessRequest {
        command: command.to_string(),
        working_dir: cwd,
        shell: settings.shell.clone(),
        timeout: settings.timeout,
        max_buffer: settings.max_buffer,
    };

    let outcome = ctx
        .process
        .execute(&request, &mut |chunk| super::print_chunk(&chunk))
        .map_err(|e| format!("execution error: {e}"))?;

    if outcome.success {
        Ok(())
    } else {
        Err(format!("error: {}", outcome.error_message()))
    }
}
