//! `scripter run` command.

use std::io::Write;
use std::path::PathBuf;

use log::warn;

use crate::cli::RunArgs;
use crate::config::Settings;
use crate::context::ServiceContext;
use crate::runner::{
    split_commands, transcript, CancelToken, RunEvent, RunOptions, RunStatus, Runner,
};
use crate::store::ShortcutStore;

/// Execute the `run` command.
///
/// Output streams to the terminal as it arrives. Echo lines go to stdout and
/// the failure line to stderr.
///
/// # Errors
///
/// Returns an error string if the block cannot be loaded or a command fails.
pub fn run(ctx: &ServiceContext, settings: &Settings, args: &RunArgs) -> Result<(), String> {
    let (block, working_dir) = load_block(ctx, settings, args)?;

    let mut runner =
        Runner::new(ctx, RunOptions::from(settings)).with_working_dir(working_dir);
    cancel_on_interrupt(runner.cancel_token());
    let report = runner.run(&block, &mut print_event);

    status_result(&report.status, split_commands(&block).len())
}

fn status_result(status: &RunStatus, total: usize) -> Result<(), String> {
    match status {
        RunStatus::Completed => Ok(()),
        RunStatus::Cancelled => Err("run cancelled".to_string()),
        RunStatus::Failed { index, .. } => {
            Err(format!("stopped at command {} of {total}", index + 1))
        }
    }
}

/// Cancels `token` on the first Ctrl-C.
///
/// The terminal delivers the interrupt to the running command as well, so
/// the sequence stops once that command returns.
fn cancel_on_interrupt(token: CancelToken) {
    std::thread::spawn(move || {
        let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
            Ok(runtime) => runtime,
            Err(err) => {
                warn!("Ctrl-C handling unavailable: {err}");
                return;
            }
        };
        if runtime.block_on(tokio::signal::ctrl_c()).is_ok() {
            warn!("interrupted, stopping before the next command");
            token.cancel();
        }
    });
}

/// The command block and starting directory named by `args`.
fn load_block(
    ctx: &ServiceContext,
    settings: &Settings,
    args: &RunArgs,
) -> Result<(String, Option<PathBuf>), String> {
    if let Some(commands) = &args.commands {
        return Ok((commands.clone(), args.cwd.clone()));
    }
    if let Some(path) = &args.file {
        let block = ctx
            .fs
            .read_to_string(path)
            .map_err(|e| format!("Failed to read {}: {e}", path.display()))?;
        return Ok((block, args.cwd.clone()));
    }
    if let Some(key) = &args.shortcut {
        let store = ShortcutStore::new(ctx, &settings.shortcuts_path);
        let shortcut = store.find(key)?.ok_or_else(|| format!("Shortcut not found: {key}"))?;
        let working_dir = args.cwd.clone().or(shortcut.working_dir);
        return Ok((shortcut.commands, working_dir));
    }
    Err("Nothing to run: pass COMMANDS, --file or --shortcut".to_string())
}

fn print_event(event: RunEvent) {
    match &event {
        RunEvent::Output(chunk) => super::print_chunk(chunk),
        RunEvent::Failed { .. } | RunEvent::Cancelled => {
            if let Some(line) = transcript::render(&event) {
                let _ = std::io::stderr().lock().write_all(line.as_bytes());
            }
        }
        RunEvent::Echo { .. } | RunEvent::DirectoryChanged(_) => {
            if let Some(line) = transcript::render(&event) {
                let mut out = std::io::stdout().lock();
                let _ = out.write_all(line.as_bytes());
                let _ = out.flush();
            }
        }
    }
}
