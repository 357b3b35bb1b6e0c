//! Command dispatch and handlers.

pub mod exec;
pub mod run;
pub mod shortcut;

use std::io::Write;

use crate::cassette::config::CassetteConfig;
use crate::cassette::session::RecordingSession;
use crate::cli::Command;
use crate::config::{SessionMode, Settings};
use crate::context::ServiceContext;
use crate::ports::{OutputChunk, OutputStream};

/// Dispatch a parsed command to its handler.
///
/// When `SCRIPTER_RECORD` is set to a directory path, all port interactions
/// are recorded to per-port cassette files under it. When `SCRIPTER_REPLAY`
/// names a cassette directory, port calls are served from it instead.
///
/// # Errors
///
/// Returns an error string if the settings are invalid or the selected
/// command handler fails.
pub fn dispatch(command: &Command) -> Result<(), String> {
    let settings = Settings::from_env().map_err(|e| e.to_string())?;

    match &settings.mode {
        SessionMode::Live => dispatch_with_context(command, &ServiceContext::live(), &settings),
        SessionMode::Replay(dir) => {
            let ctx = ServiceContext::replaying_from(&CassetteConfig::from_dir(dir))?;
            dispatch_with_context(command, &ctx, &settings)
        }
        SessionMode::Record(root) => {
            let session = RecordingSession::start(root)?;
            let ctx = ServiceContext::recording(&session);
            let result = dispatch_with_context(command, &ctx, &settings);

            // Finish recording after command completes (even on error).
            // Drop context first to release Arc references.
            drop(ctx);
            finish_recording(session)?;
            result
        }
    }
}

/// Dispatch a command with the given service context.
fn dispatch_with_context(
    command: &Command,
    ctx: &ServiceContext,
    settings: &Settings,
) -> Result<(), String> {
    match command {
        Command::Run(args) => run::run(ctx, settings, args),
        Command::Exec { command, cwd } => exec::run(ctx, settings, command, cwd.clone()),
        Command::Shortcut(sub) => shortcut::run(ctx, settings, sub),
    }
}

/// Finish a recording session and print the output directory.
fn finish_recording(session: RecordingSession) -> Result<(), String> {
    let output_dir = session.finish()?;
    eprintln!("Recording saved to: {}", output_dir.display());
    Ok(())
}

/// Writes a chunk to the terminal stream it came from.
fn print_chunk(chunk: &OutputChunk) {
    match chunk.stream {
        OutputStream::Stdout => {
            let mut out = std::io::stdout().lock();
            let _ = out.write_all(chunk.data.as_bytes());
            let _ = out.flush();
        }
        OutputStream::Stderr => {
            let mut err = std::io::stderr().lock();
            let _ = err.write_all(chunk.data.as_bytes());
            let _ = err.flush();
        }
    }
}
