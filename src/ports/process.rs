//! Process host port for running one command through the OS shell.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default per-command timeout (five minutes).
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

/// Default cap on captured output, applied to each stream separately (10 MiB).
pub const DEFAULT_MAX_BUFFER: usize = 10 * 1024 * 1024;

/// The shell binary and the flag(s) placed before the command string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShellSpec {
    /// Program to launch, e.g. `/bin/sh` or `cmd.exe`.
    pub program: String,
    /// Arguments preceding the command, e.g. `["-c"]`.
    pub args: Vec<String>,
}

impl ShellSpec {
    /// Returns the default shell for the current platform.
    ///
    /// On Windows this honours `COMSPEC`, falling back to `cmd.exe`.
    #[must_use]
    pub fn platform_default() -> Self {
        if cfg!(windows) {
            let program = std::env::var("COMSPEC").unwrap_or_else(|_| "cmd.exe".to_string());
            Self { program, args: vec!["/C".to_string()] }
        } else {
            Self { program: "/bin/sh".to_string(), args: vec!["-c".to_string()] }
        }
    }

    /// Builds a spec for a custom shell program, inferring its command flag
    /// from the program's file name.
    ///
    /// Both `/` and `\` count as separators on every platform.
    #[must_use]
    pub fn for_program(program: &str) -> Self {
        let base = program.rsplit(|c: char| c == '/' || c == '\\').next().unwrap_or(program);
        let stem = base.rsplit_once('.').map_or(base, |(stem, _)| stem);
        let name = stem.to_ascii_lowercase();
        let flag = if name.starts_with("cmd") {
            "/C"
        } else if name == "powershell" || name == "pwsh" {
            "-Command"
        } else {
            "-c"
        };
        Self { program: program.to_string(), args: vec![flag.to_string()] }
    }
}

impl Default for ShellSpec {
    fn default() -> Self {
        Self::platform_default()
    }
}

/// A request to run a single command.
#[derive(Debug, Clone)]
pub struct ProcessRequest {
    /// The command text; trimmed by the host before execution.
    pub command: String,
    /// Directory to run in. Missing or nonexistent means the host's cwd.
    pub working_dir: Option<PathBuf>,
    /// Shell used to interpret the command.
    pub shell: ShellSpec,
    /// Kill the command once this much time has elapsed.
    pub timeout: Duration,
    /// Kill the command once either stream has produced more than this many bytes.
    pub max_buffer: usize,
}

impl ProcessRequest {
    /// Creates a request with default shell, timeout and buffer cap.
    #[must_use]
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            working_dir: None,
            shell: ShellSpec::platform_default(),
            timeout: DEFAULT_TIMEOUT,
            max_buffer: DEFAULT_MAX_BUFFER,
        }
    }

    /// Sets the working directory.
    #[must_use]
    pub fn in_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.working_dir = dir;
        self
    }
}

/// Which output stream a chunk came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputStream {
    /// Standard output.
    Stdout,
    /// Standard error.
    Stderr,
}

impl fmt::Display for OutputStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stdout => f.write_str("stdout"),
            Self::Stderr => f.write_str("stderr"),
        }
    }
}

/// A piece of output delivered while the command is still running.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputChunk {
    /// Source stream.
    pub stream: OutputStream,
    /// Decoded text (lossy UTF-8).
    pub data: String,
}

/// Why a command did not succeed.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProcessFailure {
    /// The shell could not find the program.
    #[error("command not found: {command}{diagnostics}")]
    NotFound {
        /// The command as executed.
        command: String,
        /// Extra lines describing where the lookup happened.
        diagnostics: String,
    },
    /// The program exists but may not be executed.
    #[error("permission denied: {command}")]
    PermissionDenied {
        /// The command as executed.
        command: String,
    },
    /// The process was terminated by a signal.
    #[error("command terminated by signal ({signal}): {command}")]
    Signal {
        /// Signal number.
        signal: i32,
        /// The command as executed.
        command: String,
    },
    /// The timeout elapsed and the process was killed.
    #[error("command timed out after {seconds}s: {command}")]
    TimedOut {
        /// Timeout that elapsed, in seconds.
        seconds: u64,
        /// The command as executed.
        command: String,
    },
    /// A stream produced more output than the cap and the process was killed.
    #[error("{stream} maxBuffer length exceeded ({limit} bytes)")]
    BufferExceeded {
        /// Stream that overflowed.
        stream: OutputStream,
        /// The configured cap in bytes.
        limit: usize,
    },
    /// The process exited with a non-zero status.
    #[error("Command failed: {command}\n{stderr}")]
    Exit {
        /// Exit code.
        code: i32,
        /// The command as executed.
        command: String,
        /// Captured stderr at exit.
        stderr: String,
    },
    /// The shell could not be started for another reason.
    #[error("process error: {message}")]
    Spawn {
        /// Underlying OS error text.
        message: String,
    },
}

/// The structured result of running one command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessOutcome {
    /// Whether the command exited with status 0.
    pub success: bool,
    /// Exit code when the process exited normally.
    pub code: Option<i32>,
    /// Everything captured from stdout (up to the cap).
    pub stdout: String,
    /// Everything captured from stderr (up to the cap).
    pub stderr: String,
    /// Failure detail when `success` is false.
    pub failure: Option<ProcessFailure>,
}

impl ProcessOutcome {
    /// A successful outcome with exit code 0.
    #[must_use]
    pub fn succeeded(stdout: String, stderr: String) -> Self {
        Self { success: true, code: Some(0), stdout, stderr, failure: None }
    }

    /// A failed outcome.
    #[must_use]
    pub fn failed(
        failure: ProcessFailure,
        code: Option<i32>,
        stdout: String,
        stderr: String,
    ) -> Self {
        Self { success: false, code, stdout, stderr, failure: Some(failure) }
    }

    /// Human-readable reason for a failure: the failure detail, or the
    /// captured stderr when there is none.
    #[must_use]
    pub fn error_message(&self) -> String {
        match &self.failure {
            Some(failure) => failure.to_string(),
            None => self.stderr.trim_end().to_string(),
        }
    }
}

/// Runs commands through the operating system's shell.
///
/// Output is handed to `on_output` as it arrives, before the final outcome
/// is returned.
pub trait ProcessHost: Send + Sync {
    /// Executes one command and reports how it ended.
    ///
    /// A command that runs and fails is an `Ok` outcome with
    /// `success == false`.
    ///
    /// # Errors
    ///
    /// Returns an error only when the host itself cannot operate (for
    /// example the async runtime cannot be built, or a replayed cassette is
    /// malformed).
    fn execute(
        &self,
        request: &ProcessRequest,
        on_output: &mut dyn FnMut(OutputChunk),
    ) -> Result<ProcessOutcome, Box<dyn std::error::Error + Send + Sync>>;
}
