//! Sequential command runner.
//!
//! A block of text is split into one command per non-empty line. Commands run
//! in order through the `ProcessHost`, each in a fresh shell, with the
//! working directory carried across successful `cd` commands. The first
//! failure ends the sequence.

pub mod cd;
pub mod transcript;

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use log::{debug, info};

use crate::config::Settings;
use crate::context::ServiceContext;
use crate::ports::process::{
    OutputChunk, ProcessRequest, ShellSpec, DEFAULT_MAX_BUFFER, DEFAULT_TIMEOUT,
};

pub use cd::{parse_cd, resolve_dir, CdTarget};

/// Splits a command block into trimmed, non-empty lines.
#[must_use]
pub fn split_commands(block: &str) -> Vec<String> {
    block.lines().map(str::trim).filter(|line| !line.is_empty()).map(String::from).collect()
}

/// Shell, timeout and output cap applied to every command.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Shell that interprets each line.
    pub shell: ShellSpec,
    /// Per-command timeout.
    pub timeout: Duration,
    /// Per-stream output cap.
    pub max_buffer: usize,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            shell: ShellSpec::platform_default(),
            timeout: DEFAULT_TIMEOUT,
            max_buffer: DEFAULT_MAX_BUFFER,
        }
    }
}

impl From<&Settings> for RunOptions {
    fn from(settings: &Settings) -> Self {
        Self {
            shell: settings.shell.clone(),
            timeout: settings.timeout,
            max_buffer: settings.max_buffer,
        }
    }
}

/// Shared flag that stops a run before its next command.
///
/// The command already in flight is allowed to finish.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// Requests that the run stop.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Whether a stop was requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Where a failure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The command ran and failed.
    Command,
    /// The process host could not run it at all.
    Host,
}

/// Progress reported while a block runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunEvent {
    /// A command is about to start.
    Echo {
        /// Zero-based position in the block.
        index: usize,
        /// The trimmed command text.
        command: String,
    },
    /// Output arrived from the running command.
    Output(OutputChunk),
    /// A `cd` succeeded and later commands will run here.
    DirectoryChanged(PathBuf),
    /// The command failed; nothing after it runs.
    Failed {
        /// Zero-based position of the failing command.
        index: usize,
        /// Source of the failure.
        kind: FailureKind,
        /// Failure description.
        message: String,
    },
    /// The run stopped on request.
    Cancelled,
}

/// How a run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunStatus {
    /// Every command succeeded.
    Completed,
    /// The command at `index` failed.
    Failed {
        /// Zero-based position of the failing command.
        index: usize,
        /// Failure description.
        message: String,
    },
    /// The run stopped on request.
    Cancelled,
}

/// One executed command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandRecord {
    /// Command text.
    pub command: String,
    /// Whether it succeeded.
    pub success: bool,
    /// Exit code, when it exited normally.
    pub code: Option<i32>,
    /// Clock reading before it started.
    pub started_at: DateTime<Utc>,
    /// Clock reading after it finished.
    pub finished_at: DateTime<Utc>,
}

/// Summary of a finished run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    /// Final status.
    pub status: RunStatus,
    /// Commands that were started, in order.
    pub commands: Vec<CommandRecord>,
    /// Tracked working directory after the run.
    pub working_dir: Option<PathBuf>,
}

impl RunReport {
    /// Whether every command succeeded.
    #[must_use]
    pub fn succeeded(&self) -> bool {
        self.status == RunStatus::Completed
    }
}

/// Runs command blocks while tracking the working directory between them.
pub struct Runner<'a> {
    ctx: &'a ServiceContext,
    options: RunOptions,
    working_dir: Option<PathBuf>,
    home: Option<PathBuf>,
    cancel: CancelToken,
}

impl<'a> Runner<'a> {
    /// Creates a runner starting in the host's current directory.
    #[must_use]
    pub fn new(ctx: &'a ServiceContext, options: RunOptions) -> Self {
        Self {
            ctx,
            options,
            working_dir: None,
            home: dirs::home_dir(),
            cancel: CancelToken::default(),
        }
    }

    /// Starts in `dir` instead of the host's current directory.
    #[must_use]
    pub fn with_working_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.working_dir = dir;
        self
    }

    /// Uses `home` for `cd`, `cd ~` and `cd ~/...`.
    #[must_use]
    pub fn with_home(mut self, home: Option<PathBuf>) -> Self {
        self.home = home;
        self
    }

    /// Token that stops this runner between commands.
    #[must_use]
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// The tracked working directory, if any `cd` or start directory set one.
    #[must_use]
    pub fn working_dir(&self) -> Option<&Path> {
        self.working_dir.as_deref()
    }

    /// Runs every command in `block`, reporting progress to `sink`.
    pub fn run(&mut self, block: &str, sink: &mut dyn FnMut(RunEvent)) -> RunReport {
        let commands = split_commands(block);
        info!("running {} command(s)", commands.len());

        let mut records = Vec::with_capacity(commands.len());
        let mut status = RunStatus::Completed;

        for (index, command) in commands.into_iter().enumerate() {
            if self.cancel.is_cancelled() {
                info!("run cancelled before command {index}");
                sink(RunEvent::Cancelled);
                status = RunStatus::Cancelled;
                break;
            }

            sink(RunEvent::Echo { index, command: command.clone() });
            let request = ProcessRequest {
                command: command.clone(),
                working_dir: self.working_dir.clone(),
                shell: self.options.shell.clone(),
                timeout: self.options.timeout,
                max_buffer: self.options.max_buffer,
            };

            let started_at = self.ctx.clock.now();
            let result = self
                .ctx
                .process
                .execute(&request, &mut |chunk: OutputChunk| sink(RunEvent::Output(chunk)));
            let finished_at = self.ctx.clock.now();

            let outcome = match result {
                Ok(outcome) => outcome,
                Err(err) => {
                    let message = err.to_string();
                    records.push(CommandRecord {
                        command,
                        success: false,
                        code: None,
                        started_at,
                        finished_at,
                    });
                    sink(RunEvent::Failed { index, kind: FailureKind::Host, message: message.clone() });
                    status = RunStatus::Failed { index, message };
                    break;
                }
            };

            records.push(CommandRecord {
                command: command.clone(),
                success: outcome.success,
                code: outcome.code,
                started_at,
                finished_at,
            });

            if !outcome.success {
                let message = outcome.error_message();
                debug!("command {index} failed: {message}");
                sink(RunEvent::Failed { index, kind: FailureKind::Command, message: message.clone() });
                status = RunStatus::Failed { index, message };
                break;
            }

            if let Some(dir) = self.track_cd(&command) {
                debug!("working directory is now {}", dir.display());
                self.working_dir = Some(dir.clone());
                sink(RunEvent::DirectoryChanged(dir));
            }
        }

        RunReport { status, commands: records, working_dir: self.working_dir.clone() }
    }

    /// The directory a successful `command` moved to, if it was a trackable `cd`.
    fn track_cd(&self, command: &str) -> Option<PathBuf> {
        let target = parse_cd(command)?;
        let base = match &self.working_dir {
            Some(dir) => dir.clone(),
            None => std::env::current_dir().ok()?,
        };
        resolve_dir(&base, &target, self.home.as_deref())
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use chrono::{DateTime, TimeZone, Utc};

    use crate::adapters::live::{LiveFileSystem, LiveIdGenerator};
    use crate::context::ServiceContext;
    use crate::ports::process::{
        OutputChunk, OutputStream, ProcessHost, ProcessOutcome, ProcessRequest,
    };
    use crate::ports::Clock;

    /// Clock frozen at 2025-01-01T00:00:00Z.
    pub(crate) struct FixedClock;

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()
        }
    }

    /// Scripted reply for one command.
    pub(crate) enum Reply {
        Ok(&'static str),
        Fail(i32, &'static str),
        HostError(&'static str),
    }

    /// Process host that replies from a script and remembers every request.
    #[derive(Default)]
    pub(crate) struct ScriptedHost {
        replies: Mutex<VecDeque<Reply>>,
        pub(crate) requests: Mutex<Vec<ProcessRequest>>,
    }

    impl ScriptedHost {
        pub(crate) fn new(replies: Vec<Reply>) -> Self {
            Self { replies: Mutex::new(replies.into()), requests: Mutex::default() }
        }
    }

    impl ProcessHost for std::sync::Arc<ScriptedHost> {
        fn execute(
            &self,
            request: &ProcessRequest,
            on_output: &mut dyn FnMut(OutputChunk),
        ) -> Result<ProcessOutcome, Box<dyn std::error::Error + Send + Sync>> {
            self.requests.lock().unwrap().push(request.clone());
            match self.replies.lock().unwrap().pop_front().unwrap_or(Reply::Ok("")) {
                Reply::Ok(out) => {
                    if !out.is_empty() {
                        on_output(OutputChunk { stream: OutputStream::Stdout, data: out.into() });
                    }
                    Ok(ProcessOutcome::succeeded(out.into(), String::new()))
                }
                Reply::Fail(code, err) => {
                    on_output(OutputChunk { stream: OutputStream::Stderr, data: err.into() });
                    Ok(ProcessOutcome {
                        success: false,
                        code: Some(code),
                        stdout: String::new(),
                        stderr: err.into(),
                        failure: None,
                    })
                }
                Reply::HostError(msg) => Err(msg.into()),
            }
        }
    }

    /// Context whose process host is `host` and whose clock is frozen.
    pub(crate) fn context(host: &std::sync::Arc<ScriptedHost>) -> ServiceContext {
        ServiceContext {
            clock: Box::new(FixedClock),
            fs: Box::new(LiveFileSystem),
            id_gen: Box::new(LiveIdGenerator),
            process: Box::new(std::sync::Arc::clone(host)),
        }
    }
}
