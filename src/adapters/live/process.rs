//! Live process host: spawns the shell with tokio and streams its output.

use std::io;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};

use log::{debug, warn};
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{Child, Command};

use crate::ports::process::{
    OutputChunk, OutputStream, ProcessFailure, ProcessHost, ProcessOutcome, ProcessRequest,
};

const READ_CHUNK: usize = 8 * 1024;

/// Runs commands through the configured shell.
///
/// Each call drives its own current-thread tokio runtime, so this must not be
/// called from inside an async context.
pub struct LiveProcessHost;

impl ProcessHost for LiveProcessHost {
    fn execute(
        &self,
        request: &ProcessRequest,
        on_output: &mut dyn FnMut(OutputChunk),
    ) -> Result<ProcessOutcome, Box<dyn std::error::Error + Send + Sync>> {
        let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build()?;
        Ok(runtime.block_on(run(request, on_output)))
    }
}

/// How the streaming phase ended.
enum Drive {
    Exited(ExitStatus),
    Overflow(OutputStream),
}

async fn run(request: &ProcessRequest, on_output: &mut dyn FnMut(OutputChunk)) -> ProcessOutcome {
    let command = request.command.trim();
    let cwd = effective_working_dir(request.working_dir.as_deref());
    debug!("spawning `{command}` in {} via {}", cwd.display(), request.shell.program);

    let spawned = Command::new(&request.shell.program)
        .args(&request.shell.args)
        .arg(command)
        .current_dir(&cwd)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn();
    let mut child = match spawned {
        Ok(child) => child,
        Err(err) => {
            warn!("failed to start {}: {err}", request.shell.program);
            let failure = spawn_failure(&err, command, &request.shell.program);
            return ProcessOutcome::failed(failure, None, String::new(), String::new());
        }
    };

    let mut capture = Capture::new(request.max_buffer);
    let driven =
        tokio::time::timeout(request.timeout, drive(&mut child, &mut capture, on_output)).await;

    match driven {
        Ok(Ok(Drive::Exited(status))) => {
            debug!("`{command}` exited with {status}");
            let (stdout, stderr) = capture.into_strings();
            classify(status, command, &cwd, stdout, stderr)
        }
        Ok(Ok(Drive::Overflow(stream))) => {
            kill(&mut child).await;
            let (stdout, stderr) = capture.into_strings();
            let failure = ProcessFailure::BufferExceeded { stream, limit: request.max_buffer };
            ProcessOutcome::failed(failure, None, stdout, stderr)
        }
        Ok(Err(err)) => {
            kill(&mut child).await;
            let (stdout, stderr) = capture.into_strings();
            let failure = ProcessFailure::Spawn { message: err.to_string() };
            ProcessOutcome::failed(failure, None, stdout, stderr)
        }
        Err(_elapsed) => {
            warn!("`{command}` timed out after {:?}", request.timeout);
            kill(&mut child).await;
            let (stdout, stderr) = capture.into_strings();
            let failure = ProcessFailure::TimedOut {
                seconds: request.timeout.as_secs(),
                command: command.to_string(),
            };
            ProcessOutcome::failed(failure, None, stdout, stderr)
        }
    }
}

/// Pumps both pipes until EOF, then reaps the child.
async fn drive(
    child: &mut Child,
    capture: &mut Capture,
    on_output: &mut dyn FnMut(OutputChunk),
) -> io::Result<Drive> {
    let mut stdout = child.stdout.take();
    let mut stderr = child.stderr.take();
    let mut out_buf = [0u8; READ_CHUNK];
    let mut err_buf = [0u8; READ_CHUNK];

    while stdout.is_some() || stderr.is_some() {
        tokio::select! {
            read = read_some(&mut stdout, &mut out_buf) => match read? {
                0 => stdout = None,
                n => {
                    if capture.push(OutputStream::Stdout, &out_buf[..n], on_output) {
                        return Ok(Drive::Overflow(OutputStream::Stdout));
                    }
                }
            },
            read = read_some(&mut stderr, &mut err_buf) => match read? {
                0 => stderr = None,
                n => {
                    if capture.push(OutputStream::Stderr, &err_buf[..n], on_output) {
                        return Ok(Drive::Overflow(OutputStream::Stderr));
                    }
                }
            },
        }
    }

    Ok(Drive::Exited(child.wait().await?))
}

/// Reads from an open pipe; a closed pipe never resolves.
async fn read_some<R: AsyncRead + Unpin>(reader: &mut Option<R>, buf: &mut [u8]) -> io::Result<usize> {
    match reader {
        Some(reader) => reader.read(buf).await,
        None => std::future::pending().await,
    }
}

async fn kill(child: &mut Child) {
    if let Err(err) = child.kill().await {
        debug!("kill after early stop failed: {err}");
    }
}

/// Per-stream capture with a byte cap and UTF-8 safe chunk decoding.
struct Capture {
    limit: usize,
    stdout: StreamBuffer,
    stderr: StreamBuffer,
}

#[derive(Default)]
struct StreamBuffer {
    bytes: Vec<u8>,
    carry: Vec<u8>,
}

impl Capture {
    fn new(limit: usize) -> Self {
        Self { limit, stdout: StreamBuffer::default(), stderr: StreamBuffer::default() }
    }

    /// Records `data` and forwards it. Returns `true` once the stream has
    /// gone over the cap; only the part that fits is kept and forwarded.
    fn push(
        &mut self,
        stream: OutputStream,
        data: &[u8],
        on_output: &mut dyn FnMut(OutputChunk),
    ) -> bool {
        let buffer = match stream {
            OutputStream::Stdout => &mut self.stdout,
            OutputStream::Stderr => &mut self.stderr,
        };
        let room = self.limit.saturating_sub(buffer.bytes.len());
        let overflow = data.len() > room;
        let kept = if overflow { &data[..room] } else { data };

        buffer.bytes.extend_from_slice(kept);
        let text = decode_chunk(&mut buffer.carry, kept);
        if !text.is_empty() {
            on_output(OutputChunk { stream, data: text });
        }
        overflow
    }

    fn into_strings(self) -> (String, String) {
        (
            String::from_utf8_lossy(&self.stdout.bytes).into_owned(),
            String::from_utf8_lossy(&self.stderr.bytes).into_owned(),
        )
    }
}

/// Decodes as much of `carry + bytes` as forms complete UTF-8, leaving an
/// incomplete trailing sequence in `carry` for the next read.
fn decode_chunk(carry: &mut Vec<u8>, bytes: &[u8]) -> String {
    carry.extend_from_slice(bytes);
    let split = match std::str::from_utf8(carry) {
        Ok(_) => carry.len(),
        Err(err) if err.error_len().is_none() => err.valid_up_to(),
        Err(_) => carry.len(),
    };
    let rest = carry.split_off(split);
    let text = String::from_utf8_lossy(carry).into_owned();
    *carry = rest;
    text
}

/// The requested directory when it exists, otherwise the host's cwd.
fn effective_working_dir(requested: Option<&Path>) -> PathBuf {
    let fallback = || std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    match requested {
        Some(dir) if dir.is_dir() => dir.to_path_buf(),
        Some(dir) => {
            let cwd = fallback();
            warn!("working directory {} does not exist, using {}", dir.display(), cwd.display());
            cwd
        }
        None => fallback(),
    }
}

fn classify(
    status: ExitStatus,
    command: &str,
    cwd: &Path,
    stdout: String,
    stderr: String,
) -> ProcessOutcome {
    if status.success() {
        return ProcessOutcome::succeeded(stdout, stderr);
    }
    let command_owned = command.to_string();
    let failure = match status.code() {
        Some(127) => {
            ProcessFailure::NotFound { command: command_owned, diagnostics: diagnostics(command, cwd) }
        }
        Some(126) => ProcessFailure::PermissionDenied { command: command_owned },
        Some(_) if cfg!(windows) && stderr.contains("is not recognized") => {
            ProcessFailure::NotFound { command: command_owned, diagnostics: diagnostics(command, cwd) }
        }
        Some(code) => ProcessFailure::Exit { code, command: command_owned, stderr: stderr.clone() },
        None => ProcessFailure::Signal { signal: terminating_signal(status), command: command_owned },
    };
    ProcessOutcome::failed(failure, status.code(), stdout, stderr)
}

fn diagnostics(command: &str, cwd: &Path) -> String {
    let executable = command.split_whitespace().next().unwrap_or(command);
    format!(
        "\ndiagnostics:\n- executable: {executable}\n- working directory: {}\n- hint: check that \
         {executable} is installed and on PATH, or use its full path",
        cwd.display()
    )
}

fn spawn_failure(err: &io::Error, command: &str, shell: &str) -> ProcessFailure {
    match err.kind() {
        io::ErrorKind::NotFound => ProcessFailure::NotFound {
            command: command.to_string(),
            diagnostics: format!("\ndiagnostics:\n- shell not found: {shell}"),
        },
        io::ErrorKind::PermissionDenied => {
            ProcessFailure::PermissionDenied { command: command.to_string() }
        }
        _ => ProcessFailure::Spawn { message: err.to_string() },
    }
}

#[cfg(unix)]
fn terminating_signal(status: ExitStatus) -> i32 {
    use std::os::unix::process::ExitStatusExt;
    status.signal().unwrap_or(-1)
}

#[cfg(not(unix))]
fn terminating_signal(_status: ExitStatus) -> i32 {
    -1
}
