//! Runtime settings taken from the environment.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::ports::process::{ShellSpec, DEFAULT_MAX_BUFFER, DEFAULT_TIMEOUT};

/// Shortcut file name, placed in the user's home directory.
pub const SHORTCUTS_FILE_NAME: &str = ".execute-scripter-shortcuts.json";

/// Shortcut file override.
pub const ENV_SHORTCUTS: &str = "SCRIPTER_SHORTCUTS";
/// Per-command timeout in seconds.
pub const ENV_TIMEOUT_SECS: &str = "SCRIPTER_TIMEOUT_SECS";
/// Per-stream capture cap in bytes.
pub const ENV_MAX_BUFFER: &str = "SCRIPTER_MAX_BUFFER";
/// Shell program override.
pub const ENV_SHELL: &str = "SCRIPTER_SHELL";
/// Directory under which to record port traffic.
pub const ENV_RECORD: &str = "SCRIPTER_RECORD";
/// Cassette directory to replay port traffic from.
pub const ENV_REPLAY: &str = "SCRIPTER_REPLAY";

/// A setting that could not be parsed.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A numeric variable held something else.
    #[error("{name} must be a positive integer, got {value:?}")]
    InvalidNumber {
        /// Variable name.
        name: &'static str,
        /// Raw value.
        value: String,
    },
    /// No home directory and no explicit shortcut path.
    #[error("cannot locate the home directory; set SCRIPTER_SHORTCUTS")]
    NoHomeDir,
    /// Recording and replaying were both requested.
    #[error("SCRIPTER_RECORD and SCRIPTER_REPLAY cannot be used together")]
    RecordAndReplay,
}

/// How port traffic is captured or served.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionMode {
    /// Talk to the real system.
    Live,
    /// Talk to the real system and write cassettes under this directory.
    Record(PathBuf),
    /// Serve port calls from the cassettes in this directory.
    Replay(PathBuf),
}

/// Resolved settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Where shortcuts are stored.
    pub shortcuts_path: PathBuf,
    /// Kill a command after this long.
    pub timeout: Duration,
    /// Per-stream output cap.
    pub max_buffer: usize,
    /// Shell used for every command.
    pub shell: ShellSpec,
    /// Live, recording or replaying.
    pub mode: SessionMode,
}

impl Settings {
    /// Reads settings from the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is malformed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok(), dirs::home_dir())
    }

    /// Reads settings through `lookup`, with `home` as the default shortcut location.
    ///
    /// Empty values count as unset.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable is malformed.
    pub fn from_lookup<F>(lookup: F, home: Option<PathBuf>) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let shortcuts_path = match get(ENV_SHORTCUTS) {
            Some(path) => PathBuf::from(path),
            None => home.ok_or(ConfigError::NoHomeDir)?.join(SHORTCUTS_FILE_NAME),
        };

        let timeout = match get(ENV_TIMEOUT_SECS) {
            Some(raw) => Duration::from_secs(parse_positive(ENV_TIMEOUT_SECS, &raw)?),
            None => DEFAULT_TIMEOUT,
        };

        let max_buffer = match get(ENV_MAX_BUFFER) {
            Some(raw) => usize::try_from(parse_positive(ENV_MAX_BUFFER, &raw)?)
                .map_err(|_| ConfigError::InvalidNumber { name: ENV_MAX_BUFFER, value: raw })?,
            None => DEFAULT_MAX_BUFFER,
        };

        let shell = get(ENV_SHELL).map_or_else(ShellSpec::platform_default, |program| {
            ShellSpec::for_program(program.trim())
        });

        let mode = match (get(ENV_RECORD), get(ENV_REPLAY)) {
            (Some(_), Some(_)) => return Err(ConfigError::RecordAndReplay),
            (Some(dir), None) => SessionMode::Record(PathBuf::from(dir)),
            (None, Some(dir)) => SessionMode::Replay(PathBuf::from(dir)),
            (None, None) => SessionMode::Live,
        };

        Ok(Self { shortcuts_path, timeout, max_buffer, shell, mode })
    }
}

fn parse_positive(name: &'static str, raw: &str) -> Result<u64, ConfigError> {
    match raw.trim().parse::<u64>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(ConfigError::InvalidNumber { name, value: raw.to_string() }),
    }
}
