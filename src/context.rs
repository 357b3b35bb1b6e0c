//! Service context bundling the port trait objects.

use std::path::Path;
use std::sync::Arc;

use crate::adapters::live::{LiveClock, LiveFileSystem, LiveIdGenerator, LiveProcessHost};
use crate::adapters::recording::{
    RecordingClock, RecordingFileSystem, RecordingIdGenerator, RecordingProcessHost,
};
use crate::adapters::replaying::{
    ReplayingClock, ReplayingFileSystem, ReplayingIdGenerator, ReplayingProcessHost,
};
use crate::cassette::config::CassetteConfig;
use crate::cassette::format::Cassette;
use crate::cassette::replayer::CassetteReplayer;
use crate::cassette::session::RecordingSession;
use crate::ports::process::{OutputChunk, ProcessOutcome, ProcessRequest};
use crate::ports::{Clock, FileSystem, IdGenerator, ProcessHost};

/// Every external boundary the runner, store and commands use.
pub struct ServiceContext {
    /// Wall-clock time.
    pub clock: Box<dyn Clock>,
    /// File I/O.
    pub fs: Box<dyn FileSystem>,
    /// Shortcut id generation.
    pub id_gen: Box<dyn IdGenerator>,
    /// Shell command execution.
    pub process: Box<dyn ProcessHost>,
}

impl ServiceContext {
    /// Real clock, disk, UUIDs and shell.
    #[must_use]
    pub fn live() -> Self {
        Self {
            clock: Box::new(LiveClock),
            fs: Box::new(LiveFileSystem),
            id_gen: Box::new(LiveIdGenerator),
            process: Box::new(LiveProcessHost),
        }
    }

    /// Live adapters wrapped so every call is logged to `session`.
    ///
    /// Drop the context before calling [`RecordingSession::finish`].
    #[must_use]
    pub fn recording(session: &RecordingSession) -> Self {
        Self {
            clock: Box::new(RecordingClock::new(Box::new(LiveClock), Arc::clone(&session.clock))),
            fs: Box::new(RecordingFileSystem::new(
                Box::new(LiveFileSystem),
                Arc::clone(&session.fs),
            )),
            id_gen: Box::new(RecordingIdGenerator::new(
                Box::new(LiveIdGenerator),
                Arc::clone(&session.id_gen),
            )),
            process: Box::new(RecordingProcessHost::new(
                Box::new(LiveProcessHost),
                Arc::clone(&session.process),
            )),
        }
    }

    /// Every port served from one cassette file.
    ///
    /// # Errors
    ///
    /// Returns an error if the cassette cannot be read or parsed.
    pub fn replaying(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read cassette file {}: {e}", path.display()))?;
        let cassette = Cassette::from_yaml(&content)
            .map_err(|e| format!("Failed to parse cassette file {}: {e}", path.display()))?;

        // Separate replayers keep per-port cursors independent.
        Ok(Self {
            clock: Box::new(ReplayingClock::new(CassetteReplayer::new(&cassette))),
            fs: Box::new(ReplayingFileSystem::new(CassetteReplayer::new(&cassette))),
            id_gen: Box::new(ReplayingIdGenerator::new(CassetteReplayer::new(&cassette))),
            process: Box::new(ReplayingProcessHost::new(CassetteReplayer::new(&cassette))),
        })
    }

    /// Each port served from its own cassette; unconfigured ports panic when used.
    ///
    /// # Errors
    ///
    /// Returns an error if a configured cassette cannot be read or parsed.
    pub fn replaying_from(config: &CassetteConfig) -> Result<Self, String> {
        let replayers = config.load_all()?;

        Ok(Self {
            clock: match replayers.clock {
                Some(r) => Box::new(ReplayingClock::new(r)),
                None => Box::new(UnconfiguredPort),
            },
            fs: match replayers.fs {
                Some(r) => Box::new(ReplayingFileSystem::new(r)),
                None => Box::new(UnconfiguredPort),
            },
            id_gen: match replayers.id_gen {
                Some(r) => Box::new(ReplayingIdGenerator::new(r)),
                None => Box::new(UnconfiguredPort),
            },
            process: match replayers.process {
                Some(r) => Box::new(ReplayingProcessHost::new(r)),
                None => Box::new(UnconfiguredPort),
            },
        })
    }
}

/// Stand-in for a port that has no cassette in a replay.
struct UnconfiguredPort;

impl UnconfiguredPort {
    fn fail(port: &str) -> ! {
        panic!("{port} port not configured in CassetteConfig: no cassette loaded for {port}");
    }
}

impl Clock for UnconfiguredPort {
    fn now(&self) -> chrono::DateTime<chrono::Utc> {
        Self::fail("clock")
    }
}

impl FileSystem for UnconfiguredPort {
    fn read_to_string(
        &self,
        _path: &Path,
    ) -> Result<String, Box<dyn std::error::Error + Send + Sync>> {
        Self::fail("fs")
    }

    fn write(
        &self,
        _path: &Path,
        _contents: &str,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        Self::fail("fs")
    }

    fn exists(&self, _path: &Path) -> bool {
        Self::fail("fs")
    }
}

impl IdGenerator for UnconfiguredPort {
    fn generate_id(&self) -> String {
        Self::fail("id_gen")
    }
}

impl ProcessHost for UnconfiguredPort {
    fn execute(
        &self,
        _request: &ProcessRequest,
        _on_output: &mut dyn FnMut(OutputChunk),
    ) -> Result<ProcessOutcome, Box<dyn std::error::Error + Send + Sync>> {
        Self::fail("process")
    }
}
