//! Which cassette file feeds which port during replay.

use std::path::{Path, PathBuf};

use super::format::Cassette;
use super::replayer::CassetteReplayer;

/// Per-port cassette paths. A port left as `None` panics if used during replay.
#[derive(Debug, Clone, Default)]
pub struct CassetteConfig {
    /// Cassette for the clock port.
    pub clock: Option<PathBuf>,
    /// Cassette for the filesystem port.
    pub fs: Option<PathBuf>,
    /// Cassette for the ID generator port.
    pub id_gen: Option<PathBuf>,
    /// Cassette for the process host port.
    pub process: Option<PathBuf>,
}

/// Loaded replayers, one per configured port.
pub struct PortReplayers {
    /// Replayer for the clock port.
    pub clock: Option<CassetteReplayer>,
    /// Replayer for the filesystem port.
    pub fs: Option<CassetteReplayer>,
    /// Replayer for the ID generator port.
    pub id_gen: Option<CassetteReplayer>,
    /// Replayer for the process host port.
    pub process: Option<CassetteReplayer>,
}

impl CassetteConfig {
    /// File name a recording session uses for `port`.
    #[must_use]
    pub fn file_name(port: &str) -> String {
        format!("{port}.cassette.yaml")
    }

    /// Picks up every `<port>.cassette.yaml` present in `dir`.
    #[must_use]
    pub fn from_dir(dir: &Path) -> Self {
        let existing = |port: &str| Some(dir.join(Self::file_name(port))).filter(|p| p.is_file());
        Self {
            clock: existing("clock"),
            fs: existing("fs"),
            id_gen: existing("id_gen"),
            process: existing("process"),
        }
    }

    /// Reads and parses a single cassette file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<CassetteReplayer, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read cassette file {}: {e}", path.display()))?;
        let cassette = Cassette::from_yaml(&content)
            .map_err(|e| format!("Failed to parse cassette file {}: {e}", path.display()))?;
        Ok(CassetteReplayer::new(&cassette))
    }

    /// Loads every configured cassette.
    ///
    /// # Errors
    ///
    /// Returns an error if any configured cassette cannot be read or parsed.
    pub fn load_all(&self) -> Result<PortReplayers, String> {
        Ok(PortReplayers {
            clock: self.clock.as_deref().map(Self::load).transpose()?,
            fs: self.fs.as_deref().map(Self::load).transpose()?,
            id_gen: self.id_gen.as_deref().map(Self::load).transpose()?,
            process: self.process.as_deref().map(Self::load).transpose()?,
        })
    }
}
