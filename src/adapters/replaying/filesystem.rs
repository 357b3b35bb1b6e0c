//! Replaying adapter for the `FileSystem` port.

use std::path::Path;
use std::sync::Mutex;

use super::{next_output, replay_result};
use crate::cassette::replayer::CassetteReplayer;
use crate::ports::FileSystem;

/// Serves recorded file reads and write results.
pub struct ReplayingFileSystem {
    replayer: Mutex<CassetteReplayer>,
}

impl ReplayingFileSystem {
    /// Creates a filesystem over `replayer`.
    #[must_use]
    pub fn new(replayer: CassetteReplayer) -> Self {
        Self { replayer: Mutex::new(replayer) }
    }
}

impl FileSystem for ReplayingFileSystem {
    fn read_to_string(
        &self,
        _path: &Path,
    ) -> Result<String, Box<dyn std::error::Error + Send + Sync>> {
        let output = next_output(&self.replayer, "fs", "read_to_string")?;
        replay_result(&output, "fs::read_to_string")
    }

    fn write(
        &self,
        _path: &Path,
        _contents: &str,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let output = next_output(&self.replayer, "fs", "write")?;
        replay_result(&output, "fs::write")
    }

    fn exists(&self, _path: &Path) -> bool {
        let output =
            self.replayer.lock().expect("replayer lock poisoned").expect_output("fs", "exists");
        output.as_bool().expect("fs::exists: expected boolean output")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::replaying::test_support::replayer;
    use serde_json::json;

    #[test]
    fn replays_reads_writes_and_checks() {
        let fs = ReplayingFileSystem::new(replayer(vec![
            ("fs", "exists", json!(true)),
            ("fs", "read_to_string", json!({"ok": "[]"})),
            ("fs", "write", json!({"ok": null})),
        ]));
        let path = Path::new("/home/me/.execute-scripter-shortcuts.json");

        assert!(fs.exists(path));
        assert_eq!(fs.read_to_string(path).unwrap(), "[]");
        fs.write(path, "[]").unwrap();
    }

    #[test]
    fn replays_recorded_error() {
        let fs = ReplayingFileSystem::new(replayer(vec![(
            "fs",
            "read_to_string",
            json!({"err": "No such file or directory"}),
        )]));

        let err = fs.read_to_string(Path::new("/missing")).unwrap_err();
        assert!(err.to_string().contains("No such file"));
    }

    #[test]
    fn unrecorded_call_is_an_error_not_a_panic() {
        let fs = ReplayingFileSystem::new(replayer(vec![]));
        let err = fs.write(Path::new("/x"), "").unwrap_err();
        assert!(err.to_string().contains("Cassette exhausted"));
    }
}
