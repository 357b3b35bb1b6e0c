//! Replaying adapter for the `ProcessHost` port.

use std::sync::Mutex;

use super::{next_output, replay_result};
use crate::cassette::replayer::CassetteReplayer;
use crate::ports::process::{OutputChunk, ProcessHost, ProcessOutcome, ProcessRequest};

/// Re-streams recorded chunks and returns the recorded outcome.
pub struct ReplayingProcessHost {
    replayer: Mutex<CassetteReplayer>,
}

impl ReplayingProcessHost {
    /// Creates a process host over `replayer`.
    #[must_use]
    pub fn new(replayer: CassetteReplayer) -> Self {
        Self { replayer: Mutex::new(replayer) }
    }
}

impl ProcessHost for ReplayingProcessHost {
    fn execute(
        &self,
        _request: &ProcessRequest,
        on_output: &mut dyn FnMut(OutputChunk),
    ) -> Result<ProcessOutcome, Box<dyn std::error::Error + Send + Sync>> {
        let output = next_output(&self.replayer, "process", "execute")?;

        if let Some(chunks) = output.get("chunks") {
            let chunks: Vec<OutputChunk> = serde_json::from_value(chunks.clone())
                .map_err(|e| format!("process::execute: bad chunks: {e}"))?;
            for chunk in chunks {
                on_output(chunk);
            }
        }

        let result = output.get("result").ok_or("process::execute: missing result")?;
        replay_result(result, "process::execute")
    }
}
