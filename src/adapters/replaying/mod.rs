//! Replaying adapters that serve recorded interactions instead of touching the system.

pub mod clock;
pub mod filesystem;
pub mod id_gen;
pub mod process;

pub use clock::ReplayingClock;
pub use filesystem::ReplayingFileSystem;
pub use id_gen::ReplayingIdGenerator;
pub use process::ReplayingProcessHost;

use std::sync::Mutex;

use serde::de::DeserializeOwned;

use crate::cassette::replayer::CassetteReplayer;

/// Takes the output of the next `port`/`method` interaction.
pub(crate) fn next_output(
    replayer: &Mutex<CassetteReplayer>,
    port: &str,
    method: &str,
) -> Result<serde_json::Value, Box<dyn std::error::Error + Send + Sync>> {
    let mut replayer = replayer.lock().map_err(|_| "replayer lock poisoned")?;
    Ok(replayer.next_interaction(port, method)?.output.clone())
}

/// Decodes an `{"ok": value}` / `{"err": message}` output.
pub(crate) fn replay_result<T: DeserializeOwned>(
    output: &serde_json::Value,
    context: &str,
) -> Result<T, Box<dyn std::error::Error + Send + Sync>> {
    if let Some(err) = output.get("err") {
        return Err(err.as_str().unwrap_or("unknown error").into());
    }
    let value = output.get("ok").unwrap_or(output);
    serde_json::from_value(value.clone())
        .map_err(|e| format!("{context}: failed to deserialize: {e}").into())
}


#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn replay_result_reads_ok_and_err() {
        let ok: String = replay_result(&json!({"ok": "text"}), "t").unwrap();
        assert_eq!(ok, "text");

        let err = replay_result::<String>(&json!({"err": "denied"}), "t").unwrap_err();
        assert_eq!(err.to_string(), "denied");
    }

    #[test]
    fn replay_result_reports_shape_mismatch() {
        let err = replay_result::<u32>(&json!({"ok": "nope"}), "fs::read_to_string").unwrap_err();
        assert!(err.to_string().starts_with("fs::read_to_string: failed to deserialize"));
    }
}
