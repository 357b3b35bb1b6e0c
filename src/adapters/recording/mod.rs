//! Recording adapters: delegate to an inner port and log every call to a cassette.

pub mod clock;
pub mod filesystem;
pub mod id_gen;
pub mod process;

pub use clock::RecordingClock;
pub use filesystem::RecordingFileSystem;
pub use id_gen::RecordingIdGenerator;
pub use process::RecordingProcessHost;

use std::sync::{Arc, Mutex};

use serde::Serialize;
use serde_json::{json, Value};

use crate::cassette::recorder::CassetteRecorder;

/// Records a call whose return value is not a `Result`.
pub(crate) fn record_interaction<I, O>(
    recorder: &Arc<Mutex<CassetteRecorder>>,
    port: &str,
    method: &str,
    input: &I,
    output: &O,
) where
    I: Serialize,
    O: Serialize,
{
    let output = serde_json::to_value(output).expect("failed to serialize recording output");
    push(recorder, port, method, input, output);
}

/// Encodes a `Result` as `{"ok": value}` or `{"err": message}`, the shape the
/// replaying adapters read back.
pub(crate) fn result_value<T, E>(result: &Result<T, E>) -> Value
where
    T: Serialize,
    E: std::fmt::Display,
{
    match result {
        Ok(v) => json!({ "ok": serde_json::to_value(v).expect("failed to serialize Ok value") }),
        Err(e) => json!({ "err": e.to_string() }),
    }
}

/// Records a call that returned a `Result`.
pub(crate) fn record_result<T, E, I>(
    recorder: &Arc<Mutex<CassetteRecorder>>,
    port: &str,
    method: &str,
    input: &I,
    result: &Result<T, E>,
) where
    T: Serialize,
    E: std::fmt::Display,
    I: Serialize,
{
    push(recorder, port, method, input, result_value(result));
}

pub(crate) fn push<I: Serialize>(
    recorder: &Arc<Mutex<CassetteRecorder>>,
    port: &str,
    method: &str,
    input: &I,
    output: Value,
) {
    let input = serde_json::to_value(input).expect("failed to serialize recording input");
    let mut guard = recorder.lock().expect("recorder lock poisoned");
    guard.record(port, method, input, output);
}
