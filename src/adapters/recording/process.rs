//! Recording adapter for the `ProcessHost` port.
//!
//! Output is `{"chunks": [...], "result": {"ok": outcome}}` so a replay can
//! stream the same chunks before returning.

use std::sync::{Arc, Mutex};

use serde::Serialize;
use serde_json::json;

use super::{push, result_value};
use crate::cassette::recorder::CassetteRecorder;
use crate::ports::process::{OutputChunk, ProcessHost, ProcessOutcome, ProcessRequest};

/// Records each command, the chunks it streamed and how it ended.
pub struct RecordingProcessHost {
    inner: Box<dyn ProcessHost>,
    recorder: Arc<Mutex<CassetteRecorder>>,
}

impl RecordingProcessHost {
    /// Wraps `inner`, logging to `recorder`.
    pub fn new(inner: Box<dyn ProcessHost>, recorder: Arc<Mutex<CassetteRecorder>>) -> Self {
        Self { inner, recorder }
    }
}

#[derive(Serialize)]
struct ExecuteInput<'a> {
    command: &'a str,
    working_dir: Option<String>,
}

impl ProcessHost for RecordingProcessHost {
    fn execute(
        &self,
        request: &ProcessRequest,
        on_output: &mut dyn FnMut(OutputChunk),
    ) -> Result<ProcessOutcome, Box<dyn std::error::Error + Send + Sync>> {
        let mut chunks = Vec::new();
        let result = self.inner.execute(request, &mut |chunk: OutputChunk| {
            chunks.push(chunk.clone());
            on_output(chunk);
        });

        let input = ExecuteInput {
            command: &request.command,
            working_dir: request.working_dir.as_ref().map(|d| d.display().to_string()),
        };
        let output = json!({ "chunks": chunks, "result": result_value(&result) });
        push(&self.recorder, "process", "execute", &input, output);
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::process::{OutputStream, ProcessOutcome};

    struct Echo;

    impl ProcessHost for Echo {
        fn execute(
            &self,
            request: &ProcessRequest,
            on_output: &mut dyn FnMut(OutputChunk),
        ) -> Result<ProcessOutcome, Box<dyn std::error::Error + Send + Sync>> {
            let data = format!("{}\n", request.command);
            on_output(OutputChunk { stream: OutputStream::Stdout, data: data.clone() });
            Ok(ProcessOutcome::succeeded(data, String::new()))
        }
    }

    #[test]
    fn forwards_chunks_and_records_them() {
        let recorder = Arc::new(Mutex::new(CassetteRecorder::new("unused.yaml", "test")));
        let host = RecordingProcessHost::new(Box::new(Echo), Arc::clone(&recorder));

        let mut seen = Vec::new();
        let outcome = host
            .execute(&ProcessRequest::new("hello"), &mut |c: OutputChunk| seen.push(c))
            .unwrap();

        assert!(outcome.success);
        assert_eq!(seen.len(), 1);
        assert_eq!(recorder.lock().unwrap().len(), 1);
    }
}
