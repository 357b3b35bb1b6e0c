//! Log-pane text for run events.

use super::{FailureKind, RunEvent};

/// Log text for one event; `None` for events that only update state.
#[must_use]
pub fn render(event: &RunEvent) -> Option<String> {
    match event {
        RunEvent::Echo { command, .. } => Some(format!("> {command}\n")),
        RunEvent::Output(chunk) => Some(chunk.data.clone()),
        RunEvent::DirectoryChanged(_) => None,
        RunEvent::Failed { kind: FailureKind::Command, message, .. } => {
            Some(format!("error: {message}\n"))
        }
        RunEvent::Failed { kind: FailureKind::Host, message, .. } => {
            Some(format!("execution error: {message}\n"))
        }
        RunEvent::Cancelled => Some("cancelled\n".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::ports::{OutputChunk, OutputStream};

    #[test]
    fn renders_a_failed_run() {
        let log: String = [
            RunEvent::Echo { index: 0, command: "cd app".into() },
            RunEvent::DirectoryChanged(PathBuf::from("/app")),
            RunEvent::Echo { index: 1, command: "make".into() },
            RunEvent::Output(OutputChunk { stream: OutputStream::Stderr, data: "oops\n".into() }),
            RunEvent::Failed {
                index: 1,
                kind: FailureKind::Command,
                message: "Command failed: make\noops".into(),
            },
        ]
        .iter()
        .filter_map(render)
        .collect();

        assert_eq!(log, "> cd app\n> make\noops\nerror: Command failed: make\noops\n");
    }

    #[test]
    fn host_errors_are_labelled_separately() {
        let event =
            RunEvent::Failed { index: 0, kind: FailureKind::Host, message: "no runtime".into() };
        assert_eq!(render(&event).as_deref(), Some("execution error: no runtime\n"));
    }
}
