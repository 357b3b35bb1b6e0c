//! Cassette file layout.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One call into a port and what it returned.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Interaction {
    /// Position in the recording, assigned by the recorder.
    pub seq: u64,
    /// Port name: `clock`, `fs`, `id_gen` or `process`.
    pub port: String,
    /// Port method that was called.
    pub method: String,
    /// Arguments of the call.
    pub input: serde_json::Value,
    /// Value returned by the call.
    pub output: serde_json::Value,
}

/// A named, ordered list of interactions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Cassette {
    /// Cassette name, usually `<timestamp>-<port>`.
    pub name: String,
    /// When the recording finished.
    pub recorded_at: DateTime<Utc>,
    /// Crate version that produced the recording.
    pub version: String,
    /// Interactions in call order.
    pub interactions: Vec<Interaction>,
}

impl Cassette {
    /// Parses a cassette from YAML text.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not a valid cassette.
    pub fn from_yaml(text: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_hand_written_cassette() {
        let yaml = r#"
name: demo
recorded_at: 2025-03-15T14:30:00Z
version: 0.1.0
interactions:
  - seq: 0
    port: process
    method: execute
    input: { command: "echo hi" }
    output: { chunks: [], result: { ok: { success: true } } }
"#;
        let cassette = Cassette::from_yaml(yaml).unwrap();

        assert_eq!(cassette.name, "demo");
        assert_eq!(cassette.interactions.len(), 1);
        assert_eq!(cassette.interactions[0].input, json!({"command": "echo hi"}));
    }
}
