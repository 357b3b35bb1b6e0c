//! Replaying adapter for the `IdGenerator` port.

use std::sync::Mutex;

use crate::cassette::replayer::CassetteReplayer;
use crate::ports::IdGenerator;

/// Serves recorded ids.
pub struct ReplayingIdGenerator {
    replayer: Mutex<CassetteReplayer>,
}

impl ReplayingIdGenerator {
    /// Creates a generator over `replayer`.
    #[must_use]
    pub fn new(replayer: CassetteReplayer) -> Self {
        Self { replayer: Mutex::new(replayer) }
    }
}

impl IdGenerator for ReplayingIdGenerator {
    fn generate_id(&self) -> String {
        let output = self
            .replayer
            .lock()
            .expect("replayer lock poisoned")
            .expect_output("id_gen", "generate_id");
        output.as_str().expect("id_gen::generate_id: expected string output").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::replaying::test_support::replayer;
    use serde_json::json;

    #[test]
    fn serves_recorded_ids() {
        let gen = ReplayingIdGenerator::new(replayer(vec![
            ("id_gen", "generate_id", json!("1700000000000")),
            ("id_gen", "generate_id", json!("1700000000001")),
        ]));
        assert_eq!(gen.generate_id(), "1700000000000");
        assert_eq!(gen.generate_id(), "1700000000001");
    }
}
