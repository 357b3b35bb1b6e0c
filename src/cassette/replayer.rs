//! Serves recorded interactions back in order.

use std::collections::HashMap;

use thiserror::Error;

use super::format::{Cassette, Interaction};

/// A replay request the cassette cannot satisfy.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReplayError {
    /// The cassette never recorded this port/method.
    #[error(
        "Cassette exhausted: no interactions recorded for {port}::{method}. Available: [{available}]"
    )]
    Unrecorded {
        /// Requested port.
        port: String,
        /// Requested method.
        method: String,
        /// Comma-separated `port::method` pairs that do exist.
        available: String,
    },
    /// Every recorded call for this port/method has already been served.
    #[error(
        "Cassette exhausted: all {count} interactions for {port}::{method} have been consumed \
         (last seq={last_seq})"
    )]
    Exhausted {
        /// Requested port.
        port: String,
        /// Requested method.
        method: String,
        /// How many were recorded.
        count: usize,
        /// Sequence number of the last one served.
        last_seq: u64,
    },
}

#[derive(Debug, Clone, Hash, Eq, PartialEq)]
struct PortMethodKey {
    port: String,
    method: String,
}

/// Per port/method queues over a loaded cassette.
///
/// Queues are independent: interleaving between ports does not need to match
/// the recording, only the order within each port/method.
pub struct CassetteReplayer {
    queues: HashMap<PortMethodKey, Vec<Interaction>>,
    cursors: HashMap<PortMethodKey, usize>,
}

impl CassetteReplayer {
    /// Indexes a cassette for replay.
    #[must_use]
    pub fn new(cassette: &Cassette) -> Self {
        let mut queues: HashMap<PortMethodKey, Vec<Interaction>> = HashMap::new();
        for interaction in &cassette.interactions {
            let key = PortMethodKey {
                port: interaction.port.clone(),
                method: interaction.method.clone(),
            };
            queues.entry(key).or_default().push(interaction.clone());
        }
        Self { queues, cursors: HashMap::new() }
    }

    /// Returns the next interaction recorded for `port`/`method`.
    ///
    /// # Errors
    ///
    /// Returns [`ReplayError`] when the cassette has no (more) interactions
    /// for the pair.
    pub fn next_interaction(
        &mut self,
        port: &str,
        method: &str,
    ) -> Result<&Interaction, ReplayError> {
        let key = PortMethodKey { port: port.to_string(), method: method.to_string() };

        let Some(queue) = self.queues.get(&key) else {
            let mut available: Vec<String> =
                self.queues.keys().map(|k| format!("{}::{}", k.port, k.method)).collect();
            available.sort();
            return Err(ReplayError::Unrecorded {
                port: port.to_string(),
                method: method.to_string(),
                available: available.join(", "),
            });
        };

        let cursor = self.cursors.entry(key).or_insert(0);
        let Some(interaction) = queue.get(*cursor) else {
            return Err(ReplayError::Exhausted {
                port: port.to_string(),
                method: method.to_string(),
                count: queue.len(),
                last_seq: queue.last().map_or(0, |i| i.seq),
            });
        };
        *cursor += 1;
        Ok(interaction)
    }

    /// Clones the output of the next interaction, panicking when there is
    /// none. For ports whose signatures cannot carry an error.
    ///
    /// # Panics
    ///
    /// Panics with the [`ReplayError`] message when the cassette is exhausted.
    pub fn expect_output(&mut self, port: &str, method: &str) -> serde_json::Value {
        match self.next_interaction(port, method) {
            Ok(interaction) => interaction.output.clone(),
            Err(err) => panic!("{err}"),
        }
    }
}
