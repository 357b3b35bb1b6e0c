//! Random shortcut ids.

use uuid::Uuid;

use crate::ports::IdGenerator;

/// Generates v4 UUIDs for shortcut records.
#[derive(Default)]
pub struct LiveIdGenerator;

impl IdGenerator for LiveIdGenerator {
    fn generate_id(&self) -> String {
        Uuid::new_v4().to_string()
    }
}
