//! ID generator port.

/// Produces identifiers for newly saved shortcuts.
pub trait IdGenerator: Send + Sync {
    /// Returns a fresh identifier, unique within the shortcut file.
    fn generate_id(&self) -> String;
}
