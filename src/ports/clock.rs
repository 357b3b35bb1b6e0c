//! Clock port.

use chrono::{DateTime, Utc};

/// Source of wall-clock time for shortcut creation stamps and command timings.
pub trait Clock: Send + Sync {
    /// Returns the current UTC time.
    fn now(&self) -> DateTime<Utc>;
}
