//! YAML cassettes of port traffic, for recording a session and replaying it.

pub mod config;
pub mod format;
pub mod recorder;
pub mod replayer;
pub mod session;
