//! Live adapters that talk to the real system.

pub mod clock;
pub mod filesystem;
pub mod id_gen;
pub mod process;

pub use clock::LiveClock;
pub use filesystem::LiveFileSystem;
pub use id_gen::LiveIdGenerator;
pub use process::LiveProcessHost;
