//! Port traits for everything the runner and store touch outside the process.
//!
//! Live, recording and replaying implementations live in `src/adapters/`.

pub mod clock;
pub mod filesystem;
pub mod id_gen;
pub mod process;

pub use clock::Clock;
pub use filesystem::FileSystem;
pub use id_gen::IdGenerator;
pub use process::{
    OutputChunk, OutputStream, ProcessFailure, ProcessHost, ProcessOutcome, ProcessRequest,
    ShellSpec,
};
