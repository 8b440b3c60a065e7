//! Test helpers shared across archivist crates.

pub mod archive;
pub mod clock;
pub mod random;

pub use archive::{FailingArchive, InMemoryArchive};
pub use clock::FixedClock;
pub use random::ScriptedIndexSource;
