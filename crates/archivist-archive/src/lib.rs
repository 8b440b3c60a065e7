//! Append-only per-conversation message archive.

pub mod error;
pub mod model;
pub mod provider;
pub mod redact;

/// Archive error type.
pub use error::ArchiveError;
/// Archived message model.
pub use model::{COMMAND_SIGIL, MessageRecord, is_command_text};
/// Archive interface and default file implementation.
pub use provider::{FileArchive, MessageArchive, encode_file_stem};
/// Text masking applied before digests quote messages.
pub use redact::{ELLIPSIS, MaskingRedactor, RedactionPolicy, Redactor, clip_chars};
