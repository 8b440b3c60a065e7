//! The archivist: an append-only chat archive with incremental digests.
//!
//! Hosts build a [`DigestOrchestrator`] from an [`ArchivistConfig`], feed it
//! every inbound message and route digest commands to [`DigestOrchestrator::handle`].

pub use archivist_archive as archive;
pub use archivist_config as config;
pub use archivist_core as core;

pub use archivist_archive::{FileArchive, MaskingRedactor, MessageArchive, MessageRecord, Redactor};
pub use archivist_config::{ArchivistConfig, LayeredConfigOptions};
pub use archivist_core::{
    APOLOGY, CursorState, DigestError, DigestOrchestrator, DigestRequest, InboundMessage, ViewKind,
};

/// Install `env_logger` (when the `logging` feature is on) with an `info`
/// default that `RUST_LOG` overrides. Safe to call more than once.
pub fn init_logging() {
    #[cfg(feature = "logging")]
    {
        let env = env_logger::Env::default().default_filter_or("info");
        let _ = env_logger::Builder::from_env(env).try_init();
    }
    log::debug!("archivist logging initialized");
}
