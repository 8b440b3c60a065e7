//! Settings for the archivist: where the archive and cursor state live, how
//! many messages each digest reads, rendering limits and redaction rules.
//!
//! Settings come from JSON5 files stacked system, user, cwd, runtime; see
//! [`ArchivistConfig::load_layered`].

mod error;
mod loader;
mod model;

pub use error::ConfigError;
pub use loader::{ConfigLayer, ConfigLayerSource, LayeredConfig, LayeredConfigOptions};
pub use model::*;
