//! Configuration schema for the archivist.

use serde::{Deserialize, Serialize};

/// Root config for the archive and digest engine.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ArchivistConfig {
    #[serde(default, rename = "$schema")]
    pub schema: Option<String>,
    #[serde(default)]
    pub archive: ArchiveConfig,
    #[serde(default)]
    pub state: StateConfig,
    #[serde(default)]
    pub windows: WindowConfig,
    #[serde(default)]
    pub render: RenderConfig,
    #[serde(default)]
    pub redaction: RedactionConfig,
}

impl ArchivistConfig {
    /// Start building a config programmatically with defaults applied.
    pub fn builder() -> ArchivistConfigBuilder {
        ArchivistConfigBuilder::new()
    }
}

/// Builder for assembling an `ArchivistConfig` in code.
#[derive(Debug, Default, Clone)]
pub struct ArchivistConfigBuilder {
    config: ArchivistConfig,
}

impl ArchivistConfigBuilder {
    /// Create a new builder seeded with default config values.
    pub fn new() -> Self {
        Self {
            config: ArchivistConfig::default(),
        }
    }

    /// Replace the message archive configuration.
    pub fn archive(mut self, archive: ArchiveConfig) -> Self {
        self.config.archive = archive;
        self
    }

    /// Replace the cursor state configuration.
    pub fn state(mut self, state: StateConfig) -> Self {
        self.config.state = state;
        self
    }

    /// Replace the digest window sizes.
    pub fn windows(mut self, windows: WindowConfig) -> Self {
        self.config.windows = windows;
        self
    }

    /// Replace the rendering limits.
    pub fn render(mut self, render: RenderConfig) -> Self {
        self.config.render = render;
        self
    }

    /// Replace the redaction settings.
    pub fn redaction(mut self, redaction: RedactionConfig) -> Self {
        self.config.redaction = redaction;
        self
    }

    /// Finalize and return the built `ArchivistConfig`.
    pub fn build(self) -> ArchivistConfig {
        self.config
    }
}

/// Location of the per-conversation message logs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ArchiveConfig {
    #[serde(default = "default_archive_path")]
    pub path: String,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            path: default_archive_path(),
        }
    }
}

fn default_archive_path() -> String {
    "data/chats".to_string()
}

/// Location of the global cursor state document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StateConfig {
    #[serde(default = "default_state_path")]
    pub path: String,
}

impl Default for StateConfig {
    fn default() -> Self {
        Self {
            path: default_state_path(),
        }
    }
}

fn default_state_path() -> String {
    "data/state.json".to_string()
}

/// Maximum number of messages considered by each digest kind.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct WindowConfig {
    #[serde(default = "default_summary_window")]
    pub summary: usize,
    #[serde(default = "default_catchup_window")]
    pub catchup: usize,
    #[serde(default = "default_observe_window")]
    pub observe: usize,
    #[serde(default = "default_silence_window")]
    pub silence: usize,
    #[serde(default = "default_extraction_window")]
    pub extraction: usize,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            summary: default_summary_window(),
            catchup: default_catchup_window(),
            observe: default_observe_window(),
            silence: default_silence_window(),
            extraction: default_extraction_window(),
        }
    }
}

fn default_summary_window() -> usize {
    50
}

fn default_catchup_window() -> usize {
    300
}

fn default_observe_window() -> usize {
    30
}

fn default_silence_window() -> usize {
    50
}

fn default_extraction_window() -> usize {
    300
}

/// Clipping and anti-repeat limits used when rendering digests.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct RenderConfig {
    #[serde(default = "default_quote_max_chars")]
    pub quote_max_chars: usize,
    #[serde(default = "default_question_max_chars")]
    pub question_max_chars: usize,
    #[serde(default = "default_extract_max_chars")]
    pub extract_max_chars: usize,
    #[serde(default = "default_extract_max_items")]
    pub extract_max_items: usize,
    #[serde(default = "default_anti_repeat_attempts")]
    pub anti_repeat_attempts: usize,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            quote_max_chars: default_quote_max_chars(),
            question_max_chars: default_question_max_chars(),
            extract_max_chars: default_extract_max_chars(),
            extract_max_items: default_extract_max_items(),
            anti_repeat_attempts: default_anti_repeat_attempts(),
        }
    }
}

fn default_quote_max_chars() -> usize {
    120
}

fn default_question_max_chars() -> usize {
    140
}

fn default_extract_max_chars() -> usize {
    180
}

fn default_extract_max_items() -> usize {
    7
}

fn default_anti_repeat_attempts() -> usize {
    6
}

/// Masking applied to message text before it reaches a digest.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RedactionConfig {
    #[serde(default = "default_true")]
    pub mask_handles: bool,
    #[serde(default = "default_true")]
    pub mask_digit_runs: bool,
    #[serde(default = "default_link_marker")]
    pub link_marker: String,
    #[serde(default = "default_redaction_max_chars")]
    pub max_chars: usize,
}

impl Default for RedactionConfig {
    fn default() -> Self {
        Self {
            mask_handles: true,
            mask_digit_runs: true,
            link_marker: default_link_marker(),
            max_chars: default_redaction_max_chars(),
        }
    }
}

fn default_true() -> bool {
    true
}

/// Default marker substituted for URLs.
fn default_link_marker() -> String {
    "[link]".to_string()
}

fn default_redaction_max_chars() -> usize {
    500
}
