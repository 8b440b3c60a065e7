//! Message record model stored by archives.

use serde::{Deserialize, Serialize};

/// Sigil that marks a message as a bot command.
pub const COMMAND_SIGIL: char = '/';

/// One archived utterance.
///
/// The conversation id is not part of the stored line; it names the log the
/// line lives in and is restored when records are read back.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MessageRecord {
    /// Conversation the record belongs to.
    #[serde(skip)]
    pub conversation_id: String,
    /// Source-assigned timestamp in seconds.
    pub timestamp: i64,
    /// Raw message text.
    pub text: String,
    /// Opaque author identifier, never used for attribution.
    #[serde(default)]
    pub author_id: Option<String>,
    /// Whether the text starts with the command sigil.
    #[serde(default)]
    pub is_command: bool,
}

impl MessageRecord {
    /// Build a record, deriving `is_command` from the text.
    pub fn new(conversation_id: impl Into<String>, timestamp: i64, text: impl Into<String>) -> Self {
        let text = text.into();
        let is_command = is_command_text(&text);
        Self {
            conversation_id: conversation_id.into(),
            timestamp,
            text,
            author_id: None,
            is_command,
        }
    }

    /// Attach an author identifier.
    pub fn with_author(mut self, author_id: impl Into<String>) -> Self {
        self.author_id = Some(author_id.into());
        self
    }
}

/// Whether a message text is a command (starts with `/` after whitespace).
pub fn is_command_text(text: &str) -> bool {
    text.trim_start().starts_with(COMMAND_SIGIL)
}
