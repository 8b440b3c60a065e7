//! Request and message types exchanged with the transport layer.

use crate::render::ViewKind;
use archivist_archive::{MessageRecord, is_command_text};

/// A message as delivered by the chat transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    pub conversation_id: String,
    /// Source-assigned timestamp in seconds.
    pub timestamp: i64,
    pub text: String,
    pub author_id: Option<String>,
    /// Command flag set by the transport; derived from the text when absent.
    pub is_command: Option<bool>,
}

impl InboundMessage {
    pub fn new(conversation_id: impl Into<String>, timestamp: i64, text: impl Into<String>) -> Self {
        Self {
            conversation_id: conversation_id.into(),
            timestamp,
            text: text.into(),
            author_id: None,
            is_command: None,
        }
    }

    pub fn with_author(mut self, author_id: impl Into<String>) -> Self {
        self.author_id = Some(author_id.into());
        self
    }

    pub fn with_command(mut self, is_command: bool) -> Self {
        self.is_command = Some(is_command);
        self
    }

    pub(crate) fn into_record(self) -> MessageRecord {
        let is_command = self
            .is_command
            .unwrap_or_else(|| is_command_text(&self.text));
        MessageRecord {
            conversation_id: self.conversation_id,
            timestamp: self.timestamp,
            text: self.text,
            author_id: self.author_id,
            is_command,
        }
    }
}

/// Digest operations a transport can ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DigestRequest {
    /// Incremental summary since the last summary.
    Summary,
    /// Digest since the later of the last restart and the last catch-up.
    Catchup,
    /// Read-only view over the most recent messages.
    View {
        kind: ViewKind,
        limit: Option<usize>,
    },
    LooseEnds,
    Decisions,
}

impl DigestRequest {
    pub fn name(&self) -> &'static str {
        match self {
            DigestRequest::Summary => "summary",
            DigestRequest::Catchup => "catchup",
            DigestRequest::View {
                kind: ViewKind::Observe,
                ..
            } => "observe",
            DigestRequest::View {
                kind: ViewKind::Silence,
                ..
            } => "silence",
            DigestRequest::LooseEnds => "loose_ends",
            DigestRequest::Decisions => "decisions",
        }
    }
}
