//! Verbatim extraction of loose ends and decisions.

use crate::classify::pattern_set;
use crate::classify::tables::{DECISION_EXTRACT_PATTERNS, LOOSE_END_PATTERNS};
use crate::error::DigestError;
use crate::render::HEADER;
use archivist_archive::clip_chars;
use archivist_config::RenderConfig;
use regex::RegexSet;
use std::collections::HashSet;

/// What an extraction digest looks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionKind {
    LooseEnds,
    Decisions,
}

/// Pattern-hit extractor over redacted texts.
#[derive(Debug, Clone)]
pub struct Extractor {
    loose_ends: RegexSet,
    decisions: RegexSet,
    max_chars: usize,
    max_items: usize,
}

impl Extractor {
    pub fn new(config: &RenderConfig) -> Result<Self, DigestError> {
        Ok(Self {
            loose_ends: pattern_set(LOOSE_END_PATTERNS)?,
            decisions: pattern_set(DECISION_EXTRACT_PATTERNS)?,
            max_chars: config.extract_max_chars,
            max_items: config.extract_max_items,
        })
    }

    /// Matching texts, clipped, deduplicated case-insensitively in first-seen
    /// order and capped.
    pub fn extract(&self, texts: &[String], kind: ExtractionKind) -> Vec<String> {
        let patterns = match kind {
            ExtractionKind::LooseEnds => &self.loose_ends,
            ExtractionKind::Decisions => &self.decisions,
        };
        let mut seen = HashSet::new();
        texts
            .iter()
            .map(|text| text.trim())
            .filter(|text| !text.is_empty() && patterns.is_match(text))
            .map(|text| clip_chars(text, self.max_chars))
            .filter(|item| seen.insert(item.to_lowercase()))
            .take(self.max_items)
            .collect()
    }

    /// Render an extraction digest for `texts`.
    pub fn render(&self, texts: &[String], kind: ExtractionKind) -> String {
        let items = self.extract(texts, kind);
        let (heading, closing, no_hits) = match kind {
            ExtractionKind::LooseEnds => (
                "- Loose ends detected:",
                "- Ownership remained interpretive.",
                ["- Loose ends were referenced.", "- None successfully attached."],
            ),
            ExtractionKind::Decisions => (
                "- Decisions recorded:",
                "- Documentation thanks you for your cooperation.",
                ["- Decisions were discussed.", "- They did not attach."],
            ),
        };
        let mut lines = vec![HEADER.to_string()];
        if items.is_empty() {
            lines.extend(no_hits.iter().map(|line| line.to_string()));
            return lines.join("\n");
        }
        lines.push(heading.to_string());
        lines.extend(items.iter().map(|item| format!("- \"{item}\"")));
        lines.push(closing.to_string());
        lines.join("\n")
    }
}
