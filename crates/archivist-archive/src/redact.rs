//! Masking of message text before it is quoted in a digest.

use crate::error::ArchiveError;
use regex::Regex;

/// Marker appended to clipped text.
pub const ELLIPSIS: char = '…';

/// Text filter applied to every message before classification or quoting.
pub trait Redactor: Send + Sync {
    /// Return a masked copy of `text`.
    fn redact(&self, text: &str) -> String;
}

/// Policy for the default masking redactor.
#[derive(Debug, Clone, PartialEq)]
pub struct RedactionPolicy {
    /// Replace `@handle` mentions with `@…`.
    pub mask_handles: bool,
    /// Replace runs of seven or more digits with `…`.
    pub mask_digit_runs: bool,
    /// Marker substituted for URLs.
    pub link_marker: String,
    /// Maximum characters kept after masking.
    pub max_chars: usize,
}

impl Default for RedactionPolicy {
    /// Default redaction policy settings.
    fn default() -> Self {
        Self {
            mask_handles: true,
            mask_digit_runs: true,
            link_marker: "[link]".to_string(),
            max_chars: 500,
        }
    }
}

/// Regex-based redactor masking links, handles and long numbers.
#[derive(Debug, Clone)]
pub struct MaskingRedactor {
    policy: RedactionPolicy,
    link: Regex,
    handle: Regex,
    digits: Regex,
    whitespace: Regex,
}

impl MaskingRedactor {
    /// Compile the masking patterns for a policy.
    pub fn new(policy: RedactionPolicy) -> Result<Self, ArchiveError> {
        let compile =
            |pattern: &str| Regex::new(pattern).map_err(|err| ArchiveError::Regex(err.to_string()));
        Ok(Self {
            link: compile(r"(?i)https?://\S+")?,
            handle: compile(r"@\w+")?,
            digits: compile(r"\b\d{7,}\b")?,
            whitespace: compile(r"\s+")?,
            policy,
        })
    }

    /// Policy this redactor applies.
    pub fn policy(&self) -> &RedactionPolicy {
        &self.policy
    }
}

impl Redactor for MaskingRedactor {
    fn redact(&self, text: &str) -> String {
        let mut masked = self
            .link
            .replace_all(text, regex::NoExpand(&self.policy.link_marker))
            .into_owned();
        if self.policy.mask_handles {
            masked = self.handle.replace_all(&masked, "@…").into_owned();
        }
        if self.policy.mask_digit_runs {
            masked = self.digits.replace_all(&masked, "…").into_owned();
        }
        let collapsed = self.whitespace.replace_all(&masked, " ");
        clip_chars(collapsed.trim(), self.policy.max_chars)
    }
}

/// Clip text to at most `max_chars` characters, ending in `…` when clipped.
pub fn clip_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    if max_chars == 0 {
        return String::new();
    }
    let mut clipped: String = text.chars().take(max_chars - 1).collect();
    clipped.push(ELLIPSIS);
    clipped
}
