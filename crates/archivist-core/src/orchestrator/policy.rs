//! Config to runtime policy mapping.

use archivist_archive::RedactionPolicy;
use archivist_config::RedactionConfig;

/// Translate redaction config into the masking redactor's policy.
pub(crate) fn redaction_policy_from_config(config: &RedactionConfig) -> RedactionPolicy {
    RedactionPolicy {
        mask_handles: config.mask_handles,
        mask_digit_runs: config.mask_digit_runs,
        link_marker: config.link_marker.clone(),
        max_chars: config.max_chars,
    }
}
