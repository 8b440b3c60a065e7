//! Shape checks for a single JSON5 layer before it is merged.
//!
//! Layers are partial, so every key is optional; only unknown keys and wrongly
//! typed values are rejected. Range checks happen on the merged config.

use crate::ConfigError;
use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy)]
enum Kind {
    Text,
    Flag,
    Count,
}

impl Kind {
    fn accepts(self, value: &Value) -> bool {
        match self {
            Kind::Text => value.is_string(),
            Kind::Flag => value.is_boolean(),
            Kind::Count => value.is_u64(),
        }
    }

    fn expected(self) -> &'static str {
        match self {
            Kind::Text => "expected string",
            Kind::Flag => "expected bool",
            Kind::Count => "expected non-negative integer",
        }
    }
}

type Block = (&'static str, &'static [(&'static str, Kind)]);

const BLOCKS: &[Block] = &[
    ("archive", &[("path", Kind::Text)]),
    ("state", &[("path", Kind::Text)]),
    (
        "windows",
        &[
            ("summary", Kind::Count),
            ("catchup", Kind::Count),
            ("observe", Kind::Count),
            ("silence", Kind::Count),
            ("extraction", Kind::Count),
        ],
    ),
    (
        "render",
        &[
            ("quote_max_chars", Kind::Count),
            ("question_max_chars", Kind::Count),
            ("extract_max_chars", Kind::Count),
            ("extract_max_items", Kind::Count),
            ("anti_repeat_attempts", Kind::Count),
        ],
    ),
    (
        "redaction",
        &[
            ("mask_handles", Kind::Flag),
            ("mask_digit_runs", Kind::Flag),
            ("link_marker", Kind::Text),
            ("max_chars", Kind::Count),
        ],
    ),
];

/// Check one layer. `layer` prefixes every reported field path.
pub(super) fn validate_layer_schema(value: &Value, layer: &str) -> Result<(), ConfigError> {
    let root = as_object(value, layer, "root")?;
    for (key, value) in root {
        if key == "$schema" {
            if !Kind::Text.accepts(value) {
                return Err(field_error(layer, key, Kind::Text.expected()));
            }
            continue;
        }
        let Some((_, fields)) = BLOCKS.iter().find(|(name, _)| *name == key.as_str()) else {
            return Err(field_error(layer, key, "unknown key"));
        };
        check_block(as_object(value, layer, key)?, fields, layer, key)?;
    }
    Ok(())
}

fn check_block(
    block: &Map<String, Value>,
    fields: &[(&str, Kind)],
    layer: &str,
    name: &str,
) -> Result<(), ConfigError> {
    for (key, value) in block {
        let path = format!("{name}.{key}");
        match fields.iter().find(|(field, _)| *field == key.as_str()) {
            None => return Err(field_error(layer, &path, "unknown key")),
            Some((_, kind)) if !kind.accepts(value) => {
                return Err(field_error(layer, &path, kind.expected()));
            }
            Some(_) => {}
        }
    }
    Ok(())
}

fn as_object<'a>(
    value: &'a Value,
    layer: &str,
    path: &str,
) -> Result<&'a Map<String, Value>, ConfigError> {
    value
        .as_object()
        .ok_or_else(|| field_error(layer, path, "expected object"))
}

fn field_error(layer: &str, path: &str, message: &str) -> ConfigError {
    ConfigError::InvalidField {
        path: format!("{layer}:{path}"),
        message: message.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::validate_layer_schema;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn partial_layers_pass() {
        let layer = json!({ "$schema": "x", "windows": { "observe": 5 } });
        assert!(validate_layer_schema(&layer, "cwd").is_ok());
    }

    #[test]
    fn reports_the_offending_field() {
        let layer = json!({ "render": { "quote_max_chars": -1 } });
        let err = validate_layer_schema(&layer, "user(u.json5)").unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid config at user(u.json5):render.quote_max_chars: expected non-negative integer"
        );
    }

    #[test]
    fn rejects_unknown_nested_key() {
        let layer = json!({ "state": { "path": "s.json", "ttl": 3 } });
        let err = validate_layer_schema(&layer, "cwd").unwrap_err();
        assert!(err.to_string().contains("state.ttl: unknown key"));
    }

    #[test]
    fn non_object_block_is_rejected() {
        let err = validate_layer_schema(&json!({ "archive": "chats" }), "cwd").unwrap_err();
        assert!(err.to_string().contains("cwd:archive: expected object"));
    }
}
