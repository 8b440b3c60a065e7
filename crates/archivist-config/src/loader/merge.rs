//! Overlaying one config layer onto the accumulated lower layers.

use serde_json::Value;

/// Objects merge key by key; any other overlay value replaces what was there.
pub(super) fn merge_json_values(base: &mut Value, overlay: &Value) {
    let (Value::Object(lower), Value::Object(upper)) = (&mut *base, overlay) else {
        *base = overlay.clone();
        return;
    };
    for (key, value) in upper {
        lower
            .entry(key.clone())
            .and_modify(|existing| merge_json_values(existing, value))
            .or_insert_with(|| value.clone());
    }
}
