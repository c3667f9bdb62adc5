use serde_json::{Map, Value};

/// Trim leading and trailing whitespace from every string, recursively.
pub fn trim_strings(value: Value) -> Value {
    map_strings(value, &|s| s.trim().to_string())
}

/// Trim only trailing whitespace (fixed-width CHAR columns pad on the right).
pub fn rtrim_strings(value: Value) -> Value {
    map_strings(value, &|s| s.trim_end().to_string())
}

fn map_strings(value: Value, f: &dyn Fn(&str) -> String) -> Value {
    match value {
        Value::String(s) => Value::String(f(&s)),
        Value::Array(items) => Value::Array(items.into_iter().map(|v| map_strings(v, f)).collect()),
        Value::Object(obj) => Value::Object(obj.into_iter().map(|(k, v)| (k, map_strings(v, f))).collect()),
        other => other,
    }
}

/// Lower-case the keys of a row object; other values pass through.
pub fn lowercase_keys(row: Value) -> Value {
    match row {
        Value::Object(obj) => {
            let lowered: Map<String, Value> = obj.into_iter().map(|(k, v)| (k.to_lowercase(), v)).collect();
            Value::Object(lowered)
        }
        other => other,
    }
}
