//! Cache key derivation
//!
//! Keys are pure functions of their inputs. Filters are rendered as canonical
//! JSON (object keys sorted at every level) so that structurally equal filters
//! always share a cache entry, whatever order their keys were inserted in.

use serde_json::Value;

/// Cache key for a list request
pub fn list_key(doctype: &str, filters: Option<&Value>) -> String {
    match filters {
        Some(filters) => format!("{}-{}", doctype, canonical_json(filters)),
        None => doctype.to_string(),
    }
}

/// Cache key for a single document, `None` when there is nothing to fetch
pub fn doc_key(doctype: &str, name: Option<&str>) -> Option<String> {
    match name {
        Some(name) if !name.is_empty() => Some(format!("{}-{}", doctype, name)),
        _ => None,
    }
}

/// Serialize JSON with recursively sorted object keys
pub fn canonical_json(value: &Value) -> String {
    let mut out = String::new();
    write_canonical(value, &mut out);
    out
}

fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));

            out.push('{');
            for (i, (key, val)) in entries.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                out.push_str(&Value::String(key.clone()).to_string());
                out.push(':');
                write_canonical(val, out);
            }
            out.push('}');
        },
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        },
        scalar => out.push_str(&scalar.to_string()),
    }
}
