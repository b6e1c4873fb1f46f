//! Flatten nested YAML data into dotted/bracketed keys.
//!
//! `{a: {b: 1}, l: [x, {y: 2}]}` becomes `a.b = 1`, `l[0] = x`, `l[1].y = 2`.
//! Only scalar leaves produce entries.

use serde_yaml::Value;
use std::collections::BTreeMap;

/// Flat key space consumed by template lookups.
pub type FlatMap = BTreeMap<String, String>;

pub fn flatten(value: &Value) -> FlatMap {
    let mut out = FlatMap::new();
    flatten_into("", value, &mut out);
    out
}

fn flatten_into(prefix: &str, value: &Value, out: &mut FlatMap) {
    match value {
        Value::Mapping(map) => {
            for (k, v) in map {
                let key = scalar_text(k);
                let full = if prefix.is_empty() {
                    key
                } else {
                    format!("{prefix}.{key}")
                };
                flatten_into(&full, v, out);
            }
        }
        Value::Sequence(seq) => {
            for (i, v) in seq.iter().enumerate() {
                flatten_into(&format!("{prefix}[{i}]"), v, out);
            }
        }
        Value::Tagged(tagged) => flatten_into(prefix, &tagged.value, out),
        scalar => {
            if !prefix.is_empty() {
                out.insert(prefix.to_owned(), scalar_text(scalar));
            }
        }
    }
}

/// Renders a scalar the way templates print it. Null renders empty.
pub fn scalar_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        other => serde_yaml::to_string(other)
            .map(|s| s.trim_end().to_owned())
            .unwrap_or_default(),
    }
}
