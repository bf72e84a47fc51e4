use serde_json::Value;

use super::{lookup, result_of};

/// Headline fields, most specific first. Paths are dotted.
const PRIORITY_PATHS: [&str; 8] = [
    "peer_score",
    "achievement_pct",
    "summary.total_weighted_score",
    "fit.slope",
    "positions",
    "kpis",
    "kpi_name",
    "performance",
];

/// Print just the key answer value from the output.
///
/// Looks for well-known result fields in order of priority, then falls
/// back to the first field in the result object.
pub fn print_minimal(value: &Value) {
    println!("{}", minimal_line(value));
}

fn minimal_line(value: &Value) -> String {
    let result = result_of(value);

    if let Value::Object(map) = result {
        for path in PRIORITY_PATHS {
            if let Some(val) = lookup(result, path) {
                if !val.is_null() {
                    return format_minimal(val);
                }
            }
        }
        if let Some((key, val)) = map.iter().next() {
            return format!("{}: {}", key, format_minimal(val));
        }
    }

    format_minimal(result)
}

fn format_minimal(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        Value::Array(arr) if arr.iter().all(|v| !v.is_object() && !v.is_array()) => arr
            .iter()
            .map(format_minimal)
            .collect::<Vec<_>>()
            .join("\n"),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}
