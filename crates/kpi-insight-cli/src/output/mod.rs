pub mod csv_out;
pub mod json;
pub mod minimal;
pub mod table;

use crate::OutputFormat;
use serde_json::{Map, Value};

/// Dispatch output to the appropriate formatter.
pub fn format_output(format: &OutputFormat, value: &Value) {
    match format {
        OutputFormat::Json => json::print_json(value),
        OutputFormat::Table => table::print_table(value),
        OutputFormat::Csv => csv_out::print_csv(value),
        OutputFormat::Minimal => minimal::print_minimal(value),
    }
}

/// Unwrap the `result` envelope produced by core computations.
pub fn result_of(value: &Value) -> &Value {
    value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value)
}

/// Flatten an object into dotted `(key, value)` pairs.
///
/// Arrays of objects are returned separately as `(path, rows)` so the
/// caller can render them as their own table.
pub fn flatten<'a>(
    map: &'a Map<String, Value>,
) -> (Vec<(String, &'a Value)>, Vec<(String, &'a [Value])>) {
    let mut fields = Vec::new();
    let mut tables = Vec::new();
    flatten_into("", map, &mut fields, &mut tables);
    (fields, tables)
}

fn flatten_into<'a>(
    prefix: &str,
    map: &'a Map<String, Value>,
    fields: &mut Vec<(String, &'a Value)>,
    tables: &mut Vec<(String, &'a [Value])>,
) {
    for (key, val) in map {
        let path = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{}.{}", prefix, key)
        };
        match val {
            Value::Object(inner) => flatten_into(&path, inner, fields, tables),
            Value::Array(items) if items.first().is_some_and(Value::is_object) => {
                tables.push((path, items.as_slice()))
            }
            _ => fields.push((path, val)),
        }
    }
}

/// Column headers for an array of objects: flattened keys in first-seen order.
pub fn row_headers(rows: &[Value]) -> Vec<String> {
    let mut headers: Vec<String> = Vec::new();
    for row in rows {
        if let Value::Object(map) = row {
            let (fields, _) = flatten(map);
            for (key, _) in fields {
                if !headers.contains(&key) {
                    headers.push(key);
                }
            }
        }
    }
    headers
}

/// Look up a dotted path in a JSON value.
pub fn lookup<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(value, |v, key| v.get(key))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_flatten_nested_and_tables() {
        let v = json!({
            "kpi_name": "Throughput",
            "summary": {"rows": 2, "on_track": 1},
            "rows": [{"kpi_id": "K1", "peer_ratings": {"peer": 4}}],
            "positions": ["A", "B"]
        });
        let (fields, tables) = flatten(v.as_object().unwrap());
        let keys: Vec<&str> = fields.iter().map(|(k, _)| k.as_str()).collect();
        assert!(keys.contains(&"summary.rows"));
        assert!(keys.contains(&"positions"));
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].0, "rows");
        assert_eq!(
            row_headers(tables[0].1),
            vec!["kpi_id".to_string(), "peer_ratings.peer".to_string()]
        );
    }

    #[test]
    fn test_lookup_dotted_path() {
        let v = json!({"result": {"fit": {"slope": "0.7"}}});
        assert_eq!(lookup(result_of(&v), "fit.slope"), Some(&json!("0.7")));
        assert_eq!(lookup(&v, "fit.missing"), None);
    }
}
