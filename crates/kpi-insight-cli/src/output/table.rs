use serde_json::{Map, Value};
use tabled::{builder::Builder, Table};

use super::{flatten, lookup, row_headers};

/// Format output as tables using the tabled crate.
///
/// Scalar fields go into one field/value table. Each array of objects
/// (analysis rows, group observations, chart series) gets its own table.
pub fn print_table(value: &Value) {
    match value {
        Value::Object(map) => match map.get("result") {
            Some(Value::Object(result)) => print_result_table(result, map),
            _ => print_object(map),
        },
        Value::Array(arr) => print_rows(arr),
        _ => println!("{}", value),
    }
}

fn print_result_table(result: &Map<String, Value>, envelope: &Map<String, Value>) {
    print_object(result);

    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings {
                if let Value::String(s) = w {
                    println!("  - {}", s);
                }
            }
        }
    }

    if let Some(Value::String(meth)) = envelope.get("methodology") {
        println!("\nMethodology: {}", meth);
    }
}

fn print_object(map: &Map<String, Value>) {
    let (fields, tables) = flatten(map);

    if !fields.is_empty() {
        let mut builder = Builder::default();
        builder.push_record(["Field", "Value"]);
        for (key, val) in &fields {
            builder.push_record([key.as_str(), &format_value(val)]);
        }
        println!("{}", Table::from(builder));
    }

    for (name, rows) in tables {
        println!("\n{}:", name);
        print_rows(rows);
    }
}

fn print_rows(arr: &[Value]) {
    if arr.is_empty() {
        println!("(empty)");
        return;
    }

    if !arr.iter().all(Value::is_object) {
        for item in arr {
            println!("{}", format_value(item));
        }
        return;
    }

    let headers = row_headers(arr);
    let mut builder = Builder::default();
    builder.push_record(&headers);
    for item in arr {
        let row: Vec<String> = headers
            .iter()
            .map(|h| lookup(item, h).map(format_value).unwrap_or_default())
            .collect();
        builder.push_record(row);
    }
    println!("{}", Table::from(builder));
}

fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "-".to_string(),
        Value::Array(arr) => {
            let items: Vec<String> = arr.iter().map(format_value).collect();
            items.join("; ")
        }
        Value::Object(_) => serde_json::to_string(value).unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_format_value_missing_and_lists() {
        assert_eq!(format_value(&Value::Null), "-");
        assert_eq!(format_value(&json!(["a", "b"])), "a; b");
        assert_eq!(format_value(&json!("13.33")), "13.33");
    }
}
