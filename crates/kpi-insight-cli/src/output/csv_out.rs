use serde_json::{Map, Value};
use std::io::{self, Write};

use super::{flatten, lookup, result_of, row_headers};

/// Keys whose array of records is the natural CSV body, in priority order.
const RECORD_KEYS: [&str; 2] = ["rows", "observations"];

/// Write output as CSV to stdout.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());
    if let Err(e) = write_csv(&mut wtr, value) {
        eprintln!("CSV output error: {}", e);
    }
    let _ = wtr.flush();
}

fn write_csv<W: Write>(wtr: &mut csv::Writer<W>, value: &Value) -> csv::Result<()> {
    match result_of(value) {
        Value::Object(map) => {
            let records = RECORD_KEYS
                .iter()
                .find_map(|k| map.get(*k).and_then(Value::as_array));
            match records {
                Some(rows) => write_records(wtr, rows),
                None => write_fields(wtr, map),
            }
        }
        Value::Array(arr) => write_records(wtr, arr),
        other => wtr.write_record([format_csv_value(other)]),
    }
}

fn write_fields<W: Write>(wtr: &mut csv::Writer<W>, map: &Map<String, Value>) -> csv::Result<()> {
    wtr.write_record(["field", "value"])?;
    let (fields, _) = flatten(map);
    for (key, val) in fields {
        wtr.write_record([key.as_str(), &format_csv_value(val)])?;
    }
    Ok(())
}

fn write_records<W: Write>(wtr: &mut csv::Writer<W>, arr: &[Value]) -> csv::Result<()> {
    if arr.is_empty() {
        return Ok(());
    }

    if !arr.iter().all(Value::is_object) {
        wtr.write_record(["value"])?;
        for item in arr {
            wtr.write_record([format_csv_value(item)])?;
        }
        return Ok(());
    }

    let headers = row_headers(arr);
    wtr.write_record(&headers)?;
    for item in arr {
        let row: Vec<String> = headers
            .iter()
            .map(|h| lookup(item, h).map(format_csv_value).unwrap_or_default())
            .collect();
        wtr.write_record(&row)?;
    }
    Ok(())
}

fn format_csv_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        Value::Array(arr) => arr.iter().map(format_csv_value).collect::<Vec<_>>().join("; "),
        Value::Object(_) => serde_json::to_string(value).unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn render(value: &Value) -> String {
        let mut buf = Vec::new();
        {
            let mut wtr = csv::Writer::from_writer(&mut buf);
            write_csv(&mut wtr, value).unwrap();
            wtr.flush().unwrap();
        }
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_analysis_rows_become_records() {
        let v = json!({
            "result": {
                "kpi_name": "Throughput",
                "rows": [
                    {"kpi_id": "K1", "achievement_pct": "110", "peer_ratings": {"peer": 4}},
                    {"kpi_id": "K2", "achievement_pct": null, "peer_ratings": {"peer": 5}}
                ]
            }
        });
        let out = render(&v);
        let mut lines = out.lines();
        assert_eq!(lines.next(), Some("kpi_id,achievement_pct,peer_ratings.peer"));
        assert_eq!(lines.next(), Some("K1,110,4"));
        assert_eq!(lines.next(), Some("K2,,5"));
    }

    #[test]
    fn test_scalar_result_as_field_value() {
        let v = json!({"peer_score": "13.33", "ratings": {"supervisor": 4}});
        let out = render(&v);
        assert!(out.starts_with("field,value\n"));
        assert!(out.contains("ratings.supervisor,4"));
    }

    #[test]
    fn test_plain_list() {
        let v = json!(["Finance", "Operations"]);
        assert_eq!(render(&v), "value\nFinance\nOperations\n");
    }
}
