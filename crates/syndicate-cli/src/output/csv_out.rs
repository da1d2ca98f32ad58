use serde_json::{Map, Value};
use std::io;

type StdoutWriter<'a> = csv::Writer<io::StdoutLock<'a>>;

/// Write output as CSV to stdout.
///
/// Waterfall tiers and payout records become one row each. A sensitivity
/// grid is written with the exit multiple in the first column. Anything
/// else falls back to two-column field,value rows.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());

    match value {
        Value::Object(map) => match map.get("result") {
            Some(Value::Object(result)) => write_result_csv(&mut wtr, result),
            _ => write_fields_csv(&mut wtr, map),
        },
        Value::Array(arr) => write_array_csv(&mut wtr, arr),
        _ => {
            let _ = wtr.write_record([&format_csv_value(value)]);
        }
    }

    let _ = wtr.flush();
}

fn write_result_csv(wtr: &mut StdoutWriter<'_>, result: &Map<String, Value>) {
    if let Some(Value::Array(rows)) = result.get("matrix") {
        write_matrix_csv(wtr, result, rows);
        return;
    }

    for key in ["tiers", "records"] {
        if let Some(Value::Array(items)) = result.get(key) {
            write_array_csv(wtr, items);
            return;
        }
    }

    write_fields_csv(wtr, result);
}

fn write_matrix_csv(wtr: &mut StdoutWriter<'_>, result: &Map<String, Value>, rows: &[Value]) {
    let empty = Vec::new();
    let exits = match result.get("exit_multiple_values") {
        Some(Value::Array(v)) => v,
        _ => &empty,
    };
    let holds = match result.get("hold_period_values") {
        Some(Value::Array(v)) => v,
        _ => &empty,
    };

    let mut header = vec!["exit_multiple".to_string()];
    header.extend(holds.iter().map(format_csv_value));
    let _ = wtr.write_record(&header);

    for (exit, row) in exits.iter().zip(rows) {
        let mut record = vec![format_csv_value(exit)];
        if let Value::Array(cells) = row {
            record.extend(cells.iter().map(format_csv_value));
        }
        let _ = wtr.write_record(&record);
    }
}

fn write_fields_csv(wtr: &mut StdoutWriter<'_>, map: &Map<String, Value>) {
    let _ = wtr.write_record(["field", "value"]);
    for (key, val) in map {
        let _ = wtr.write_record([key.as_str(), &format_csv_value(val)]);
    }
}

fn write_array_csv(wtr: &mut StdoutWriter<'_>, arr: &[Value]) {
    if arr.is_empty() {
        return;
    }

    if let Some(Value::Object(first)) = arr.first() {
        let headers: Vec<&str> = first.keys().map(|k| k.as_str()).collect();
        let _ = wtr.write_record(&headers);

        for item in arr {
            if let Value::Object(map) = item {
                let row: Vec<String> = headers
                    .iter()
                    .map(|h| map.get(*h).map(format_csv_value).unwrap_or_default())
                    .collect();
                let _ = wtr.write_record(&row);
            }
        }
    } else {
        for item in arr {
            let _ = wtr.write_record([&format_csv_value(item)]);
        }
    }
}

fn format_csv_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}
