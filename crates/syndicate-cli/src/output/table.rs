use serde_json::{Map, Value};
use tabled::{builder::Builder, Table};

/// Format output as tables using the tabled crate.
///
/// Scalar result fields go in a Field/Value table. Nested objects such as the
/// waterfall summary get their own table, arrays of objects (tiers, payout
/// records) are printed row per item, and a sensitivity matrix is laid out
/// with exit multiples down the side and hold periods across the top.
pub fn print_table(value: &Value) {
    match value {
        Value::Object(map) => {
            if let Some(result) = map.get("result") {
                print_result_table(result, map);
            } else {
                print_flat_object(map);
            }
        }
        Value::Array(arr) => print_array_table(arr),
        _ => println!("{}", value),
    }
}

fn print_result_table(result: &Value, envelope: &Map<String, Value>) {
    match result {
        Value::Object(res_map) => {
            if res_map.contains_key("matrix") {
                print_matrix(res_map);
            }

            let scalars: Map<String, Value> = res_map
                .iter()
                .filter(|(key, val)| !is_nested(val) && !is_axis(key))
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect();
            if !scalars.is_empty() {
                print_flat_object(&scalars);
            }

            for (key, val) in res_map {
                match val {
                    Value::Object(inner) => {
                        println!("\n{}:", heading(key));
                        print_flat_object(inner);
                    }
                    Value::Array(items) if key != "matrix" && items.iter().all(Value::is_object) => {
                        println!("\n{}:", heading(key));
                        print_array_table(items);
                    }
                    _ => {}
                }
            }
        }
        _ => print_flat_object(envelope),
    }

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

fn is_nested(value: &Value) -> bool {
    match value {
        Value::Object(_) => true,
        Value::Array(items) => items.iter().any(|v| v.is_object() || v.is_array()),
        _ => false,
    }
}

fn is_axis(key: &str) -> bool {
    matches!(key, "exit_multiple_values" | "hold_period_values")
}

fn heading(key: &str) -> String {
    let mut chars = key.replace('_', " ").chars().collect::<Vec<_>>();
    if let Some(first) = chars.first_mut() {
        *first = first.to_ascii_uppercase();
    }
    chars.into_iter().collect()
}

fn print_matrix(res_map: &Map<String, Value>) {
    let (Some(Value::Array(rows)), Some(Value::Array(exits)), Some(Value::Array(holds))) = (
        res_map.get("matrix"),
        res_map.get("exit_multiple_values"),
        res_map.get("hold_period_values"),
    ) else {
        return;
    };

    let mut builder = Builder::default();
    let mut header = vec!["Exit \\ Hold".to_string()];
    header.extend(holds.iter().map(format_value));
    builder.push_record(header);

    for (exit, row) in exits.iter().zip(rows) {
        let mut record = vec![format_value(exit)];
        if let Value::Array(cells) = row {
            record.extend(cells.iter().map(format_value));
        }
        builder.push_record(record);
    }

    println!("{}", Table::from(builder));
    println!();
}

fn print_flat_object(map: &Map<String, Value>) {
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    for (key, val) in map {
        builder.push_record([key.as_str(), &format_value(val)]);
    }
    println!("{}", Table::from(builder));
}

fn print_array_table(arr: &[Value]) {
    if arr.is_empty() {
        println!("(empty)");
        return;
    }

    if let Some(Value::Object(first)) = arr.first() {
        let headers: Vec<String> = first.keys().cloned().collect();
        let mut builder = Builder::default();
        builder.push_record(&headers);

        for item in arr {
            if let Value::Object(map) = item {
                let row: Vec<String> = headers
                    .iter()
                    .map(|h| map.get(h.as_str()).map(format_value).unwrap_or_default())
                    .collect();
                builder.push_record(row);
            }
        }

        println!("{}", Table::from(builder));
    } else {
        for item in arr {
            println!("{}", format_value(item));
        }
    }
}

fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        Value::Array(arr) => {
            let items: Vec<String> = arr.iter().map(format_value).collect();
            items.join(", ")
        }
        Value::Object(_) => serde_json::to_string(value).unwrap_or_default(),
    }
}
