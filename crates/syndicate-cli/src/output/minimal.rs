use serde_json::Value;

/// Print just the headline number from the output.
///
/// Looks for well-known fields in the result and then in a nested
/// `summary`, falling back to the first result field.
pub fn print_minimal(value: &Value) {
    let result_obj = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    let priority_keys = [
        "lp_irr",
        "base_case_value",
        "total_distributed",
        "gp_irr",
        "lp_multiple",
    ];

    if let Value::Object(map) = result_obj {
        let summary = map.get("summary").and_then(Value::as_object);
        for key in &priority_keys {
            let found = map
                .get(*key)
                .or_else(|| summary.and_then(|s| s.get(*key)));
            if let Some(val) = found {
                if !val.is_null() {
                    println!("{}", format_minimal(val));
                    return;
                }
            }
        }

        if let Some((key, val)) = map.iter().next() {
            println!("{}: {}", key, format_minimal(val));
            return;
        }
    }

    println!("{}", format_minimal(result_obj));
}

fn format_minimal(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}
