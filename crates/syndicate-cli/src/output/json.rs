use serde_json::Value;

/// Pretty-print the full computation envelope as JSON to stdout.
/// Money values keep their string form so cents are never lost to floats.
pub fn print_json(value: &Value) {
    match serde_json::to_string_pretty(value) {
        Ok(s) => println!("{}", s),
        Err(e) => log::error!("failed to serialize output: {}", e),
    }
}
