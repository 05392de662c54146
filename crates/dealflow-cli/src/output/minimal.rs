use serde_json::Value;

/// Print just the key answer value from the output.
///
/// Looks for the headline field of each command in order of priority,
/// then falls back to the first field in the result object.
pub fn print_minimal(value: &Value) {
    // Try to extract the "result" envelope
    let result_obj = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    // Headline output of each command, most specific first
    let priority_keys = [
        "irr",
        "moic",
        "score",
        "matched",
        "accepted_count",
        "count",
        "base_case_value",
    ];

    if let Value::Object(map) = result_obj {
        // Try priority keys first (skip null and nested values)
        for key in &priority_keys {
            if let Some(val) = map.get(*key) {
                if !val.is_null() && !val.is_object() {
                    println!("{}", format_minimal(val));
                    return;
                }
            }
        }

        // Monte Carlo: median IRR
        if let Some(median) = map.get("irr").and_then(|irr| irr.get("median")) {
            println!("{}", format_minimal(median));
            return;
        }

        // Fall back to first field
        if let Some((key, val)) = map.iter().next() {
            println!("{}: {}", key, format_minimal(val));
            return;
        }
    }

    // Not an object, just print directly
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
