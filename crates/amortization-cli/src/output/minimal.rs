use serde_json::Value;

/// Fields printed by `--output minimal`, in priority order.
const PRIORITY_KEYS: [&str; 2] = ["periodic_payment", "remaining_balance"];

/// Print just the key answer value from the output.
///
/// Looks for well-known fields in the result (and in a nested schedule
/// summary), then falls back to the first field of the result object.
pub fn print_minimal(value: &Value) {
    println!("{}", minimal_answer(value));
}

fn minimal_answer(value: &Value) -> String {
    let result_obj = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    let candidates = [Some(result_obj), result_obj.get("summary")];
    for map in candidates.into_iter().flatten().filter_map(Value::as_object) {
        for key in PRIORITY_KEYS {
            if let Some(val) = map.get(key).filter(|v| !v.is_null()) {
                return format_minimal(val);
            }
        }
    }

    if let Some((key, val)) = result_obj.as_object().and_then(|m| m.iter().next()) {
        return format!("{}: {}", key, format_minimal(val));
    }

    format_minimal(result_obj)
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
