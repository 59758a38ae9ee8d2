/// Parse a boolean flag from a string value, or return the given default value otherwise.
pub fn parse_boolean_flag(value: Option<String>, default: bool) -> bool {
    let value = match value {
        Some(v) => v,
        None => return default,
    };
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => true,
        "0" | "false" | "no" | "off" => false,
        _ => default,
    }
}

/// Parse a comma-separated list of numeric ids, e.g. `SMSB_ADMIN_IDS=1001, 1002`.
///
/// Returns the entries that could not be parsed in the `Err` variant, so that the caller can log them.
pub fn parse_id_list(value: &str) -> Result<Vec<i64>, Vec<String>> {
    let mut ids = Vec::new();
    let mut invalid = Vec::new();
    for entry in value.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        match entry.parse::<i64>() {
            Ok(id) => ids.push(id),
            Err(_) => invalid.push(entry.to_string()),
        }
    }
    if invalid.is_empty() {
        Ok(ids)
    } else {
        Err(invalid)
    }
}
