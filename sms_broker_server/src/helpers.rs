use sms_broker_engine::db_types::OrderCode;

/// Order codes start with `#`, which cannot appear unescaped in a URL path. Accept them with or without it.
pub fn normalize_order_code(code: String) -> OrderCode {
    let code = code.trim();
    if code.starts_with('#') {
        OrderCode::from(code)
    } else {
        OrderCode::from(format!("#{code}"))
    }
}
