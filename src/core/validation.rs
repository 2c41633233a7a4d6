//! Validation utilities for CLI arguments and configuration values

use std::time::Duration;

/// Parse a strictly positive number of seconds
pub fn validate_positive_secs(value: &str) -> Result<Duration, String> {
    match value.trim().parse::<u64>() {
        Ok(0) => Err("Value must be greater than 0".to_string()),
        Ok(n) => Ok(Duration::from_secs(n)),
        Err(_) => Err(format!("'{}' is not a valid number of seconds", value)),
    }
}

/// Parse a `name=value` runtime parameter override
///
/// The value is read as JSON when it parses as JSON (`true`, `42`,
/// `["a"]`), otherwise it is kept as a plain string.
pub fn parse_key_value(arg: &str) -> Result<(String, serde_json::Value), String> {
    let (name, raw) = arg
        .split_once('=')
        .ok_or_else(|| format!("Invalid parameter '{}'. Use name=value.", arg))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("Parameter name cannot be empty in '{}'", arg));
    }
    let value = serde_json::from_str(raw).unwrap_or_else(|_| serde_json::Value::from(raw));
    Ok((name.to_string(), value))
}

/// Check that a URL has an HTTP(S) scheme
pub fn is_http_url(url: &str) -> bool {
    let lower = url.trim_start().to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}
