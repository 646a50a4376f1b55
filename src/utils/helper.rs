use std::time::{SystemTime, UNIX_EPOCH};

/// Get current timestamp in milliseconds since epoch
pub fn current_timestamp_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

/// Human-readable UTC rendering of an epoch-millisecond timestamp.
pub fn format_timestamp_ms(ms: i64) -> String {
    chrono::DateTime::from_timestamp_millis(ms)
        .map(|t| t.format("%H:%M:%S, %B %e %Y UTC").to_string())
        .unwrap_or_else(|| ms.to_string())
}
