use chrono::Utc;

pub fn now_timestamp_ms() -> i64 {
    Utc::now().timestamp_millis()
}

pub fn how_many_seconds_ago(past_timestamp_ms: i64) -> i64 {
    // How many seconds ago was the event described by `past_timestamp_ms` ?
    (now_timestamp_ms() - past_timestamp_ms) / 1000
}

/// RFC 3339 timestamp used to stamp run reports.
pub fn now_rfc3339() -> String {
    Utc::now().to_rfc3339()
}
