//! Epoch-millisecond time helpers.

use chrono::Utc;

/// Current wall-clock time in epoch milliseconds.
#[must_use]
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// Converts a server epoch-seconds timestamp to epoch milliseconds,
/// falling back to `received_at` when the server omitted it.
#[must_use]
pub fn server_time_to_millis(time: Option<i64>, received_at: i64) -> i64 {
    time.map_or(received_at, |secs| secs.saturating_mul(1000))
}
