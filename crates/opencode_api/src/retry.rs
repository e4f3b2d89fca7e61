use std::sync::OnceLock;
use std::time::Duration;

use regex::Regex;

/// Retries after the initial attempt. Commands are user intents, so the
/// budget is short: a stale retry is worth less than a dropped command once
/// the user has moved on.
pub const MAX_RETRIES: u32 = 3;
/// Delay before the first retry.
pub const BASE_DELAY_MS: u64 = 250;
/// Backoff ceiling. Anything longer belongs to the event-stream reconnect
/// path, not per-request retries.
pub const MAX_DELAY_MS: u64 = 2_000;

fn transient_error_regex() -> &'static Regex {
    static CACHED: OnceLock<Regex> = OnceLock::new();
    CACHED.get_or_init(|| {
        Regex::new(
            r"(?i)rate.?limit|overloaded|temporarily.?unavailable|connection.?refused|connection.?reset|stream.?closed",
        )
        .expect("transient error regex must compile")
    })
}

/// Statuses the session server emits for transient conditions.
pub fn is_retryable_status(status: u16) -> bool {
    matches!(status, 429 | 500 | 502 | 503 | 504)
}

/// Error-text fallback for failures that carry no usable status.
pub fn is_transient_error_text(error_text: &str) -> bool {
    transient_error_regex().is_match(error_text)
}

/// Exponential backoff clamped to [`MAX_DELAY_MS`].
pub fn retry_delay(attempt: u32) -> Duration {
    let multiplier = 2u64.saturating_pow(attempt.min(16));
    Duration::from_millis(BASE_DELAY_MS.saturating_mul(multiplier).min(MAX_DELAY_MS))
}
