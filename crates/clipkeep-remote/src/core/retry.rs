use std::time::Duration;

/// Delay before a retry attempt using exponential backoff: `base * 2^retry_count`.
///
/// `retry_count` is 0-indexed (0 = first retry).
///
/// ```
/// use std::time::Duration;
/// use clipkeep_remote::retry_delay;
///
/// assert_eq!(retry_delay(0, Duration::from_millis(500)), Duration::from_millis(500));
/// assert_eq!(retry_delay(2, Duration::from_millis(500)), Duration::from_secs(2));
/// ```
pub fn retry_delay(retry_count: u32, base: Duration) -> Duration {
    let multiplier = 2_u32.saturating_pow(retry_count);
    base.saturating_mul(multiplier)
}
