//! Retry backoff policy.
//!
//! Delay before attempt N (1-based): 1, 5, 15, 60 minutes, then 60 minutes
//! for every further attempt up to the ceiling. The ceiling itself lives on
//! the record (`maxAttempts`, default 5); an unreachable sink surfaces as a
//! dead-lettered record rather than retrying forever.

use chrono::Duration;

/// Minutes of delay indexed by `min(attempt - 1, 3)`.
pub const RETRY_DELAYS_MINUTES: [i64; 4] = [1, 5, 15, 60];

/// Delay to wait before delivery attempt `attempt` (1-based).
pub fn delay_before_attempt(attempt: u32) -> Duration {
    let index = (attempt.saturating_sub(1) as usize).min(RETRY_DELAYS_MINUTES.len() - 1);
    Duration::minutes(RETRY_DELAYS_MINUTES[index])
}

/// The epoch-millis instant at which attempt `attempt` becomes eligible.
pub fn next_attempt_at(attempt: u32, now_ms: i64) -> i64 {
    now_ms + delay_before_attempt(attempt).num_milliseconds()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schedule_matches_policy() {
        assert_eq!(delay_before_attempt(1), Duration::minutes(1));
        assert_eq!(delay_before_attempt(2), Duration::minutes(5));
        assert_eq!(delay_before_attempt(3), Duration::minutes(15));
        assert_eq!(delay_before_attempt(4), Duration::minutes(60));
        assert_eq!(delay_before_attempt(5), Duration::minutes(60));
        assert_eq!(delay_before_attempt(100), Duration::minutes(60));
    }

    #[test]
    fn delays_never_decrease() {
        let mut previous = Duration::zero();
        for attempt in 1..=10 {
            let delay = delay_before_attempt(attempt);
            assert!(delay >= previous);
            previous = delay;
        }
    }

    #[test]
    fn next_attempt_is_offset_from_now() {
        assert_eq!(next_attempt_at(1, 1_000), 1_000 + 60_000);
        assert_eq!(next_attempt_at(4, 0), 3_600_000);
    }
}
