//! Retry delay computation with optional jitter.

use crate::config::schema::BackoffKind;
use rand::Rng;
use std::time::Duration;

/// Calculate the delay before retry `attempt` (1-indexed).
///
/// Constant backoff always yields the base delay; exponential doubles it per
/// retry (`base × 2^(attempt-1)`). With jitter the result is drawn uniformly
/// from `[0, computed]` so concurrent callers do not retry in lockstep.
pub fn calculate_backoff(attempt: u32, base: Duration, kind: BackoffKind, jitter: bool) -> Duration {
    if attempt == 0 {
        return Duration::from_millis(0);
    }

    let base_ms = base.as_millis() as u64;
    let delay_ms = match kind {
        BackoffKind::Constant => base_ms,
        BackoffKind::Exponential => {
            let exponential_base = 2u64.saturating_pow(attempt - 1);
            base_ms.saturating_mul(exponential_base)
        }
    };

    if jitter && delay_ms > 0 {
        Duration::from_millis(rand::thread_rng().gen_range(0..=delay_ms))
    } else {
        Duration::from_millis(delay_ms)
    }
}
