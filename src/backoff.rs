use rand::Rng;
use std::time::Duration;

/// Retry delay schedule for page fetches: doubling from `base_ms`, capped at
/// `max_ms`, plus a random extra of up to `jitter_percent` of that delay.
#[derive(Debug, Clone, Copy)]
pub struct ExponentialBackoff {
    base_ms: u64,
    max_ms: u64,
    jitter_percent: u64,
}

impl ExponentialBackoff {
    pub const fn new(base_ms: u64, max_ms: u64) -> Self {
        Self {
            base_ms,
            max_ms,
            jitter_percent: 10,
        }
    }

    /// Percentages above 100 are clamped.
    pub fn with_jitter(mut self, jitter_percent: u64) -> Self {
        self.jitter_percent = jitter_percent.min(100);
        self
    }

    /// Delay before retry number `attempt` (0 = first retry), without jitter.
    pub fn base_delay_ms(&self, attempt: u32) -> u64 {
        self.base_ms
            .saturating_mul(2u64.saturating_pow(attempt.min(20)))
            .min(self.max_ms)
    }

    /// Delay before retry number `attempt` (0 = first retry).
    pub fn delay(&self, attempt: u32) -> Duration {
        let base = self.base_delay_ms(attempt);
        let max_jitter = base.saturating_mul(self.jitter_percent) / 100;
        let jitter = if max_jitter > 0 {
            rand::thread_rng().gen_range(0..=max_jitter)
        } else {
            0
        };
        Duration::from_millis(base.saturating_add(jitter))
    }
}
