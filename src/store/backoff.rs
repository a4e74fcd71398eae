use rand::Rng;
use tokio::time::Duration;

/// ConnectBackoff computes the delay between rounds of connection attempts. It grows the base
/// delay geometrically up to a cap, then spreads it by a random jitter factor so that many
/// clients started at once don't reconnect in lock step.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct ConnectBackoff {
    pub(crate) base_delay: Duration,
    pub(crate) multiplier: f64,
    pub(crate) jitter: f64,
    pub(crate) max_delay: Duration,
}

impl ConnectBackoff {
    /// Delay before the next round, given how many rounds have already failed.
    pub(crate) fn delay(&self, retries: u32) -> Duration {
        let unit_jitter = rand::thread_rng().gen_range(-1.0..=1.0);
        self.delay_with_jitter(retries, unit_jitter)
    }

    /// `unit_jitter` is in [-1, 1].
    fn delay_with_jitter(&self, retries: u32, unit_jitter: f64) -> Duration {
        if retries == 0 {
            return self.base_delay;
        }

        let max = self.max_delay.as_secs_f64();
        let mut backoff = self.base_delay.as_secs_f64();
        let mut remaining = retries;
        while backoff < max && remaining > 0 {
            backoff *= self.multiplier;
            remaining -= 1;
        }
        if backoff > max {
            backoff = max;
        }

        backoff *= 1.0 + self.jitter * unit_jitter;
        if backoff < 0.0 {
            return Duration::from_secs(0);
        }

        Duration::from_secs_f64(backoff)
    }
}
