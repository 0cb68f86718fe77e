use crate::config::SocketConfig;
use std::time::Duration;

/// Exponential reconnect delay
///
/// Delays never decrease between resets and never exceed `max`.
#[derive(Debug, Clone)]
pub struct Backoff {
    initial: Duration,
    max: Duration,
    factor: f64,
    next: Duration,
}

impl Backoff {
    pub fn new(initial: Duration, max: Duration, factor: f64) -> Self {
        let initial = initial.min(max);
        Self {
            initial,
            max,
            factor: factor.max(1.0),
            next: initial,
        }
    }

    pub fn from_config(config: &SocketConfig) -> Self {
        Self::new(
            config.reconnect_delay,
            config.max_reconnect_delay,
            config.backoff_factor,
        )
    }

    /// Delay before the next attempt; advances the schedule
    pub fn next_delay(&mut self) -> Duration {
        let delay = self.next;
        let grown = (self.next.as_nanos() as f64 * self.factor).round() as u64;
        self.next = Duration::from_nanos(grown).min(self.max);
        delay
    }

    /// Back to the initial delay, after a successful connect
    pub fn reset(&mut self) {
        self.next = self.initial;
    }
}
