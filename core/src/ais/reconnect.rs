use std::time::Duration;

/// Client-side reconnect policy for the relay stream: a fixed delay, retried
/// forever.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectPolicy {
    delay: Duration,
}

impl ReconnectPolicy {
    pub const DEFAULT_DELAY: Duration = Duration::from_secs(5);

    pub fn fixed(delay: Duration) -> Self {
        Self { delay }
    }

    /// Delay before reconnect attempt `attempt`; independent of the attempt.
    pub fn delay_for(&self, _attempt: u32) -> Duration {
        self.delay
    }
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self::fixed(Self::DEFAULT_DELAY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_policy_waits_five_seconds_every_time() {
        let policy = ReconnectPolicy::default();
        assert_eq!(policy.delay_for(0), Duration::from_secs(5));
        assert_eq!(policy.delay_for(1_000), Duration::from_secs(5));
    }
}
