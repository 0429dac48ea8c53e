use chrono::{DateTime, Utc};
use std::time::Duration;

/// Decides when an in-progress game has run out of time. The engine never polls this
/// itself; a caller finds games created before the cutoff and reports the expiry
/// through `Game::time_out`.
#[derive(Debug, Clone)]
pub struct TimeoutPolicy {
    pub time_limit: Duration,
}

impl Default for TimeoutPolicy {
    fn default() -> Self {
        Self {
            time_limit: Duration::from_secs(35 * 60), // 35 minutes
        }
    }
}

impl TimeoutPolicy {
    pub fn new(time_limit: Duration) -> Self {
        Self { time_limit }
    }

    /// Games created before this instant are overdue at `now`.
    pub fn cutoff(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let limit = chrono::Duration::from_std(self.time_limit).unwrap_or(chrono::Duration::MAX);
        now.checked_sub_signed(limit).unwrap_or(DateTime::<Utc>::MIN_UTC)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_configuration() {
        let policy = TimeoutPolicy::default();
        assert_eq!(policy.time_limit, Duration::from_secs(2100));
    }

    #[test]
    fn test_cutoff() {
        let policy = TimeoutPolicy::new(Duration::from_secs(60));
        let now = Utc::now();
        assert_eq!(policy.cutoff(now), now - chrono::Duration::seconds(60));

        let instant = TimeoutPolicy::new(Duration::ZERO);
        assert_eq!(instant.cutoff(now), now);
    }

    #[test]
    fn test_huge_limit_saturates() {
        let policy = TimeoutPolicy::new(Duration::from_secs(u64::MAX));
        assert_eq!(policy.cutoff(Utc::now()), DateTime::<Utc>::MIN_UTC);
    }
}
