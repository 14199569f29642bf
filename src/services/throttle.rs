//! In-memory login throttle.
//!
//! Failed attempts are counted per source over a rolling window; once the
//! limit is hit the source is locked out for a fixed period. State lives
//! in process memory, so a restart clears it. That matches a
//! single-instance deployment; there is no shared state between nodes.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::config::AuthThrottleConfig;

#[derive(Debug)]
struct SourceState {
    failures: Vec<Instant>,
    locked_until: Option<Instant>,
}

pub struct LoginThrottle {
    config: AuthThrottleConfig,
    sources: Mutex<HashMap<String, SourceState>>,
}

impl LoginThrottle {
    #[must_use]
    pub fn new(config: AuthThrottleConfig) -> Self {
        Self {
            config,
            sources: Mutex::new(HashMap::new()),
        }
    }

    /// Seconds until the source may attempt a login again, or `None`
    /// when the attempt is allowed.
    #[must_use]
    pub fn retry_after(&self, source: &str) -> Option<u64> {
        self.retry_after_at(source, Instant::now())
    }

    fn retry_after_at(&self, source: &str, now: Instant) -> Option<u64> {
        let mut sources = self.lock();
        let state = sources.get_mut(source)?;

        if let Some(until) = state.locked_until {
            if now < until {
                return Some(until.duration_since(now).as_secs().max(1));
            }
            state.locked_until = None;
            state.failures.clear();
        }

        let window = Duration::from_secs(self.config.window_seconds);
        state.failures.retain(|t| now.duration_since(*t) < window);

        None
    }

    /// Record a failed attempt, locking the source out when the window
    /// limit is reached.
    pub fn record_failure(&self, source: &str) {
        self.record_failure_at(source, Instant::now());
    }

    fn record_failure_at(&self, source: &str, now: Instant) {
        let mut sources = self.lock();
        let state = sources.entry(source.to_string()).or_insert(SourceState {
            failures: Vec::new(),
            locked_until: None,
        });

        let window = Duration::from_secs(self.config.window_seconds);
        state.failures.retain(|t| now.duration_since(*t) < window);
        state.failures.push(now);

        if state.failures.len() as u64 >= u64::from(self.config.max_attempts) {
            state.locked_until = Some(now + Duration::from_secs(self.config.lockout_seconds));
        }
    }

    /// A successful login clears the source's failure history.
    pub fn reset(&self, source: &str) {
        self.lock().remove(source);
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, SourceState>> {
        match self.sources.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn throttle() -> LoginThrottle {
        LoginThrottle::new(AuthThrottleConfig {
            max_attempts: 3,
            window_seconds: 60,
            lockout_seconds: 120,
        })
    }

    #[test]
    fn test_allows_until_limit() {
        let throttle = throttle();
        let now = Instant::now();

        assert_eq!(throttle.retry_after_at("1.2.3.4", now), None);
        throttle.record_failure_at("1.2.3.4", now);
        throttle.record_failure_at("1.2.3.4", now);
        assert_eq!(throttle.retry_after_at("1.2.3.4", now), None);

        throttle.record_failure_at("1.2.3.4", now);
        assert!(throttle.retry_after_at("1.2.3.4", now).is_some());
    }

    #[test]
    fn test_lockout_expires() {
        let throttle = throttle();
        let now = Instant::now();

        for _ in 0..3 {
            throttle.record_failure_at("1.2.3.4", now);
        }
        assert!(throttle.retry_after_at("1.2.3.4", now).is_some());

        let later = now + Duration::from_secs(121);
        assert_eq!(throttle.retry_after_at("1.2.3.4", later), None);
    }

    #[test]
    fn test_window_prunes_old_failures() {
        let throttle = throttle();
        let now = Instant::now();

        throttle.record_failure_at("1.2.3.4", now);
        throttle.record_failure_at("1.2.3.4", now);

        // Third failure lands after the first two aged out.
        let later = now + Duration::from_secs(61);
        throttle.record_failure_at("1.2.3.4", later);
        assert_eq!(throttle.retry_after_at("1.2.3.4", later), None);
    }

    #[test]
    fn test_sources_are_independent() {
        let throttle = throttle();
        let now = Instant::now();

        for _ in 0..3 {
            throttle.record_failure_at("1.2.3.4", now);
        }
        assert_eq!(throttle.retry_after_at("5.6.7.8", now), None);
    }

    #[test]
    fn test_reset_clears_history() {
        let throttle = throttle();
        let now = Instant::now();

        for _ in 0..3 {
            throttle.record_failure_at("1.2.3.4", now);
        }
        throttle.reset("1.2.3.4");
        assert_eq!(throttle.retry_after_at("1.2.3.4", now), None);
    }
}
