use std::collections::HashMap;
use std::sync::Mutex;
use time::{OffsetDateTime, Duration};
use tracing::{warn, error};

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum RateLimitError {
    #[error("Rate limit exceeded. Please try again in {retry_in_minutes} minutes.")]
    Exceeded { retry_in_minutes: i64 },
    #[error("Internal rate limit error")]
    LockFailed,
}

#[derive(Debug)]
struct Window {
    attempts: u32,
    started: OffsetDateTime,
}

/// Fixed-window limiter keyed by caller.
#[derive(Debug)]
pub struct RateLimiter {
    windows: Mutex<HashMap<String, Window>>,
    max_attempts: u32,
    window: Duration,
}

impl RateLimiter {
    pub fn new(max_attempts: u32, window_minutes: i64) -> Self {
        Self {
            windows: Mutex::new(HashMap::new()),
            max_attempts,
            window: Duration::minutes(window_minutes),
        }
    }

    pub fn check_rate_limit(&self, key: &str) -> Result<(), RateLimitError> {
        self.check_at(key, OffsetDateTime::now_utc())
    }

    pub(crate) fn check_at(&self, key: &str, now: OffsetDateTime) -> Result<(), RateLimitError> {
        let mut windows = match self.windows.lock() {
            Ok(guard) => guard,
            Err(e) => {
                error!("Failed to acquire rate limit lock: {}", e);
                return Err(RateLimitError::LockFailed);
            }
        };

        windows.retain(|_, w| now - w.started <= self.window * 2);

        let window = windows.entry(key.to_string()).or_insert(Window { attempts: 0, started: now });
        if now - window.started > self.window {
            *window = Window { attempts: 0, started: now };
        }

        if window.attempts >= self.max_attempts {
            let retry_in_minutes = (window.started + self.window - now).whole_minutes().max(1);
            warn!("Rate limit triggered for key {}", key);
            return Err(RateLimitError::Exceeded { retry_in_minutes });
        }

        window.attempts += 1;
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn poison(&self) {
        let _ = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _windows = self.windows.lock();
            panic!("rate limit lock poisoned");
        }));
    }
}
