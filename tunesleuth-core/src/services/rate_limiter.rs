//! Minimum-interval rate limiter for outbound catalog queries

use crate::{Error, Result};
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

/// Enforces a floor interval between the starts of consecutive calls
///
/// The lock is held across the sleep, so concurrent callers sharing one
/// limiter are released one interval apart.
#[derive(Debug)]
pub struct RateLimiter {
    last_request: Mutex<Option<Instant>>,
    min_interval: Duration,
}

impl RateLimiter {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            last_request: Mutex::new(None),
            min_interval,
        }
    }

    /// Limiter allowing `calls_per_second` calls per second
    pub fn from_rate(calls_per_second: f64) -> Result<Self> {
        if !calls_per_second.is_finite() || calls_per_second <= 0.0 {
            return Err(Error::InvalidInput(format!(
                "rate must be a positive number of calls per second (got {})",
                calls_per_second
            )));
        }
        let min_interval = Duration::try_from_secs_f64(1.0 / calls_per_second).map_err(|_| {
            Error::InvalidInput(format!(
                "rate of {} calls per second gives an interval too long to wait",
                calls_per_second
            ))
        })?;
        Ok(Self::new(min_interval))
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Wait if necessary to comply with rate limit
    pub async fn wait(&self) {
        let mut last = self.last_request.lock().await;

        if let Some(last_time) = *last {
            let elapsed = last_time.elapsed();
            if elapsed < self.min_interval {
                let wait_time = self.min_interval - elapsed;
                tracing::debug!("Rate limiting: waiting {:?}", wait_time);
                tokio::time::sleep(wait_time).await;
            }
        }

        *last = Some(Instant::now());
    }
}
