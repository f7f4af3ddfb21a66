use std::time::Duration;

use crate::config::CaptureSettings;

#[derive(Debug, Clone)]
pub struct RetryConfig {
    pub max_attempts: usize,
    pub base_backoff: Duration,
    pub max_backoff: Duration,
    pub jitter_max: Option<Duration>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_backoff: Duration::from_millis(20),
            max_backoff: Duration::from_millis(500),
            jitter_max: Some(Duration::from_millis(10)),
        }
    }
}

impl From<&CaptureSettings> for RetryConfig {
    fn from(settings: &CaptureSettings) -> Self {
        let base_backoff = Duration::from_millis(settings.regrade_retry_backoff_ms);
        Self {
            max_attempts: settings.regrade_retry_attempts.max(1),
            base_backoff,
            max_backoff: base_backoff * 16,
            jitter_max: Some(base_backoff / 2),
        }
    }
}

/// Runs `f` until it succeeds or `max_attempts` calls have failed, doubling
/// the backoff after each failure. Returns the last error.
pub async fn retry_async_with_config<F, Fut, T, E>(config: RetryConfig, mut f: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let mut attempt = 0;
    let mut backoff = config.base_backoff;

    loop {
        attempt += 1;
        match f().await {
            Ok(v) => return Ok(v),
            Err(e) if attempt >= config.max_attempts => return Err(e),
            Err(e) => {
                tracing::warn!(
                    "Attempt {}/{} failed: {}; retrying in {:?}",
                    attempt,
                    config.max_attempts,
                    e,
                    backoff
                );

                let jitter = match config.jitter_max {
                    Some(jitter_max) if !jitter_max.is_zero() => {
                        let jitter_ms = jitter_max.as_millis() as u64;
                        Duration::from_millis(rand::random::<u64>() % (jitter_ms + 1))
                    }
                    _ => Duration::ZERO,
                };
                tokio::time::sleep(backoff + jitter).await;

                backoff = std::cmp::min(backoff * 2, config.max_backoff);
            }
        }
    }
}
