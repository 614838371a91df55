/// 指数バックオフ + Full Jitter による再試行。
///
/// カタログAPIはレート制限（429）を返すことがあるため、一時的な失敗のみ再試行する。
use std::{future::Future, time::Duration};

use rand::Rng;
use tracing::warn;

/// 再試行戦略の設定。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryConfig {
    /// 最大試行回数（初回を含む）
    pub max_attempts: usize,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 250,
            max_delay_ms: 4000,
        }
    }
}

impl RetryConfig {
    #[must_use]
    pub const fn new(max_attempts: usize, base_delay_ms: u64, max_delay_ms: u64) -> Self {
        Self {
            max_attempts,
            base_delay_ms,
            max_delay_ms,
        }
    }

    /// 再試行を行わない設定。
    #[must_use]
    pub const fn disabled() -> Self {
        Self::new(1, 0, 0)
    }

    /// `attempt` 回目（0始まり）の前に待つ時間。
    ///
    /// `random(0, min(cap, base * 2^(attempt-1)))`
    #[must_use]
    pub fn delay_for_attempt(&self, attempt: usize) -> Duration {
        if attempt == 0 {
            return Duration::ZERO;
        }

        let shift = u32::try_from(attempt - 1).unwrap_or(u32::MAX).min(63);
        let exponential = self.base_delay_ms.saturating_mul(1_u64 << shift);
        let capped = exponential.min(self.max_delay_ms);
        if capped == 0 {
            return Duration::ZERO;
        }

        Duration::from_millis(rand::rng().random_range(0..=capped))
    }

    #[must_use]
    pub const fn can_retry(&self, attempt: usize) -> bool {
        attempt < self.max_attempts
    }
}

/// タイムアウト、接続失敗、5xx、429 を再試行対象とする。
#[must_use]
pub fn is_retryable_error(error: &reqwest::Error) -> bool {
    if error.is_timeout() || error.is_connect() {
        return true;
    }

    error.status().is_some_and(|status| {
        status.is_server_error() || status == reqwest::StatusCode::TOO_MANY_REQUESTS
    })
}

/// `operation` を再試行付きで実行する。
///
/// `anyhow::Error` の中身が再試行可能な `reqwest::Error` の場合のみ再試行し、
/// それ以外は即座に返す。`on_retry` は再試行のたびに呼ばれる。
///
/// # Errors
/// 最後の試行のエラー、または再試行不可能なエラーを返す。
pub async fn retry_async<T, F, Fut>(
    config: RetryConfig,
    label: &str,
    mut on_retry: impl FnMut(),
    mut operation: F,
) -> anyhow::Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = anyhow::Result<T>>,
{
    let mut attempt = 0;

    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(error) => {
                attempt += 1;

                let retryable = error
                    .chain()
                    .find_map(|cause| cause.downcast_ref::<reqwest::Error>())
                    .is_some_and(is_retryable_error);

                if !retryable || !config.can_retry(attempt) {
                    return Err(error);
                }

                let delay = config.delay_for_attempt(attempt);
                warn!(
                    operation = label,
                    attempt,
                    delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                    error = %error,
                    "catalog request failed, retrying after delay"
                );
                on_retry();
                tokio::time::sleep(delay).await;
            }
        }
    }
}
