//! 数据库操作重试
//!
//! 连接获取失败、死锁、SQLite BUSY 等瞬时错误按指数退避重试，
//! 其余错误直接返回给调用方。

use std::future::Future;
use std::time::Duration;

use sea_orm::DbErr;
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::config::DatabaseConfig;

/// 判断数据库错误是否可重试
pub fn is_retryable_error(err: &DbErr) -> bool {
    match err {
        DbErr::ConnectionAcquire(_) | DbErr::Conn(_) => true,
        DbErr::Exec(runtime_err) | DbErr::Query(runtime_err) => {
            is_retryable_runtime_error(runtime_err)
        }
        _ => false,
    }
}

fn is_retryable_runtime_error(err: &sea_orm::error::RuntimeErr) -> bool {
    use sea_orm::error::RuntimeErr;

    match err {
        RuntimeErr::SqlxError(sqlx_err) => {
            use std::ops::Deref;
            if let Some(db_err) = sqlx_err.deref().as_database_error()
                && let Some(code) = db_err.code()
            {
                return matches!(
                    code.as_ref(),
                    // MySQL 死锁和锁超时
                    "1213" | "1205" |
                    // PostgreSQL 序列化失败和死锁
                    "40001" | "40P01" |
                    // SQLite BUSY 和 LOCKED
                    "5" | "6" | "517"
                );
            }
            is_retryable_message(&sqlx_err.to_string())
        }
        RuntimeErr::Internal(msg) => is_retryable_message(msg),
        #[allow(unreachable_patterns)]
        _ => false,
    }
}

fn is_retryable_message(msg: &str) -> bool {
    let msg = msg.to_lowercase();
    msg.contains("deadlock")
        || msg.contains("lock wait timeout")
        || msg.contains("database is locked")
        || msg.contains("serialization failure")
}

/// 重试策略：最大重试次数 + 指数退避 + 单次超时
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
    /// 单次尝试的超时，None 表示不限
    pub attempt_timeout: Option<Duration>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay_ms: 100,
            max_delay_ms: 2000,
            attempt_timeout: None,
        }
    }
}

impl RetryPolicy {
    pub fn from_config(config: &DatabaseConfig) -> Self {
        Self {
            max_retries: config.retry_count,
            base_delay_ms: config.retry_base_delay_ms,
            max_delay_ms: config.retry_max_delay_ms,
            attempt_timeout: (config.timeout > 0).then(|| Duration::from_secs(config.timeout)),
        }
    }

    /// 执行操作，对可重试错误与超时自动重试
    pub async fn run<T, F, Fut>(&self, operation_name: &str, mut operation: F) -> Result<T, DbErr>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, DbErr>>,
    {
        let mut attempt = 0;
        loop {
            let outcome = match self.attempt_timeout {
                Some(limit) => match tokio::time::timeout(limit, operation()).await {
                    Ok(result) => result,
                    Err(_elapsed) => Err(DbErr::Custom(format!(
                        "Operation '{}' timed out after {} ms",
                        operation_name,
                        limit.as_millis()
                    ))),
                },
                None => operation().await,
            };

            let err = match outcome {
                Ok(value) => {
                    if attempt > 0 {
                        debug!(
                            "Operation '{}' succeeded after {} retries",
                            operation_name, attempt
                        );
                    }
                    return Ok(value);
                }
                Err(e) => e,
            };

            let retryable = is_retryable_error(&err) || is_timeout(&err);
            if !retryable || attempt >= self.max_retries {
                if !retryable {
                    debug!(
                        "Operation '{}' failed with non-retryable error: {}",
                        operation_name, err
                    );
                }
                return Err(err);
            }

            attempt += 1;
            let delay = calculate_backoff(attempt, self.base_delay_ms, self.max_delay_ms);
            warn!(
                "Operation '{}' failed (attempt {}/{}): {}; retrying in {} ms",
                operation_name,
                attempt,
                self.max_retries + 1,
                err,
                delay
            );
            sleep(Duration::from_millis(delay)).await;
        }
    }
}

fn is_timeout(err: &DbErr) -> bool {
    matches!(err, DbErr::Custom(msg) if msg.contains("timed out after"))
}

/// 计算指数退避延迟（带 0-25% 抖动）
fn calculate_backoff(attempt: u32, base_ms: u64, max_ms: u64) -> u64 {
    use rand::RngExt;
    let exp_delay = base_ms.saturating_mul(2u64.saturating_pow(attempt.saturating_sub(1)));
    let capped = exp_delay.min(max_ms);
    let jitter = rand::rng().random_range(0..=capped / 4);
    capped.saturating_add(jitter)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn fast_policy(max_retries: u32) -> RetryPolicy {
        RetryPolicy {
            max_retries,
            base_delay_ms: 5,
            max_delay_ms: 20,
            attempt_timeout: None,
        }
    }

    #[test]
    fn test_retryable_classification() {
        assert!(is_retryable_error(&DbErr::ConnectionAcquire(
            sea_orm::error::ConnAcquireErr::Timeout
        )));
        assert!(is_retryable_error(&DbErr::Exec(
            sea_orm::error::RuntimeErr::Internal("database is locked".to_string())
        )));
        assert!(is_retryable_error(&DbErr::Query(
            sea_orm::error::RuntimeErr::Internal("Deadlock found".to_string())
        )));
        assert!(!is_retryable_error(&DbErr::RecordNotFound(
            "missing".to_string()
        )));
    }

    #[test]
    fn test_backoff_grows_and_caps() {
        let first = calculate_backoff(1, 100, 2000);
        assert!((100..=125).contains(&first));
        let third = calculate_backoff(3, 100, 2000);
        assert!((400..=500).contains(&third));
        let capped = calculate_backoff(12, 100, 2000);
        assert!((2000..=2500).contains(&capped));
    }

    #[test]
    fn test_from_config_reads_timeout() {
        let config = DatabaseConfig::default();
        let policy = RetryPolicy::from_config(&config);
        assert_eq!(policy.max_retries, config.retry_count);
        assert_eq!(policy.attempt_timeout, Some(Duration::from_secs(30)));
    }

    #[tokio::test]
    async fn test_run_retries_transient_errors() {
        let calls = AtomicU32::new(0);
        let result = fast_policy(3)
            .run("flaky", || {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    if n < 2 {
                        Err(DbErr::ConnectionAcquire(
                            sea_orm::error::ConnAcquireErr::Timeout,
                        ))
                    } else {
                        Ok(7)
                    }
                }
            })
            .await;
        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_run_stops_on_permanent_error() {
        let calls = AtomicU32::new(0);
        let result = fast_policy(3)
            .run("broken", || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err::<i32, _>(DbErr::RecordNotFound("gone".to_string())) }
            })
            .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_run_times_out_slow_attempts() {
        let policy = RetryPolicy {
            attempt_timeout: Some(Duration::from_millis(10)),
            ..fast_policy(1)
        };
        let calls = AtomicU32::new(0);
        let result = policy
            .run("slow", || {
                calls.fetch_add(1, Ordering::SeqCst);
                async {
                    sleep(Duration::from_millis(200)).await;
                    Ok::<_, DbErr>(1)
                }
            })
            .await;
        assert!(matches!(result, Err(DbErr::Custom(ref m)) if m.contains("timed out")));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
