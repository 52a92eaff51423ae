use redis::aio::MultiplexedConnection;

use crate::error::ApiError;

/// Checks a counter-based rate limit stored in Redis.
///
/// Uses the INCR + EXPIRE strategy:
/// - Increments a counter for `key`
/// - On first increment, sets TTL to `window_secs`
/// - Returns 429 if counter exceeds `max_attempts`
///
/// With no Redis connection (cache-less mode) the limit is skipped: rate
/// limiting shares the cache backend's availability-over-consistency
/// contract.
pub async fn check_rate_limit(
    redis: Option<MultiplexedConnection>,
    key: &str,
    max_attempts: u64,
    window_secs: u64,
) -> Result<(), ApiError> {
    let Some(mut redis) = redis else {
        return Ok(());
    };

    let count: u64 = redis::cmd("INCR")
        .arg(key)
        .query_async(&mut redis)
        .await
        .unwrap_or(0);

    if count == 1 {
        // Set TTL only on first increment to avoid resetting the window on each attempt
        let _: Result<(), _> = redis::cmd("EXPIRE")
            .arg(key)
            .arg(window_secs)
            .query_async(&mut redis)
            .await;
    }

    if count > max_attempts {
        return Err(ApiError::RateLimited);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn no_backend_means_no_limit() {
        assert!(check_rate_limit(None, "rate:admin-login:unknown", 5, 900)
            .await
            .is_ok());
    }
}
