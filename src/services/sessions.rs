//! Redis-backed session state for the per-session visit counter

use redis::{AsyncCommands, Client};

use crate::error::{AppError, AppResult};

#[derive(Clone)]
pub struct SessionService {
    client: Client,
    ttl_seconds: u64,
}

impl SessionService {
    /// Create a new session service and verify the Redis connection
    pub async fn new(url: &str, ttl_seconds: u64) -> AppResult<Self> {
        let client = Client::open(url)
            .map_err(|e| AppError::Internal(format!("Failed to create Redis client: {}", e)))?;

        // Test connection
        let mut conn = client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| AppError::Internal(format!("Failed to connect to Redis: {}", e)))?;

        redis::cmd("PING")
            .query_async::<_, String>(&mut conn)
            .await
            .map_err(|e| AppError::Internal(format!("Redis connection test failed: {}", e)))?;

        Ok(Self {
            client,
            ttl_seconds,
        })
    }

    /// Record a visit for a session and return the number of visits the
    /// session had made BEFORE this one. The key expires `ttl_seconds`
    /// after the last visit; nothing outlives the session.
    pub async fn record_visit(&self, session_id: &str) -> AppResult<i64> {
        let mut conn = self
            .client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| AppError::Internal(format!("Failed to get Redis connection: {}", e)))?;

        let key = format!("session:{}:visits", session_id);

        let count: i64 = conn
            .incr(&key, 1)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to count visit in Redis: {}", e)))?;

        conn.expire::<_, ()>(&key, self.ttl_seconds as i64)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to refresh session in Redis: {}", e)))?;

        Ok(count - 1)
    }
}
