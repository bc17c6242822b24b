//! Redis Backend Module
//!
//! Backing store over a single multiplexed Redis connection. Clones of the
//! connection share one socket, so concurrent commands never block each other.

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;

use super::Backend;
use crate::error::BackendResult;

// == Redis Backend ==
/// Redis-backed store.
#[derive(Clone)]
pub struct RedisBackend {
    connection: MultiplexedConnection,
}

impl RedisBackend {
    /// Opens a connection and verifies it with `PING`.
    pub async fn connect(url: &str) -> BackendResult<Self> {
        let client = redis::Client::open(url)?;
        let connection = client.get_multiplexed_async_connection().await?;
        let backend = Self { connection };
        backend.ping().await?;
        Ok(backend)
    }

    fn conn(&self) -> MultiplexedConnection {
        self.connection.clone()
    }
}

/// Extracts `used_memory_human` from an `INFO memory` reply.
fn parse_used_memory(info: &str) -> Option<String> {
    info.lines()
        .find_map(|line| line.strip_prefix("used_memory_human:"))
        .map(|value| value.trim().to_string())
}

#[async_trait]
impl Backend for RedisBackend {
    async fn get(&self, key: &str) -> BackendResult<Option<String>> {
        let value: Option<String> = self.conn().get(key).await?;
        Ok(value)
    }

    async fn set_ex(&self, key: &str, value: String, ttl_seconds: u64) -> BackendResult<()> {
        let _: () = self.conn().set_ex(key, value, ttl_seconds).await?;
        Ok(())
    }

    async fn set_keep_ttl(&self, key: &str, value: String) -> BackendResult<bool> {
        let reply: Option<String> = redis::cmd("SET")
            .arg(key)
            .arg(value)
            .arg("KEEPTTL")
            .arg("XX")
            .query_async(&mut self.conn())
            .await?;
        Ok(reply.is_some())
    }

    async fn del(&self, keys: &[String]) -> BackendResult<u64> {
        if keys.is_empty() {
            return Ok(0);
        }
        let removed: u64 = self.conn().del(keys).await?;
        Ok(removed)
    }

    async fn exists(&self, key: &str) -> BackendResult<bool> {
        let found: bool = self.conn().exists(key).await?;
        Ok(found)
    }

    async fn incr(&self, key: &str) -> BackendResult<i64> {
        let value: i64 = self.conn().incr(key, 1).await?;
        Ok(value)
    }

    async fn expire(&self, key: &str, ttl_seconds: u64) -> BackendResult<bool> {
        let seconds = i64::try_from(ttl_seconds).unwrap_or(i64::MAX);
        let updated: bool = self.conn().expire(key, seconds).await?;
        Ok(updated)
    }

    async fn ttl(&self, key: &str) -> BackendResult<Option<u64>> {
        // -2 = missing, -1 = no expiry
        let remaining: i64 = self.conn().ttl(key).await?;
        Ok(u64::try_from(remaining).ok())
    }

    async fn keys(&self, pattern: &str) -> BackendResult<Vec<String>> {
        let keys: Vec<String> = self.conn().keys(pattern).await?;
        Ok(keys)
    }

    async fn dbsize(&self) -> BackendResult<u64> {
        let size: u64 = redis::cmd("DBSIZE").query_async(&mut self.conn()).await?;
        Ok(size)
    }

    async fn used_memory(&self) -> BackendResult<String> {
        let info: String = redis::cmd("INFO")
            .arg("memory")
            .query_async(&mut self.conn())
            .await?;
        Ok(parse_used_memory(&info).unwrap_or_else(|| "0B".to_string()))
    }

    async fn flush(&self) -> BackendResult<()> {
        let _: () = redis::cmd("FLUSHDB").query_async(&mut self.conn()).await?;
        Ok(())
    }

    async fn ping(&self) -> BackendResult<()> {
        let _: String = redis::cmd("PING").query_async(&mut self.conn()).await?;
        Ok(())
    }

    async fn close(&self) {
        // The socket closes when the last connection clone is dropped.
    }
}
