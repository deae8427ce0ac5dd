use std::collections::HashMap;

use async_trait::async_trait;
use redis::aio::ConnectionManager;

use crate::repositories::errors::session_cache_errors::SessionCacheError;

#[cfg(test)]
use mockall::automock;

/// String key/value and hash storage with optional per-key expiry.
///
/// Absent keys and fields read as `None`.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait SessionCache: Send + Sync {
    async fn set(&self, key: &str, value: &str) -> Result<(), SessionCacheError>;
    async fn set_with_ttl(
        &self,
        key: &str,
        value: &str,
        ttl_seconds: u64,
    ) -> Result<(), SessionCacheError>;
    async fn get(&self, key: &str) -> Result<Option<String>, SessionCacheError>;
    /// Reads and deletes `key` in one step. Of two concurrent takes at most one sees the value.
    async fn take(&self, key: &str) -> Result<Option<String>, SessionCacheError>;
    async fn delete(&self, key: &str) -> Result<(), SessionCacheError>;
    /// Returns false when the key does not exist.
    async fn expire(&self, key: &str, ttl_seconds: u64) -> Result<bool, SessionCacheError>;
    async fn hash_set_all(
        &self,
        key: &str,
        fields: &[(String, String)],
    ) -> Result<(), SessionCacheError>;
    async fn hash_get(&self, key: &str, field: &str) -> Result<Option<String>, SessionCacheError>;
    async fn hash_get_all(&self, key: &str) -> Result<HashMap<String, String>, SessionCacheError>;
    async fn hash_delete(&self, key: &str, field: &str) -> Result<(), SessionCacheError>;
}

pub struct RedisSessionCache {
    conn: ConnectionManager,
}

impl RedisSessionCache {
    pub fn new(conn: ConnectionManager) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl SessionCache for RedisSessionCache {
    async fn set(&self, key: &str, value: &str) -> Result<(), SessionCacheError> {
        let mut conn = self.conn.clone();
        redis::cmd("SET")
            .arg(key)
            .arg(value)
            .query_async::<_, ()>(&mut conn)
            .await?;
        Ok(())
    }

    async fn set_with_ttl(
        &self,
        key: &str,
        value: &str,
        ttl_seconds: u64,
    ) -> Result<(), SessionCacheError> {
        let mut conn = self.conn.clone();
        redis::cmd("SET")
            .arg(key)
            .arg(value)
            .arg("EX")
            .arg(ttl_seconds.max(1))
            .query_async::<_, ()>(&mut conn)
            .await?;
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>, SessionCacheError> {
        let mut conn = self.conn.clone();
        let value = redis::cmd("GET")
            .arg(key)
            .query_async::<_, Option<String>>(&mut conn)
            .await?;
        Ok(value)
    }

    async fn take(&self, key: &str) -> Result<Option<String>, SessionCacheError> {
        let mut conn = self.conn.clone();
        let value = redis::cmd("GETDEL")
            .arg(key)
            .query_async::<_, Option<String>>(&mut conn)
            .await?;
        Ok(value)
    }

    async fn delete(&self, key: &str) -> Result<(), SessionCacheError> {
        let mut conn = self.conn.clone();
        redis::cmd("DEL")
            .arg(key)
            .query_async::<_, i64>(&mut conn)
            .await?;
        Ok(())
    }

    async fn expire(&self, key: &str, ttl_seconds: u64) -> Result<bool, SessionCacheError> {
        let mut conn = self.conn.clone();
        let applied = redis::cmd("EXPIRE")
            .arg(key)
            .arg(ttl_seconds)
            .query_async::<_, i64>(&mut conn)
            .await?;
        Ok(applied == 1)
    }

    async fn hash_set_all(
        &self,
        key: &str,
        fields: &[(String, String)],
    ) -> Result<(), SessionCacheError> {
        if fields.is_empty() {
            return Ok(());
        }
        let mut cmd = redis::cmd("HSET");
        cmd.arg(key);
        for (field, value) in fields {
            cmd.arg(field).arg(value);
        }
        let mut conn = self.conn.clone();
        cmd.query_async::<_, i64>(&mut conn).await?;
        Ok(())
    }

    async fn hash_get(&self, key: &str, field: &str) -> Result<Option<String>, SessionCacheError> {
        let mut conn = self.conn.clone();
        let value = redis::cmd("HGET")
            .arg(key)
            .arg(field)
            .query_async::<_, Option<String>>(&mut conn)
            .await?;
        Ok(value)
    }

    async fn hash_get_all(&self, key: &str) -> Result<HashMap<String, String>, SessionCacheError> {
        let mut conn = self.conn.clone();
        let entries = redis::cmd("HGETALL")
            .arg(key)
            .query_async::<_, HashMap<String, String>>(&mut conn)
            .await?;
        Ok(entries)
    }

    async fn hash_delete(&self, key: &str, field: &str) -> Result<(), SessionCacheError> {
        let mut conn = self.conn.clone();
        redis::cmd("HDEL")
            .arg(key)
            .arg(field)
            .query_async::<_, i64>(&mut conn)
            .await?;
        Ok(())
    }
}
