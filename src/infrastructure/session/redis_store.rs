use async_trait::async_trait;
use redis::{aio::MultiplexedConnection, AsyncCommands, Client as RedisClient};

use super::SessionStore;
use crate::errors::SessionError;

/// Sessions kept as Redis hashes (`session:<id>`), expiring after the session TTL.
#[derive(Clone)]
pub struct RedisSessionStore {
    client: RedisClient,
    ttl_secs: u64,
}

impl RedisSessionStore {
    pub fn open(url: &str, ttl_secs: u64) -> Result<Self, SessionError> {
        let client = RedisClient::open(url).map_err(SessionError::from)?;
        Ok(Self { client, ttl_secs })
    }

    fn session_key(session_id: &str) -> String {
        format!("session:{}", session_id)
    }

    async fn connection(&self) -> Result<MultiplexedConnection, SessionError> {
        self.client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| SessionError::Connection(e.to_string()))
    }

    /// Round-trips a PING, used by the health endpoint.
    pub async fn ping(&self) -> bool {
        match self.connection().await {
            Ok(mut conn) => matches!(conn.ping::<String>().await, Ok(pong) if pong == "PONG"),
            Err(_) => false,
        }
    }
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    async fn get(&self, session_id: &str, key: &str) -> Result<Option<String>, SessionError> {
        let mut conn = self.connection().await?;
        let value: Option<String> = conn.hget(Self::session_key(session_id), key).await?;
        Ok(value)
    }

    async fn set(&self, session_id: &str, key: &str, value: &str) -> Result<(), SessionError> {
        let mut conn = self.connection().await?;
        let session_key = Self::session_key(session_id);

        redis::pipe()
            .atomic()
            .hset(&session_key, key, value)
            .ignore()
            .expire(&session_key, self.ttl_secs as i64)
            .ignore()
            .query_async::<()>(&mut conn)
            .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn namespaces_session_keys() {
        assert_eq!(RedisSessionStore::session_key("abc"), "session:abc");
    }

    #[test]
    fn rejects_malformed_url() {
        assert!(RedisSessionStore::open("not a url", 60).is_err());
    }
}
