use std::{sync::Arc, time::Duration};

use async_trait::async_trait;

use crate::{errors::SessionError, settings::AppConfig};

pub mod memory;
pub mod redis_store;

pub use memory::InMemorySessionStore;
pub use redis_store::RedisSessionStore;

/// Key-value storage scoped to one client session.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn get(&self, session_id: &str, key: &str) -> Result<Option<String>, SessionError>;
    async fn set(&self, session_id: &str, key: &str, value: &str) -> Result<(), SessionError>;
}

/// The session store selected at startup: Redis when `redis_url` is set, memory otherwise.
#[derive(Clone)]
pub enum SessionBackend {
    Memory(InMemorySessionStore),
    Redis(RedisSessionStore),
}

impl SessionBackend {
    pub fn from_config(config: &AppConfig) -> Result<Self, SessionError> {
        match config.redis_url.as_deref().filter(|url| !url.trim().is_empty()) {
            Some(url) => Ok(SessionBackend::Redis(RedisSessionStore::open(url, config.session_ttl_secs)?)),
            None => Ok(SessionBackend::Memory(InMemorySessionStore::new(
                Duration::from_secs(config.session_ttl_secs),
            ))),
        }
    }

    pub fn store(&self) -> Arc<dyn SessionStore> {
        match self {
            SessionBackend::Memory(store) => Arc::new(store.clone()),
            SessionBackend::Redis(store) => Arc::new(store.clone()),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            SessionBackend::Memory(_) => "memory",
            SessionBackend::Redis(_) => "redis",
        }
    }

    pub async fn status(&self) -> &'static str {
        match self {
            SessionBackend::Memory(_) => "OK",
            SessionBackend::Redis(store) if store.ping().await => "OK",
            SessionBackend::Redis(_) => "Unavailable",
        }
    }
}
