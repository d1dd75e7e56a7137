use std::{
    collections::HashMap,
    sync::Arc,
    time::{Duration, Instant},
};

use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::Mutex;

use super::SessionStore;
use crate::errors::SessionError;

#[derive(Debug)]
struct SessionEntry {
    values: HashMap<String, String>,
    last_seen: Instant,
}

impl SessionEntry {
    fn new() -> Self {
        Self {
            values: HashMap::new(),
            last_seen: Instant::now(),
        }
    }

    fn is_expired(&self, now: Instant, ttl: Duration) -> bool {
        now.duration_since(self.last_seen) > ttl
    }
}

type Key = String;

/// Process-local session store. Sessions idle for longer than the TTL are
/// treated as absent and removed by [`InMemorySessionStore::evict_expired`].
#[derive(Clone)]
pub struct InMemorySessionStore {
    map: Arc<DashMap<Key, Arc<Mutex<SessionEntry>>>>,
    ttl: Duration,
}

impl InMemorySessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            map: Arc::new(DashMap::new()),
            ttl,
        }
    }

    fn get_entry(&self, session_id: &str) -> Arc<Mutex<SessionEntry>> {
        if let Some(existing) = self.map.get(session_id) {
            existing.clone()
        } else {
            match self.map.entry(session_id.to_string()) {
                dashmap::mapref::entry::Entry::Occupied(entry) => entry.get().clone(),
                dashmap::mapref::entry::Entry::Vacant(entry) => {
                    let session = Arc::new(Mutex::new(SessionEntry::new()));
                    entry.insert(session.clone());
                    session
                }
            }
        }
    }

    /// Drops every idle session and returns how many were removed.
    pub fn evict_expired(&self) -> usize {
        let now = Instant::now();
        let keys_to_remove: Vec<Key> = self.map
            .iter()
            .filter_map(|entry| {
                if entry.value().lock().is_expired(now, self.ttl) {
                    Some(entry.key().clone())
                } else {
                    None
                }
            })
            .collect();

        for k in &keys_to_remove {
            self.map.remove(k);
        }
        keys_to_remove.len()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn get(&self, session_id: &str, key: &str) -> Result<Option<String>, SessionError> {
        let Some(session) = self.map.get(session_id).map(|s| s.clone()) else {
            return Ok(None);
        };

        let mut entry = session.lock();
        let now = Instant::now();
        if entry.is_expired(now, self.ttl) {
            entry.values.clear();
        }
        entry.last_seen = now;
        Ok(entry.values.get(key).cloned())
    }

    async fn set(&self, session_id: &str, key: &str, value: &str) -> Result<(), SessionError> {
        let session = self.get_entry(session_id);
        let mut entry = session.lock();
        let now = Instant::now();
        if entry.is_expired(now, self.ttl) {
            entry.values.clear();
        }
        entry.values.insert(key.to_string(), value.to_string());
        entry.last_seen = now;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[actix_rt::test]
    async fn stores_values_per_session() {
        let store = InMemorySessionStore::new(Duration::from_secs(60));

        store.set("a", "last", "100").await.unwrap();

        assert_eq!(store.get("a", "last").await.unwrap().as_deref(), Some("100"));
        assert_eq!(store.get("b", "last").await.unwrap(), None);
        assert_eq!(store.get("a", "other").await.unwrap(), None);
    }

    #[actix_rt::test]
    async fn overwrites_existing_value() {
        let store = InMemorySessionStore::new(Duration::from_secs(60));

        store.set("a", "last", "100").await.unwrap();
        store.set("a", "last", "160").await.unwrap();

        assert_eq!(store.get("a", "last").await.unwrap().as_deref(), Some("160"));
        assert_eq!(store.len(), 1);
    }

    #[actix_rt::test]
    async fn expired_sessions_are_forgotten_and_evicted() {
        let store = InMemorySessionStore::new(Duration::from_millis(20));
        store.set("a", "last", "100").await.unwrap();

        tokio::time::sleep(Duration::from_millis(50)).await;

        assert_eq!(store.evict_expired(), 1);
        assert!(store.is_empty());
        assert_eq!(store.get("a", "last").await.unwrap(), None);
    }

    #[actix_rt::test]
    async fn expired_values_are_not_returned_before_sweep() {
        let store = InMemorySessionStore::new(Duration::from_millis(20));
        store.set("a", "last", "100").await.unwrap();

        tokio::time::sleep(Duration::from_millis(50)).await;

        assert_eq!(store.get("a", "last").await.unwrap(), None);
    }
}
