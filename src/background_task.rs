use tokio::time::{interval, Duration};

use crate::session::InMemorySessionStore;

/// Periodically drops idle in-memory sessions.
pub async fn start_session_sweep(store: InMemorySessionStore, every: Duration) {
    let mut interval = interval(every);

    loop {
        interval.tick().await;

        let evicted = store.evict_expired();
        if evicted > 0 {
            tracing::debug!("Evicted {} idle sessions, {} remaining", evicted, store.len());
        }
    }
}
