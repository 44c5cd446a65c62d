//! String key-value storage that outlives a session.

use async_trait::async_trait;
use thiserror::Error;

pub mod memory;
pub mod sqlite;

pub use memory::InMemoryKeyValueStore;
pub use sqlite::SqliteKeyValueStore;

/// Key under which the welcome screen remembers it has been shown.
pub const HAS_VISITED_KEY: &str = "hasVisitedQuotation";

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("decode error: {0}")]
    Decode(String),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, RepositoryError>;
    async fn set(&self, key: &str, value: &str) -> Result<(), RepositoryError>;
    async fn remove(&self, key: &str) -> Result<(), RepositoryError>;
}

/// Reads the first-visit flag; a failing store counts as "not visited".
pub async fn has_visited(store: &dyn KeyValueStore) -> bool {
    match store.get(HAS_VISITED_KEY).await {
        Ok(value) => value.as_deref() == Some("true"),
        Err(error) => {
            tracing::warn!(
                event_name = "session.visited_flag.read_failed",
                error = %error,
                "could not read first-visit flag"
            );
            false
        }
    }
}

pub async fn mark_visited(store: &dyn KeyValueStore) {
    if let Err(error) = store.set(HAS_VISITED_KEY, "true").await {
        tracing::warn!(
            event_name = "session.visited_flag.write_failed",
            error = %error,
            "could not persist first-visit flag"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::{has_visited, mark_visited, InMemoryKeyValueStore, KeyValueStore, HAS_VISITED_KEY};

    #[tokio::test]
    async fn visited_flag_round_trips_through_store() {
        let store = InMemoryKeyValueStore::default();
        assert!(!has_visited(&store).await);

        mark_visited(&store).await;
        assert!(has_visited(&store).await);
        assert_eq!(store.get(HAS_VISITED_KEY).await.expect("get").as_deref(), Some("true"));
    }

    #[tokio::test]
    async fn unavailable_store_reads_as_first_visit() {
        let store = InMemoryKeyValueStore::unavailable();
        mark_visited(&store).await;
        assert!(!has_visited(&store).await);
    }
}
