use std::sync::Arc;

use tracing::{debug, warn};

use quotecanvas_core::domain::quotation::QuotationRecord;

use crate::store::{KeyValueStore, RepositoryError};

pub const DEFAULT_QUOTATIONS_KEY: &str = "savedQuotations";

/// Whole-list persistence of quotation records under a single key.
///
/// Both directions fail soft: unreadable data loads as an empty list and failed writes are
/// logged, never raised. Every save replaces the full list.
#[derive(Clone)]
pub struct QuotationStorage {
    store: Arc<dyn KeyValueStore>,
    key: String,
}

impl QuotationStorage {
    pub fn new(store: Arc<dyn KeyValueStore>, key: impl Into<String>) -> Self {
        Self { store, key: key.into() }
    }

    pub fn with_default_key(store: Arc<dyn KeyValueStore>) -> Self {
        Self::new(store, DEFAULT_QUOTATIONS_KEY)
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn store(&self) -> &Arc<dyn KeyValueStore> {
        &self.store
    }

    pub async fn load(&self) -> Vec<QuotationRecord> {
        match self.try_load().await {
            Ok(records) => records,
            Err(error) => {
                warn!(
                    event_name = "quotation.storage.load_failed",
                    key = %self.key,
                    error = %error,
                    "falling back to an empty quotation list"
                );
                Vec::new()
            }
        }
    }

    pub async fn try_load(&self) -> Result<Vec<QuotationRecord>, RepositoryError> {
        let Some(raw) = self.store.get(&self.key).await? else {
            return Ok(Vec::new());
        };
        serde_json::from_str(&raw).map_err(|error| RepositoryError::Decode(error.to_string()))
    }

    /// Returns whether the list reached the store.
    pub async fn save(&self, records: &[QuotationRecord]) -> bool {
        match self.try_save(records).await {
            Ok(()) => {
                debug!(
                    event_name = "quotation.storage.saved",
                    key = %self.key,
                    count = records.len(),
                    "quotation list persisted"
                );
                true
            }
            Err(error) => {
                warn!(
                    event_name = "quotation.storage.save_failed",
                    key = %self.key,
                    count = records.len(),
                    error = %error,
                    "quotation list was not persisted"
                );
                false
            }
        }
    }

    pub async fn try_save(&self, records: &[QuotationRecord]) -> Result<(), RepositoryError> {
        let raw = serde_json::to_string(records)
            .map_err(|error| RepositoryError::Decode(error.to_string()))?;
        self.store.set(&self.key, &raw).await
    }

    pub async fn clear(&self) -> bool {
        match self.store.remove(&self.key).await {
            Ok(()) => true,
            Err(error) => {
                warn!(
                    event_name = "quotation.storage.clear_failed",
                    key = %self.key,
                    error = %error,
                    "quotation list was not cleared"
                );
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::{TimeZone, Utc};
    use rust_decimal::Decimal;

    use quotecanvas_core::domain::quotation::{QuotationId, QuotationRecord, QuotationStatus};

    use super::{QuotationStorage, DEFAULT_QUOTATIONS_KEY};
    use crate::store::{InMemoryKeyValueStore, KeyValueStore};

    fn record(id: &str) -> QuotationRecord {
        QuotationRecord {
            id: Some(QuotationId(id.to_string())),
            title: "Façade cleaning".to_string(),
            description: "Clean the north façade.".to_string(),
            estimated_hours: Decimal::from(8),
            total_cost: Decimal::new(60_050, 2),
            status: QuotationStatus::Pending,
            approver_notes: None,
            created_by: Some("Requestor".to_string()),
            owner_role: None,
            created_at: Some(Utc.with_ymd_and_hms(2026, 3, 1, 9, 30, 0).unwrap()),
            client_name: None,
            client_address: None,
            line_items: Vec::new(),
        }
    }

    #[tokio::test]
    async fn empty_store_loads_empty_list() {
        let storage = QuotationStorage::with_default_key(Arc::new(InMemoryKeyValueStore::default()));
        assert!(storage.load().await.is_empty());
    }

    #[tokio::test]
    async fn save_then_load_restores_dates_and_decimals() {
        let storage = QuotationStorage::with_default_key(Arc::new(InMemoryKeyValueStore::default()));
        let records = vec![record("QT-2026-0001"), record("QT-2026-0002")];

        assert!(storage.save(&records).await);
        assert_eq!(storage.load().await, records);
    }

    #[tokio::test]
    async fn browser_style_timestamps_are_accepted() {
        let store = Arc::new(InMemoryKeyValueStore::default());
        store
            .set(
                DEFAULT_QUOTATIONS_KEY,
                r#"[{"id":"QT-2025-0042","title":"Pump repair","description":"Repair pump","estimatedHours":4,"totalCost":300,"status":"draft","createdAt":"2025-06-01T10:15:00.000Z"}]"#,
            )
            .await
            .expect("seed");

        let loaded = QuotationStorage::with_default_key(store).load().await;
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].created_at, Some(Utc.with_ymd_and_hms(2025, 6, 1, 10, 15, 0).unwrap()));
        assert_eq!(loaded[0].total_cost, Decimal::from(300));
    }

    #[tokio::test]
    async fn malformed_payload_loads_empty_list() {
        let store = Arc::new(InMemoryKeyValueStore::default());
        store.set(DEFAULT_QUOTATIONS_KEY, "{not json").await.expect("seed");

        let storage = QuotationStorage::with_default_key(store);
        assert!(storage.load().await.is_empty());
        assert!(storage.try_load().await.is_err());
    }

    #[tokio::test]
    async fn write_failure_is_swallowed() {
        let store = Arc::new(InMemoryKeyValueStore::default());
        let storage = QuotationStorage::new(store.clone(), "quotes");
        assert!(storage.save(&[record("QT-2026-0001")]).await);

        store.set_unavailable(true);
        assert!(!storage.save(&[]).await);
        assert!(storage.load().await.is_empty());

        store.set_unavailable(false);
        assert_eq!(storage.load().await.len(), 1);
    }

    #[tokio::test]
    async fn clear_removes_the_key() {
        let store = Arc::new(InMemoryKeyValueStore::default());
        let storage = QuotationStorage::with_default_key(store.clone());
        storage.save(&[record("QT-2026-0001")]).await;

        assert!(storage.clear().await);
        assert_eq!(store.get(DEFAULT_QUOTATIONS_KEY).await.expect("get"), None);
    }
}
