use std::collections::HashSet;
use std::sync::Arc;

use tracing::{info, warn};

use quotecanvas_core::audit::{AuditContext, AuditSink, TracingAuditSink};
use quotecanvas_core::domain::quotation::{QuotationId, QuotationRecord};
use quotecanvas_core::errors::DomainError;
use quotecanvas_core::flows::{FlowEngine, LifecycleEvent, LifecycleFlow};

use super::queries::{self, DraftFilter, ListFilter};
use super::storage::QuotationStorage;

/// Lifecycle operations over the persisted quotation list.
///
/// Each call reloads the list, touches one record, and writes the whole list back.
/// `Ok(None)` means the id is unknown; a lifecycle guard failure is
/// `Err(DomainError::FlowTransition)`. Neither case writes to the store.
pub struct QuotationRepository {
    storage: QuotationStorage,
    engine: FlowEngine<LifecycleFlow>,
    audit: Arc<dyn AuditSink>,
    context: AuditContext,
}

impl QuotationRepository {
    pub fn new(storage: QuotationStorage) -> Self {
        Self {
            storage,
            engine: FlowEngine::default(),
            audit: Arc::new(TracingAuditSink),
            context: AuditContext::default(),
        }
    }

    pub fn with_audit(mut self, sink: Arc<dyn AuditSink>, context: AuditContext) -> Self {
        self.audit = sink;
        self.context = context;
        self
    }

    pub fn storage(&self) -> &QuotationStorage {
        &self.storage
    }

    pub async fn list(&self, filter: ListFilter, drafts_for: &DraftFilter) -> Vec<QuotationRecord> {
        queries::filtered(&self.storage.load().await, filter, drafts_for)
    }

    pub async fn pending(&self) -> Vec<QuotationRecord> {
        queries::pending(&self.storage.load().await)
    }

    pub async fn archived(&self) -> Vec<QuotationRecord> {
        queries::archived(&self.storage.load().await)
    }

    pub async fn non_archived(&self) -> Vec<QuotationRecord> {
        queries::non_archived(&self.storage.load().await)
    }

    pub async fn drafts(&self, filter: &DraftFilter) -> Vec<QuotationRecord> {
        queries::drafts(&self.storage.load().await, filter)
    }

    pub async fn all(&self) -> Vec<QuotationRecord> {
        queries::all(&self.storage.load().await)
    }

    pub async fn by_id(&self, id: &str) -> Option<QuotationRecord> {
        queries::by_id(&self.storage.load().await, id)
    }

    pub async fn existing_ids(&self) -> HashSet<QuotationId> {
        self.storage.load().await.into_iter().filter_map(|record| record.id).collect()
    }

    /// Replaces the record with the same id, or appends it. Never assigns ids.
    pub async fn save(&self, record: QuotationRecord) -> QuotationRecord {
        let mut records = self.storage.load().await;
        let existing = record
            .id_str()
            .and_then(|id| records.iter().position(|stored| stored.has_id(id)));

        match existing {
            Some(index) => records[index] = record.clone(),
            None => records.push(record.clone()),
        }
        self.storage.save(&records).await;

        info!(
            event_name = "quotation.saved",
            quotation_id = record.id_str().unwrap_or("unassigned"),
            status = record.status.as_str(),
            replaced = existing.is_some(),
            "quotation saved"
        );
        record
    }

    pub async fn submit_for_approval(
        &self,
        id: &str,
    ) -> Result<Option<QuotationRecord>, DomainError> {
        self.transition(id, LifecycleEvent::SubmitForApproval, None).await
    }

    pub async fn approve(
        &self,
        id: &str,
        notes: Option<String>,
    ) -> Result<Option<QuotationRecord>, DomainError> {
        self.transition(id, LifecycleEvent::Approve, notes).await
    }

    pub async fn reject(
        &self,
        id: &str,
        notes: Option<String>,
    ) -> Result<Option<QuotationRecord>, DomainError> {
        self.transition(id, LifecycleEvent::Reject, notes).await
    }

    pub async fn archive(&self, id: &str) -> Result<Option<QuotationRecord>, DomainError> {
        self.transition(id, LifecycleEvent::Archive, None).await
    }

    /// Removes a draft that `owner` matches and returns it. Submitted records and other
    /// owners' drafts are refused without touching the store.
    pub async fn delete(
        &self,
        id: &str,
        owner: &DraftFilter,
    ) -> Result<Option<QuotationRecord>, DomainError> {
        let mut records = self.storage.load().await;
        let Some(index) = records.iter().position(|record| record.has_id(id)) else {
            warn!(event_name = "quotation.action.not_found", quotation_id = id, action = "delete");
            return Ok(None);
        };
        if !owner.matches(&records[index]) {
            warn!(
                event_name = "quotation.delete.refused",
                quotation_id = id,
                status = records[index].status.as_str(),
                "only the owner's drafts can be deleted"
            );
            return Err(DomainError::InvariantViolation(format!(
                "quotation `{id}` is not a draft owned by the caller"
            )));
        }

        let removed = records.remove(index);
        self.storage.save(&records).await;
        info!(
            event_name = "quotation.deleted",
            quotation_id = id,
            status = removed.status.as_str(),
            "quotation deleted"
        );
        Ok(Some(removed))
    }

    pub async fn clear(&self) -> bool {
        let cleared = self.storage.clear().await;
        info!(event_name = "quotation.cleared", cleared, "quotation list cleared");
        cleared
    }

    async fn transition(
        &self,
        id: &str,
        event: LifecycleEvent,
        notes: Option<String>,
    ) -> Result<Option<QuotationRecord>, DomainError> {
        let mut records = self.storage.load().await;
        let Some(index) = records.iter().position(|record| record.has_id(id)) else {
            warn!(
                event_name = "quotation.action.not_found",
                quotation_id = id,
                action = event.as_str(),
                "no quotation with this id"
            );
            return Ok(None);
        };

        let context = self.context.for_quotation(&QuotationId::from(id));
        let outcome =
            self.engine.apply_with_audit(records[index].status, event, self.audit.as_ref(), &context)?;
        if outcome.is_noop() {
            return Ok(Some(records[index].clone()));
        }

        let record = &mut records[index];
        record.status = outcome.to;
        if outcome.records_notes() {
            record.approver_notes = notes;
        }
        let updated = record.clone();
        self.storage.save(&records).await;

        info!(
            event_name = "quotation.transitioned",
            quotation_id = id,
            from = outcome.from.as_str(),
            to = outcome.to.as_str(),
            "quotation status changed"
        );
        Ok(Some(updated))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use rust_decimal::Decimal;

    use quotecanvas_core::audit::{AuditContext, InMemoryAuditSink};
    use quotecanvas_core::domain::quotation::{QuotationId, QuotationRecord, QuotationStatus};
    use quotecanvas_core::domain::role::Role;
    use quotecanvas_core::errors::DomainError;

    use super::QuotationRepository;
    use crate::quotations::queries::DraftFilter;
    use crate::quotations::QuotationStorage;
    use crate::store::InMemoryKeyValueStore;

    fn draft(id: &str) -> QuotationRecord {
        QuotationRecord {
            id: Some(QuotationId(id.to_string())),
            title: "Chiller servicing".to_string(),
            description: "Quarterly chiller servicing.".to_string(),
            estimated_hours: Decimal::from(6),
            total_cost: Decimal::from(540),
            status: QuotationStatus::Draft,
            approver_notes: None,
            created_by: Some("Requestor".to_string()),
            owner_role: None,
            created_at: None,
            client_name: None,
            client_address: None,
            line_items: Vec::new(),
        }
    }

    fn repository() -> (QuotationRepository, Arc<InMemoryKeyValueStore>, InMemoryAuditSink) {
        let store = Arc::new(InMemoryKeyValueStore::default());
        let sink = InMemoryAuditSink::default();
        let repository = QuotationRepository::new(QuotationStorage::with_default_key(store.clone()))
            .with_audit(Arc::new(sink.clone()), AuditContext::new(None, None, "corr-1", "tester"));
        (repository, store, sink)
    }

    #[tokio::test]
    async fn save_appends_then_replaces() {
        let (repository, _, _) = repository();
        repository.save(draft("QT-2026-0001")).await;

        let mut edited = draft("QT-2026-0001");
        edited.title = "Chiller overhaul".to_string();
        let returned = repository.save(edited.clone()).await;

        assert_eq!(returned, edited);
        let drafts = repository.drafts(&Default::default()).await;
        assert_eq!(drafts.len(), 1);
        assert_eq!(drafts[0].title, "Chiller overhaul");
    }

    #[tokio::test]
    async fn save_without_id_appends_without_assigning_one() {
        let (repository, _, _) = repository();
        let mut anonymous = draft("unused");
        anonymous.id = None;

        repository.save(anonymous.clone()).await;
        repository.save(anonymous).await;

        assert_eq!(repository.storage().load().await.len(), 2);
        assert!(repository.existing_ids().await.is_empty());
    }

    #[tokio::test]
    async fn full_review_path_records_notes_and_audits() {
        let (repository, _, sink) = repository();
        repository.save(draft("QT-2026-0007")).await;

        let pending = repository.submit_for_approval("QT-2026-0007").await.expect("submit");
        assert_eq!(pending.map(|r| r.status), Some(QuotationStatus::Pending));
        assert_eq!(repository.pending().await.len(), 1);

        let approved = repository
            .approve("QT-2026-0007", Some("Within budget".to_string()))
            .await
            .expect("approve")
            .expect("record exists");
        assert_eq!(approved.status, QuotationStatus::Approved);
        assert_eq!(approved.approver_notes.as_deref(), Some("Within budget"));

        let stored = repository.by_id("QT-2026-0007").await.expect("stored");
        assert_eq!(stored, approved);

        let events = sink.events();
        assert_eq!(events.len(), 2);
        assert!(events.iter().all(|event| event.event_type == "quotation.transition_applied"));
        assert_eq!(events[0].correlation_id, "corr-1");
        assert_eq!(events[1].quotation_id, Some(QuotationId("QT-2026-0007".to_string())));
    }

    #[tokio::test]
    async fn unknown_id_is_not_found_and_leaves_store_untouched() {
        let (repository, _, sink) = repository();
        repository.save(draft("QT-2026-0001")).await;
        let before = repository.storage().load().await;

        assert_eq!(repository.approve("QT-2026-9999", None).await.expect("no guard error"), None);
        assert_eq!(repository.archive("QT-2026-9999").await.expect("no guard error"), None);
        assert_eq!(
            repository.delete("QT-2026-9999", &Default::default()).await.expect("no guard error"),
            None
        );

        assert_eq!(repository.storage().load().await, before);
        assert!(sink.events().is_empty());
    }

    #[tokio::test]
    async fn guard_failures_do_not_write() {
        let (repository, _, sink) = repository();
        repository.save(draft("QT-2026-0002")).await;

        let error = repository.approve("QT-2026-0002", None).await.expect_err("draft cannot be approved");
        assert!(matches!(error, DomainError::FlowTransition(_)));
        assert!(repository.archive("QT-2026-0002").await.is_err());

        let stored = repository.by_id("QT-2026-0002").await.expect("stored");
        assert_eq!(stored.status, QuotationStatus::Draft);
        assert_eq!(sink.events()[0].event_type, "quotation.transition_rejected");
    }

    #[tokio::test]
    async fn archive_is_idempotent() {
        let (repository, _, _) = repository();
        repository.save(draft("QT-2026-0003")).await;
        repository.submit_for_approval("QT-2026-0003").await.expect("submit");
        repository.reject("QT-2026-0003", Some("Too costly".to_string())).await.expect("reject");

        let first = repository.archive("QT-2026-0003").await.expect("archive");
        let second = repository.archive("QT-2026-0003").await.expect("archive again");

        assert_eq!(first, second);
        assert_eq!(repository.archived().await.len(), 1);
        assert!(repository.non_archived().await.is_empty());
        assert_eq!(second.and_then(|r| r.approver_notes).as_deref(), Some("Too costly"));
    }

    #[tokio::test]
    async fn delete_and_clear_remove_records() {
        let (repository, _, _) = repository();
        repository.save(draft("QT-2026-0004")).await;
        repository.save(draft("QT-2026-0005")).await;

        let removed = repository
            .delete("QT-2026-0004", &Default::default())
            .await
            .expect("draft can be deleted")
            .expect("removed");
        assert!(removed.has_id("QT-2026-0004"));
        assert_eq!(repository.existing_ids().await.len(), 1);

        assert!(repository.clear().await);
        assert!(repository.storage().load().await.is_empty());
    }

    #[tokio::test]
    async fn delete_refuses_submitted_records_and_other_owners() {
        let (repository, _, _) = repository();
        let mut owned = draft("QT-2026-0008");
        owned.owner_role = Some(Role::Requestor);
        repository.save(owned).await;
        repository.save(draft("QT-2026-0009")).await;
        repository.submit_for_approval("QT-2026-0009").await.expect("submit");
        let before = repository.storage().load().await;

        let approver = DraftFilter::for_role(Role::Approver);
        let error = repository.delete("QT-2026-0008", &approver).await.expect_err("not the owner");
        assert!(matches!(error, DomainError::InvariantViolation(_)));
        assert!(repository.delete("QT-2026-0009", &Default::default()).await.is_err());
        assert_eq!(repository.storage().load().await, before);

        let requestor = DraftFilter::for_role(Role::Requestor);
        let removed = repository.delete("QT-2026-0008", &requestor).await.expect("owner");
        assert_eq!(removed.map(|r| r.status), Some(QuotationStatus::Draft));
    }

    #[tokio::test]
    async fn unavailable_store_reads_as_unknown_record() {
        let (repository, store, _) = repository();
        repository.save(draft("QT-2026-0006")).await;

        store.set_unavailable(true);
        let submitted = repository.submit_for_approval("QT-2026-0006").await;
        // The reload fails too, so the record reads as unknown.
        assert_eq!(submitted.expect("no guard error"), None);

        store.set_unavailable(false);
        assert_eq!(
            repository.by_id("QT-2026-0006").await.map(|r| r.status),
            Some(QuotationStatus::Draft)
        );
    }
}
