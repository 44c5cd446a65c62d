//! View state for the quotation canvas tab.
//!
//! Mirrors what the quotation panel shows: a first-visit welcome, the role-scoped list,
//! the create form (requirements, categories, rated items) and the detail of one record.
//! Every user-facing outcome is reported as a [`Toast`]; canvas notifications are queued
//! in an outbox for the chat runtime to apply.

use chrono::{DateTime, Utc};
use rand::Rng;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use quotecanvas_core::canvas::{CanvasAction, CanvasPayload};
use quotecanvas_core::domain::quotation::QuotationRecord;
use quotecanvas_core::domain::role::Role;
use quotecanvas_core::domain::sor::RatedItem;
use quotecanvas_core::domain::toast::Toast;
use quotecanvas_core::errors::{ApplicationError, DomainError, ValidationError};
use quotecanvas_core::generator::{GenerationRequest, QuotationGenerator};
use quotecanvas_db::store::{has_visited, mark_visited};
use quotecanvas_db::{DraftFilter, ListFilter, QuotationRepository};

use crate::sor::SorRetriever;

const GENERATION_SUMMARY: &str = "Generating quotation based on requirements and SOR items";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkspaceView {
    Welcome,
    #[default]
    List,
    Create,
    Detail,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum LifecycleAction {
    Submit,
    Approve,
    Reject,
    Archive,
}

impl LifecycleAction {
    fn toast_title(self) -> &'static str {
        match self {
            Self::Submit => "Quotation Submitted",
            Self::Approve => "Quotation Approved",
            Self::Reject => "Quotation Rejected",
            Self::Archive => "Quotation Archived",
        }
    }

    fn past_tense(self) -> &'static str {
        match self {
            Self::Submit => "submitted for approval",
            Self::Approve => "approved",
            Self::Reject => "rejected",
            Self::Archive => "archived",
        }
    }
}

pub struct QuotationWorkspace<R> {
    repository: QuotationRepository,
    generator: QuotationGenerator<R>,
    retriever: Option<SorRetriever>,
    role: Role,
    view: WorkspaceView,
    requirements: String,
    categories: Vec<String>,
    rated_items: Vec<RatedItem>,
    current: Option<QuotationRecord>,
    generating: bool,
    searching: bool,
    toasts: Vec<Toast>,
    outbox: Vec<CanvasAction>,
}

impl<R> QuotationWorkspace<R>
where
    R: Rng,
{
    pub fn new(repository: QuotationRepository, generator: QuotationGenerator<R>, role: Role) -> Self {
        Self {
            repository,
            generator,
            retriever: None,
            role,
            view: WorkspaceView::List,
            requirements: String::new(),
            categories: Vec::new(),
            rated_items: Vec::new(),
            current: None,
            generating: false,
            searching: false,
            toasts: Vec::new(),
            outbox: Vec::new(),
        }
    }

    pub fn with_retriever(mut self, retriever: SorRetriever) -> Self {
        self.retriever = Some(retriever);
        self
    }

    pub fn view(&self) -> WorkspaceView {
        self.view
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn set_role(&mut self, role: Role) {
        self.role = role;
    }

    pub fn repository(&self) -> &QuotationRepository {
        &self.repository
    }

    pub fn requirements(&self) -> &str {
        &self.requirements
    }

    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    pub fn rated_items(&self) -> &[RatedItem] {
        &self.rated_items
    }

    pub fn current(&self) -> Option<&QuotationRecord> {
        self.current.as_ref()
    }

    pub fn is_generating(&self) -> bool {
        self.generating
    }

    pub fn is_searching(&self) -> bool {
        self.searching
    }

    pub fn drain_toasts(&mut self) -> Vec<Toast> {
        std::mem::take(&mut self.toasts)
    }

    pub fn drain_outbox(&mut self) -> Vec<CanvasAction> {
        std::mem::take(&mut self.outbox)
    }

    /// First visit shows the welcome view; later visits land on the list.
    pub async fn open(&mut self) -> WorkspaceView {
        self.view = if has_visited(self.repository.storage().store().as_ref()).await {
            WorkspaceView::List
        } else {
            WorkspaceView::Welcome
        };
        self.view
    }

    pub async fn dismiss_welcome(&mut self) {
        mark_visited(self.repository.storage().store().as_ref()).await;
        self.view = WorkspaceView::List;
    }

    pub fn set_requirements(&mut self, requirements: impl Into<String>) {
        self.requirements = requirements.into();
    }

    pub fn set_categories(&mut self, categories: impl IntoIterator<Item = impl Into<String>>) {
        self.categories = categories.into_iter().map(Into::into).collect();
    }

    /// Adds the category when absent, removes it otherwise.
    pub fn toggle_category(&mut self, category: &str) {
        if let Some(position) = self.categories.iter().position(|c| c == category) {
            self.categories.remove(position);
        } else {
            self.categories.push(category.to_string());
        }
    }

    pub fn set_rated_items(&mut self, items: Vec<RatedItem>) {
        self.rated_items = items;
    }

    /// Selecting an item without a quantity starts it at one. Returns false for a bad index.
    pub fn select_rated_item(&mut self, index: usize, selected: bool) -> bool {
        let Some(item) = self.rated_items.get_mut(index) else {
            return false;
        };
        item.selected = selected;
        if selected && item.quantity.is_none() {
            item.quantity = Some(Decimal::ONE);
        }
        true
    }

    pub fn set_quantity(&mut self, index: usize, quantity: Decimal) -> bool {
        let Some(item) = self.rated_items.get_mut(index) else {
            return false;
        };
        item.quantity = Some(quantity);
        true
    }

    pub async fn search_sor(&mut self) -> usize {
        if self.requirements.trim().is_empty() {
            self.toasts.push(Toast::error(
                "Requirements needed",
                "Please enter your query before searching the Schedule of Rates.",
            ));
            return 0;
        }

        self.searching = true;
        self.toasts.push(Toast::info(
            "Searching SOR database",
            "Looking for matching items in the Schedule of Rates...",
        ));

        let items = match &self.retriever {
            Some(retriever) => retriever.fetch_rated_items(&self.requirements).await,
            None => {
                warn!(event_name = "sor.retrieval.unconfigured", "no schedule of rates source");
                Vec::new()
            }
        };
        self.searching = false;

        let found = items.len();
        if found > 0 {
            self.toasts.push(Toast::info(
                "SOR data retrieved",
                format!("Found {found} relevant service items."),
            ));
        } else {
            self.toasts.push(Toast::error(
                "No relevant SOR items found",
                "Try refining your search query or use the category selections below.",
            ));
        }
        self.rated_items = items;
        found
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.requirements.trim().is_empty() {
            return Err(ValidationError::EmptyRequirements);
        }
        if self.categories.is_empty() && !self.rated_items.iter().any(|item| item.selected) {
            return Err(ValidationError::NoItemsSelected);
        }
        Ok(())
    }

    /// Generates and saves a draft, then shows it. Validation failures touch nothing.
    pub async fn generate(&mut self, now: DateTime<Utc>) -> Result<QuotationRecord, ApplicationError> {
        if let Err(invalid) = self.validate() {
            self.toasts.push(Toast::error(invalid.title(), invalid.user_message()));
            return Err(invalid.into());
        }

        self.generating = true;
        self.outbox.push(CanvasAction::from_canvas(CanvasPayload::QuotationGeneration {
            requirements: self.requirements.clone(),
            categories: self.categories.clone(),
            quote_type: None,
            summary: Some(GENERATION_SUMMARY.to_string()),
        }));

        let request = GenerationRequest {
            requirements: self.requirements.clone(),
            categories: self.categories.clone(),
            rated_items: self.rated_items.clone(),
            created_by: Some(self.role.display_name().to_string()),
            owner_role: Some(self.role),
        };
        let existing = self.repository.existing_ids().await;
        let generated = self.generator.generate(&request, &existing, now);
        self.generating = false;

        match generated {
            Ok(record) => {
                let saved = self.repository.save(record).await;
                info!(
                    event_name = "quotation.generated",
                    quotation_id = saved.id_str().unwrap_or_default(),
                    line_items = saved.line_items.len(),
                    "quotation generated"
                );
                self.toasts.push(Toast::info(
                    "Quotation Generated",
                    "Your quotation has been successfully generated and saved as a draft.",
                ));
                self.current = Some(saved.clone());
                self.view = WorkspaceView::Detail;
                Ok(saved)
            }
            Err(err) => {
                warn!(event_name = "quotation.generation.failed", error = %err, "generation failed");
                self.toasts.push(Toast::error("Error", "Failed to generate quotation. Please try again."));
                Err(err.into())
            }
        }
    }

    pub async fn list(&self) -> Vec<QuotationRecord> {
        self.repository
            .list(ListFilter::from(self.role.list_scope()), &DraftFilter::for_role(self.role))
            .await
    }

    pub async fn select(&mut self, id: &str) -> bool {
        match self.repository.by_id(id).await {
            Some(record) => {
                self.current = Some(record);
                self.view = WorkspaceView::Detail;
                true
            }
            None => false,
        }
    }

    pub fn back_to_list(&mut self) {
        self.current = None;
        self.view = WorkspaceView::List;
    }

    pub fn create_new(&mut self) {
        self.reset();
    }

    /// Starts a fresh quotation, clearing every working field.
    pub fn reset(&mut self) {
        self.requirements.clear();
        self.categories.clear();
        self.rated_items.clear();
        self.current = None;
        self.view = WorkspaceView::Create;
    }

    /// Persists edits made to the open record.
    pub async fn save_current(&mut self) -> Result<QuotationRecord, ApplicationError> {
        let record = self.current.clone().ok_or_else(no_open_quotation)?;
        let saved = self.repository.save(record).await;
        self.toasts.push(Toast::info(
            "Quotation Saved",
            format!("Quotation {} has been saved successfully.", saved.id_str().unwrap_or_default()),
        ));
        self.current = Some(saved.clone());
        Ok(saved)
    }

    pub async fn submit_current(&mut self) -> Result<QuotationRecord, ApplicationError> {
        self.transition_current(LifecycleAction::Submit, None).await
    }

    pub async fn approve_current(
        &mut self,
        notes: Option<String>,
    ) -> Result<QuotationRecord, ApplicationError> {
        self.transition_current(LifecycleAction::Approve, notes).await
    }

    pub async fn reject_current(
        &mut self,
        notes: Option<String>,
    ) -> Result<QuotationRecord, ApplicationError> {
        self.transition_current(LifecycleAction::Reject, notes).await
    }

    pub async fn archive_current(&mut self) -> Result<QuotationRecord, ApplicationError> {
        self.transition_current(LifecycleAction::Archive, None).await
    }

    /// Deletes the open record when it is this role's own draft, then returns to the list.
    pub async fn delete_current(&mut self) -> Result<QuotationRecord, ApplicationError> {
        let id = self
            .current
            .as_ref()
            .and_then(|record| record.id_str().map(str::to_string))
            .ok_or_else(no_open_quotation)?;

        match self.repository.delete(&id, &DraftFilter::for_role(self.role)).await {
            Ok(Some(removed)) => {
                self.toasts.push(Toast::info(
                    "Quotation Deleted",
                    format!("Draft {id} has been deleted."),
                ));
                self.back_to_list();
                Ok(removed)
            }
            Ok(None) => Err(ApplicationError::NotFound(id)),
            Err(err) => {
                self.toasts.push(Toast::error("Action not allowed", err.to_string()));
                Err(err.into())
            }
        }
    }

    async fn transition_current(
        &mut self,
        action: LifecycleAction,
        notes: Option<String>,
    ) -> Result<QuotationRecord, ApplicationError> {
        let id = self
            .current
            .as_ref()
            .and_then(|record| record.id_str().map(str::to_string))
            .ok_or_else(no_open_quotation)?;

        let outcome = match action {
            LifecycleAction::Submit => self.repository.submit_for_approval(&id).await,
            LifecycleAction::Approve => self.repository.approve(&id, notes).await,
            LifecycleAction::Reject => self.repository.reject(&id, notes).await,
            LifecycleAction::Archive => self.repository.archive(&id).await,
        };

        match outcome {
            Ok(Some(record)) => {
                self.toasts.push(Toast::info(
                    action.toast_title(),
                    format!("Quotation {id} has been {}.", action.past_tense()),
                ));
                self.current = Some(record.clone());
                Ok(record)
            }
            Ok(None) => Err(ApplicationError::NotFound(id)),
            Err(err) => {
                self.toasts.push(Toast::error("Action not allowed", err.to_string()));
                Err(err.into())
            }
        }
    }
}

fn no_open_quotation() -> ApplicationError {
    DomainError::InvariantViolation("no quotation is open".to_string()).into()
}
