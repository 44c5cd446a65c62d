//! Pure filters over a loaded quotation list.

use std::str::FromStr;

use quotecanvas_core::domain::quotation::{QuotationRecord, QuotationStatus};
use quotecanvas_core::domain::role::{ListScope, Role};
use quotecanvas_core::errors::DomainError;

/// Narrows drafts to one owner; unset fields match everything.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DraftFilter {
    pub owner_role: Option<Role>,
    pub created_by: Option<String>,
}

impl DraftFilter {
    pub fn for_role(role: Role) -> Self {
        Self { owner_role: Some(role), created_by: None }
    }

    pub fn matches(&self, record: &QuotationRecord) -> bool {
        if record.status != QuotationStatus::Draft {
            return false;
        }
        if let Some(role) = self.owner_role {
            if record.owner_role != Some(role) {
                return false;
            }
        }
        match &self.created_by {
            Some(owner) => record.created_by.as_deref() == Some(owner.as_str()),
            None => true,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ListFilter {
    #[default]
    All,
    Pending,
    Archived,
    Active,
    Drafts,
}

impl ListFilter {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Pending => "pending",
            Self::Archived => "archived",
            Self::Active => "active",
            Self::Drafts => "drafts",
        }
    }
}

impl From<ListScope> for ListFilter {
    fn from(scope: ListScope) -> Self {
        match scope {
            ListScope::PendingReview => Self::Pending,
            ListScope::AllSubmitted => Self::All,
        }
    }
}

impl FromStr for ListFilter {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(Self::All),
            "pending" => Ok(Self::Pending),
            "archived" => Ok(Self::Archived),
            "active" | "non-archived" => Ok(Self::Active),
            "drafts" | "draft" => Ok(Self::Drafts),
            other => Err(DomainError::InvariantViolation(format!("unknown list scope `{other}`"))),
        }
    }
}

pub fn pending(records: &[QuotationRecord]) -> Vec<QuotationRecord> {
    with_status(records, |status| status == QuotationStatus::Pending)
}

pub fn archived(records: &[QuotationRecord]) -> Vec<QuotationRecord> {
    with_status(records, |status| status == QuotationStatus::Archived)
}

pub fn non_archived(records: &[QuotationRecord]) -> Vec<QuotationRecord> {
    with_status(records, |status| status != QuotationStatus::Archived)
}

pub fn drafts(records: &[QuotationRecord], filter: &DraftFilter) -> Vec<QuotationRecord> {
    records.iter().filter(|record| filter.matches(record)).cloned().collect()
}

/// Every submitted record. Drafts are only reachable through [`drafts`].
pub fn all(records: &[QuotationRecord]) -> Vec<QuotationRecord> {
    with_status(records, |status| status != QuotationStatus::Draft)
}

pub fn by_id(records: &[QuotationRecord], id: &str) -> Option<QuotationRecord> {
    records.iter().find(|record| record.has_id(id)).cloned()
}

/// Applies a list scope. `All` also carries the drafts `drafts_for` matches, so an owner
/// sees their own drafts next to every submitted record.
pub fn filtered(
    records: &[QuotationRecord],
    filter: ListFilter,
    drafts_for: &DraftFilter,
) -> Vec<QuotationRecord> {
    match filter {
        ListFilter::All => records
            .iter()
            .filter(|record| record.status != QuotationStatus::Draft || drafts_for.matches(record))
            .cloned()
            .collect(),
        ListFilter::Pending => pending(records),
        ListFilter::Archived => archived(records),
        ListFilter::Active => non_archived(records),
        ListFilter::Drafts => drafts(records, drafts_for),
    }
}

fn with_status(
    records: &[QuotationRecord],
    keep: impl Fn(QuotationStatus) -> bool,
) -> Vec<QuotationRecord> {
    records.iter().filter(|record| keep(record.status)).cloned().collect()
}
