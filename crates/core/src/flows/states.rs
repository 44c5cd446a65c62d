use serde::{Deserialize, Serialize};

use crate::domain::quotation::QuotationStatus;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleEvent {
    SubmitForApproval,
    Approve,
    Reject,
    Archive,
}

impl LifecycleEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SubmitForApproval => "submit_for_approval",
            Self::Approve => "approve",
            Self::Reject => "reject",
            Self::Archive => "archive",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowAction {
    RouteToApprover,
    RecordApproverNotes,
    NotifyRequestor,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionOutcome {
    pub from: QuotationStatus,
    pub to: QuotationStatus,
    pub event: LifecycleEvent,
    pub actions: Vec<FlowAction>,
}

impl TransitionOutcome {
    /// Re-applying an event that lands where the record already is.
    pub fn is_noop(&self) -> bool {
        self.from == self.to
    }

    pub fn records_notes(&self) -> bool {
        self.actions.contains(&FlowAction::RecordApproverNotes)
    }
}
