use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::quotation::QuotationStatus;
use crate::errors::DomainError;

/// Role identifiers supplied by the role selector. Gating derived from a role is
/// advisory UI filtering; nothing here is an authorization check.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Role {
    #[default]
    Requestor,
    Approver,
    ItAdmin,
    ErpAdmin,
    SeniorManagement,
}

/// What the quotation list shows for a role.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ListScope {
    PendingReview,
    AllSubmitted,
}

/// Lifecycle affordances offered to a role for a quotation in a given status.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuotationAffordance {
    SaveDraft,
    SubmitForApproval,
    Approve,
    Reject,
    Archive,
    DeleteDraft,
    CreateNew,
    Save,
}

impl Role {
    pub const ALL: [Role; 5] =
        [Self::Requestor, Self::Approver, Self::ItAdmin, Self::ErpAdmin, Self::SeniorManagement];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Requestor => "requestor",
            Self::Approver => "approver",
            Self::ItAdmin => "itAdmin",
            Self::ErpAdmin => "erpAdmin",
            Self::SeniorManagement => "seniorManagement",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Requestor => "Requestor",
            Self::Approver => "Approver",
            Self::ItAdmin => "IT Admin",
            Self::ErpAdmin => "ERP Admin",
            Self::SeniorManagement => "Senior Management",
        }
    }

    /// Session key handed to the assistant backend.
    pub fn session_key(&self) -> &'static str {
        self.as_str()
    }

    pub fn welcome_message(&self) -> &'static str {
        match self {
            Self::Requestor => {
                "Welcome to Kim Yew Integrated! I'm your AI assistant for facility management quotations. As a Requestor, you can create and submit quotations for approval. How can I help you today?"
            }
            Self::Approver => {
                "Welcome, Approver. You can review and approve facility management quotation requests here. You can open the canvas to see pending quotations for review."
            }
            Self::ItAdmin => {
                "Hello IT Admin. You can manage IT-related facility requests and configurations. How can I assist you?"
            }
            Self::ErpAdmin => {
                "Welcome, ERP Administrator. You have access to system configurations and data management. What would you like to do?"
            }
            Self::SeniorManagement => {
                "Welcome, Senior Management. You can view reports, approve high-value requests, and access analytics. How can I assist you today?"
            }
        }
    }

    pub fn list_scope(&self) -> ListScope {
        match self {
            Self::Approver => ListScope::PendingReview,
            _ => ListScope::AllSubmitted,
        }
    }

    pub fn affordances(&self, status: QuotationStatus) -> Vec<QuotationAffordance> {
        use QuotationAffordance::*;

        match (self, status) {
            (Self::Requestor, QuotationStatus::Draft) => {
                vec![SaveDraft, SubmitForApproval, DeleteDraft]
            }
            (Self::Requestor, QuotationStatus::Rejected) => vec![CreateNew, Archive],
            (Self::Requestor, QuotationStatus::Approved) => vec![Archive],
            (Self::Requestor, _) => Vec::new(),
            (Self::Approver, QuotationStatus::Pending) => vec![Approve, Reject],
            (Self::Approver, QuotationStatus::Approved | QuotationStatus::Rejected) => {
                vec![Archive]
            }
            (Self::Approver, _) => Vec::new(),
            (_, QuotationStatus::Archived) => Vec::new(),
            _ => vec![Save],
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase().replace(['_', '-', ' '], "");
        match normalized.as_str() {
            "requestor" => Ok(Self::Requestor),
            "approver" => Ok(Self::Approver),
            "itadmin" => Ok(Self::ItAdmin),
            "erpadmin" => Ok(Self::ErpAdmin),
            "seniormanagement" => Ok(Self::SeniorManagement),
            _ => Err(DomainError::InvariantViolation(format!(
                "unknown role `{value}` (expected requestor|approver|itAdmin|erpAdmin|seniorManagement)"
            ))),
        }
    }
}
