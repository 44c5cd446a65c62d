use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::role::Role;
use crate::errors::DomainError;

/// Identifier in the `QT-<year>-<4 digits>` format.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct QuotationId(pub String);

impl QuotationId {
    pub fn new(year: i32, sequence: u16) -> Self {
        Self(format!("QT-{year}-{:04}", sequence % 10_000))
    }

    pub fn for_date(created_at: DateTime<Utc>, sequence: u16) -> Self {
        Self::new(created_at.year(), sequence)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Checks the `QT-YYYY-NNNN` shape without allocating.
    pub fn is_well_formed(&self) -> bool {
        let mut parts = self.0.split('-');
        let (Some(prefix), Some(year), Some(sequence), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return false;
        };

        prefix == "QT"
            && year.len() == 4
            && year.chars().all(|c| c.is_ascii_digit())
            && sequence.len() == 4
            && sequence.chars().all(|c| c.is_ascii_digit())
    }
}

impl fmt::Display for QuotationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for QuotationId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuotationStatus {
    #[default]
    Draft,
    Pending,
    Approved,
    Rejected,
    Archived,
}

impl QuotationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Archived => "archived",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Draft => "Draft",
            Self::Pending => "Pending",
            Self::Approved => "Approved",
            Self::Rejected => "Rejected",
            Self::Archived => "Archived",
        }
    }
}

impl fmt::Display for QuotationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QuotationStatus {
    type Err = DomainError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "draft" => Ok(Self::Draft),
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            "archived" => Ok(Self::Archived),
            other => Err(DomainError::InvariantViolation(format!(
                "unknown quotation status `{other}`"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub item: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sor: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "rust_decimal::serde::float_option"
    )]
    pub quantity: Option<Decimal>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "rust_decimal::serde::float_option"
    )]
    pub hours: Option<Decimal>,
    #[serde(with = "rust_decimal::serde::float")]
    pub rate: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub cost: Decimal,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuotationRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<QuotationId>,
    pub title: String,
    pub description: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub estimated_hours: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_cost: Decimal,
    #[serde(default)]
    pub status: QuotationStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approver_notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_role: Option<Role>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_address: Option<String>,
    #[serde(default)]
    pub line_items: Vec<LineItem>,
}

impl QuotationRecord {
    pub fn id_str(&self) -> Option<&str> {
        self.id.as_ref().map(QuotationId::as_str)
    }

    pub fn has_id(&self, id: &str) -> bool {
        self.id_str() == Some(id)
    }

    /// Sums `(hours, cost)` over the current line items.
    pub fn line_item_totals(&self) -> (Decimal, Decimal) {
        sum_line_items(&self.line_items)
    }

    pub fn totals_match_line_items(&self) -> bool {
        self.line_item_totals() == (self.estimated_hours, self.total_cost)
    }
}

pub fn sum_line_items(items: &[LineItem]) -> (Decimal, Decimal) {
    items.iter().fold((Decimal::ZERO, Decimal::ZERO), |(hours, cost), item| {
        (hours + item.hours.unwrap_or(Decimal::ZERO), cost + item.cost)
    })
}
