use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A Schedule of Rates entry as retrieved for a set of requirements. `selected`
/// and `quantity` are working state owned by the quotation workspace.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatedItem {
    pub item_code: String,
    pub description: String,
    pub unit: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub rate: Decimal,
    #[serde(default)]
    pub selected: bool,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "rust_decimal::serde::float_option"
    )]
    pub quantity: Option<Decimal>,
}

impl RatedItem {
    pub const DEFAULT_UNIT: &'static str = "No";

    pub fn new(
        item_code: impl Into<String>,
        description: impl Into<String>,
        unit: impl Into<String>,
        rate: Decimal,
    ) -> Self {
        Self {
            item_code: item_code.into(),
            description: description.into(),
            unit: unit.into(),
            rate,
            selected: false,
            quantity: None,
        }
    }

    pub fn selected_with(mut self, quantity: Option<Decimal>) -> Self {
        self.selected = true;
        self.quantity = quantity;
        self
    }
}
