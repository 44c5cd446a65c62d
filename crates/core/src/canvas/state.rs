use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::canvas::action::{CanvasAction, CanvasPayload, ChartKind, DataType, Location};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CanvasTab {
    #[default]
    Data,
    Map,
    Calendar,
    Quotation,
}

impl CanvasTab {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Data => "data",
            Self::Map => "map",
            Self::Calendar => "calendar",
            Self::Quotation => "quotation",
        }
    }
}

/// Quotation request handed to the canvas quotation tab.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuotationIntent {
    pub requirements: String,
    pub categories: Vec<String>,
    pub quote_type: Option<String>,
    pub summary: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanvasState {
    pub active_tab: CanvasTab,
    pub visualization_type: Option<ChartKind>,
    pub data_type: Option<DataType>,
    pub selected_location: Option<Location>,
    pub selected_date: Option<NaiveDate>,
    pub data_filters: BTreeMap<String, serde_json::Value>,
    pub quotation_data: Option<QuotationIntent>,
}

impl Default for CanvasState {
    fn default() -> Self {
        Self {
            active_tab: CanvasTab::Data,
            visualization_type: Some(ChartKind::Bar),
            data_type: Some(DataType::Revenue),
            selected_location: None,
            selected_date: None,
            data_filters: BTreeMap::new(),
            quotation_data: None,
        }
    }
}

impl CanvasState {
    pub fn apply(&mut self, action: &CanvasAction) {
        match &action.payload {
            CanvasPayload::Visualization { chart, data_type, .. } => {
                self.active_tab = CanvasTab::Data;
                self.visualization_type = Some(*chart);
                self.data_type = Some(*data_type);
            }
            CanvasPayload::PositionChange { location } => {
                self.active_tab = CanvasTab::Map;
                if let Some(location) = location {
                    self.selected_location = Some(location.clone());
                }
            }
            CanvasPayload::DateSelection { date } => {
                self.active_tab = CanvasTab::Calendar;
                if let Some(date) = date {
                    self.selected_date = Some(*date);
                }
            }
            CanvasPayload::DataUpdate { filter, value, data_type, .. } => {
                self.data_filters.insert(filter.clone(), value.clone());
                if let Some(data_type) = data_type {
                    self.data_type = Some(*data_type);
                }
            }
            CanvasPayload::QuotationGeneration { requirements, categories, quote_type, summary } => {
                self.active_tab = CanvasTab::Quotation;
                self.quotation_data = Some(QuotationIntent {
                    requirements: requirements.clone(),
                    categories: categories.clone(),
                    quote_type: quote_type.clone(),
                    summary: summary.clone(),
                });
            }
            CanvasPayload::Selection { .. } => {}
        }
    }
}
