use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionSource {
    Canvas,
    Chat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CanvasActionType {
    DataUpdate,
    Selection,
    Visualization,
    PositionChange,
    DateSelection,
    QuotationGeneration,
}

impl CanvasActionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DataUpdate => "data_update",
            Self::Selection => "selection",
            Self::Visualization => "visualization",
            Self::PositionChange => "position_change",
            Self::DateSelection => "date_selection",
            Self::QuotationGeneration => "quotation_generation",
        }
    }

    /// UI-only feedback types that stay out of the transcript under the strict policy.
    pub fn is_ui_feedback(&self) -> bool {
        matches!(self, Self::Visualization | Self::DateSelection | Self::PositionChange)
    }
}

impl fmt::Display for CanvasActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    #[default]
    Bar,
    Line,
    Area,
    Default,
}

impl ChartKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bar => "bar",
            Self::Line => "line",
            Self::Area => "area",
            Self::Default => "default",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    Sales,
    Users,
    Conversion,
    #[default]
    Revenue,
}

impl DataType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sales => "sales",
            Self::Users => "users",
            Self::Conversion => "conversion",
            Self::Revenue => "revenue",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub lat: f64,
    pub lng: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "type",
    content = "payload",
    rename_all = "snake_case",
    rename_all_fields = "camelCase"
)]
pub enum CanvasPayload {
    DataUpdate {
        filter: String,
        value: serde_json::Value,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        data_type: Option<DataType>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        description: Option<String>,
    },
    Selection {
        item: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        description: Option<String>,
    },
    Visualization {
        #[serde(rename = "type")]
        chart: ChartKind,
        data_type: DataType,
        description: String,
    },
    PositionChange {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        location: Option<Location>,
    },
    DateSelection {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        date: Option<NaiveDate>,
    },
    QuotationGeneration {
        #[serde(default)]
        requirements: String,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        categories: Vec<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        quote_type: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        summary: Option<String>,
    },
}

impl CanvasPayload {
    pub fn action_type(&self) -> CanvasActionType {
        match self {
            Self::DataUpdate { .. } => CanvasActionType::DataUpdate,
            Self::Selection { .. } => CanvasActionType::Selection,
            Self::Visualization { .. } => CanvasActionType::Visualization,
            Self::PositionChange { .. } => CanvasActionType::PositionChange,
            Self::DateSelection { .. } => CanvasActionType::DateSelection,
            Self::QuotationGeneration { .. } => CanvasActionType::QuotationGeneration,
        }
    }
}

/// A user intent flowing between the chat thread and the canvas. Built, handled once,
/// then dropped.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CanvasAction {
    #[serde(flatten)]
    pub payload: CanvasPayload,
    pub source: ActionSource,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub silent: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub confirmed: bool,
}

impl CanvasAction {
    pub fn new(payload: CanvasPayload, source: ActionSource) -> Self {
        Self { payload, source, silent: false, confirmed: false }
    }

    pub fn from_chat(payload: CanvasPayload) -> Self {
        Self::new(payload, ActionSource::Chat)
    }

    pub fn from_canvas(payload: CanvasPayload) -> Self {
        Self::new(payload, ActionSource::Canvas)
    }

    pub fn silenced(mut self) -> Self {
        self.silent = true;
        self
    }

    pub fn confirmed(mut self) -> Self {
        self.confirmed = true;
        self
    }

    pub fn action_type(&self) -> CanvasActionType {
        self.payload.action_type()
    }
}
