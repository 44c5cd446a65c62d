//! Translation between chat text and canvas actions.
//!
//! Intent detection is an ordered rule table: the first rule whose keywords appear in
//! the lower-cased text wins, so text mentioning several families resolves to the
//! earliest rule.

use crate::canvas::action::{CanvasAction, CanvasPayload, ChartKind, DataType};

pub struct IntentRule {
    pub name: &'static str,
    pub keywords: &'static [&'static str],
    build: fn(&str, &str) -> CanvasPayload,
}

impl IntentRule {
    pub fn matches(&self, lowered: &str) -> bool {
        self.keywords.iter().any(|keyword| lowered.contains(keyword))
    }

    pub fn build(&self, original: &str, lowered: &str) -> CanvasPayload {
        (self.build)(original, lowered)
    }
}

pub const INTENT_RULES: [IntentRule; 4] = [
    IntentRule {
        name: "visualization",
        keywords: &["chart", "graph", "data"],
        build: build_visualization,
    },
    IntentRule { name: "location", keywords: &["map", "location"], build: build_position },
    IntentRule {
        name: "schedule",
        keywords: &["calendar", "date", "schedule"],
        build: build_date_selection,
    },
    IntentRule {
        name: "quotation",
        keywords: &[
            "quotation",
            "quote",
            "proposal",
            "rfp",
            "facility",
            "maintenance",
            "cleaning",
            "repair",
        ],
        build: build_quotation,
    },
];

pub fn message_to_action(text: &str) -> Option<CanvasAction> {
    let lowered = text.to_lowercase();
    INTENT_RULES
        .iter()
        .find(|rule| rule.matches(&lowered))
        .map(|rule| CanvasAction::from_chat(rule.build(text, &lowered)))
}

pub fn action_to_message(action: &CanvasAction) -> String {
    match &action.payload {
        CanvasPayload::DataUpdate { description, .. } => format!(
            "Updated visualization with new data: {}",
            description.as_deref().unwrap_or("Data update")
        ),
        CanvasPayload::Selection { item, description } => match description {
            Some(description) => format!("Selected {item} ({description})"),
            None => format!("Selected {item}"),
        },
        CanvasPayload::Visualization { chart, data_type, .. } => format!(
            "Changed visualization to {} for {} data",
            chart.as_str(),
            data_type.as_str()
        ),
        CanvasPayload::PositionChange { location } => format!(
            "Moved to location: {}",
            location.as_ref().and_then(|location| location.name.as_deref()).unwrap_or("New location")
        ),
        CanvasPayload::DateSelection { date } => match date {
            Some(date) => format!("Selected date: {}", date.format("%Y-%m-%d")),
            None => "Selected date: New date".to_string(),
        },
        CanvasPayload::QuotationGeneration { requirements, summary, .. } => match summary {
            Some(summary) => summary.clone(),
            None => {
                let excerpt: String = requirements.chars().take(50).collect();
                format!("Created quotation from: {excerpt}...")
            }
        },
    }
}

fn build_visualization(_original: &str, lowered: &str) -> CanvasPayload {
    let chart = if lowered.contains("bar") {
        ChartKind::Bar
    } else if lowered.contains("line") {
        ChartKind::Line
    } else if lowered.contains("area") {
        ChartKind::Area
    } else {
        ChartKind::Default
    };

    let data_type = if lowered.contains("sales") {
        DataType::Sales
    } else if lowered.contains("user") {
        DataType::Users
    } else if lowered.contains("conversion") {
        DataType::Conversion
    } else {
        DataType::Revenue
    };

    CanvasPayload::Visualization {
        chart,
        data_type,
        description: format!("{} chart for {} data", chart.as_str(), data_type.as_str()),
    }
}

fn build_position(_original: &str, _lowered: &str) -> CanvasPayload {
    CanvasPayload::PositionChange { location: None }
}

fn build_date_selection(_original: &str, _lowered: &str) -> CanvasPayload {
    CanvasPayload::DateSelection { date: None }
}

fn build_quotation(original: &str, _lowered: &str) -> CanvasPayload {
    CanvasPayload::QuotationGeneration {
        requirements: original.to_string(),
        categories: Vec::new(),
        quote_type: None,
        summary: None,
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::{action_to_message, message_to_action, INTENT_RULES};
    use crate::canvas::action::{
        ActionSource, CanvasAction, CanvasActionType, CanvasPayload, ChartKind, DataType, Location,
    };

    #[test]
    fn bar_chart_of_sales_is_a_visualization() {
        let action = message_to_action("show me a bar chart of sales").expect("action");

        assert_eq!(action.source, ActionSource::Chat);
        assert_eq!(
            action.payload,
            CanvasPayload::Visualization {
                chart: ChartKind::Bar,
                data_type: DataType::Sales,
                description: "bar chart for sales data".to_string(),
            }
        );
    }

    #[test]
    fn greeting_yields_no_action() {
        assert!(message_to_action("hello").is_none());
        assert!(message_to_action("").is_none());
    }

    #[test]
    fn each_rule_fires_on_its_own_keywords() {
        let cases = [
            ("Plot a GRAPH please", CanvasActionType::Visualization),
            ("open the map", CanvasActionType::PositionChange),
            ("what is on my calendar", CanvasActionType::DateSelection),
            ("I need a quote for cleaning", CanvasActionType::QuotationGeneration),
            ("prepare an RFP", CanvasActionType::QuotationGeneration),
            ("repair the lift", CanvasActionType::QuotationGeneration),
        ];

        for (text, expected) in cases {
            let action = message_to_action(text).unwrap_or_else(|| panic!("no action for {text}"));
            assert_eq!(action.action_type(), expected, "{text}");
        }
    }

    #[test]
    fn earlier_rule_wins_on_ambiguous_text() {
        let action = message_to_action("schedule a data review at the location").expect("action");
        assert_eq!(action.action_type(), CanvasActionType::Visualization);

        let action = message_to_action("map out the maintenance schedule").expect("action");
        assert_eq!(action.action_type(), CanvasActionType::PositionChange);
        assert_eq!(INTENT_RULES[0].name, "visualization");
    }

    #[test]
    fn visualization_defaults_to_revenue_and_default_chart() {
        let action = message_to_action("show the data").expect("action");
        assert_eq!(
            action.payload,
            CanvasPayload::Visualization {
                chart: ChartKind::Default,
                data_type: DataType::Revenue,
                description: "default chart for revenue data".to_string(),
            }
        );

        let action = message_to_action("line chart of user growth").expect("action");
        assert!(matches!(
            action.payload,
            CanvasPayload::Visualization { chart: ChartKind::Line, data_type: DataType::Users, .. }
        ));
    }

    #[test]
    fn quotation_keeps_raw_text_as_requirements() {
        let text = "Need a Quote for facility maintenance.";
        let action = message_to_action(text).expect("action");
        assert!(matches!(
            action.payload,
            CanvasPayload::QuotationGeneration { ref requirements, .. } if requirements == text
        ));
    }

    #[test]
    fn messages_render_each_action_type() {
        let visualization = message_to_action("bar chart of conversion").expect("action");
        assert_eq!(
            action_to_message(&visualization),
            "Changed visualization to bar for conversion data"
        );

        let located = CanvasAction::from_canvas(CanvasPayload::PositionChange {
            location: Some(Location { lat: 1.3, lng: 103.8, name: Some("Toa Payoh".to_string()) }),
        });
        assert_eq!(action_to_message(&located), "Moved to location: Toa Payoh");

        let unnamed = CanvasAction::from_chat(CanvasPayload::PositionChange { location: None });
        assert_eq!(action_to_message(&unnamed), "Moved to location: New location");

        let dated = CanvasAction::from_canvas(CanvasPayload::DateSelection {
            date: NaiveDate::from_ymd_opt(2026, 7, 1),
        });
        assert_eq!(action_to_message(&dated), "Selected date: 2026-07-01");

        let selected = CanvasAction::from_canvas(CanvasPayload::Selection {
            item: "Q3".to_string(),
            description: Some("revenue bar".to_string()),
        });
        assert_eq!(action_to_message(&selected), "Selected Q3 (revenue bar)");

        let update = CanvasAction::from_canvas(CanvasPayload::DataUpdate {
            filter: "region".to_string(),
            value: serde_json::json!("north"),
            data_type: None,
            description: None,
        });
        assert_eq!(action_to_message(&update), "Updated visualization with new data: Data update");
    }

    #[test]
    fn quotation_message_truncates_requirements() {
        let requirements = "a".repeat(80);
        let action = CanvasAction::from_chat(CanvasPayload::QuotationGeneration {
            requirements,
            categories: Vec::new(),
            quote_type: None,
            summary: None,
        });
        assert_eq!(action_to_message(&action), format!("Created quotation from: {}...", "a".repeat(50)));
    }
}
