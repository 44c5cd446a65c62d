//! Schedule of Rates retrieval through the prediction endpoint.
//!
//! The endpoint is asked for a JSON array but frequently answers in prose, so parsing
//! tries JSON first and then falls back to pulling labelled fields out of text sections.

use std::str::FromStr;
use std::sync::{Arc, LazyLock};

use regex::Regex;
use rust_decimal::Decimal;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use quotecanvas_core::domain::role::Role;
use quotecanvas_core::domain::sor::RatedItem;

use crate::prediction::{PredictionClient, ResponseFormat};

struct SectionPatterns {
    delimiter: Regex,
    item_code: Regex,
    description: Regex,
    unit: Regex,
    labelled_rate: Regex,
    currency_rate: Regex,
}

impl SectionPatterns {
    fn compile() -> Result<Self, regex::Error> {
        Ok(Self {
            delimiter: Regex::new(r"(?i)\n\n|\n###|\n\*\*|\nItem \d+|\n[A-Za-z]+ Point")?,
            item_code: Regex::new(r"(?i)(?:Item Code|Code):\s*([A-Za-z0-9-]+)")?,
            description: Regex::new(r"(?i)(?:Description(?: of Works)?|Works):\s*([^\n]+)")?,
            unit: Regex::new(r"(?i)Unit:\s*([^\n]+)")?,
            labelled_rate: Regex::new(r"(?i)Rate:\s*(?:SGD|S\$|\$)?\s*([0-9.]+)")?,
            currency_rate: Regex::new(r"(?i)(?:SGD|S\$|\$)\s*([0-9.]+)")?,
        })
    }
}

static SECTION_PATTERNS: LazyLock<Result<SectionPatterns, regex::Error>> =
    LazyLock::new(SectionPatterns::compile);

pub fn sor_prompt(requirements: &str) -> String {
    format!(
        r#"Search the Schedule of Rates (SOR) database and return the most relevant item(s) based on the following requirements:

{requirements}

IMPORTANT: Return the results in a structured JSON array format, with each item containing these exact fields:
[
  {{
    "itemCode": "SME-1-1-6",
    "description": "Wiring of 2 x 1.5mm sq. PVC cable to lighting point",
    "unit": "No",
    "rate": 162.00
  }},
  {{
    "itemCode": "...",
    "description": "...",
    "unit": "...",
    "rate": ...
  }}
]"#
    )
}

pub struct SorRetriever {
    client: Arc<dyn PredictionClient>,
    session_id: String,
}

impl SorRetriever {
    pub fn new(client: Arc<dyn PredictionClient>) -> Self {
        Self { client, session_id: Role::Requestor.session_key().to_string() }
    }

    /// Never fails: transport or parse trouble yields an empty list.
    pub async fn fetch_rated_items(&self, requirements: &str) -> Vec<RatedItem> {
        let reply = match self
            .client
            .predict(&sor_prompt(requirements), &self.session_id, ResponseFormat::Json)
            .await
        {
            Ok(reply) => reply,
            Err(error) => {
                warn!(
                    event_name = "sor.retrieval.failed",
                    error = %error,
                    "schedule of rates lookup failed"
                );
                return Vec::new();
            }
        };

        let items = parse_sor_response(&reply);
        debug!(event_name = "sor.retrieval.parsed", count = items.len(), "rated items parsed");
        items
    }
}

pub fn parse_sor_response(text: &str) -> Vec<RatedItem> {
    if let Some(items) = parse_json_items(text) {
        return items;
    }
    parse_text_sections(text)
}

fn parse_json_items(text: &str) -> Option<Vec<RatedItem>> {
    let value: Value = serde_json::from_str(text).ok()?;
    let entries = match &value {
        Value::Array(entries) => entries,
        Value::Object(object) => match object.get("items") {
            Some(Value::Array(entries)) => entries,
            _ => return None,
        },
        _ => return None,
    };

    let empty = Map::new();
    Some(
        entries
            .iter()
            .map(|entry| {
                let fields = entry.as_object().unwrap_or(&empty);
                let unit = first_text(fields, &["unit"]);
                RatedItem::new(
                    first_text(fields, &["itemCode", "item_code"]),
                    first_text(fields, &["description", "description_of_works"]),
                    if unit.is_empty() { RatedItem::DEFAULT_UNIT.to_string() } else { unit },
                    parse_rate(&fields.get("rate").map(value_text).unwrap_or_default()),
                )
            })
            .collect(),
    )
}

fn parse_text_sections(text: &str) -> Vec<RatedItem> {
    let patterns = match SECTION_PATTERNS.as_ref() {
        Ok(patterns) => patterns,
        Err(error) => {
            warn!(event_name = "sor.parse.patterns_invalid", error = %error, "text parsing disabled");
            return Vec::new();
        }
    };

    patterns
        .delimiter
        .split(text)
        .filter(|section| !section.is_empty())
        .filter_map(|section| {
            let item_code = capture(&patterns.item_code, section)?;
            let rate = capture(&patterns.labelled_rate, section)
                .or_else(|| capture(&patterns.currency_rate, section))?;

            let description = capture(&patterns.description, section)
                .map(|description| description.trim().to_string())
                .unwrap_or_else(|| item_code.to_string());
            let unit = capture(&patterns.unit, section)
                .map(|unit| unit.trim().to_string())
                .unwrap_or_else(|| RatedItem::DEFAULT_UNIT.to_string());

            Some(RatedItem::new(item_code, description, unit, parse_rate(rate)))
        })
        .collect()
}

fn capture<'t>(pattern: &Regex, section: &'t str) -> Option<&'t str> {
    pattern.captures(section).and_then(|captures| captures.get(1)).map(|m| m.as_str())
}

/// First non-empty value among `keys`, rendered as text.
fn first_text(fields: &Map<String, Value>, keys: &[&str]) -> String {
    keys.iter()
        .filter_map(|key| fields.get(*key))
        .map(value_text)
        .find(|text| !text.is_empty())
        .unwrap_or_default()
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Number(number) => number.to_string(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Keeps digits and dots, then reads the leading number; anything unreadable is zero.
fn parse_rate(raw: &str) -> Decimal {
    let mut seen_dot = false;
    let numeric: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .take_while(|c| {
            if *c != '.' {
                return true;
            }
            let first = !seen_dot;
            seen_dot = true;
            first
        })
        .collect();

    let numeric = numeric.trim_end_matches('.');
    let numeric = if numeric.starts_with('.') { format!("0{numeric}") } else { numeric.to_string() };
    Decimal::from_str(&numeric).unwrap_or(Decimal::ZERO)
}
