//! Printable HTML rendering of a quotation.

use std::collections::HashMap;
use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;
use tera::{Context, Tera};
use thiserror::Error;

use crate::domain::quotation::QuotationRecord;
use crate::generator::rate_card::CLIENT_DIRECTORY;

const TEMPLATE_NAME: &str = "print_view.html";
const GST_PERCENT: u32 = 9;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("template error: {0}")]
    Template(String),
}

#[derive(Clone, Debug, Serialize)]
pub struct Letterhead {
    pub company: &'static str,
    pub address: &'static str,
    pub contact: &'static str,
    pub registration: &'static str,
}

pub const LETTERHEAD: Letterhead = Letterhead {
    company: "Kim Yew Integrated Pte. Ltd.",
    address: "134 Tagore Lane, Singapore 787557",
    contact: "Tel: 6466 4211 (7 lines) | Fax: 6235 3639 | Email: kimyewint@kimyew.com.sg",
    registration: "GST Regn. No: 199606507M | www.kimyew.com.sg",
};

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PrintLine {
    pub sor: String,
    pub description: String,
    pub unit: String,
    pub quantity: Decimal,
    pub rate: Decimal,
    pub amount: Decimal,
}

/// Flattened view of a quotation with every fallback already applied.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PrintDocument {
    pub quote_no: String,
    pub date: String,
    pub status: &'static str,
    pub client_name: String,
    pub client_address: Vec<String>,
    pub title: String,
    pub lines: Vec<PrintLine>,
    pub subtotal: Decimal,
    pub gst_percent: u32,
    pub gst: Decimal,
    pub total: Decimal,
    pub total_in_words: String,
    pub approver_notes: Option<String>,
}

impl PrintDocument {
    pub fn from_record(record: &QuotationRecord) -> Self {
        let fallback_client = CLIENT_DIRECTORY[0];
        let lines = record
            .line_items
            .iter()
            .enumerate()
            .map(|(index, item)| PrintLine {
                sor: item.sor.clone().unwrap_or_else(|| format!("SME-{}-1-5", index + 1)),
                description: item.description.clone().unwrap_or_else(|| item.item.clone()),
                unit: item.unit.clone().unwrap_or_else(|| "No".to_string()),
                quantity: item.quantity.unwrap_or(Decimal::ONE),
                rate: item.rate,
                amount: item.cost,
            })
            .collect();

        let subtotal = record.total_cost;
        let gst = (subtotal * Decimal::from(GST_PERCENT) / Decimal::from(100))
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        let total = subtotal + gst;

        Self {
            quote_no: record.id_str().unwrap_or("DRAFT").to_string(),
            date: record
                .created_at
                .map(|created_at| created_at.format("%d %b %Y").to_string())
                .unwrap_or_default(),
            status: record.status.label(),
            client_name: record
                .client_name
                .clone()
                .unwrap_or_else(|| fallback_client.name.to_string())
                .to_uppercase(),
            client_address: record
                .client_address
                .as_deref()
                .unwrap_or(fallback_client.address)
                .split(", ")
                .map(str::to_string)
                .collect(),
            title: record.title.clone(),
            lines,
            subtotal,
            gst_percent: GST_PERCENT,
            gst,
            total,
            total_in_words: amount_in_words(total),
            approver_notes: record.approver_notes.clone(),
        }
    }
}

pub struct PrintView {
    tera: Tera,
}

impl PrintView {
    pub fn new() -> Result<Self, ExportError> {
        let mut tera = Tera::default();
        tera.register_filter("money", money_filter);
        tera.add_raw_template(TEMPLATE_NAME, include_str!("../templates/print_view.html"))
            .map_err(|error| ExportError::Template(error.to_string()))?;
        Ok(Self { tera })
    }

    pub fn render(&self, record: &QuotationRecord) -> Result<String, ExportError> {
        let mut context = Context::new();
        context.insert("doc", &PrintDocument::from_record(record));
        context.insert("letterhead", &LETTERHEAD);

        self.tera
            .render(TEMPLATE_NAME, &context)
            .map_err(|error| ExportError::Template(error.to_string()))
    }
}

/// Formats a number or numeric string with two decimals. Usage: `amount | money`
fn money_filter(
    value: &tera::Value,
    _args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let amount = match value {
        tera::Value::String(raw) => Decimal::from_str(raw).unwrap_or(Decimal::ZERO),
        tera::Value::Number(number) => {
            Decimal::from_str(&number.to_string()).unwrap_or(Decimal::ZERO)
        }
        _ => Decimal::ZERO,
    };
    Ok(tera::Value::String(format!(
        "{:.2}",
        amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
    )))
}

/// "Singapore Dollar 1,234 Dollars And 56 Cents Only"
pub fn amount_in_words(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let dollars = rounded.trunc();
    let cents = ((rounded - dollars) * Decimal::from(100)).trunc();
    format!(
        "Singapore Dollar {} Dollars And {} Cents Only",
        group_thousands(&dollars.to_string()),
        cents
    )
}

fn group_thousands(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, digit) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    grouped
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use rust_decimal::Decimal;

    use super::{amount_in_words, PrintDocument, PrintView};
    use crate::domain::quotation::{LineItem, QuotationId, QuotationRecord, QuotationStatus};

    fn record() -> QuotationRecord {
        QuotationRecord {
            id: Some(QuotationId("QT-2026-0415".to_string())),
            title: "Lobby <deep> cleaning".to_string(),
            description: "Lobby deep cleaning for two towers.".to_string(),
            estimated_hours: Decimal::from(2),
            total_cost: Decimal::from(1_150),
            status: QuotationStatus::Approved,
            approver_notes: Some("Within budget".to_string()),
            created_by: Some("Requestor".to_string()),
            owner_role: None,
            created_at: Some(Utc.with_ymd_and_hms(2026, 4, 15, 8, 0, 0).unwrap()),
            client_name: Some("Alexandra Hospital".to_string()),
            client_address: Some("378 Alexandra Road, Singapore 159964".to_string()),
            line_items: vec![
                LineItem {
                    item: "Deep Cleaning".to_string(),
                    description: None,
                    sor: None,
                    unit: None,
                    quantity: None,
                    hours: Some(Decimal::from(2)),
                    rate: Decimal::from(75),
                    cost: Decimal::from(150),
                },
                LineItem {
                    item: "Scrub atrium floor".to_string(),
                    description: Some("Scrub atrium floor".to_string()),
                    sor: Some("CL-210".to_string()),
                    unit: Some("m2".to_string()),
                    quantity: Some(Decimal::from(100)),
                    hours: None,
                    rate: Decimal::from(10),
                    cost: Decimal::from(1_000),
                },
            ],
        }
    }

    #[test]
    fn document_applies_fallbacks_and_gst() {
        let document = PrintDocument::from_record(&record());

        assert_eq!(document.lines[0].sor, "SME-1-1-5");
        assert_eq!(document.lines[0].unit, "No");
        assert_eq!(document.lines[0].quantity, Decimal::ONE);
        assert_eq!(document.lines[0].description, "Deep Cleaning");
        assert_eq!(document.lines[1].sor, "CL-210");
        assert_eq!(document.gst, Decimal::new(10_350, 2));
        assert_eq!(document.total, Decimal::new(125_350, 2));
        assert_eq!(document.client_name, "ALEXANDRA HOSPITAL");
        assert_eq!(document.client_address, vec!["378 Alexandra Road", "Singapore 159964"]);
        assert_eq!(document.date, "15 Apr 2026");
    }

    #[test]
    fn words_group_thousands_and_cents() {
        assert_eq!(
            amount_in_words(Decimal::new(125_350, 2)),
            "Singapore Dollar 1,253 Dollars And 50 Cents Only"
        );
        assert_eq!(
            amount_in_words(Decimal::new(123_456_789, 2)),
            "Singapore Dollar 1,234,567 Dollars And 89 Cents Only"
        );
        assert_eq!(amount_in_words(Decimal::from(95)), "Singapore Dollar 95 Dollars And 0 Cents Only");
    }

    #[test]
    fn render_produces_escaped_html() {
        let view = PrintView::new().expect("template compiles");
        let html = view.render(&record()).expect("render");

        assert!(html.contains("QT-2026-0415"));
        assert!(html.contains("$1253.50"));
        assert!(html.contains("$103.50"));
        assert!(html.contains("Lobby &lt;deep&gt; cleaning"));
        assert!(html.contains("Within budget"));
        assert!(html.contains("<td class=\"centre\">100.00</td>"));
    }
}
