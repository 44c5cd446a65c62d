pub mod rate_card;

use std::collections::HashSet;

use chrono::{DateTime, Datelike, Utc};
use rand::Rng;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::domain::quotation::{sum_line_items, LineItem, QuotationId, QuotationRecord, QuotationStatus};
use crate::domain::role::Role;
use crate::domain::sor::RatedItem;
use crate::errors::DomainError;

use rate_card::{base_hour_rate, category_line_description, CLIENT_DIRECTORY, FALLBACK_TITLE};

const ID_SPACE: u16 = 10_000;
const MAX_RANDOM_ID_DRAWS: usize = 32;
/// Randomised quantities are drawn in tenths from this range (0.5..=2.5).
const QUANTITY_TENTHS: std::ops::RangeInclusive<i64> = 5..=25;
const MIN_QUANTITY: Decimal = Decimal::from_parts(5, 0, 0, false, 1);
const MAX_QUANTITY: Decimal = Decimal::from_parts(25, 0, 0, false, 1);

#[derive(Clone, Debug, Default, PartialEq)]
pub struct GenerationRequest {
    pub requirements: String,
    pub categories: Vec<String>,
    /// Rated items; only the ones marked selected become line items.
    pub rated_items: Vec<RatedItem>,
    pub created_by: Option<String>,
    pub owner_role: Option<Role>,
}

impl GenerationRequest {
    pub fn selected_rated_items(&self) -> impl Iterator<Item = &RatedItem> {
        self.rated_items.iter().filter(|item| item.selected)
    }
}

/// Turns requirements and selections into a priced draft quotation.
pub struct QuotationGenerator<R> {
    rng: R,
}

impl<R> QuotationGenerator<R>
where
    R: Rng,
{
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    pub fn generate(
        &mut self,
        request: &GenerationRequest,
        existing_ids: &HashSet<QuotationId>,
        now: DateTime<Utc>,
    ) -> Result<QuotationRecord, DomainError> {
        let client = CLIENT_DIRECTORY[self.rng.gen_range(0..CLIENT_DIRECTORY.len())];

        let selected: Vec<&RatedItem> = request.selected_rated_items().collect();
        let line_items = if selected.is_empty() {
            request
                .categories
                .iter()
                .map(|category| self.category_line(category, &request.requirements))
                .collect::<Vec<_>>()
        } else {
            selected.into_iter().map(|item| self.rated_line(item)).collect()
        };

        let (estimated_hours, total_cost) = sum_line_items(&line_items);
        let id = self.allocate_id(now.year(), existing_ids)?;

        Ok(QuotationRecord {
            id: Some(id),
            title: derive_title(&request.requirements),
            description: request.requirements.clone(),
            estimated_hours,
            total_cost,
            status: QuotationStatus::Draft,
            approver_notes: None,
            created_by: request.created_by.clone(),
            owner_role: request.owner_role,
            created_at: Some(now),
            client_name: Some(client.name.to_string()),
            client_address: Some(client.address.to_string()),
            line_items,
        })
    }

    fn random_quantity(&mut self) -> Decimal {
        Decimal::new(self.rng.gen_range(QUANTITY_TENTHS), 1)
    }

    fn rated_line(&mut self, item: &RatedItem) -> LineItem {
        let quantity = match item.quantity {
            Some(quantity) => quantity,
            None => self.random_quantity(),
        };

        LineItem {
            item: item.description.clone(),
            description: Some(item.description.clone()),
            sor: Some(item.item_code.clone()),
            unit: Some(item.unit.clone()),
            quantity: Some(quantity),
            hours: Some(round_whole(quantity)),
            rate: item.rate,
            cost: round_whole(item.rate * quantity),
        }
    }

    fn category_line(&mut self, category: &str, requirements: &str) -> LineItem {
        let rate = base_hour_rate(category);
        // Longer requirements read as more complex work.
        let complexity = Decimal::from(requirements.chars().count()) / Decimal::from(100);
        let factor = Decimal::new(8, 1) + complexity * Decimal::new(4, 1);

        let quantity = (self.random_quantity() * factor)
            .round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero)
            .clamp(MIN_QUANTITY, MAX_QUANTITY);
        let hours = (quantity * Decimal::from(8) * factor).ceil();

        LineItem {
            item: category.to_string(),
            description: Some(category_line_description(category)),
            sor: None,
            unit: None,
            quantity: Some(quantity),
            hours: Some(hours),
            rate,
            cost: round_whole(rate * quantity),
        }
    }

    /// Random four-digit suffix, redrawn on collision, then probed sequentially.
    fn allocate_id(
        &mut self,
        year: i32,
        existing_ids: &HashSet<QuotationId>,
    ) -> Result<QuotationId, DomainError> {
        for _ in 0..MAX_RANDOM_ID_DRAWS {
            let candidate = QuotationId::new(year, self.rng.gen_range(0..ID_SPACE));
            if !existing_ids.contains(&candidate) {
                return Ok(candidate);
            }
        }

        (0..ID_SPACE)
            .map(|sequence| QuotationId::new(year, sequence))
            .find(|candidate| !existing_ids.contains(candidate))
            .ok_or_else(|| {
                DomainError::InvariantViolation(format!("no quotation ids left for year {year}"))
            })
    }
}

pub fn derive_title(requirements: &str) -> String {
    let first_sentence = requirements.split('.').next().unwrap_or_default().trim();
    let length = first_sentence.chars().count();
    if (5..100).contains(&length) {
        first_sentence.to_string()
    } else {
        FALLBACK_TITLE.to_string()
    }
}

fn round_whole(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}
