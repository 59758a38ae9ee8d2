//! Order pricing.
//!
//! Orders of [`BULK_THRESHOLD`] codes or more get a fixed discount off the per-code price. Totals are computed in
//! whole cents so no rounding is ever needed.
//!
//! Note that the discount is applied to *every* code in a bulk order, so with a base price below the threshold
//! value, a 25-code order costs less than a 24-code one. The total is non-decreasing within each tier.
use serde::{Deserialize, Serialize};

use crate::db_types::Money;

pub const BULK_THRESHOLD: i64 = 25;
pub const BULK_DISCOUNT: Money = Money::from_units(1);
/// The most codes a single order may ask for.
pub const MAX_ORDER_QUANTITY: i64 = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceSchedule {
    pub base_unit_price: Money,
    pub bulk_threshold: i64,
    pub bulk_discount: Money,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    pub quantity: i64,
    pub unit_price: Money,
    pub total: Money,
}

impl PriceSchedule {
    pub fn new(base_unit_price: Money) -> Self {
        Self { base_unit_price, bulk_threshold: BULK_THRESHOLD, bulk_discount: BULK_DISCOUNT }
    }

    /// The per-code price for the given quantity. Never negative.
    pub fn unit_price(&self, quantity: i64) -> Money {
        if quantity >= self.bulk_threshold {
            self.base_unit_price.saturating_sub(self.bulk_discount)
        } else {
            self.base_unit_price
        }
    }

    /// `None` unless `quantity` is between 1 and [`MAX_ORDER_QUANTITY`] and the total fits in [`Money`].
    pub fn quote(&self, quantity: i64) -> Option<Quote> {
        if !(1..=MAX_ORDER_QUANTITY).contains(&quantity) {
            return None;
        }
        let unit_price = self.unit_price(quantity);
        let total = unit_price.checked_mul(quantity)?;
        Some(Quote { quantity, unit_price, total })
    }
}

/// Shorthand for quoting against the default schedule.
pub fn quote(quantity: i64, base_unit_price: Money) -> Option<Quote> {
    PriceSchedule::new(base_unit_price).quote(quantity)
}
