//! Money calculation utilities using rust_decimal for precision
//!
//! All calculations are done using `Decimal` internally, then converted to `f64`
//! for storage/serialization.

use rust_decimal::prelude::*;

/// Rounding strategy for monetary values (2 decimal places, half-up)
const DECIMAL_PLACES: u32 = 2;

/// Maximum allowed unit price (yen)
pub const MAX_PRICE: f64 = 1_000_000.0;
/// Maximum allowed quantity per line
pub const MAX_QUANTITY: u32 = 999;

#[inline]
pub fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_default()
}

#[inline]
pub fn to_f64(value: Decimal) -> f64 {
    value
        .round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
        .to_f64()
        .unwrap_or_default()
}

/// `(unit_price + Σ topping prices) × quantity`
pub fn line_total<I>(unit_price: f64, topping_prices: I, quantity: u32) -> f64
where
    I: IntoIterator<Item = f64>,
{
    let toppings: Decimal = topping_prices.into_iter().map(to_decimal).sum();
    to_f64((to_decimal(unit_price) + toppings) * Decimal::from(quantity))
}

/// Sum of already computed amounts
pub fn sum<I>(amounts: I) -> f64
where
    I: IntoIterator<Item = f64>,
{
    to_f64(amounts.into_iter().map(to_decimal).sum())
}

/// Price sanity check shared by catalog writes
pub fn is_valid_price(price: f64) -> bool {
    price.is_finite() && (0.0..=MAX_PRICE).contains(&price)
}

/// `a >= b` with cent tolerance
pub fn covers(paid: f64, due: f64) -> bool {
    to_decimal(paid) + Decimal::new(1, 3) >= to_decimal(due)
}
