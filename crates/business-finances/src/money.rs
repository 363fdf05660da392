//! Cent-precision money arithmetic
//!
//! Every monetary value in the report is a `rust_decimal::Decimal` rounded
//! to two decimal places. Rounding happens at every aggregation step, not
//! just at output, so error can never accumulate beyond one cent per leaf.

use rust_decimal::{Decimal, RoundingStrategy};

/// Monetary amount in the books' currency
pub type Money = Decimal;

/// Round to cents, midpoints away from zero (120.555 -> 120.56)
pub fn round_cents(amount: Money) -> Money {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Add an amount into a running total, keeping the total at cent precision
pub fn add_cents(total: Money, amount: Money) -> Money {
    round_cents(total + amount)
}

/// Render an amount with exactly two decimal places
pub fn fmt_cents(amount: Money) -> String {
    format!("{:.2}", amount)
}
