//! Number formatting for printed invoices

use rust_decimal::{Decimal, RoundingStrategy};
use shared::Amount;

/// Render a money value with exactly two fractional digits
///
/// Absent or unparsable values print as `0.00`.
pub fn format_money(amount: Amount) -> String {
    format_decimal(amount.value())
}

/// Round half away from zero to two places; zero never prints as `-0.00`
pub fn format_decimal(value: Decimal) -> String {
    let mut rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    if rounded.is_zero() {
        // avoid "-0.00"
        rounded = Decimal::ZERO;
    }
    format!("{:.2}", rounded)
}

/// Render a quantity without trailing zeros, `0` when absent
pub fn format_quantity(quantity: Amount) -> String {
    quantity.value().normalize().to_string()
}
