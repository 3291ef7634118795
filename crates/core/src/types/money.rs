//! Minor-currency-unit conversions and payout arithmetic.
//!
//! Stripe amounts are integer minor units (cents for USD). WooCommerce
//! totals arrive as decimal strings. All conversions round down: the
//! platform absorbs sub-cent remainders, recipients are never overpaid.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

/// Fraction of each line item's total paid out to its recipient.
/// The remainder is retained as the platform fee.
pub const PAYOUT_FRACTION: Decimal = Decimal::from_parts(9, 0, 0, false, 1); // 0.9

/// Convert a decimal major-unit amount to integer minor units, rounding
/// down. Returns `None` when the amount does not fit in `i64`.
#[must_use]
pub fn minor_units(amount: Decimal) -> Option<i64> {
    (amount * Decimal::ONE_HUNDRED).floor().to_i64()
}

/// A line item's payout share in minor units: `floor(total * 0.9 * 100)`.
///
/// Non-finite or out-of-range inputs yield 0, which the settlement
/// fan-out skips.
#[must_use]
pub fn payout_share_minor_units(line_total: Decimal) -> i64 {
    minor_units(line_total * PAYOUT_FRACTION).unwrap_or(0)
}
