//! Discount Calculator
//!
//! Turns a validated coupon and the eligible order value into a concrete
//! discount amount and final price. Uses rust_decimal for precise
//! calculations, stores as f64.

use rust_decimal::prelude::*;
use shared::{Discount, DiscountKind, RejectionReason};

/// Rounding strategy for monetary values (2 decimal places, half-up)
const DECIMAL_PLACES: u32 = 2;

/// Convert f64 to Decimal for calculation
#[inline]
fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or_default()
}

/// Convert Decimal back to f64 for storage, rounded to 2 decimal places
#[inline]
fn to_f64(value: Decimal) -> f64 {
    value
        .round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
        .to_f64()
        .unwrap_or_default()
}

/// Computed discount outcome
///
/// `final_price` is the merchandise value after the discount. Free-ship
/// discounts apply to shipping and cashback is credited post-order, so
/// both leave it at the undiscounted eligible value.
#[derive(Debug, Clone, PartialEq)]
pub struct DiscountQuote {
    pub discount: f64,
    pub final_price: f64,
}

/// Compute the discount for an eligible order value
///
/// `shipping_fee` is externally supplied and only consulted for the
/// free-ship kind. Fails with BelowMinOrderValue when the eligible value
/// does not reach the coupon minimum.
pub fn compute_discount(
    discount: &Discount,
    eligible_value: f64,
    shipping_fee: f64,
) -> Result<DiscountQuote, RejectionReason> {
    if let Some(min) = discount.min_order_value
        && eligible_value < min
    {
        return Err(RejectionReason::BelowMinOrderValue);
    }

    let eligible = to_decimal(eligible_value);
    let value = to_decimal(discount.value);

    let quote = match discount.kind {
        DiscountKind::Percent => {
            let raw = eligible * value / Decimal::ONE_HUNDRED;
            let amount = match discount.max_discount {
                Some(max) => raw.min(to_decimal(max)),
                None => raw,
            };
            DiscountQuote {
                discount: to_f64(amount),
                final_price: to_f64(eligible - amount),
            }
        }
        DiscountKind::Fixed => {
            // A fixed discount never exceeds the value it applies to
            let amount = value.min(eligible);
            DiscountQuote {
                discount: to_f64(amount),
                final_price: to_f64((eligible - amount).max(Decimal::ZERO)),
            }
        }
        DiscountKind::FreeShip => {
            let shipping = to_decimal(shipping_fee);
            let amount = match discount.max_discount {
                Some(max) => shipping.min(to_decimal(max)),
                None => shipping,
            };
            // Applies to shipping; merchandise value is unchanged
            DiscountQuote {
                discount: to_f64(amount),
                final_price: to_f64(eligible),
            }
        }
        DiscountKind::Cashback => {
            // Credited post-order by an external ledger, not deducted
            // at checkout. Amount computed like percent.
            let raw = eligible * value / Decimal::ONE_HUNDRED;
            let amount = match discount.max_discount {
                Some(max) => raw.min(to_decimal(max)),
                None => raw,
            };
            DiscountQuote {
                discount: to_f64(amount),
                final_price: to_f64(eligible),
            }
        }
    };

    Ok(quote)
}
