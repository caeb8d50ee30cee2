//! Coupon Model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Coupon type enum
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CouponType {
    Voucher,
    ShopVoucher,
    FreeShip,
    Combo,
    Event,
}

/// Discount kind enum
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiscountKind {
    Percent,
    Fixed,
    FreeShip,
    Cashback,
}

/// Discount definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Discount {
    pub kind: DiscountKind,
    /// Percent: 20 = 20%. Fixed/cashback: amount in currency unit.
    pub value: f64,
    /// Cap on the computed discount amount
    pub max_discount: Option<f64>,
    /// Minimum eligible order value required to apply
    pub min_order_value: Option<f64>,
}

/// Seller/product/category restriction
///
/// All fields unset means the coupon applies to the whole order.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CouponScope {
    pub seller_id: Option<String>,
    #[serde(default)]
    pub products: Vec<String>,
    #[serde(default)]
    pub categories: Vec<String>,
}

impl CouponScope {
    pub fn is_unrestricted(&self) -> bool {
        self.seller_id.is_none() && self.products.is_empty() && self.categories.is_empty()
    }
}

/// A single behavioral condition on a coupon
///
/// `rule` is the stored rule name (e.g. "min_completed_orders"); the
/// engine parses it against the closed rule-type set and fails closed on
/// unknown names. `value` is the comparison operand, shape depending on
/// the rule (number, boolean).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CouponCondition {
    pub rule: String,
    #[serde(default)]
    pub value: serde_json::Value,
}

/// Redemption limits (absent = unlimited)
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UsageLimits {
    pub usage_limit: Option<u32>,
    pub per_user_limit: Option<u32>,
}

/// Coupon entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Coupon {
    pub id: String,
    pub code: String,
    pub coupon_type: CouponType,
    pub discount: Discount,
    #[serde(default)]
    pub scope: CouponScope,
    /// Ordered condition list, combined with logical AND
    #[serde(default)]
    pub conditions: Vec<CouponCondition>,
    #[serde(default)]
    pub limits: UsageLimits,
    /// Empty set = open to all non-excluded users
    #[serde(default)]
    pub eligible_users: Vec<String>,
    /// Takes precedence over `eligible_users`
    #[serde(default)]
    pub excluded_users: Vec<String>,
    /// Activation window: [start_at, end_at)
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    pub created_at: Option<DateTime<Utc>>,
}

fn default_true() -> bool {
    true
}

impl Coupon {
    /// Check definition invariants
    ///
    /// Returns the first violated invariant as a message. A violation is
    /// a configuration error, not a user-facing validation failure.
    pub fn validate_config(&self) -> Result<(), String> {
        if self.start_at >= self.end_at {
            return Err(format!(
                "coupon {}: start_at must be before end_at",
                self.code
            ));
        }
        match self.discount.kind {
            DiscountKind::Percent => {
                if self.discount.value <= 0.0 || self.discount.value > 100.0 {
                    return Err(format!(
                        "coupon {}: percent value must be in (0, 100], got {}",
                        self.code, self.discount.value
                    ));
                }
            }
            DiscountKind::Fixed | DiscountKind::Cashback => {
                if self.discount.value <= 0.0 {
                    return Err(format!(
                        "coupon {}: {:?} value must be positive, got {}",
                        self.code, self.discount.kind, self.discount.value
                    ));
                }
            }
            // Free-ship discounts derive their amount from the shipping
            // fee; the stored value is not used.
            DiscountKind::FreeShip => {}
        }
        if let Some(max) = self.discount.max_discount
            && max < 0.0
        {
            return Err(format!("coupon {}: max_discount must not be negative", self.code));
        }
        if let Some(min) = self.discount.min_order_value
            && min < 0.0
        {
            return Err(format!(
                "coupon {}: min_order_value must not be negative",
                self.code
            ));
        }
        Ok(())
    }
}
