//! User Coupon Model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// User coupon lifecycle status
///
/// `Saved` is the only non-terminal state. Transitions:
/// - `Saved → Used` via a successful redemption commit
/// - `Saved → Expired` lazily at validation time
/// - `Saved → Invalid` when the parent coupon is deactivated
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserCouponStatus {
    Saved,
    Used,
    Expired,
    Invalid,
}

impl UserCouponStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, UserCouponStatus::Saved)
    }
}

/// A user's claim on a coupon instance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserCoupon {
    pub id: String,
    pub user_id: String,
    pub coupon_id: String,
    pub status: UserCouponStatus,
    pub saved_at: DateTime<Utc>,
    pub used_at: Option<DateTime<Utc>>,
    /// Claim-level expiry; the parent coupon window applies on top
    pub expires_at: Option<DateTime<Utc>>,
    /// Order the coupon was consumed by, set on redemption
    pub order_id: Option<String>,
}

impl UserCoupon {
    /// Whether the claim itself has lapsed at `now`
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|exp| now >= exp)
    }
}
