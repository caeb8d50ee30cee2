//! Validation & Redemption Outcomes
//!
//! Result types returned to callers. A rejection is data, not an error:
//! the first failing check is always reported so the caller can render an
//! actionable reason ("sold out" vs "doesn't apply to you").

use serde::{Deserialize, Serialize};

/// The first failing check for a coupon, in pipeline order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[serde(tag = "code", content = "detail", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RejectionReason {
    #[error("Coupon is not active")]
    Inactive,

    #[error("Coupon is not active yet")]
    NotYetActive,

    #[error("Coupon has expired")]
    Expired,

    #[error("User is excluded from this coupon")]
    ExcludedUser,

    #[error("User is not eligible for this coupon")]
    NotEligibleUser,

    #[error("No order items fall within the coupon scope")]
    ScopeMismatch,

    /// Carries the name of the unsatisfied rule
    #[error("Condition not met: {0}")]
    ConditionFailed(String),

    #[error("Order value is below the coupon minimum")]
    BelowMinOrderValue,

    #[error("Coupon usage limit reached")]
    UsageLimitExceeded,

    #[error("Per-user usage limit reached")]
    PerUserLimitExceeded,

    #[error("Coupon has already been used")]
    AlreadyUsed,
}

impl RejectionReason {
    /// Whether the rejection arose at commit time rather than validation
    pub fn is_redemption_failure(&self) -> bool {
        matches!(
            self,
            RejectionReason::UsageLimitExceeded
                | RejectionReason::PerUserLimitExceeded
                | RejectionReason::AlreadyUsed
        )
    }
}

/// Result of validating (or attempting to redeem) a coupon
///
/// Produced fresh per call, never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CouponValidationResult {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<RejectionReason>,
    /// Human-readable form of `reason`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Computed discount amount. For cashback coupons this is the amount
    /// to be credited post-order, not deducted at checkout.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount: Option<f64>,
    /// Merchandise value after the discount. Unchanged for free-ship and
    /// cashback kinds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_price: Option<f64>,
}

impl CouponValidationResult {
    pub fn applied(discount: f64, final_price: f64) -> Self {
        Self {
            valid: true,
            reason: None,
            message: None,
            discount: Some(discount),
            final_price: Some(final_price),
        }
    }

    pub fn rejected(reason: RejectionReason) -> Self {
        let message = reason.to_string();
        Self {
            valid: false,
            reason: Some(reason),
            message: Some(message),
            discount: None,
            final_price: None,
        }
    }
}

/// Result of a redemption attempt
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedemptionOutcome {
    /// True only when counters were incremented and the claim flipped
    pub committed: bool,
    pub result: CouponValidationResult,
}

impl RedemptionOutcome {
    pub fn committed(result: CouponValidationResult) -> Self {
        Self {
            committed: true,
            result,
        }
    }

    pub fn rejected(reason: RejectionReason) -> Self {
        Self {
            committed: false,
            result: CouponValidationResult::rejected(reason),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejected_carries_message() {
        let result = CouponValidationResult::rejected(RejectionReason::BelowMinOrderValue);
        assert!(!result.valid);
        assert_eq!(result.reason, Some(RejectionReason::BelowMinOrderValue));
        assert!(result.message.is_some());
        assert!(result.discount.is_none());
    }

    #[test]
    fn test_redemption_failures_are_distinguishable() {
        assert!(RejectionReason::UsageLimitExceeded.is_redemption_failure());
        assert!(RejectionReason::AlreadyUsed.is_redemption_failure());
        assert!(!RejectionReason::Expired.is_redemption_failure());
        assert!(!RejectionReason::ScopeMismatch.is_redemption_failure());
    }
}
