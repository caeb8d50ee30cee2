//! Shared types for the coupon platform
//!
//! Data models exchanged between the coupon engine and its hosting
//! services: coupon definitions, user claims, usage counters and the
//! validation/redemption result types.

pub mod models;

// Re-exports
pub use serde::{Deserialize, Serialize};

pub use models::{
    Coupon, CouponCondition, CouponScope, CouponType, CouponValidationResult, Discount,
    DiscountKind, OrderContext, OrderLine, RedemptionOutcome, RejectionReason, UsageCounters,
    UsageLimits, UserCoupon, UserCouponStatus, UserStats, VersionedCounters,
};
