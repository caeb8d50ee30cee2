//! Coupon Store
//!
//! The collaborator surface the engine consumes: coupon lookup, usage
//! counters with a versioned conditional-update primitive, user-coupon
//! state, the redemption idempotency ledger and user statistics.
//!
//! Production deployments back this with their transactional store; the
//! engine ships [`MemoryStore`] as the in-process reference
//! implementation used by tests and embedders.

mod memory;

pub use memory::MemoryStore;

use crate::error::EngineResult;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::{Coupon, UsageCounters, UserCoupon, UserCouponStatus, UserStats, VersionedCounters};

/// One committed redemption, keyed on (user_coupon_id, order_id)
///
/// Written atomically with the commit; replaying the same pair returns
/// this record instead of touching counters again.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedemptionRecord {
    pub id: String,
    pub user_coupon_id: String,
    pub order_id: String,
    pub coupon_id: String,
    pub user_id: String,
    pub discount: f64,
    pub final_price: f64,
    pub redeemed_at: DateTime<Utc>,
}

/// Store collaborator consumed by the engine
#[async_trait]
pub trait CouponStore: Send + Sync {
    async fn coupon_by_code(&self, code: &str) -> EngineResult<Option<Coupon>>;

    async fn coupon_by_id(&self, id: &str) -> EngineResult<Option<Coupon>>;

    /// Current counters for a coupon plus the version token for the
    /// conditional update. A coupon with no redemptions yet reads as
    /// zeroed counters.
    async fn usage_counters(&self, coupon_id: &str) -> EngineResult<VersionedCounters>;

    /// Conditional-update primitive: persist `counters` only if the
    /// stored version still equals `expected_version`. Returns whether
    /// the write applied. This is the only way counters change.
    async fn try_update_counters(
        &self,
        expected_version: u64,
        counters: UsageCounters,
    ) -> EngineResult<bool>;

    async fn user_coupon(&self, id: &str) -> EngineResult<Option<UserCoupon>>;

    async fn save_user_coupon_status(
        &self,
        id: &str,
        status: UserCouponStatus,
        used_at: Option<DateTime<Utc>>,
        order_id: Option<String>,
    ) -> EngineResult<()>;

    async fn redemption_record(
        &self,
        user_coupon_id: &str,
        order_id: &str,
    ) -> EngineResult<Option<RedemptionRecord>>;

    async fn record_redemption(&self, record: RedemptionRecord) -> EngineResult<()>;

    /// Point-in-time statistics snapshot for rule evaluation.
    /// `seller_id` scopes the follow-relationship fields when present.
    async fn user_stats(&self, user_id: &str, seller_id: Option<&str>)
    -> EngineResult<UserStats>;
}
