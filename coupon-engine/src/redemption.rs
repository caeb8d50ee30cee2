//! Redemption Coordinator
//!
//! The only component permitted to mutate usage counters and flip a
//! user coupon to used. The triple check — global limit, per-user limit,
//! claim still saved — and the increment happen as one indivisible unit
//! per coupon: commits for the same coupon serialize behind a per-coupon
//! lock, and the counter write itself goes through the store's versioned
//! conditional update so an external store keeps optimistic-concurrency
//! protection. Different coupons never contend.
//!
//! # Commit Flow
//!
//! ```text
//! commit(coupon, user_coupon, order_id, quote)
//!     ├─ 1. Acquire per-coupon commit lock
//!     ├─ 2. Re-read claim, must still be saved
//!     ├─ 3. Read counters, check both limits
//!     ├─ 4. Conditional increment (bounded retries on version conflict)
//!     ├─ 5. Write idempotency record
//!     └─ 6. Flip claim to used, stamp used_at + order_id
//! ```
//!
//! The conditional increment is the commit point: an attempt abandoned
//! before step 4 completes has applied nothing.

use crate::config::EngineConfig;
use crate::discount::DiscountQuote;
use crate::error::{EngineError, EngineResult};
use crate::store::{CouponStore, RedemptionRecord};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use shared::{Coupon, RejectionReason, UserCoupon, UserCouponStatus};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

/// Redemption Coordinator
#[derive(Clone)]
pub struct RedemptionCoordinator {
    store: Arc<dyn CouponStore>,
    /// Per-coupon commit locks, created on first contention
    commit_locks: Arc<DashMap<String, Arc<Mutex<()>>>>,
    max_retries: u32,
    retry_backoff: Duration,
}

impl std::fmt::Debug for RedemptionCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedemptionCoordinator")
            .field("store", &"<CouponStore>")
            .field("max_retries", &self.max_retries)
            .finish()
    }
}

impl RedemptionCoordinator {
    pub fn new(store: Arc<dyn CouponStore>, config: &EngineConfig) -> Self {
        Self {
            store,
            commit_locks: Arc::new(DashMap::new()),
            max_retries: config.max_commit_retries,
            retry_backoff: Duration::from_millis(config.retry_backoff_ms),
        }
    }

    fn commit_lock(&self, coupon_id: &str) -> Arc<Mutex<()>> {
        self.commit_locks
            .entry(coupon_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Atomically consume one redemption slot
    ///
    /// Validation has already passed when this runs; the checks here are
    /// only the ones that race with concurrent commits. Limit and
    /// already-used failures surface as `Rejected` so the caller can
    /// report them as outcomes; version-conflict exhaustion surfaces as
    /// the retryable `ConcurrencyConflict`.
    pub async fn commit(
        &self,
        coupon: &Coupon,
        user_coupon: &UserCoupon,
        order_id: &str,
        quote: &DiscountQuote,
        now: DateTime<Utc>,
    ) -> EngineResult<RedemptionRecord> {
        let lock = self.commit_lock(&coupon.id);
        let _guard = lock.lock().await;

        // Re-read under the lock: another commit may have consumed this
        // claim between validation and now
        let current = self
            .store
            .user_coupon(&user_coupon.id)
            .await?
            .ok_or_else(|| EngineError::UserCouponNotFound(user_coupon.id.clone()))?;
        match current.status {
            UserCouponStatus::Saved => {}
            UserCouponStatus::Used => {
                return Err(EngineError::Rejected(RejectionReason::AlreadyUsed));
            }
            UserCouponStatus::Expired => {
                return Err(EngineError::Rejected(RejectionReason::Expired));
            }
            UserCouponStatus::Invalid => {
                return Err(EngineError::Rejected(RejectionReason::Inactive));
            }
        }

        self.increment_counters(coupon, &current.user_id).await?;

        // The increment is the commit point. The idempotency record is
        // written before the claim flips so any reader that observes
        // the used status also finds the record.
        let record = RedemptionRecord {
            id: uuid::Uuid::new_v4().to_string(),
            user_coupon_id: current.id.clone(),
            order_id: order_id.to_string(),
            coupon_id: coupon.id.clone(),
            user_id: current.user_id.clone(),
            discount: quote.discount,
            final_price: quote.final_price,
            redeemed_at: now,
        };
        self.store.record_redemption(record.clone()).await?;

        self.store
            .save_user_coupon_status(
                &current.id,
                UserCouponStatus::Used,
                Some(now),
                Some(order_id.to_string()),
            )
            .await?;

        tracing::debug!(
            coupon_id = %coupon.id,
            user_coupon_id = %current.id,
            order_id = %order_id,
            "Redemption committed"
        );
        Ok(record)
    }

    /// Read-check-write cycle against the versioned counters, retried a
    /// bounded number of times on version conflict
    async fn increment_counters(&self, coupon: &Coupon, user_id: &str) -> EngineResult<()> {
        for attempt in 0..self.max_retries {
            let read = self.store.usage_counters(&coupon.id).await?;

            if let Some(limit) = coupon.limits.usage_limit
                && read.counters.global_used >= limit
            {
                return Err(EngineError::Rejected(RejectionReason::UsageLimitExceeded));
            }
            if let Some(limit) = coupon.limits.per_user_limit
                && read.counters.used_by(user_id) >= limit
            {
                return Err(EngineError::Rejected(RejectionReason::PerUserLimitExceeded));
            }

            let mut next = read.counters.clone();
            next.record(user_id);
            if self.store.try_update_counters(read.version, next).await? {
                return Ok(());
            }

            tracing::debug!(
                coupon_id = %coupon.id,
                attempt,
                "Counter version conflict, retrying"
            );
            tokio::time::sleep(self.retry_backoff * (attempt + 1)).await;
        }

        Err(EngineError::ConcurrencyConflict(coupon.id.clone()))
    }
}
