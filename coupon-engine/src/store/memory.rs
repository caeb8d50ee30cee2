//! In-process reference store
//!
//! An arena of per-coupon counter records addressed by coupon id, plus
//! plain maps for the other entities. Counter writes go through the
//! versioned conditional update; the per-cell lock only covers the
//! compare-and-swap itself, so different coupons never contend.

use super::{CouponStore, RedemptionRecord};
use crate::error::{EngineError, EngineResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use parking_lot::Mutex;
use shared::{Coupon, UsageCounters, UserCoupon, UserCouponStatus, UserStats, VersionedCounters};
use std::sync::Arc;

/// Counter record guarded by its own lock
struct CounterCell {
    counters: UsageCounters,
    version: u64,
}

/// In-memory implementation of [`CouponStore`]
#[derive(Default)]
pub struct MemoryStore {
    coupons: DashMap<String, Coupon>,
    /// code -> coupon id
    codes: DashMap<String, String>,
    counters: DashMap<String, Arc<Mutex<CounterCell>>>,
    user_coupons: DashMap<String, UserCoupon>,
    /// (user_coupon_id, order_id) -> committed record
    records: DashMap<(String, String), RedemptionRecord>,
    stats: DashMap<String, UserStats>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a coupon definition
    pub fn insert_coupon(&self, coupon: Coupon) {
        self.codes.insert(coupon.code.clone(), coupon.id.clone());
        self.coupons.insert(coupon.id.clone(), coupon);
    }

    /// Seed a user's claim on a coupon
    pub fn insert_user_coupon(&self, user_coupon: UserCoupon) {
        self.user_coupons
            .insert(user_coupon.id.clone(), user_coupon);
    }

    /// Seed the statistics snapshot returned for a user
    pub fn set_user_stats(&self, user_id: impl Into<String>, stats: UserStats) {
        self.stats.insert(user_id.into(), stats);
    }

    fn counter_cell(&self, coupon_id: &str) -> Arc<Mutex<CounterCell>> {
        self.counters
            .entry(coupon_id.to_string())
            .or_insert_with(|| {
                Arc::new(Mutex::new(CounterCell {
                    counters: UsageCounters::new(coupon_id),
                    version: 0,
                }))
            })
            .clone()
    }
}

#[async_trait]
impl CouponStore for MemoryStore {
    async fn coupon_by_code(&self, code: &str) -> EngineResult<Option<Coupon>> {
        let Some(id) = self.codes.get(code) else {
            return Ok(None);
        };
        Ok(self.coupons.get(id.value()).map(|c| c.clone()))
    }

    async fn coupon_by_id(&self, id: &str) -> EngineResult<Option<Coupon>> {
        Ok(self.coupons.get(id).map(|c| c.clone()))
    }

    async fn usage_counters(&self, coupon_id: &str) -> EngineResult<VersionedCounters> {
        let cell = self.counter_cell(coupon_id);
        let guard = cell.lock();
        Ok(VersionedCounters {
            counters: guard.counters.clone(),
            version: guard.version,
        })
    }

    async fn try_update_counters(
        &self,
        expected_version: u64,
        counters: UsageCounters,
    ) -> EngineResult<bool> {
        let cell = self.counter_cell(&counters.coupon_id);
        let mut guard = cell.lock();
        if guard.version != expected_version {
            return Ok(false);
        }
        guard.counters = counters;
        guard.version += 1;
        Ok(true)
    }

    async fn user_coupon(&self, id: &str) -> EngineResult<Option<UserCoupon>> {
        Ok(self.user_coupons.get(id).map(|uc| uc.clone()))
    }

    async fn save_user_coupon_status(
        &self,
        id: &str,
        status: UserCouponStatus,
        used_at: Option<DateTime<Utc>>,
        order_id: Option<String>,
    ) -> EngineResult<()> {
        let mut entry = self
            .user_coupons
            .get_mut(id)
            .ok_or_else(|| EngineError::UserCouponNotFound(id.to_string()))?;
        entry.status = status;
        if used_at.is_some() {
            entry.used_at = used_at;
        }
        if order_id.is_some() {
            entry.order_id = order_id;
        }
        Ok(())
    }

    async fn redemption_record(
        &self,
        user_coupon_id: &str,
        order_id: &str,
    ) -> EngineResult<Option<RedemptionRecord>> {
        let key = (user_coupon_id.to_string(), order_id.to_string());
        Ok(self.records.get(&key).map(|r| r.clone()))
    }

    async fn record_redemption(&self, record: RedemptionRecord) -> EngineResult<()> {
        let key = (record.user_coupon_id.clone(), record.order_id.clone());
        self.records.insert(key, record);
        Ok(())
    }

    async fn user_stats(
        &self,
        user_id: &str,
        _seller_id: Option<&str>,
    ) -> EngineResult<UserStats> {
        Ok(self
            .stats
            .get(user_id)
            .map(|s| s.clone())
            .unwrap_or_default())
    }
}
