//! Usage Counters
//!
//! Per-coupon redemption counters. Owned exclusively by the redemption
//! coordinator; every write goes through the store's versioned
//! conditional-update primitive, never a blind read-modify-write.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Redemption counters for one coupon
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsageCounters {
    pub coupon_id: String,
    /// Total successful redemptions, monotonic
    pub global_used: u32,
    /// Successful redemptions per user, monotonic
    #[serde(default)]
    pub per_user_used: HashMap<String, u32>,
}

impl UsageCounters {
    pub fn new(coupon_id: impl Into<String>) -> Self {
        Self {
            coupon_id: coupon_id.into(),
            global_used: 0,
            per_user_used: HashMap::new(),
        }
    }

    /// Redemptions already consumed by `user_id`
    pub fn used_by(&self, user_id: &str) -> u32 {
        self.per_user_used.get(user_id).copied().unwrap_or(0)
    }

    /// Apply one redemption for `user_id`
    pub fn record(&mut self, user_id: &str) {
        self.global_used += 1;
        *self.per_user_used.entry(user_id.to_string()).or_insert(0) += 1;
    }
}

/// Counters together with the store version observed at read time
///
/// The version is the token for the conditional update: a write succeeds
/// only if the stored version still matches, otherwise the reader must
/// re-read and retry.
#[derive(Debug, Clone)]
pub struct VersionedCounters {
    pub counters: UsageCounters,
    pub version: u64,
}
