//! User Statistics Snapshot
//!
//! Behavioral statistics supplied by the user/profile service, captured
//! at call time. The engine treats this as a point-in-time read and never
//! mutates it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Point-in-time behavioral statistics for one user
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UserStats {
    pub completed_orders: u32,
    pub total_spent: f64,
    /// When the user started following the coupon's seller, if they do
    pub followed_at: Option<DateTime<Utc>>,
    /// Whether the user currently follows the coupon's seller
    pub follows_seller: bool,
    pub level: u32,
    pub is_new_user: bool,
    /// Whether the checkout originates from a livestream session
    pub in_livestream: bool,
    pub viewed_livestream_minutes: u32,
    pub completed_missions: u32,
    pub in_friend_list: bool,
    pub used_coupon_before: bool,
    /// Calendar month of the user's birthday (1-12), if known
    pub birthday_month: Option<u32>,
}
