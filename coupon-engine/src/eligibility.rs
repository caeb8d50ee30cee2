//! Eligibility Filter
//!
//! Activation state, time window and user inclusion/exclusion checks.
//! Checks run in a fixed order and short-circuit on the first failure so
//! the reported reason is deterministic.

use chrono::{DateTime, Utc};
use shared::{Coupon, RejectionReason};

/// Check whether `user_id` may use `coupon` at `now`
///
/// Order: active flag, activation window `[start_at, end_at)`, excluded
/// list, eligible list. An empty eligible list means the coupon is open
/// to all non-excluded users. Exclusion wins over inclusion.
pub fn check_eligibility(
    coupon: &Coupon,
    user_id: &str,
    now: DateTime<Utc>,
) -> Result<(), RejectionReason> {
    if !coupon.is_active {
        return Err(RejectionReason::Inactive);
    }
    if now < coupon.start_at {
        return Err(RejectionReason::NotYetActive);
    }
    if now >= coupon.end_at {
        return Err(RejectionReason::Expired);
    }
    if coupon.excluded_users.iter().any(|u| u == user_id) {
        return Err(RejectionReason::ExcludedUser);
    }
    if !coupon.eligible_users.is_empty() && !coupon.eligible_users.iter().any(|u| u == user_id) {
        return Err(RejectionReason::NotEligibleUser);
    }
    Ok(())
}
