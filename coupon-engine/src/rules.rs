//! Rule Evaluator
//!
//! Evaluates a coupon's dynamic condition list against a user-statistics
//! snapshot. Conditions combine with logical AND and evaluation
//! short-circuits on the first failing condition in list order, so the
//! reported failure is reproducible.
//!
//! Rule names are stored as strings but dispatch over a closed set: an
//! unrecognized name is a configuration error and fails closed, never a
//! silent pass.

use crate::error::{EngineError, EngineResult};
use chrono::{DateTime, Datelike, Utc};
use shared::{Coupon, CouponCondition, RejectionReason, UserStats};

/// Closed set of supported rule types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CouponRuleType {
    FollowSeller,
    MinCompletedOrders,
    FollowDurationDays,
    MinTotalSpent,
    NewUserOnly,
    Level,
    LivestreamOnly,
    ViewLivestreamMinutes,
    CompletedMissions,
    InFriendList,
    UsedCouponBefore,
    BirthdayMonthUser,
}

impl CouponRuleType {
    /// Parse a stored rule name. Returns None for names outside the
    /// closed set.
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "follow_seller" => Some(Self::FollowSeller),
            "min_completed_orders" => Some(Self::MinCompletedOrders),
            "follow_duration_days" => Some(Self::FollowDurationDays),
            "min_total_spent" => Some(Self::MinTotalSpent),
            "new_user_only" => Some(Self::NewUserOnly),
            "level" => Some(Self::Level),
            "livestream_only" => Some(Self::LivestreamOnly),
            "view_livestream_minutes" => Some(Self::ViewLivestreamMinutes),
            "completed_missions" => Some(Self::CompletedMissions),
            "in_friend_list" => Some(Self::InFriendList),
            "used_coupon_before" => Some(Self::UsedCouponBefore),
            "birthday_month_user" => Some(Self::BirthdayMonthUser),
            _ => None,
        }
    }
}

/// Per-call evaluation context, captured at call time and never mutated
pub struct RuleContext<'a> {
    pub user_id: &'a str,
    /// Eligible order value after scope narrowing
    pub order_value: f64,
    pub stats: &'a UserStats,
    pub now: DateTime<Utc>,
}

/// Evaluate all conditions on `coupon` against `ctx`
///
/// Ok means every condition holds. The first unsatisfied condition
/// rejects with `ConditionFailed` naming the rule; an unrecognized rule
/// name aborts with a configuration error.
pub fn evaluate_conditions(coupon: &Coupon, ctx: &RuleContext<'_>) -> EngineResult<()> {
    for cond in &coupon.conditions {
        let rule = CouponRuleType::parse(&cond.rule).ok_or_else(|| {
            tracing::error!(
                coupon = %coupon.code,
                rule = %cond.rule,
                "Unrecognized rule type in coupon conditions"
            );
            EngineError::Configuration(format!(
                "unrecognized rule type '{}' on coupon {}",
                cond.rule, coupon.code
            ))
        })?;

        if !check_rule(rule, cond, coupon, ctx)? {
            return Err(EngineError::Rejected(RejectionReason::ConditionFailed(
                cond.rule.clone(),
            )));
        }
    }
    Ok(())
}

/// Evaluate a single rule. Numeric thresholds compare with >=,
/// categorical and boolean fields with equality.
fn check_rule(
    rule: CouponRuleType,
    cond: &CouponCondition,
    coupon: &Coupon,
    ctx: &RuleContext<'_>,
) -> EngineResult<bool> {
    let stats = ctx.stats;
    match rule {
        CouponRuleType::FollowSeller => {
            // Meaningless without a seller-scoped coupon
            if coupon.scope.seller_id.is_none() {
                return Err(EngineError::Configuration(format!(
                    "coupon {} uses follow_seller without scope.seller_id",
                    coupon.code
                )));
            }
            Ok(stats.follows_seller)
        }
        CouponRuleType::MinCompletedOrders => {
            Ok(f64::from(stats.completed_orders) >= numeric_value(cond, coupon)?)
        }
        CouponRuleType::FollowDurationDays => {
            let threshold = numeric_value(cond, coupon)?;
            Ok(match stats.followed_at {
                Some(at) => (ctx.now - at).num_days() as f64 >= threshold,
                None => false,
            })
        }
        CouponRuleType::MinTotalSpent => Ok(stats.total_spent >= numeric_value(cond, coupon)?),
        // The comparison value is ignored; the rule asserts the flag
        CouponRuleType::NewUserOnly => Ok(stats.is_new_user),
        CouponRuleType::Level => Ok(f64::from(stats.level) == numeric_value(cond, coupon)?),
        CouponRuleType::LivestreamOnly => Ok(stats.in_livestream),
        CouponRuleType::ViewLivestreamMinutes => {
            Ok(f64::from(stats.viewed_livestream_minutes) >= numeric_value(cond, coupon)?)
        }
        CouponRuleType::CompletedMissions => {
            Ok(f64::from(stats.completed_missions) >= numeric_value(cond, coupon)?)
        }
        CouponRuleType::InFriendList => Ok(stats.in_friend_list),
        // Equality against the stored flag: true targets repeat
        // redeemers, false targets first-timers
        CouponRuleType::UsedCouponBefore => {
            Ok(stats.used_coupon_before == bool_value(cond))
        }
        CouponRuleType::BirthdayMonthUser => {
            Ok(stats.birthday_month == Some(ctx.now.month()))
        }
    }
}

/// Coerce the stored comparison value to a number
fn numeric_value(cond: &CouponCondition, coupon: &Coupon) -> EngineResult<f64> {
    cond.value.as_f64().ok_or_else(|| {
        EngineError::Configuration(format!(
            "rule '{}' on coupon {} requires a numeric value, got {}",
            cond.rule, coupon.code, cond.value
        ))
    })
}

/// Coerce the stored comparison value to a boolean, defaulting to true
/// when absent
fn bool_value(cond: &CouponCondition) -> bool {
    cond.value.as_bool().unwrap_or(true)
}
