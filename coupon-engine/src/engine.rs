//! Coupon Engine
//!
//! The public surface: `validate` for read-only previews and `redeem`
//! for the atomic commit. A stateless service object over an injected
//! store; construct one per process or per request, there is no global
//! instance.

use crate::audit::{AuditHandle, RedemptionEvent};
use crate::config::EngineConfig;
use crate::discount::{self, DiscountQuote};
use crate::eligibility;
use crate::error::{EngineError, EngineResult};
use crate::redemption::RedemptionCoordinator;
use crate::rules::{self, RuleContext};
use crate::scope;
use crate::store::CouponStore;
use chrono::{DateTime, Utc};
use shared::{
    Coupon, CouponValidationResult, OrderContext, RedemptionOutcome, RejectionReason, UserCoupon,
    UserCouponStatus,
};
use std::sync::Arc;

/// Coupon validation and redemption service
#[derive(Clone)]
pub struct CouponEngine {
    store: Arc<dyn CouponStore>,
    coordinator: RedemptionCoordinator,
    audit: Option<AuditHandle>,
}

impl std::fmt::Debug for CouponEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CouponEngine")
            .field("store", &"<CouponStore>")
            .field("coordinator", &self.coordinator)
            .finish()
    }
}

impl CouponEngine {
    pub fn new(store: Arc<dyn CouponStore>, config: EngineConfig) -> Self {
        let coordinator = RedemptionCoordinator::new(store.clone(), &config);
        Self {
            store,
            coordinator,
            audit: None,
        }
    }

    /// Attach a redemption audit sink
    pub fn with_audit(mut self, audit: AuditHandle) -> Self {
        self.audit = Some(audit);
        self
    }

    /// Check whether a coupon applies to an order and compute the
    /// discount. Read-only; safe to call repeatedly for UI preview.
    pub async fn validate(
        &self,
        coupon_code: &str,
        user_id: &str,
        order: &OrderContext,
    ) -> EngineResult<CouponValidationResult> {
        let coupon = self
            .store
            .coupon_by_code(coupon_code)
            .await?
            .ok_or_else(|| EngineError::CouponNotFound(coupon_code.to_string()))?;

        match self.run_pipeline(&coupon, user_id, order, Utc::now()).await {
            Ok(quote) => Ok(CouponValidationResult::applied(
                quote.discount,
                quote.final_price,
            )),
            Err(EngineError::Rejected(reason)) => Ok(CouponValidationResult::rejected(reason)),
            Err(e) => Err(e),
        }
    }

    /// Redeem a saved coupon against an order
    ///
    /// Re-runs the full validation pipeline, then hands off to the
    /// redemption coordinator for the atomic commit. Idempotent on
    /// (user_coupon_id, order_id): a replay after a successful commit
    /// returns the original outcome without touching counters, so
    /// callers may retry on timeout.
    pub async fn redeem(
        &self,
        user_coupon_id: &str,
        order_id: &str,
        order: &OrderContext,
    ) -> EngineResult<RedemptionOutcome> {
        // Replay of a completed commit, before anything else
        if let Some(record) = self
            .store
            .redemption_record(user_coupon_id, order_id)
            .await?
        {
            tracing::debug!(
                user_coupon_id = %user_coupon_id,
                order_id = %order_id,
                "Replaying committed redemption"
            );
            return Ok(RedemptionOutcome::committed(
                CouponValidationResult::applied(record.discount, record.final_price),
            ));
        }

        let user_coupon = self
            .store
            .user_coupon(user_coupon_id)
            .await?
            .ok_or_else(|| EngineError::UserCouponNotFound(user_coupon_id.to_string()))?;
        let coupon = self
            .store
            .coupon_by_id(&user_coupon.coupon_id)
            .await?
            .ok_or_else(|| EngineError::CouponNotFound(user_coupon.coupon_id.clone()))?;
        let now = Utc::now();

        if let Some(reason) = self.settle_claim(&coupon, &user_coupon, now).await? {
            return self.reject_or_replay(user_coupon_id, order_id, reason).await;
        }

        let quote = match self
            .run_pipeline(&coupon, &user_coupon.user_id, order, now)
            .await
        {
            Ok(quote) => quote,
            Err(EngineError::Rejected(reason)) => return Ok(RedemptionOutcome::rejected(reason)),
            Err(e) => return Err(e),
        };

        match self
            .coordinator
            .commit(&coupon, &user_coupon, order_id, &quote, now)
            .await
        {
            Ok(record) => {
                if let Some(audit) = &self.audit {
                    audit.emit(RedemptionEvent {
                        coupon_id: record.coupon_id,
                        user_id: record.user_id,
                        order_id: record.order_id,
                        discount: record.discount,
                        redeemed_at: record.redeemed_at,
                    });
                }
                Ok(RedemptionOutcome::committed(
                    CouponValidationResult::applied(quote.discount, quote.final_price),
                ))
            }
            Err(EngineError::Rejected(reason)) => {
                self.reject_or_replay(user_coupon_id, order_id, reason).await
            }
            Err(e) => Err(e),
        }
    }

    /// `AlreadyUsed` observed during a retry may mean the original
    /// commit of this same (claim, order) pair finished after the
    /// replay check at the top of `redeem`. The idempotency record is
    /// written before the claim flips to used, so re-checking it here
    /// distinguishes a replay from a genuine conflict with another
    /// order.
    async fn reject_or_replay(
        &self,
        user_coupon_id: &str,
        order_id: &str,
        reason: RejectionReason,
    ) -> EngineResult<RedemptionOutcome> {
        if reason == RejectionReason::AlreadyUsed
            && let Some(record) = self
                .store
                .redemption_record(user_coupon_id, order_id)
                .await?
        {
            tracing::debug!(
                user_coupon_id = %user_coupon_id,
                order_id = %order_id,
                "Replaying committed redemption"
            );
            return Ok(RedemptionOutcome::committed(
                CouponValidationResult::applied(record.discount, record.final_price),
            ));
        }
        Ok(RedemptionOutcome::rejected(reason))
    }

    /// Lazy lifecycle settlement for a claim
    ///
    /// Terminal states reject immediately. A still-saved claim whose
    /// parent coupon has been deactivated or whose expiry has passed is
    /// flipped to its terminal state before rejecting, so subsequent
    /// reads see the settled record.
    async fn settle_claim(
        &self,
        coupon: &Coupon,
        user_coupon: &UserCoupon,
        now: DateTime<Utc>,
    ) -> EngineResult<Option<RejectionReason>> {
        match user_coupon.status {
            UserCouponStatus::Used => return Ok(Some(RejectionReason::AlreadyUsed)),
            UserCouponStatus::Expired => return Ok(Some(RejectionReason::Expired)),
            UserCouponStatus::Invalid => return Ok(Some(RejectionReason::Inactive)),
            UserCouponStatus::Saved => {}
        }

        if !coupon.is_active {
            self.store
                .save_user_coupon_status(&user_coupon.id, UserCouponStatus::Invalid, None, None)
                .await?;
            return Ok(Some(RejectionReason::Inactive));
        }
        if now >= coupon.end_at || user_coupon.is_expired_at(now) {
            self.store
                .save_user_coupon_status(&user_coupon.id, UserCouponStatus::Expired, None, None)
                .await?;
            return Ok(Some(RejectionReason::Expired));
        }
        Ok(None)
    }

    /// Eligibility → scope → rules → discount, purely read-only
    async fn run_pipeline(
        &self,
        coupon: &Coupon,
        user_id: &str,
        order: &OrderContext,
        now: DateTime<Utc>,
    ) -> EngineResult<DiscountQuote> {
        coupon.validate_config().map_err(|msg| {
            tracing::error!(coupon = %coupon.code, error = %msg, "Invalid coupon definition");
            EngineError::Configuration(msg)
        })?;

        eligibility::check_eligibility(coupon, user_id, now).map_err(EngineError::Rejected)?;

        let eligible_value = scope::eligible_order_value(&coupon.scope, &order.lines)
            .map_err(EngineError::Rejected)?;

        let stats = self
            .store
            .user_stats(user_id, coupon.scope.seller_id.as_deref())
            .await?;
        let ctx = RuleContext {
            user_id,
            order_value: eligible_value,
            stats: &stats,
            now,
        };
        rules::evaluate_conditions(coupon, &ctx)?;

        discount::compute_discount(&coupon.discount, eligible_value, order.shipping_fee)
            .map_err(EngineError::Rejected)
    }
}
