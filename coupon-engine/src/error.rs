//! Error taxonomy
//!
//! Two layers of failure, kept deliberately separate:
//!
//! - [`shared::RejectionReason`] — user-facing validation outcomes,
//!   returned as data inside a `CouponValidationResult`
//! - [`EngineError`] — operational failures: missing records, coupon
//!   configuration problems, store errors, retry exhaustion
//!
//! `EngineError::Rejected` is the internal short-circuit carrying a
//! rejection through `?` inside the pipeline; the public surface converts
//! it back into a result before it reaches callers.

use shared::RejectionReason;
use thiserror::Error;

/// Engine errors
#[derive(Debug, Error)]
pub enum EngineError {
    /// Pipeline short-circuit; never escapes the public API
    #[error("Coupon rejected: {0}")]
    Rejected(RejectionReason),

    #[error("Coupon not found: {0}")]
    CouponNotFound(String),

    #[error("User coupon not found: {0}")]
    UserCouponNotFound(String),

    /// Invalid coupon definition or unrecognized rule name. Fails
    /// closed: a misconfigured coupon never silently passes validation.
    #[error("Coupon configuration error: {0}")]
    Configuration(String),

    /// Conditional counter update kept losing against concurrent
    /// commits. The only retryable variant.
    #[error("Concurrent redemption conflict on coupon {0}")]
    ConcurrencyConflict(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl EngineError {
    /// Whether the caller may safely retry the same call
    pub fn is_retryable(&self) -> bool {
        matches!(self, EngineError::ConcurrencyConflict(_))
    }
}

pub type EngineResult<T> = Result<T, EngineError>;
