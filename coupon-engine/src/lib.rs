//! Coupon Rule Evaluation & Redemption Engine
//!
//! # Architecture Overview
//!
//! This crate decides whether a coupon may be applied to an order,
//! computes the resulting discount, and atomically records consumption
//! against global and per-user usage limits:
//!
//! - **Eligibility** (`eligibility`): activation state, time window,
//!   inclusion/exclusion lists
//! - **Scope** (`scope`): seller/product/category narrowing and the
//!   eligible order value
//! - **Rules** (`rules`): dynamic condition list evaluated against a
//!   user-statistics snapshot
//! - **Discount** (`discount`): per-kind discount and final-price math
//! - **Redemption** (`redemption`): concurrency-safe, idempotent commit
//!   against shared usage counters
//!
//! # Module Structure
//!
//! ```text
//! coupon-engine/src/
//! ├── engine.rs       # CouponEngine: validate + redeem orchestration
//! ├── eligibility.rs  # Activation and user-list checks
//! ├── scope.rs        # Line-item narrowing, eligible order value
//! ├── rules.rs        # Condition evaluation (closed rule-type set)
//! ├── discount.rs     # Discount computation per kind
//! ├── redemption.rs   # Atomic counter commit, idempotency
//! ├── store/          # CouponStore trait + in-process reference store
//! ├── audit.rs        # Best-effort redemption event emission
//! ├── config.rs       # Engine configuration
//! ├── error.rs        # Error taxonomy
//! └── logger.rs       # tracing setup
//! ```

pub mod audit;
pub mod config;
pub mod discount;
pub mod eligibility;
pub mod engine;
pub mod error;
pub mod logger;
pub mod redemption;
pub mod rules;
pub mod scope;
pub mod store;

// Re-export public types
pub use audit::{AuditHandle, AuditWorker, RedemptionEvent};
pub use config::EngineConfig;
pub use discount::DiscountQuote;
pub use engine::CouponEngine;
pub use error::{EngineError, EngineResult};
pub use redemption::RedemptionCoordinator;
pub use rules::{CouponRuleType, RuleContext};
pub use store::{CouponStore, MemoryStore, RedemptionRecord};

// Re-export logger functions
pub use logger::{init_logger, init_logger_with_file};
