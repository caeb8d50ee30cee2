//! Data models
//!
//! Shared between the coupon engine and any hosting service (via API).
//! All entity IDs are `String` (store-assigned opaque identifiers).

pub mod coupon;
pub mod order;
pub mod outcome;
pub mod stats;
pub mod usage;
pub mod user_coupon;

// Re-exports
pub use coupon::*;
pub use order::*;
pub use outcome::*;
pub use stats::*;
pub use usage::*;
pub use user_coupon::*;
