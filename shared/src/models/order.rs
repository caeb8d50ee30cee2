//! Order Context
//!
//! Line items and totals supplied by the order/checkout pipeline.

use serde::{Deserialize, Serialize};

/// One order line as seen by the engine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderLine {
    pub seller_id: String,
    pub product_id: String,
    #[serde(default)]
    pub category_ids: Vec<String>,
    /// Line total (unit price x quantity), pre-discount
    pub line_value: f64,
}

/// The order a coupon is being applied to
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct OrderContext {
    pub lines: Vec<OrderLine>,
    /// Externally computed shipping fee; consumed by free-ship coupons
    #[serde(default)]
    pub shipping_fee: f64,
}

impl OrderContext {
    /// Full order value across all lines, before any scope narrowing
    pub fn total_value(&self) -> f64 {
        self.lines.iter().map(|l| l.line_value).sum()
    }
}
