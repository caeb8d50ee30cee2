//! Redemption Audit
//!
//! Best-effort emission of redemption events to a background worker over
//! a bounded mpsc channel. Emission never blocks and never fails the
//! redemption: a full or closed channel drops the event with a warning.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

/// One committed redemption, as seen by the audit sink
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedemptionEvent {
    pub coupon_id: String,
    pub user_id: String,
    pub order_id: String,
    pub discount: f64,
    pub redeemed_at: DateTime<Utc>,
}

/// Create a bounded audit channel
pub fn channel(capacity: usize) -> (AuditHandle, AuditWorker) {
    let (tx, rx) = mpsc::channel(capacity);
    (AuditHandle { tx }, AuditWorker { rx })
}

/// Producer side, held by the engine
#[derive(Clone)]
pub struct AuditHandle {
    tx: mpsc::Sender<RedemptionEvent>,
}

impl AuditHandle {
    /// Emit an event without blocking. Dropped on overflow or after the
    /// worker has stopped.
    pub fn emit(&self, event: RedemptionEvent) {
        if let Err(e) = self.tx.try_send(event) {
            tracing::warn!(error = %e, "Audit event dropped");
        }
    }
}

/// Background worker consuming redemption events
///
/// Runs until the channel closes. Events are logged as structured
/// records; a persistent sink would subscribe here.
pub struct AuditWorker {
    rx: mpsc::Receiver<RedemptionEvent>,
}

impl AuditWorker {
    pub async fn run(mut self) {
        tracing::info!("Redemption audit worker started");

        while let Some(event) = self.rx.recv().await {
            tracing::info!(
                target: "audit",
                coupon_id = %event.coupon_id,
                user_id = %event.user_id,
                order_id = %event.order_id,
                discount = event.discount,
                redeemed_at = %event.redeemed_at,
                "Coupon redeemed"
            );
        }

        tracing::info!("Audit channel closed, worker stopping");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_overflow_drops_instead_of_blocking() {
        let (handle, _worker) = channel(1);
        // Worker never runs; second emit overflows the buffer
        for _ in 0..3 {
            handle.emit(RedemptionEvent {
                coupon_id: "coupon-1".to_string(),
                user_id: "user-1".to_string(),
                order_id: "order-1".to_string(),
                discount: 10.0,
                redeemed_at: Utc::now(),
            });
        }
        // Reaching this point is the assertion: emit never blocked
    }
}
