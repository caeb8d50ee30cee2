//! Engine configuration
//!
//! All settings can be overridden through environment variables:
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | COUPON_MAX_COMMIT_RETRIES | 8 | Conditional-update attempts before ConcurrencyConflict |
//! | COUPON_RETRY_BACKOFF_MS | 5 | Base backoff between attempts (milliseconds) |
//! | COUPON_AUDIT_BUFFER | 1024 | Audit channel capacity |

/// Engine configuration
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Attempts for the counter read-check-write cycle before surfacing
    /// a retryable conflict
    pub max_commit_retries: u32,
    /// Base backoff between conflicting attempts (milliseconds), scaled
    /// linearly per attempt
    pub retry_backoff_ms: u64,
    /// Capacity of the bounded audit event channel
    pub audit_buffer: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_commit_retries: 8,
            retry_backoff_ms: 5,
            audit_buffer: 1024,
        }
    }
}

impl EngineConfig {
    /// Load configuration from environment variables, falling back to
    /// defaults for anything unset
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            max_commit_retries: std::env::var("COUPON_MAX_COMMIT_RETRIES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.max_commit_retries),
            retry_backoff_ms: std::env::var("COUPON_RETRY_BACKOFF_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.retry_backoff_ms),
            audit_buffer: std::env::var("COUPON_AUDIT_BUFFER")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.audit_buffer),
        }
    }
}
