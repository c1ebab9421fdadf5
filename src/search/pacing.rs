//! Request pacing shared by all search workers.

use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use std::time::Duration;

/// Bounds the aggregate catalog request rate to one request per period
///
/// The first request passes immediately; each later one waits until a full
/// period has elapsed since the previous grant. A zero period disables the
/// gate.
pub struct PacingGate {
    limiter: Option<DefaultDirectRateLimiter>,
    period: Duration,
}

impl PacingGate {
    pub fn new(period: Duration) -> Self {
        Self {
            limiter: Quota::with_period(period).map(RateLimiter::direct),
            period,
        }
    }

    /// Wait for permission to issue one request
    pub async fn ready(&self) {
        if let Some(limiter) = &self.limiter {
            limiter.until_ready().await;
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.limiter.is_some()
    }
}

impl std::fmt::Debug for PacingGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PacingGate")
            .field("period", &self.period)
            .field("enabled", &self.is_enabled())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[tokio::test]
    async fn test_zero_period_disables_gate() {
        let gate = PacingGate::new(Duration::ZERO);
        assert!(!gate.is_enabled());

        let start = Instant::now();
        for _ in 0..100 {
            gate.ready().await;
        }
        assert!(start.elapsed() < Duration::from_millis(50));
    }

    #[tokio::test]
    async fn test_gate_spaces_requests() {
        let gate = PacingGate::new(Duration::from_millis(40));
        assert!(gate.is_enabled());

        let start = Instant::now();
        for _ in 0..4 {
            gate.ready().await;
        }
        // First grant is immediate, the other three wait one period each
        assert!(start.elapsed() >= Duration::from_millis(110));
    }
}
