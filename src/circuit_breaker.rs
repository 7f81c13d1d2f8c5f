//! # Circuit Breaker Module
//!
//! Stops calling Tesseract for a while after it keeps failing, so a broken
//! OCR install answers users immediately instead of timing out on each photo.

use std::sync::Mutex;
use std::time::{Duration, Instant};
use tracing::{info, warn};

use crate::ocr_config::RecoveryConfig;

#[derive(Debug, Default)]
struct BreakerState {
    consecutive_failures: u32,
    opened_at: Option<Instant>,
}

/// Circuit breaker for OCR operations
///
/// - **Closed**: calls go through, failures are counted
/// - **Open**: `threshold` consecutive failures seen; calls are refused until
///   `reset` has elapsed since the last failure
/// - After the reset window the next call is let through; one more failure
///   re-opens the breaker, a success closes it
#[derive(Debug)]
pub struct CircuitBreaker {
    state: Mutex<BreakerState>,
    threshold: u32,
    reset: Duration,
}

impl CircuitBreaker {
    /// # Examples
    ///
    /// ```rust
    /// use celiac_bot::circuit_breaker::CircuitBreaker;
    /// use celiac_bot::ocr_config::RecoveryConfig;
    ///
    /// let breaker = CircuitBreaker::new(&RecoveryConfig::default());
    /// assert!(!breaker.is_open());
    /// ```
    pub fn new(config: &RecoveryConfig) -> Self {
        Self::with_settings(config.circuit_breaker_threshold, config.circuit_breaker_reset())
    }

    pub fn with_settings(threshold: u32, reset: Duration) -> Self {
        Self {
            state: Mutex::new(BreakerState::default()),
            threshold: threshold.max(1),
            reset,
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BreakerState> {
        // The state is two plain counters; a panic mid-update cannot leave it invalid
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// `true` while calls should be refused
    pub fn is_open(&self) -> bool {
        let state = self.lock();
        match state.opened_at {
            Some(opened_at) => opened_at.elapsed() < self.reset,
            None => false,
        }
    }

    pub fn record_failure(&self) {
        let mut state = self.lock();
        state.consecutive_failures += 1;
        if state.consecutive_failures >= self.threshold {
            if state.opened_at.is_none() {
                warn!(
                    failures = state.consecutive_failures,
                    reset_secs = self.reset.as_secs(),
                    "OCR circuit breaker opened"
                );
            }
            state.opened_at = Some(Instant::now());
        }
    }

    pub fn record_success(&self) {
        let mut state = self.lock();
        if state.opened_at.is_some() {
            info!("OCR circuit breaker closed");
        }
        *state = BreakerState::default();
    }

    pub fn failure_count(&self) -> u32 {
        self.lock().consecutive_failures
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opens_at_threshold() {
        let breaker = CircuitBreaker::with_settings(2, Duration::from_secs(60));
        breaker.record_failure();
        assert!(!breaker.is_open());
        breaker.record_failure();
        assert!(breaker.is_open());
    }

    #[test]
    fn test_success_closes() {
        let breaker = CircuitBreaker::with_settings(1, Duration::from_secs(60));
        breaker.record_failure();
        assert!(breaker.is_open());
        breaker.record_success();
        assert!(!breaker.is_open());
        assert_eq!(breaker.failure_count(), 0);
    }

    #[test]
    fn test_half_open_after_reset_window() {
        let breaker = CircuitBreaker::with_settings(1, Duration::from_millis(0));
        breaker.record_failure();
        assert!(!breaker.is_open());
        // still counting: the next failure re-opens immediately
        assert_eq!(breaker.failure_count(), 1);
    }
}
