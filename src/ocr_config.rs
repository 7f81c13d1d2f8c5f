//! # OCR Configuration Module
//!
//! Settings for reading ingredient labels: Tesseract languages, upload
//! limits, and the retry / circuit-breaker policy.

use std::time::Duration;

pub const DEFAULT_LANGUAGES: &str = "eng";
pub const FORMAT_DETECTION_BUFFER_SIZE: usize = 32;
pub const MIN_FORMAT_BYTES: usize = 8;
pub const MAX_FILE_SIZE: u64 = 10 * 1024 * 1024; // 10MB, well under Telegram's 20MB getFile cap

/// Retry and failure-isolation policy for OCR calls
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecoveryConfig {
    /// Attempts after the first one
    pub max_retries: u32,
    pub base_retry_delay_ms: u64,
    pub max_retry_delay_ms: u64,
    /// Per-attempt limit for one Tesseract run
    pub operation_timeout_secs: u64,
    /// Consecutive failures before the breaker opens
    pub circuit_breaker_threshold: u32,
    pub circuit_breaker_reset_secs: u64,
}

impl RecoveryConfig {
    pub fn operation_timeout(&self) -> Duration {
        Duration::from_secs(self.operation_timeout_secs)
    }

    pub fn circuit_breaker_reset(&self) -> Duration {
        Duration::from_secs(self.circuit_breaker_reset_secs)
    }
}

impl Default for RecoveryConfig {
    fn default() -> Self {
        Self {
            max_retries: 2,
            base_retry_delay_ms: 500,
            max_retry_delay_ms: 5000,
            operation_timeout_secs: 30,
            circuit_breaker_threshold: 5,
            circuit_breaker_reset_secs: 60,
        }
    }
}

/// Configuration structure for OCR processing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OcrConfig {
    /// Tesseract language codes, e.g. "eng" or "eng+fra"
    pub languages: String,
    /// Bytes read from the file head for format detection
    pub buffer_size: usize,
    pub min_format_bytes: usize,
    pub max_file_size: u64,
    pub recovery: RecoveryConfig,
}

impl OcrConfig {
    pub fn with_languages(mut self, languages: impl Into<String>) -> Self {
        self.languages = languages.into();
        self
    }

    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.recovery.operation_timeout_secs = secs;
        self
    }
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            languages: DEFAULT_LANGUAGES.to_string(),
            buffer_size: FORMAT_DETECTION_BUFFER_SIZE,
            min_format_bytes: MIN_FORMAT_BYTES,
            max_file_size: MAX_FILE_SIZE,
            recovery: RecoveryConfig::default(),
        }
    }
}
