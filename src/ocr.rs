//! # OCR Module
//!
//! Reads text off ingredient-label images with Tesseract.
//!
//! [`OcrService`] owns the configuration, the cached engines and the circuit
//! breaker, and is shared by all handlers. Tesseract runs on the blocking
//! thread pool under a timeout; extraction and timeout failures are retried
//! with exponential backoff and jitter.

use rand::Rng;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::circuit_breaker::CircuitBreaker;
use crate::instance_manager::OcrInstanceManager;
use crate::ocr_config::{OcrConfig, RecoveryConfig};
use crate::ocr_errors::OcrError;

pub struct OcrService {
    config: OcrConfig,
    instances: OcrInstanceManager,
    breaker: CircuitBreaker,
}

impl OcrService {
    pub fn new(config: OcrConfig) -> Self {
        let breaker = CircuitBreaker::new(&config.recovery);
        Self {
            config,
            instances: OcrInstanceManager::new(),
            breaker,
        }
    }

    pub fn config(&self) -> &OcrConfig {
        &self.config
    }

    /// Extract cleaned text from the image at `path`.
    ///
    /// Returns an empty string when the image contains no readable text.
    pub async fn extract_text(&self, path: &Path) -> Result<String, OcrError> {
        if self.breaker.is_open() {
            return Err(OcrError::CircuitOpen);
        }

        validate_image_file(path, &self.config)?;

        let recovery = &self.config.recovery;
        let mut attempt = 0;
        loop {
            match self.run_once(path).await {
                Ok(raw) => {
                    self.breaker.record_success();
                    let text = clean_extracted_text(&raw);
                    info!(chars_extracted = text.len(), attempt, "OCR extraction completed");
                    return Ok(text);
                }
                Err(e) => {
                    self.breaker.record_failure();
                    if !e.is_retryable() || attempt >= recovery.max_retries || self.breaker.is_open() {
                        return Err(e);
                    }
                    let delay = calculate_retry_delay(attempt, recovery);
                    warn!(error = %e, attempt, delay_ms = delay.as_millis() as u64, "OCR attempt failed, retrying");
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }

    async fn run_once(&self, path: &Path) -> Result<String, OcrError> {
        let languages = self.config.languages.as_str();
        let instance = self.instances.get_instance(languages)?;
        let path = path.to_string_lossy().into_owned();

        let task = tokio::task::spawn_blocking(move || {
            let mut tess = instance
                .lock()
                .map_err(|_| OcrError::Extraction("Tesseract instance lock poisoned".to_string()))?;
            tess.set_image(&path)
                .map_err(|e| OcrError::ImageLoad(format!("{path}: {e}")))?;
            tess.get_utf8_text()
                .map_err(|e| OcrError::Extraction(e.to_string()))
        });

        let timeout = self.config.recovery.operation_timeout();
        match tokio::time::timeout(timeout, task).await {
            Ok(Ok(result)) => result,
            Ok(Err(join_error)) => {
                // the engine panicked mid-run; do not hand it out again
                self.instances.evict(languages);
                Err(OcrError::Extraction(join_error.to_string()))
            }
            Err(_) => {
                self.instances.evict(languages);
                Err(OcrError::Timeout(format!("no result after {}s", timeout.as_secs())))
            }
        }
    }
}

/// Reject files that are too large or not in a format Tesseract reads
pub fn validate_image_file(path: &Path, config: &OcrConfig) -> Result<(), OcrError> {
    let size = std::fs::metadata(path)
        .map_err(|e| OcrError::Validation(format!("cannot stat {}: {e}", path.display())))?
        .len();
    if size > config.max_file_size {
        return Err(OcrError::Validation(format!(
            "file is {size} bytes, limit is {}",
            config.max_file_size
        )));
    }
    if !is_supported_image_format(path, config) {
        return Err(OcrError::Validation("unsupported image format".to_string()));
    }
    Ok(())
}

/// Detect the image format from the file's magic bytes.
///
/// PNG, JPEG, BMP and TIFF are accepted.
pub fn is_supported_image_format(path: &Path, config: &OcrConfig) -> bool {
    let mut buffer = vec![0; config.buffer_size];
    let bytes_read = match File::open(path).and_then(|mut file| file.read(&mut buffer)) {
        Ok(n) => n,
        Err(e) => {
            debug!(path = %path.display(), error = %e, "Could not read file for format detection");
            return false;
        }
    };
    if bytes_read < config.min_format_bytes {
        debug!(path = %path.display(), bytes_read, "Too few bytes to detect image format");
        return false;
    }
    buffer.truncate(bytes_read);

    match image::guess_format(&buffer) {
        Ok(format) => {
            let supported = matches!(
                format,
                image::ImageFormat::Png
                    | image::ImageFormat::Jpeg
                    | image::ImageFormat::Bmp
                    | image::ImageFormat::Tiff
            );
            debug!(path = %path.display(), ?format, supported, "Detected image format");
            supported
        }
        Err(e) => {
            debug!(path = %path.display(), error = %e, "Unknown image format");
            false
        }
    }
}

/// Exponential backoff capped at `max_retry_delay_ms`, plus up to 10% jitter
pub fn calculate_retry_delay(attempt: u32, config: &RecoveryConfig) -> Duration {
    let exponential = config
        .base_retry_delay_ms
        .saturating_mul(1u64 << attempt.min(16));
    let capped = exponential.min(config.max_retry_delay_ms);
    let jitter = rand::thread_rng().gen_range(0..=capped / 10);
    Duration::from_millis(capped + jitter)
}

/// Trim every line and drop blank ones
pub fn clean_extracted_text(raw: &str) -> String {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
