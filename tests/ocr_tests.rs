//! # OCR Tests Module
//!
//! Configuration, file validation, retry policy and failure isolation.
//! None of these need Tesseract installed.

use celiac_bot::circuit_breaker::CircuitBreaker;
use celiac_bot::instance_manager::OcrInstanceManager;
use celiac_bot::ocr::{calculate_retry_delay, is_supported_image_format, validate_image_file, OcrService};
use celiac_bot::ocr_config::{OcrConfig, RecoveryConfig};
use celiac_bot::ocr_errors::OcrError;
use std::io::Write;
use std::path::Path;
use std::time::Duration;
use tempfile::NamedTempFile;

const PNG_HEADER: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";
const JPEG_HEADER: &[u8] = b"\xFF\xD8\xFF\xE0\0\x10JFIF\0\x01";
const GIF_HEADER: &[u8] = b"GIF89a\x01\0\x01\0\0\0\0";

fn temp_file_with(bytes: &[u8]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(bytes).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn test_ocr_config_defaults() {
    let config = OcrConfig::default();
    assert_eq!(config.languages, "eng");
    assert_eq!(config.buffer_size, 32);
    assert_eq!(config.min_format_bytes, 8);
    assert_eq!(config.max_file_size, 10 * 1024 * 1024);
    assert_eq!(config.recovery.operation_timeout(), Duration::from_secs(30));
}

#[test]
fn test_ocr_config_builders() {
    let config = OcrConfig::default().with_languages("eng+fra").with_timeout_secs(5);
    assert_eq!(config.languages, "eng+fra");
    assert_eq!(config.recovery.operation_timeout_secs, 5);
}

#[test]
fn test_supported_formats() {
    let config = OcrConfig::default();
    let png = temp_file_with(PNG_HEADER);
    let jpeg = temp_file_with(JPEG_HEADER);
    assert!(is_supported_image_format(png.path(), &config));
    assert!(is_supported_image_format(jpeg.path(), &config));
}

#[test]
fn test_unsupported_formats() {
    let config = OcrConfig::default();
    let gif = temp_file_with(GIF_HEADER);
    let text = temp_file_with(b"wheat flour, sugar, salt");
    let tiny = temp_file_with(b"\x89PNG");
    assert!(!is_supported_image_format(gif.path(), &config));
    assert!(!is_supported_image_format(text.path(), &config));
    assert!(!is_supported_image_format(tiny.path(), &config));
    assert!(!is_supported_image_format(Path::new("/nonexistent/label.png"), &config));
}

#[test]
fn test_validate_rejects_oversized_file() {
    let config = OcrConfig {
        max_file_size: 4,
        ..Default::default()
    };
    let png = temp_file_with(PNG_HEADER);
    match validate_image_file(png.path(), &config) {
        Err(OcrError::Validation(msg)) => assert!(msg.contains("limit")),
        other => panic!("expected a validation error, got {other:?}"),
    }
}

#[test]
fn test_validate_accepts_png() {
    let png = temp_file_with(PNG_HEADER);
    assert_eq!(validate_image_file(png.path(), &OcrConfig::default()), Ok(()));
}

#[tokio::test]
async fn test_extract_text_rejects_non_image_before_ocr() {
    let service = OcrService::new(OcrConfig::default());
    let text = temp_file_with(b"this is not an image at all");
    let result = service.extract_text(text.path()).await;
    assert!(matches!(result, Err(OcrError::Validation(_))));
}

#[test]
fn test_retry_delay_respects_cap() {
    let config = RecoveryConfig::default();
    for attempt in 0..20 {
        let delay = calculate_retry_delay(attempt, &config).as_millis() as u64;
        assert!(delay >= config.base_retry_delay_ms.min(config.max_retry_delay_ms));
        assert!(delay <= config.max_retry_delay_ms + config.max_retry_delay_ms / 10);
    }
}

#[test]
fn test_circuit_breaker_state_transitions() {
    let config = RecoveryConfig {
        circuit_breaker_threshold: 3,
        ..Default::default()
    };
    let breaker = CircuitBreaker::new(&config);

    breaker.record_failure();
    breaker.record_failure();
    assert!(!breaker.is_open());
    breaker.record_failure();
    assert!(breaker.is_open());
    assert_eq!(breaker.failure_count(), 3);

    breaker.record_success();
    assert!(!breaker.is_open());
}

#[test]
fn test_circuit_breaker_resets_after_window() {
    let breaker = CircuitBreaker::with_settings(1, Duration::from_millis(20));
    breaker.record_failure();
    assert!(breaker.is_open());
    std::thread::sleep(Duration::from_millis(40));
    assert!(!breaker.is_open());
}

#[test]
fn test_instance_manager_starts_empty() {
    assert_eq!(OcrInstanceManager::new().instance_count(), 0);
}

#[test]
fn test_error_display_and_retryability() {
    assert_eq!(
        OcrError::Validation("too big".to_string()).to_string(),
        "Validation error: too big"
    );
    assert_eq!(OcrError::Timeout("30s".to_string()).to_string(), "Timeout error: 30s");
    assert!(OcrError::Timeout(String::new()).is_retryable());
    assert!(OcrError::Extraction(String::new()).is_retryable());
    assert!(!OcrError::Initialization(String::new()).is_retryable());
    assert!(!OcrError::CircuitOpen.is_retryable());
}
