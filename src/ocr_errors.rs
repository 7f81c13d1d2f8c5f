//! # OCR Error Types Module
//!
//! Failure modes of the label-reading pipeline. Every variant is reported to
//! the user as the same generic "couldn't process image" message; the
//! variant itself is only logged.

/// Custom error types for OCR operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OcrError {
    /// File rejected before OCR (size, format)
    Validation(String),
    /// Fetching the file from Telegram failed
    Download(String),
    /// Tesseract could not be created for the configured languages
    Initialization(String),
    /// Tesseract could not read the image
    ImageLoad(String),
    Extraction(String),
    Timeout(String),
    /// Too many recent failures; OCR is paused
    CircuitOpen,
}

impl OcrError {
    /// Whether another attempt could succeed
    pub fn is_retryable(&self) -> bool {
        matches!(self, OcrError::Extraction(_) | OcrError::Timeout(_))
    }
}

impl std::fmt::Display for OcrError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OcrError::Validation(msg) => write!(f, "Validation error: {msg}"),
            OcrError::Download(msg) => write!(f, "Download error: {msg}"),
            OcrError::Initialization(msg) => write!(f, "Initialization error: {msg}"),
            OcrError::ImageLoad(msg) => write!(f, "Image load error: {msg}"),
            OcrError::Extraction(msg) => write!(f, "Extraction error: {msg}"),
            OcrError::Timeout(msg) => write!(f, "Timeout error: {msg}"),
            OcrError::CircuitOpen => write!(f, "OCR temporarily disabled after repeated failures"),
        }
    }
}

impl std::error::Error for OcrError {}
