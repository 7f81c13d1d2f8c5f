//! # OCR Instance Manager Module
//!
//! Caches one Tesseract instance per language set. Creating an instance
//! loads the trained data from disk, which costs far more than a scan.

use leptess::LepTess;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::info;

use crate::ocr_errors::OcrError;

/// Shared handle to one Tesseract engine; runs are serialized by the mutex
pub type SharedTesseract = Arc<Mutex<LepTess>>;

#[derive(Default)]
pub struct OcrInstanceManager {
    instances: Mutex<HashMap<String, SharedTesseract>>,
}

impl OcrInstanceManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the cached engine for `languages`, creating it on first use
    pub fn get_instance(&self, languages: &str) -> Result<SharedTesseract, OcrError> {
        let mut instances = self
            .instances
            .lock()
            .map_err(|_| OcrError::Initialization("instance cache lock poisoned".to_string()))?;

        if let Some(instance) = instances.get(languages) {
            return Ok(Arc::clone(instance));
        }

        info!(languages, "Creating Tesseract instance");
        let tess = LepTess::new(None, languages)
            .map_err(|e| OcrError::Initialization(format!("{languages}: {e}")))?;
        let instance = Arc::new(Mutex::new(tess));
        instances.insert(languages.to_string(), Arc::clone(&instance));
        Ok(instance)
    }

    /// Drop a cached engine, e.g. after it failed mid-run
    pub fn evict(&self, languages: &str) {
        if let Ok(mut instances) = self.instances.lock() {
            if instances.remove(languages).is_some() {
                info!(languages, "Evicted Tesseract instance");
            }
        }
    }

    pub fn instance_count(&self) -> usize {
        self.instances.lock().map(|i| i.len()).unwrap_or(0)
    }
}
