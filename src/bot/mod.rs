//! Bot module for handling Telegram interactions
//!
//! - `message_handler`: routes incoming text, photo and document messages
//! - `diagnosis_handler`: drives the risk questionnaire for a chat
//! - `commands`: slash-command parsing
//! - `ui_builder`: keyboards and message formatting

pub mod commands;
pub mod diagnosis_handler;
pub mod message_handler;
pub mod ui_builder;

use crate::config::BotConfig;
use crate::gluten_scanner::IngredientVocabulary;
use crate::ocr::OcrService;

pub use message_handler::message_handler;

/// Read-only state shared by every handler
pub struct BotContext {
    pub vocabulary: IngredientVocabulary,
    pub ocr: OcrService,
}

impl BotContext {
    pub fn new(vocabulary: IngredientVocabulary, ocr: OcrService) -> Self {
        Self { vocabulary, ocr }
    }

    pub fn from_config(config: &BotConfig) -> Self {
        Self::new(config.vocabulary.clone(), OcrService::new(config.ocr.clone()))
    }
}
