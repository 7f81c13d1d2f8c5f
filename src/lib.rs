//! # Celiac Telegram Bot
//!
//! A Telegram bot that reads ingredient labels with OCR and flags
//! gluten-containing ingredients, and that walks users through a short
//! celiac-disease risk questionnaire.

pub mod bot;
pub mod circuit_breaker;
pub mod config;
pub mod diagnosis;
pub mod dialogue;
pub mod gluten_scanner;
pub mod instance_manager;
pub mod localization;
pub mod ocr;
pub mod ocr_config;
pub mod ocr_errors;
