//! # Configuration Module
//!
//! Startup settings read from the environment (and `.env` via `dotenv`).
//!
//! | Variable | Required | Default |
//! |---|---|---|
//! | `TELEGRAM_BOT_TOKEN` | yes | |
//! | `GLUTEN_KEYWORDS` | no | built-in keyword list |
//! | `OCR_LANGUAGES` | no | `eng` |
//! | `OCR_TIMEOUT_SECS` | no | `30` |

use anyhow::{bail, Context, Result};
use std::env;

use crate::gluten_scanner::IngredientVocabulary;
use crate::ocr_config::OcrConfig;

#[derive(Clone)]
pub struct BotConfig {
    pub bot_token: String,
    pub vocabulary: IngredientVocabulary,
    pub ocr: OcrConfig,
}

// The token is a credential; keep it out of logs
impl std::fmt::Debug for BotConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BotConfig")
            .field("bot_token", &"<redacted>")
            .field("vocabulary", &self.vocabulary)
            .field("ocr", &self.ocr)
            .finish()
    }
}

impl BotConfig {
    /// Read configuration from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build configuration from any variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let bot_token = lookup("TELEGRAM_BOT_TOKEN")
            .filter(|token| !token.trim().is_empty())
            .context("TELEGRAM_BOT_TOKEN must be set")?;

        let vocabulary = match lookup("GLUTEN_KEYWORDS") {
            Some(list) => {
                let vocabulary = IngredientVocabulary::from_csv(&list);
                if vocabulary.is_empty() {
                    bail!("GLUTEN_KEYWORDS is set but contains no keywords");
                }
                vocabulary
            }
            None => IngredientVocabulary::default(),
        };

        let mut ocr = OcrConfig::default();
        if let Some(languages) = lookup("OCR_LANGUAGES").filter(|l| !l.trim().is_empty()) {
            ocr = ocr.with_languages(languages.trim());
        }
        if let Some(raw) = lookup("OCR_TIMEOUT_SECS") {
            let secs: u64 = raw
                .trim()
                .parse()
                .with_context(|| format!("OCR_TIMEOUT_SECS must be a whole number of seconds, got {raw:?}"))?;
            ocr = ocr.with_timeout_secs(secs);
        }

        Ok(Self {
            bot_token,
            vocabulary,
            ocr,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Result<BotConfig> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        BotConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_token_is_required() {
        let err = config_from(&[]).unwrap_err();
        assert!(err.to_string().contains("TELEGRAM_BOT_TOKEN"));
        assert!(config_from(&[("TELEGRAM_BOT_TOKEN", "  ")]).is_err());
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[("TELEGRAM_BOT_TOKEN", "123:abc")]).unwrap();
        assert_eq!(config.vocabulary, IngredientVocabulary::default());
        assert_eq!(config.ocr, OcrConfig::default());
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("TELEGRAM_BOT_TOKEN", "123:abc"),
            ("GLUTEN_KEYWORDS", "Wheat, seitan"),
            ("OCR_LANGUAGES", "eng+fra"),
            ("OCR_TIMEOUT_SECS", "10"),
        ])
        .unwrap();
        assert_eq!(config.vocabulary.len(), 2);
        assert!(config.vocabulary.contains("seitan"));
        assert_eq!(config.ocr.languages, "eng+fra");
        assert_eq!(config.ocr.recovery.operation_timeout_secs, 10);
    }

    #[test]
    fn test_invalid_overrides() {
        assert!(config_from(&[("TELEGRAM_BOT_TOKEN", "t"), ("GLUTEN_KEYWORDS", " , ")]).is_err());
        assert!(config_from(&[("TELEGRAM_BOT_TOKEN", "t"), ("OCR_TIMEOUT_SECS", "soon")]).is_err());
    }

    #[test]
    fn test_debug_redacts_token() {
        let config = config_from(&[("TELEGRAM_BOT_TOKEN", "123:secret")]).unwrap();
        assert!(!format!("{config:?}").contains("secret"));
    }
}
