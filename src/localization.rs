//! # Localization Module
//!
//! Message catalog backed by Fluent. The English resource is compiled into
//! the binary, so lookups never touch the filesystem.

use anyhow::{anyhow, Result};
use fluent_bundle::concurrent::FluentBundle;
use fluent_bundle::{FluentArgs, FluentResource, FluentValue};
use std::collections::HashMap;
use std::sync::OnceLock;
use tracing::{error, warn};
use unic_langid::LanguageIdentifier;

const EN_MAIN_FTL: &str = include_str!("../locales/en/main.ftl");

/// Message catalog for the bot
pub struct LocalizationManager {
    bundle: FluentBundle<FluentResource>,
}

impl LocalizationManager {
    /// Create a manager loaded with the embedded English catalog
    pub fn new() -> Result<Self> {
        Self::from_source(EN_MAIN_FTL)
    }

    /// Create a manager from Fluent source text
    pub fn from_source(source: &str) -> Result<Self> {
        let locale: LanguageIdentifier = "en".parse()?;
        let mut bundle = FluentBundle::new_concurrent(vec![locale]);
        // Telegram renders the bidi isolation marks literally
        bundle.set_use_isolating(false);

        let resource = FluentResource::try_new(source.to_string())
            .map_err(|(_, errors)| anyhow!("Invalid message catalog: {errors:?}"))?;
        bundle
            .add_resource(resource)
            .map_err(|errors| anyhow!("Duplicate catalog entries: {errors:?}"))?;

        Ok(Self { bundle })
    }

    /// Get a message, formatting it with `args` when given
    pub fn get_message(&self, key: &str, args: Option<&HashMap<&str, &str>>) -> String {
        let Some(msg) = self.bundle.get_message(key) else {
            warn!(key, "Missing translation");
            return format!("Missing translation: {key}");
        };
        let Some(pattern) = msg.value() else {
            return format!("Missing value for key: {key}");
        };

        let fluent_args = args.map(|args| {
            let mut fluent_args = FluentArgs::new();
            for (name, value) in args {
                fluent_args.set(*name, FluentValue::from(*value));
            }
            fluent_args
        });

        let mut errors = vec![];
        let value = self
            .bundle
            .format_pattern(pattern, fluent_args.as_ref(), &mut errors)
            .into_owned();
        if !errors.is_empty() {
            warn!(key, ?errors, "Message formatted with errors");
        }
        value
    }

    /// Get a message with simple string arguments
    pub fn get_message_with_args(&self, key: &str, args: &[(&str, &str)]) -> String {
        let args_map: HashMap<&str, &str> = args.iter().copied().collect();
        self.get_message(key, Some(&args_map))
    }
}

static LOCALIZATION_MANAGER: OnceLock<LocalizationManager> = OnceLock::new();

/// Load the catalog eagerly so a broken resource fails at startup
pub fn init_localization() -> Result<()> {
    if LOCALIZATION_MANAGER.get().is_none() {
        let manager = LocalizationManager::new()?;
        let _ = LOCALIZATION_MANAGER.set(manager);
    }
    Ok(())
}

/// Get the global localization manager, loading it on first use
pub fn get_localization_manager() -> &'static LocalizationManager {
    LOCALIZATION_MANAGER.get_or_init(|| {
        LocalizationManager::new().unwrap_or_else(|e| {
            error!(error = %e, "Falling back to an empty message catalog");
            LocalizationManager {
                bundle: FluentBundle::new_concurrent(vec![]),
            }
        })
    })
}

/// Convenience function to get a message
pub fn t(key: &str) -> String {
    get_localization_manager().get_message(key, None)
}

/// Convenience function to get a message with arguments
pub fn t_args(key: &str, args: &[(&str, &str)]) -> String {
    get_localization_manager().get_message_with_args(key, args)
}
