//! # Localization Module
//!
//! Fluent-based message catalog for the bot. Resources are embedded at
//! compile time from `locales/<lang>/main.ftl`.

use anyhow::{anyhow, Result};
use fluent_bundle::concurrent::FluentBundle;
use fluent_bundle::{FluentArgs, FluentResource, FluentValue};
use std::collections::HashMap;
use tracing::{debug, warn};
use unic_langid::LanguageIdentifier;

/// Languages shipped with the bot, paired with their Fluent sources
const EMBEDDED_LOCALES: &[(&str, &str)] = &[
    ("ru", include_str!("../locales/ru/main.ftl")),
    ("en", include_str!("../locales/en/main.ftl")),
];

/// Localization manager for the bot
///
/// Holds one bundle per supported language. Lookups for a language that is
/// not supported fall back to the default language chosen at construction.
pub struct LocalizationManager {
    bundles: HashMap<String, FluentBundle<FluentResource>>,
    default_language: String,
}

impl LocalizationManager {
    /// Create a new localization manager with `default_language` as fallback
    ///
    /// Fails if `default_language` is not one of the embedded locales or if
    /// an embedded resource does not parse.
    pub fn new(default_language: &str) -> Result<Self> {
        let mut bundles = HashMap::new();

        for (code, source) in EMBEDDED_LOCALES {
            let locale: LanguageIdentifier = code.parse()?;
            let bundle = Self::create_bundle(&locale, source)?;
            bundles.insert(code.to_string(), bundle);
        }

        if !bundles.contains_key(default_language) {
            return Err(anyhow!(
                "Unsupported default language '{default_language}'"
            ));
        }

        debug!(languages = bundles.len(), default_language, "Localization bundles loaded");

        Ok(Self {
            bundles,
            default_language: default_language.to_string(),
        })
    }

    /// Create a fluent bundle for a specific locale
    fn create_bundle(
        locale: &LanguageIdentifier,
        source: &str,
    ) -> Result<FluentBundle<FluentResource>> {
        let mut bundle = FluentBundle::new_concurrent(vec![locale.clone()]);
        // Placeables are sent to Telegram as-is, without bidi isolation marks
        bundle.set_use_isolating(false);

        let resource = FluentResource::try_new(source.to_string())
            .map_err(|(_, errors)| anyhow!("Failed to parse {locale} resource: {errors:?}"))?;
        bundle
            .add_resource(resource)
            .map_err(|errors| anyhow!("Failed to add {locale} resource: {errors:?}"))?;

        Ok(bundle)
    }

    /// The language used when a request names no supported language
    pub fn default_language(&self) -> &str {
        &self.default_language
    }

    /// Whether `language` has its own bundle
    pub fn is_supported(&self, language: &str) -> bool {
        self.bundles.contains_key(language)
    }

    /// Pick the bundle language for a Telegram `language_code`
    ///
    /// Region subtags are ignored, so `en-US` resolves to `en`.
    pub fn resolve_language<'a>(&'a self, language_code: Option<&'a str>) -> &'a str {
        language_code
            .map(|code| code.split(['-', '_']).next().unwrap_or(code))
            .filter(|code| self.is_supported(code))
            .unwrap_or(self.default_language.as_str())
    }

    /// Get a localized message in a specific language
    pub fn get_message_in_language(
        &self,
        key: &str,
        language: &str,
        args: Option<&HashMap<&str, &str>>,
    ) -> String {
        let language = self.resolve_language(Some(language));
        let Some(bundle) = self.bundles.get(language) else {
            return format!("Missing translation: {key}");
        };

        let Some(msg) = bundle.get_message(key) else {
            warn!(key, language, "Missing translation");
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
        let value = bundle.format_pattern(pattern, fluent_args.as_ref(), &mut errors);
        if !errors.is_empty() {
            debug!(key, language, ?errors, "Fluent reported formatting errors");
        }

        value.into_owned()
    }

    /// Get a localized message for a Telegram language code
    pub fn t_lang(&self, key: &str, language_code: Option<&str>) -> String {
        let language = self.resolve_language(language_code);
        self.get_message_in_language(key, language, None)
    }

    /// Get a localized message with simple string arguments
    pub fn t_args_lang(
        &self,
        key: &str,
        args: &[(&str, &str)],
        language_code: Option<&str>,
    ) -> String {
        let language = self.resolve_language(language_code);
        let args_map: HashMap<&str, &str> = args.iter().copied().collect();
        self.get_message_in_language(key, language, Some(&args_map))
    }
}
