//! # AI Response Resolver
//!
//! Turns a user message into a reply. Candidate endpoints are tried in
//! configured order and the first usable generation wins. When every
//! endpoint fails the input is matched against a small table of canned
//! replies, and failing that a generic "unavailable" message is returned.
//!
//! [`AiResolver::resolve`] never fails: every error ends up as chat text.

use anyhow::Result;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::config::{Endpoint, InferenceConfig};
use crate::inference::InferenceClient;
use crate::inference_errors::InferenceFailure;
use crate::localization::LocalizationManager;

/// Trigger substrings (matched against lower-cased input) and their reply keys
///
/// Order matters: the first trigger found in the input wins.
pub const CANNED_TRIGGERS: &[(&str, &str)] = &[
    ("привет", "canned-greeting"),
    ("как дела", "canned-how-are-you"),
    ("что ты умеешь", "canned-abilities"),
    ("спасибо", "canned-thanks"),
    ("кто ты", "canned-who-are-you"),
];

/// User-visible strings used by the resolver
///
/// Every lookup takes the requesting user's Telegram `language_code`; codes
/// without a bundle fall back to the catalog language chosen at startup.
pub struct ReplyCatalog {
    localization: Arc<LocalizationManager>,
    language: String,
}

impl ReplyCatalog {
    /// Build the catalog with `language` as the fallback reply language
    pub fn new(localization: Arc<LocalizationManager>, language: &str) -> Self {
        let language = localization.resolve_language(Some(language)).to_string();
        Self {
            localization,
            language,
        }
    }

    /// The bundle language used for a user with `language_code`
    pub fn language_for<'a>(&'a self, language_code: Option<&'a str>) -> &'a str {
        language_code
            .and_then(|code| code.split(['-', '_']).next())
            .filter(|code| self.localization.is_supported(code))
            .unwrap_or(self.language.as_str())
    }

    fn message(&self, key: &str, language_code: Option<&str>) -> String {
        self.localization
            .get_message_in_language(key, self.language_for(language_code), None)
    }

    pub fn not_configured(&self, language_code: Option<&str>) -> String {
        self.message("ai-not-configured", language_code)
    }

    pub fn unavailable(&self, language_code: Option<&str>) -> String {
        self.message("ai-unavailable", language_code)
    }

    pub fn model_loading(&self, estimated_secs: u64, language_code: Option<&str>) -> String {
        let seconds = estimated_secs.to_string();
        self.localization.t_args_lang(
            "ai-model-loading",
            &[("seconds", seconds.as_str())],
            Some(self.language_for(language_code)),
        )
    }

    /// The canned reply for `input`, if any trigger occurs in it
    pub fn canned_reply(&self, input: &str, language_code: Option<&str>) -> Option<String> {
        let lowered = input.to_lowercase();
        CANNED_TRIGGERS
            .iter()
            .find(|(trigger, _)| lowered.contains(trigger))
            .map(|(_, key)| self.message(key, language_code))
    }
}

/// Resolves user input into a reply using remote generation with fallbacks
pub struct AiResolver {
    client: InferenceClient,
    api_token: Option<String>,
    endpoints: Vec<Endpoint>,
    replies: ReplyCatalog,
}

impl AiResolver {
    /// Create a resolver from the inference configuration
    pub fn new(config: &InferenceConfig, replies: ReplyCatalog) -> Result<Self> {
        let client = InferenceClient::new(config.timeout, config.params.clone())?;

        Ok(Self {
            client,
            api_token: config.api_token.clone(),
            endpoints: config.endpoints.clone(),
            replies,
        })
    }

    /// Whether an inference credential is present
    pub fn is_configured(&self) -> bool {
        self.api_token.is_some()
    }

    pub fn replies(&self) -> &ReplyCatalog {
        &self.replies
    }

    /// Produce a reply for `input` in the default reply language
    pub async fn resolve(&self, input: &str) -> String {
        self.resolve_in(input, None).await
    }

    /// Produce a reply for `input`; fixed texts use `language_code`
    pub async fn resolve_in(&self, input: &str, language_code: Option<&str>) -> String {
        let Some(api_token) = self.api_token.as_deref() else {
            warn!("AI reply requested but no inference token is configured");
            return self.replies.not_configured(language_code);
        };

        let prompt = input.trim();
        if prompt.is_empty() {
            debug!("Empty prompt, skipping remote generation");
            return self.fallback_reply(prompt, language_code);
        }

        for (attempt, endpoint) in self.endpoints.iter().enumerate() {
            debug!(attempt = attempt + 1, model = %endpoint.model, "Trying inference endpoint");

            match self.client.generate(endpoint, api_token, prompt).await {
                Ok(text) => {
                    info!(
                        model = %endpoint.model,
                        chars = text.chars().count(),
                        "Generated reply"
                    );
                    return text;
                }
                Err(InferenceFailure::ModelLoading { estimated_secs }) => {
                    info!(model = %endpoint.model, estimated_secs, "Model is loading");
                    return self.replies.model_loading(estimated_secs, language_code);
                }
                Err(failure) => {
                    warn!(model = %endpoint.model, error = %failure, "Inference endpoint failed");
                }
            }
        }

        info!(
            endpoints = self.endpoints.len(),
            "All inference endpoints failed, using fallback reply"
        );
        self.fallback_reply(prompt, language_code)
    }

    /// Canned reply for `input`, or the generic unavailable message
    pub fn fallback_reply(&self, input: &str, language_code: Option<&str>) -> String {
        self.replies
            .canned_reply(input, language_code)
            .unwrap_or_else(|| self.replies.unavailable(language_code))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> ReplyCatalog {
        let localization = Arc::new(LocalizationManager::new("ru").unwrap());
        ReplyCatalog::new(localization, "ru")
    }

    fn greeting(catalog: &ReplyCatalog, language: &str) -> String {
        catalog
            .localization
            .get_message_in_language("canned-greeting", language, None)
    }

    #[test]
    fn test_every_trigger_has_a_translation() {
        let catalog = catalog();
        for language in ["ru", "en"] {
            for (trigger, key) in CANNED_TRIGGERS {
                let reply = catalog.localization.get_message_in_language(key, language, None);
                assert!(!reply.starts_with("Missing"), "{language}: {trigger}");
            }
        }
    }

    #[test]
    fn test_canned_reply_is_case_insensitive() {
        let catalog = catalog();
        let expected = greeting(&catalog, "ru");
        assert_eq!(catalog.canned_reply("ПРИВЕТ, бот!", None), Some(expected));
    }

    #[test]
    fn test_first_matching_trigger_wins() {
        let catalog = catalog();
        let expected = greeting(&catalog, "ru");
        assert_eq!(catalog.canned_reply("привет, как дела?", None), Some(expected));
    }

    #[test]
    fn test_no_trigger_no_canned_reply() {
        assert_eq!(catalog().canned_reply("расскажи анекдот", None), None);
    }

    #[test]
    fn test_model_loading_mentions_seconds() {
        assert!(catalog().model_loading(45, None).contains("45"));
        assert!(catalog().model_loading(45, Some("en")).contains("45 seconds"));
    }

    #[test]
    fn test_replies_follow_user_language() {
        let catalog = catalog();

        assert_eq!(
            catalog.canned_reply("привет", Some("en-US")),
            Some(greeting(&catalog, "en"))
        );
        assert!(catalog.unavailable(Some("en")).contains("temporarily unavailable"));
        assert!(catalog.not_configured(Some("en")).contains("not configured"));
    }

    #[test]
    fn test_unknown_user_language_uses_catalog_language() {
        let catalog = catalog();

        assert_eq!(catalog.language_for(Some("de")), "ru");
        assert_eq!(catalog.language_for(None), "ru");
        assert_eq!(catalog.unavailable(Some("de")), catalog.unavailable(None));
    }
}
