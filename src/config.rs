//! # Configuration Module
//!
//! This module defines the process-wide configuration: Telegram credentials,
//! the ordered list of inference endpoints, generation parameters and the
//! bot's presentation settings. It is read once at startup and never mutated.

use anyhow::{anyhow, Context, Result};
use reqwest::Url;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};

// Constants for inference configuration
pub const DEFAULT_API_BASE: &str = "https://api-inference.huggingface.co/models";
pub const DEFAULT_MODELS: &str = "ai-forever/rugpt3small_based_on_gpt2,gpt2";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const MAX_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_TOKEN_LIMIT: u32 = 100;
pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_REPETITION_PENALTY: f32 = 1.2;
pub const DEFAULT_LANGUAGE: &str = "ru";

/// Output length limit, serialized under the field name the model expects
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenLimit {
    /// `max_new_tokens`: tokens generated after the prompt
    MaxNewTokens(u32),
    /// `max_length`: total length including the prompt
    MaxLength(u32),
}

/// Fixed generation parameters sent with every request
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationParams {
    #[serde(flatten)]
    pub token_limit: TokenLimit,
    pub temperature: f32,
    pub do_sample: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repetition_penalty: Option<f32>,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            token_limit: TokenLimit::MaxNewTokens(DEFAULT_TOKEN_LIMIT),
            temperature: DEFAULT_TEMPERATURE,
            do_sample: true,
            repetition_penalty: Some(DEFAULT_REPETITION_PENALTY),
        }
    }
}

/// A candidate inference endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    /// Model identifier, e.g. `gpt2`
    pub model: String,
    /// Full request URL for the model
    pub url: String,
}

impl Endpoint {
    /// Build an endpoint as `<api_base>/<model>`
    pub fn new(api_base: &str, model: &str) -> Self {
        Self {
            model: model.to_string(),
            url: format!("{}/{}", api_base.trim_end_matches('/'), model),
        }
    }
}

/// Inference service configuration
#[derive(Clone)]
pub struct InferenceConfig {
    /// Bearer token; `None` disables remote generation
    pub api_token: Option<String>,
    /// Candidate endpoints in trial order
    pub endpoints: Vec<Endpoint>,
    /// Per-request timeout
    pub timeout: Duration,
    /// Generation parameters shared by all endpoints
    pub params: GenerationParams,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            api_token: None,
            endpoints: parse_models(DEFAULT_API_BASE, DEFAULT_MODELS),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            params: GenerationParams::default(),
        }
    }
}

impl fmt::Debug for InferenceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InferenceConfig")
            .field("api_token", &self.api_token.as_ref().map(|_| "<redacted>"))
            .field("endpoints", &self.endpoints)
            .field("timeout", &self.timeout)
            .field("params", &self.params)
            .finish()
    }
}

/// Presentation settings for the Telegram front-end
#[derive(Debug, Clone)]
pub struct BotSettings {
    /// Default UI language, also used for AI fallback replies
    pub language: String,
    /// Target of the Web App button shown on `/start`
    pub web_app_url: Option<Url>,
}

impl Default for BotSettings {
    fn default() -> Self {
        Self {
            language: DEFAULT_LANGUAGE.to_string(),
            web_app_url: None,
        }
    }
}

/// Complete process configuration
#[derive(Clone)]
pub struct Config {
    pub telegram_token: String,
    pub inference: InferenceConfig,
    pub bot: BotSettings,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("telegram_token", &"<redacted>")
            .field("inference", &self.inference)
            .field("bot", &self.bot)
            .finish()
    }
}

impl Config {
    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    ///
    /// Blank values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let telegram_token = get("TELEGRAM_BOT_TOKEN").context("TELEGRAM_BOT_TOKEN must be set")?;

        let api_token = get("HF_API_TOKEN");

        let api_base = get("HF_API_BASE").unwrap_or_else(|| DEFAULT_API_BASE.to_string());
        Url::parse(&api_base).with_context(|| format!("Invalid HF_API_BASE: {api_base}"))?;
        let models = get("HF_MODELS").unwrap_or_else(|| DEFAULT_MODELS.to_string());
        let endpoints = parse_models(&api_base, &models);
        if endpoints.is_empty() {
            return Err(anyhow!("HF_MODELS must name at least one model"));
        }

        let timeout_secs: u64 = parse_var(&get, "HF_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)?;
        if !(1..=MAX_TIMEOUT_SECS).contains(&timeout_secs) {
            return Err(anyhow!(
                "HF_TIMEOUT_SECS must be between 1 and {MAX_TIMEOUT_SECS}, got {timeout_secs}"
            ));
        }

        let limit: u32 = parse_var(&get, "HF_MAX_NEW_TOKENS", DEFAULT_TOKEN_LIMIT)?;
        let token_limit = match get("HF_TOKEN_LIMIT_FIELD").as_deref() {
            None | Some("max_new_tokens") => TokenLimit::MaxNewTokens(limit),
            Some("max_length") => TokenLimit::MaxLength(limit),
            Some(other) => {
                return Err(anyhow!(
                    "HF_TOKEN_LIMIT_FIELD must be max_new_tokens or max_length, got {other}"
                ))
            }
        };

        let temperature: f32 = parse_var(&get, "HF_TEMPERATURE", DEFAULT_TEMPERATURE)?;
        if !temperature.is_finite() || temperature < 0.0 {
            return Err(anyhow!(
                "HF_TEMPERATURE must be a finite non-negative number, got {temperature}"
            ));
        }

        // An explicitly empty value disables the penalty
        let repetition_penalty = match lookup("HF_REPETITION_PENALTY") {
            Some(value) if value.trim().is_empty() => None,
            _ => Some(parse_var(&get, "HF_REPETITION_PENALTY", DEFAULT_REPETITION_PENALTY)?),
        };

        let language = get("BOT_LANGUAGE").unwrap_or_else(|| DEFAULT_LANGUAGE.to_string());

        let web_app_url = get("WEB_APP_URL")
            .map(|value| Url::parse(&value).with_context(|| format!("Invalid WEB_APP_URL: {value}")))
            .transpose()?;

        let config = Self {
            telegram_token,
            inference: InferenceConfig {
                api_token,
                endpoints,
                timeout: Duration::from_secs(timeout_secs),
                params: GenerationParams {
                    token_limit,
                    temperature,
                    do_sample: true,
                    repetition_penalty,
                },
            },
            bot: BotSettings {
                language,
                web_app_url,
            },
        };

        info!(
            endpoints = config.inference.endpoints.len(),
            timeout_secs,
            language = %config.bot.language,
            "Configuration loaded"
        );
        debug!(config = ?config, "Effective configuration");

        Ok(config)
    }
}

/// Split a comma-separated model list into endpoints, preserving order
pub fn parse_models(api_base: &str, models: &str) -> Vec<Endpoint> {
    models
        .split(',')
        .map(str::trim)
        .filter(|model| !model.is_empty())
        .map(|model| Endpoint::new(api_base, model))
        .collect()
}

fn parse_var<T, G>(get: &G, name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: fmt::Display,
    G: Fn(&str) -> Option<String>,
{
    match get(name) {
        Some(value) => value
            .parse()
            .map_err(|e| anyhow!("Invalid {name}={value}: {e}")),
        None => Ok(default),
    }
}
