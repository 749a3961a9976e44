//! # Inference Client Module
//!
//! Thin wrapper around the text-generation HTTP API. One call targets one
//! endpoint and yields either generated text or an [`InferenceFailure`];
//! nothing here panics or returns transport errors to the caller.

use anyhow::{Context, Result};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

use crate::config::{Endpoint, GenerationParams};
use crate::inference_errors::InferenceFailure;

/// Wait suggested to the user when the service gives no estimate
pub const DEFAULT_LOADING_WAIT_SECS: u64 = 30;

/// Characters of response body kept in log lines
const LOG_BODY_LIMIT: usize = 200;

#[derive(Debug, Serialize)]
struct GenerationRequest<'a> {
    inputs: &'a str,
    parameters: &'a GenerationParams,
}

#[derive(Debug, Deserialize)]
struct Generation {
    generated_text: String,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
    #[serde(default)]
    estimated_time: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum InferenceResponse {
    Generations(Vec<Generation>),
    Error(ErrorBody),
    Single(Generation),
}

/// HTTP client for the inference service
#[derive(Debug, Clone)]
pub struct InferenceClient {
    http: reqwest::Client,
    params: GenerationParams,
}

impl InferenceClient {
    /// Create a client whose every request is bounded by `timeout`
    pub fn new(timeout: Duration, params: GenerationParams) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build inference HTTP client")?;

        Ok(Self { http, params })
    }

    /// Ask `endpoint` to continue `prompt`
    pub async fn generate(
        &self,
        endpoint: &Endpoint,
        api_token: &str,
        prompt: &str,
    ) -> std::result::Result<String, InferenceFailure> {
        let request = GenerationRequest {
            inputs: prompt,
            parameters: &self.params,
        };

        debug!(model = %endpoint.model, url = %endpoint.url, "Sending generation request");

        let response = self
            .http
            .post(&endpoint.url)
            .bearer_auth(api_token)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        info!(
            model = %endpoint.model,
            status = status.as_u16(),
            body = %truncate_chars(&body, LOG_BODY_LIMIT),
            "Inference endpoint responded"
        );

        parse_generation_body(status, &body, prompt)
    }
}

/// Interpret a response body from the inference service
///
/// Generation bodies are accepted regardless of status; error bodies and
/// unparseable non-success bodies become [`InferenceFailure`]s.
pub fn parse_generation_body(
    status: StatusCode,
    body: &str,
    prompt: &str,
) -> std::result::Result<String, InferenceFailure> {
    let parsed: InferenceResponse = match serde_json::from_str(body) {
        Ok(parsed) => parsed,
        Err(e) if status.is_success() => {
            return Err(InferenceFailure::UnexpectedBody(e.to_string()));
        }
        Err(_) => {
            return Err(InferenceFailure::Remote {
                status: status.as_u16(),
                message: truncate_chars(body, LOG_BODY_LIMIT),
            });
        }
    };

    let generation = match parsed {
        InferenceResponse::Generations(items) => items.into_iter().next(),
        InferenceResponse::Single(generation) => Some(generation),
        InferenceResponse::Error(err) => return Err(classify_error(status, err)),
    };

    let Some(generation) = generation else {
        return Err(InferenceFailure::EmptyOutput);
    };

    let text = strip_echo(&generation.generated_text, prompt);
    if text.is_empty() {
        Err(InferenceFailure::EmptyOutput)
    } else {
        Ok(text)
    }
}

fn classify_error(status: StatusCode, err: ErrorBody) -> InferenceFailure {
    if err.error.to_lowercase().contains("loading") {
        let estimated_secs = err
            .estimated_time
            .filter(|secs| secs.is_finite() && *secs > 0.0)
            .map(|secs| secs.ceil() as u64)
            .unwrap_or(DEFAULT_LOADING_WAIT_SECS);
        InferenceFailure::ModelLoading { estimated_secs }
    } else {
        InferenceFailure::Remote {
            status: status.as_u16(),
            message: err.error,
        }
    }
}

/// Remove the prompt from the front of generated text, then trim
pub fn strip_echo(generated: &str, prompt: &str) -> String {
    generated
        .strip_prefix(prompt)
        .unwrap_or(generated)
        .trim()
        .to_string()
}

/// Keep at most `limit` characters, respecting char boundaries
pub fn truncate_chars(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}
