//! # Inference Error Types Module
//!
//! Typed failure reasons for a single call to an inference endpoint. The
//! resolver branches on these to decide whether to try the next endpoint.

/// Why an inference call did not produce usable text
#[derive(Debug, Clone, PartialEq)]
pub enum InferenceFailure {
    /// The request exceeded the configured timeout
    Timeout,
    /// Connection, TLS or body read failure
    Transport(String),
    /// The service is still loading the model
    ModelLoading { estimated_secs: u64 },
    /// The service answered with an error body or a non-success status
    Remote { status: u16, message: String },
    /// The body was not one of the known response shapes
    UnexpectedBody(String),
    /// Generation succeeded but nothing remained after echo suppression
    EmptyOutput,
}

impl std::fmt::Display for InferenceFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InferenceFailure::Timeout => write!(f, "Request timed out"),
            InferenceFailure::Transport(msg) => write!(f, "Transport error: {msg}"),
            InferenceFailure::ModelLoading { estimated_secs } => {
                write!(f, "Model is loading, estimated {estimated_secs}s")
            }
            InferenceFailure::Remote { status, message } => {
                write!(f, "Remote error ({status}): {message}")
            }
            InferenceFailure::UnexpectedBody(msg) => write!(f, "Unexpected response body: {msg}"),
            InferenceFailure::EmptyOutput => write!(f, "Generated text was empty"),
        }
    }
}

impl std::error::Error for InferenceFailure {}

impl From<reqwest::Error> for InferenceFailure {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            InferenceFailure::Timeout
        } else {
            InferenceFailure::Transport(err.to_string())
        }
    }
}
