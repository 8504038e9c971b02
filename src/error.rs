use crate::types::ServiceCategory;
use reqwest::StatusCode;
use thiserror::Error;

pub type GenerationResult<T> = std::result::Result<T, GenerationError>;

/// The single failure a `generate` call can surface.
///
/// Every failure carries the category the client was bound to when the
/// request was assembled. The cause is kept for display and inspection but
/// callers are not expected to branch on it: nothing here is marked
/// retryable or fatal.
#[derive(Error, Debug)]
#[error("{category} generation failed: {cause}")]
pub struct GenerationError {
    pub category: ServiceCategory,
    #[source]
    pub cause: FailureCause,
}

impl GenerationError {
    pub fn new(category: ServiceCategory, cause: FailureCause) -> Self {
        Self { category, cause }
    }

    /// Get the HTTP status code if the API answered at all
    pub fn status_code(&self) -> Option<StatusCode> {
        match &self.cause {
            FailureCause::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// What went wrong during one request/response cycle
#[derive(Error, Debug)]
pub enum FailureCause {
    /// Non-2xx answer; `body` is the parsed error body or `{}`
    #[error("API request failed: {} {} - {body}", .status.as_u16(), .status.canonical_reason().unwrap_or(""))]
    Status {
        status: StatusCode,
        body: serde_json::Value,
    },

    /// Network-level failure, including timeouts
    #[error("transport error: {0}")]
    Transport(String),

    /// The response body was not a chat-completions document
    #[error("malformed response: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for FailureCause {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            FailureCause::Decode(err.to_string())
        } else {
            FailureCause::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for FailureCause {
    fn from(err: serde_json::Error) -> Self {
        FailureCause::Decode(err.to_string())
    }
}

/// Errors raised while loading or validating configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Environment variable error
    #[error(transparent)]
    EnvVar(#[from] EnvVarError),

    #[error("invalid base URL `{url}`: {source}")]
    BaseUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("unsupported base URL scheme `{0}`, expected http or https")]
    Scheme(String),
}

/// Environment variable error
#[derive(Debug)]
pub struct EnvVarError {
    /// Name of the environment variable that is missing
    pub var: String,
    /// Optional instructions to help the user get a valid value
    pub instructions: Option<String>,
}

impl std::fmt::Display for EnvVarError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Missing environment variable: `{}`", self.var)?;
        if let Some(instructions) = &self.instructions {
            write!(f, ". {}", instructions)?;
        }
        Ok(())
    }
}

impl std::error::Error for EnvVarError {}
