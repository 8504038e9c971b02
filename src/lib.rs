//! Agent presets over the OpenRouter chat-completions API
//!
//! A [`GenerationClient`] is bound to a [`ServiceCategory`] and fills every
//! request parameter the caller leaves unset (model, system prompt,
//! temperature, token budget) from that category's profile. Each `generate`
//! call is a single request/response cycle; every failure comes back as a
//! [`GenerationError`].

pub mod agents;
pub mod catalog;
pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod probe;
pub mod profile;
pub mod session;
pub mod types;
pub mod utils;

#[cfg(test)]
mod testing;

// Re-export main types for convenience
pub use agents::{AgentKind, AgentOutput, AgentTask};
pub use client::{Completion, GenerateOptions, GenerationClient, Generator};
pub use config::{default_configuration, ConnectionConfig, ConnectionUpdate, EnvOverrides};
pub use error::{ConfigError, FailureCause, GenerationError, GenerationResult};
pub use models::{ChatMessage, ChatRequest, ChatResponse, MessageRole};
pub use profile::{JsonModeTable, ModelPattern, ProfileResolver};
pub use types::{ModelId, ServiceCategory};

/// Initialize the logging system. Logs go to stderr so command output on
/// stdout stays clean.
pub fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
}
