use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Model identifier, e.g. `openai/gpt-4.1-nano`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModelId(String);

impl ModelId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ModelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for ModelId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for ModelId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Predefined model IDs
impl ModelId {
    /// Used when neither the environment nor the caller names a model.
    pub const FALLBACK: &'static str = "meta-llama/llama-3.1-8b-instruct:free";
    pub const GPT_4_1_NANO: &'static str = "openai/gpt-4.1-nano";
    pub const GPT_4O_MINI: &'static str = "openai/gpt-4o-mini";
    pub const CLAUDE_3_HAIKU: &'static str = "anthropic/claude-3-haiku";
    pub const CLAUDE_3_5_SONNET: &'static str = "anthropic/claude-3.5-sonnet";
    pub const GEMINI_FLASH: &'static str = "google/gemini-flash-1.5";
}

/// The profile a client applies when filling unset request parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ServiceCategory {
    MockGeneration,
    CodeGeneration,
    Translation,
    Documentation,
    #[default]
    Unspecified,
}

impl ServiceCategory {
    pub const ALL: [ServiceCategory; 5] = [
        ServiceCategory::MockGeneration,
        ServiceCategory::CodeGeneration,
        ServiceCategory::Translation,
        ServiceCategory::Documentation,
        ServiceCategory::Unspecified,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceCategory::MockGeneration => "mock-generator",
            ServiceCategory::CodeGeneration => "code-generator",
            ServiceCategory::Translation => "translator",
            ServiceCategory::Documentation => "documentation",
            ServiceCategory::Unspecified => "general",
        }
    }

    /// Name of the environment variable that pins a model for this category.
    /// `Unspecified` has none and only follows the global default.
    pub fn model_env_var(&self) -> Option<&'static str> {
        match self {
            ServiceCategory::MockGeneration => Some("OPENROUTER_MOCK_GENERATOR_MODEL"),
            ServiceCategory::CodeGeneration => Some("OPENROUTER_CODE_GENERATOR_MODEL"),
            ServiceCategory::Translation => Some("OPENROUTER_TRANSLATOR_MODEL"),
            ServiceCategory::Documentation => Some("OPENROUTER_DOCUMENTATION_MODEL"),
            ServiceCategory::Unspecified => None,
        }
    }
}

impl fmt::Display for ServiceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ServiceCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mock-generator" | "mock-generation" | "mock" => Ok(ServiceCategory::MockGeneration),
            "code-generator" | "code-generation" | "code" => Ok(ServiceCategory::CodeGeneration),
            "translator" | "translation" => Ok(ServiceCategory::Translation),
            "documentation" | "docs" => Ok(ServiceCategory::Documentation),
            "general" | "unspecified" | "custom" => Ok(ServiceCategory::Unspecified),
            other => Err(format!("unknown service category: {}", other)),
        }
    }
}

/// Request ID for tracking
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestId(String);

impl RequestId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Token usage information
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    #[serde(default)]
    pub prompt_tokens: u32,
    #[serde(default)]
    pub completion_tokens: u32,
    #[serde(default)]
    pub total_tokens: u32,
}
