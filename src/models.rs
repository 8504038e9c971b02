use crate::types::{ModelId, TokenUsage};
use serde::{Deserialize, Serialize};

/// Chat message role
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

/// Chat message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: MessageRole,
    #[serde(default)]
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(MessageRole::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(MessageRole::User, content)
    }
}

/// `response_format` body; only `json_object` is ever sent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseFormat {
    #[serde(rename = "type")]
    pub format_type: String,
}

impl ResponseFormat {
    pub fn json_object() -> Self {
        Self {
            format_type: "json_object".to_string(),
        }
    }
}

/// Chat completion request as sent on the wire
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatRequest {
    pub model: ModelId,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    pub max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_format: Option<ResponseFormat>,
}

impl ChatRequest {
    pub fn new(model: impl Into<ModelId>, system_prompt: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            messages: vec![ChatMessage::system(system_prompt), ChatMessage::user(prompt)],
            temperature: 0.5,
            max_tokens: 2000,
            response_format: None,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_json_mode(mut self, enabled: bool) -> Self {
        self.response_format = enabled.then(ResponseFormat::json_object);
        self
    }
}

/// Message as returned in a choice. Providers send `"content": null` for
/// refusals, tool calls and truncated reasoning, and sometimes omit `role`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResponseMessage {
    #[serde(default)]
    pub role: Option<MessageRole>,
    #[serde(default)]
    pub content: Option<String>,
}

/// Chat completion choice
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatChoice {
    #[serde(default)]
    pub index: u32,
    #[serde(default)]
    pub message: Option<ResponseMessage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,
}

/// Chat completion response. Only `choices[0].message.content` is consumed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<TokenUsage>,
}

impl ChatResponse {
    /// Content of the first choice, or `""` when there is none.
    pub fn content(&self) -> &str {
        self.choices
            .first()
            .and_then(|choice| choice.message.as_ref())
            .and_then(|message| message.content.as_deref())
            .unwrap_or("")
    }
}

/// Model entry from `GET /models`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelInfo {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub context_length: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pricing: Option<ModelPricing>,
}

impl ModelInfo {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
            context_length: None,
            pricing: None,
        }
    }

    pub fn is_free(&self) -> bool {
        self.id.ends_with(":free")
            || self
                .pricing
                .as_ref()
                .map(|p| p.prompt == "0" && p.completion == "0")
                .unwrap_or(false)
    }
}

/// Per-token prices, as decimal strings in US dollars
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelPricing {
    #[serde(default)]
    pub prompt: String,
    #[serde(default)]
    pub completion: String,
}

/// Models list response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelsResponse {
    #[serde(default)]
    pub data: Vec<ModelInfo>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn request_serializes_without_response_format_by_default() {
        let req = ChatRequest::new("openai/gpt-4o-mini", "sys", "hi")
            .with_temperature(0.3)
            .with_max_tokens(6000);
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(value["model"], "openai/gpt-4o-mini");
        assert_eq!(
            value["messages"],
            json!([
                {"role": "system", "content": "sys"},
                {"role": "user", "content": "hi"}
            ])
        );
        assert!((value["temperature"].as_f64().unwrap() - 0.3).abs() < 1e-6);
        assert_eq!(value["max_tokens"], 6000);
        assert!(value.get("response_format").is_none());
    }

    #[test]
    fn json_mode_adds_response_format() {
        let req = ChatRequest::new("openai/gpt-4o-mini", "sys", "hi").with_json_mode(true);
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(value["response_format"], json!({"type": "json_object"}));
    }

    #[test]
    fn content_defaults_to_empty() {
        let empty: ChatResponse = serde_json::from_value(json!({"choices": []})).unwrap();
        assert_eq!(empty.content(), "");

        let no_message: ChatResponse = serde_json::from_value(json!({"choices": [{}]})).unwrap();
        assert_eq!(no_message.content(), "");

        let missing: ChatResponse = serde_json::from_value(json!({})).unwrap();
        assert_eq!(missing.content(), "");

        let null_content: ChatResponse = serde_json::from_value(json!({
            "choices": [{"message": {"role": "assistant", "content": null}, "finish_reason": "length"}]
        }))
        .unwrap();
        assert_eq!(null_content.content(), "");

        let no_role: ChatResponse =
            serde_json::from_value(json!({"choices": [{"message": {"content": "hi"}}]})).unwrap();
        assert_eq!(no_role.content(), "hi");
        assert_eq!(no_role.choices[0].message.as_ref().unwrap().role, None);

        let bare_message: ChatResponse = serde_json::from_value(json!({"choices": [{"message": {}}]})).unwrap();
        assert_eq!(bare_message.content(), "");

        let full: ChatResponse = serde_json::from_value(json!({
            "id": "gen-1",
            "choices": [{"message": {"role": "assistant", "content": "hello"}}],
            "usage": {"prompt_tokens": 3, "completion_tokens": 1, "total_tokens": 4}
        }))
        .unwrap();
        assert_eq!(full.content(), "hello");
        assert_eq!(full.usage.unwrap().total_tokens, 4);
    }

    #[test]
    fn free_models_are_recognised() {
        assert!(ModelInfo::new("meta-llama/llama-3.1-8b-instruct:free").is_free());
        let priced = ModelInfo {
            pricing: Some(ModelPricing {
                prompt: "0.000001".into(),
                completion: "0.000002".into(),
            }),
            ..ModelInfo::new("openai/gpt-4o-mini")
        };
        assert!(!priced.is_free());
    }
}
