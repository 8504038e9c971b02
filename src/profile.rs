//! Per-category defaults for model, system prompt, temperature and token
//! budget.
//!
//! Everything here is a table lookup over [`ServiceCategory`]. Environment
//! overrides arrive as an [`EnvOverrides`] snapshot; nothing in this module
//! reads process state.

use crate::config::EnvOverrides;
use crate::types::{ModelId, ServiceCategory};

const JSON_ONLY_CLAUSE: &str = " Your response must be valid, directly parseable JSON. \
Do not wrap it in markdown code fences and do not add any commentary before or after it.";

/// How a category turns a model family's limits into a `max_tokens` value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenRule {
    FullHigh,
    ThreeQuartersHigh,
    ThreeQuartersDefault,
    Default,
}

impl TokenRule {
    pub fn apply(self, limits: ModelLimits) -> u32 {
        match self {
            TokenRule::FullHigh => limits.high,
            TokenRule::ThreeQuartersHigh => limits.high * 3 / 4,
            TokenRule::ThreeQuartersDefault => limits.default * 3 / 4,
            TokenRule::Default => limits.default,
        }
    }
}

/// Default parameters for one category.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ServiceProfile {
    pub category: ServiceCategory,
    pub system_prompt: &'static str,
    /// Appended to `system_prompt` when the caller forces JSON output.
    pub json_clause: Option<&'static str>,
    pub temperature: f32,
    pub token_rule: TokenRule,
}

static PROFILES: [ServiceProfile; 5] = [
    ServiceProfile {
        category: ServiceCategory::MockGeneration,
        system_prompt: "You are a mock data generator. Produce realistic, varied sample data \
that follows the requested structure exactly, with plausible names, dates and values.",
        json_clause: Some(JSON_ONLY_CLAUSE),
        temperature: 0.7,
        token_rule: TokenRule::FullHigh,
    },
    ServiceProfile {
        category: ServiceCategory::CodeGeneration,
        system_prompt: "You are an expert software engineer. Write clean, idiomatic, \
well-structured code with sensible error handling. Return only the code unless an \
explanation is requested.",
        json_clause: None,
        temperature: 0.3,
        token_rule: TokenRule::ThreeQuartersHigh,
    },
    ServiceProfile {
        category: ServiceCategory::Translation,
        system_prompt: "You are a professional translator. Translate the text accurately, \
preserving tone, meaning and formatting. Return only the translation.",
        json_clause: None,
        temperature: 0.1,
        token_rule: TokenRule::ThreeQuartersDefault,
    },
    ServiceProfile {
        category: ServiceCategory::Documentation,
        system_prompt: "You are a technical writer. Produce clear, well-organized documentation \
in Markdown with headings, examples and concise explanations.",
        json_clause: None,
        temperature: 0.4,
        token_rule: TokenRule::FullHigh,
    },
    ServiceProfile {
        category: ServiceCategory::Unspecified,
        system_prompt: "You are a helpful assistant.",
        json_clause: None,
        temperature: 0.5,
        token_rule: TokenRule::Default,
    },
];

pub fn profile(category: ServiceCategory) -> &'static ServiceProfile {
    PROFILES
        .iter()
        .find(|p| p.category == category)
        .unwrap_or(&PROFILES[PROFILES.len() - 1])
}

/// Token ceilings for a model family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelLimits {
    pub high: u32,
    pub default: u32,
}

/// Checked in order; the first family whose marker occurs in the model id wins.
static MODEL_FAMILIES: [(&str, ModelLimits); 4] = [
    ("claude-3", ModelLimits { high: 8000, default: 4000 }),
    ("gpt-4", ModelLimits { high: 8000, default: 4000 }),
    ("gpt-3.5", ModelLimits { high: 4000, default: 2000 }),
    ("gemini", ModelLimits { high: 8000, default: 4000 }),
];

const FALLBACK_LIMITS: ModelLimits = ModelLimits { high: 4000, default: 2000 };

pub fn model_limits(model: &str) -> ModelLimits {
    MODEL_FAMILIES
        .iter()
        .find(|(marker, _)| model.contains(marker))
        .map(|(_, limits)| *limits)
        .unwrap_or(FALLBACK_LIMITS)
}

/// A way of recognising a model id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelPattern {
    Prefix(String),
    Contains(String),
}

impl ModelPattern {
    pub fn matches(&self, model: &str) -> bool {
        match self {
            ModelPattern::Prefix(p) => model.starts_with(p.as_str()),
            ModelPattern::Contains(p) => model.contains(p.as_str()),
        }
    }
}

/// Models presumed to honour `response_format: {"type": "json_object"}`.
///
/// This is a static allowlist, not a capability query. OpenRouter's catalog
/// moves independently of this crate, so extend it with
/// [`JsonModeTable::with_pattern`] or `OPENROUTER_JSON_MODELS`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonModeTable {
    patterns: Vec<ModelPattern>,
}

impl Default for JsonModeTable {
    fn default() -> Self {
        Self {
            patterns: vec![
                ModelPattern::Prefix("openai/".into()),
                ModelPattern::Prefix("gpt-".into()),
                ModelPattern::Prefix("nitro/".into()),
                ModelPattern::Contains("claude-3".into()),
                ModelPattern::Contains("gemini".into()),
            ],
        }
    }
}

impl JsonModeTable {
    pub fn empty() -> Self {
        Self { patterns: Vec::new() }
    }

    pub fn with_pattern(mut self, pattern: ModelPattern) -> Self {
        self.patterns.push(pattern);
        self
    }

    pub fn is_json_capable(&self, model: &str) -> bool {
        self.patterns.iter().any(|p| p.matches(model))
    }
}

/// Fills unset request parameters from the category table and the
/// environment snapshot.
#[derive(Debug, Clone, Default)]
pub struct ProfileResolver {
    overrides: EnvOverrides,
    json_models: JsonModeTable,
}

impl ProfileResolver {
    pub fn new(overrides: EnvOverrides) -> Self {
        let json_models = overrides
            .json_model_prefixes
            .iter()
            .fold(JsonModeTable::default(), |table, prefix| {
                table.with_pattern(ModelPattern::Prefix(prefix.clone()))
            });
        Self { overrides, json_models }
    }

    pub fn with_json_models(mut self, json_models: JsonModeTable) -> Self {
        self.json_models = json_models;
        self
    }

    pub fn overrides(&self) -> &EnvOverrides {
        &self.overrides
    }

    pub fn json_models(&self) -> &JsonModeTable {
        &self.json_models
    }

    /// Picks the model for a request.
    ///
    /// Environment overrides win even over `explicit`: a category variable
    /// first, then the global default variable, then the caller's model,
    /// then the client's configured model.
    pub fn resolve_model(
        &self,
        category: ServiceCategory,
        explicit: Option<&ModelId>,
        configured: &ModelId,
    ) -> ModelId {
        self.overrides
            .category_model(category)
            .or(self.overrides.default_model.as_ref())
            .or(explicit)
            .unwrap_or(configured)
            .clone()
    }

    pub fn resolve_system_prompt(&self, category: ServiceCategory, force_json: bool) -> String {
        let profile = profile(category);
        match profile.json_clause {
            Some(clause) if force_json => format!("{}{}", profile.system_prompt, clause),
            _ => profile.system_prompt.to_string(),
        }
    }

    pub fn resolve_temperature(&self, category: ServiceCategory) -> f32 {
        profile(category).temperature
    }

    pub fn resolve_max_tokens(&self, category: ServiceCategory, model: &str) -> u32 {
        profile(category).token_rule.apply(model_limits(model))
    }

    pub fn is_json_capable(&self, model: &str) -> bool {
        self.json_models.is_json_capable(model)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    #[test]
    fn temperatures_are_fixed_per_category() {
        let resolver = ProfileResolver::default();
        let expected = [
            (ServiceCategory::MockGeneration, 0.7),
            (ServiceCategory::CodeGeneration, 0.3),
            (ServiceCategory::Translation, 0.1),
            (ServiceCategory::Documentation, 0.4),
            (ServiceCategory::Unspecified, 0.5),
        ];
        for (category, temperature) in expected {
            assert_eq!(resolver.resolve_temperature(category), temperature, "{category}");
        }
    }

    #[test]
    fn claude_3_token_budgets() {
        let resolver = ProfileResolver::default();
        for model in [ModelId::CLAUDE_3_HAIKU, ModelId::CLAUDE_3_5_SONNET, "claude-3-opus"] {
            assert_eq!(resolver.resolve_max_tokens(ServiceCategory::MockGeneration, model), 8000);
            assert_eq!(resolver.resolve_max_tokens(ServiceCategory::CodeGeneration, model), 6000);
            assert_eq!(resolver.resolve_max_tokens(ServiceCategory::Translation, model), 3000);
            assert_eq!(resolver.resolve_max_tokens(ServiceCategory::Documentation, model), 8000);
            assert_eq!(resolver.resolve_max_tokens(ServiceCategory::Unspecified, model), 4000);
        }
    }

    #[test]
    fn unknown_family_uses_conservative_limits() {
        let resolver = ProfileResolver::default();
        let model = ModelId::FALLBACK;
        assert_eq!(model_limits(model), FALLBACK_LIMITS);
        assert_eq!(resolver.resolve_max_tokens(ServiceCategory::CodeGeneration, model), 3000);
        assert_eq!(resolver.resolve_max_tokens(ServiceCategory::Translation, model), 1500);
        assert_eq!(resolver.resolve_max_tokens(ServiceCategory::Unspecified, model), 2000);
    }

    #[test]
    fn gpt_3_5_family_is_not_mistaken_for_gpt_4() {
        assert_eq!(model_limits("openai/gpt-3.5-turbo").high, 4000);
        assert_eq!(model_limits(ModelId::GPT_4_1_NANO).high, 8000);
    }

    #[test]
    fn json_capability_table() {
        let resolver = ProfileResolver::default();
        assert!(resolver.is_json_capable(ModelId::GPT_4_1_NANO));
        assert!(resolver.is_json_capable(ModelId::CLAUDE_3_HAIKU));
        assert!(resolver.is_json_capable(ModelId::GEMINI_FLASH));
        assert!(resolver.is_json_capable("nitro/some-model"));
        assert!(!resolver.is_json_capable(ModelId::FALLBACK));
    }

    #[test]
    fn json_table_extends_from_environment() {
        let resolver = ProfileResolver::new(EnvOverrides {
            json_model_prefixes: vec!["mistralai/".into()],
            ..Default::default()
        });
        assert!(resolver.is_json_capable("mistralai/mistral-large"));
        assert!(resolver.is_json_capable(ModelId::GPT_4O_MINI));
        assert_eq!(resolver.overrides().json_model_prefixes, vec!["mistralai/".to_string()]);

        let strict = ProfileResolver::default().with_json_models(JsonModeTable::empty());
        assert!(!strict.is_json_capable(ModelId::GPT_4O_MINI));
    }

    #[test]
    fn mock_generation_prompt_gains_json_clause_only_when_forced() {
        let resolver = ProfileResolver::default();
        let plain = resolver.resolve_system_prompt(ServiceCategory::MockGeneration, false);
        let json = resolver.resolve_system_prompt(ServiceCategory::MockGeneration, true);
        assert!(!plain.contains("parseable JSON"));
        assert!(json.starts_with(&plain));
        assert!(json.contains("parseable JSON"));

        let code = resolver.resolve_system_prompt(ServiceCategory::CodeGeneration, true);
        assert_eq!(code, resolver.resolve_system_prompt(ServiceCategory::CodeGeneration, false));
    }

    #[test]
    fn environment_overrides_beat_explicit_model() {
        let configured = ModelId::new("configured/model");
        let explicit = ModelId::new("explicit/model");

        let bare = ProfileResolver::default();
        assert_eq!(bare.resolve_model(ServiceCategory::Translation, None, &configured), configured);
        assert_eq!(
            bare.resolve_model(ServiceCategory::Translation, Some(&explicit), &configured),
            explicit
        );

        let global = ProfileResolver::new(EnvOverrides {
            default_model: Some(ModelId::new("global/model")),
            ..Default::default()
        });
        assert_eq!(
            global.resolve_model(ServiceCategory::Translation, Some(&explicit), &configured),
            ModelId::new("global/model")
        );

        let mut category_models = HashMap::new();
        category_models.insert(ServiceCategory::Translation, ModelId::new("translator/model"));
        let both = ProfileResolver::new(EnvOverrides {
            default_model: Some(ModelId::new("global/model")),
            category_models,
            ..Default::default()
        });
        assert_eq!(
            both.resolve_model(ServiceCategory::Translation, Some(&explicit), &configured),
            ModelId::new("translator/model")
        );
        assert_eq!(
            both.resolve_model(ServiceCategory::CodeGeneration, Some(&explicit), &configured),
            ModelId::new("global/model")
        );
    }
}
