use crate::error::{ConfigError, EnvVarError};
use crate::types::{ModelId, ServiceCategory};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use url::Url;

pub const API_KEY_VAR: &str = "OPENROUTER_API_KEY";
pub const BASE_URL_VAR: &str = "OPENROUTER_BASE_URL";
pub const DEFAULT_MODEL_VAR: &str = "OPENROUTER_DEFAULT_MODEL";
pub const JSON_MODELS_VAR: &str = "OPENROUTER_JSON_MODELS";
pub const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";

/// Where and as whom a client talks to the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: ModelId,
}

impl ConnectionConfig {
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>, model: impl Into<ModelId>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: normalize_base_url(&base_url.into()),
            model: model.into(),
        }
    }

    /// Shallow merge; unset fields keep their current value.
    pub fn merged(&self, update: ConnectionUpdate) -> Self {
        Self {
            api_key: update.api_key.unwrap_or_else(|| self.api_key.clone()),
            base_url: update
                .base_url
                .map(|u| normalize_base_url(&u))
                .unwrap_or_else(|| self.base_url.clone()),
            model: update.model.unwrap_or_else(|| self.model.clone()),
        }
    }

    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Checks what a real call needs: a key and an absolute http(s) base URL.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_key.trim().is_empty() {
            return Err(EnvVarError {
                var: API_KEY_VAR.to_string(),
                instructions: Some("Create a key at https://openrouter.ai/keys".to_string()),
            }
            .into());
        }
        let url = Url::parse(&self.base_url).map_err(|source| ConfigError::BaseUrl {
            url: self.base_url.clone(),
            source,
        })?;
        match url.scheme() {
            "http" | "https" => Ok(()),
            other => Err(ConfigError::Scheme(other.to_string())),
        }
    }
}

/// Partial configuration for `GenerationClient::update_configuration`.
#[derive(Debug, Clone, Default)]
pub struct ConnectionUpdate {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub model: Option<ModelId>,
}

impl ConnectionUpdate {
    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn model(mut self, model: impl Into<ModelId>) -> Self {
        self.model = Some(model.into());
        self
    }
}

/// Snapshot of every environment variable this crate consults, taken once
/// at startup and passed around by value afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvOverrides {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub default_model: Option<ModelId>,
    #[serde(default)]
    pub category_models: HashMap<ServiceCategory, ModelId>,
    #[serde(default)]
    pub json_model_prefixes: Vec<String>,
}

impl EnvOverrides {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the snapshot from any key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let category_models = ServiceCategory::ALL
            .iter()
            .filter_map(|category| {
                let var = category.model_env_var()?;
                get(var).map(|model| (*category, ModelId::new(model)))
            })
            .collect();

        let json_model_prefixes = get(JSON_MODELS_VAR)
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|p| !p.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();

        Self {
            api_key: get(API_KEY_VAR),
            base_url: get(BASE_URL_VAR),
            default_model: get(DEFAULT_MODEL_VAR).map(ModelId::new),
            category_models,
            json_model_prefixes,
        }
    }

    pub fn category_model(&self, category: ServiceCategory) -> Option<&ModelId> {
        self.category_models.get(&category)
    }
}

/// Connection configuration assembled purely from the snapshot. Never fails;
/// a missing key surfaces later through `ConnectionConfig::validate`.
pub fn default_configuration(env: &EnvOverrides) -> ConnectionConfig {
    ConnectionConfig::new(
        env.api_key.clone().unwrap_or_default(),
        env.base_url.clone().unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
        env.default_model
            .clone()
            .unwrap_or_else(|| ModelId::new(ModelId::FALLBACK)),
    )
}

fn normalize_base_url(raw: &str) -> String {
    raw.trim().trim_end_matches('/').to_string()
}
