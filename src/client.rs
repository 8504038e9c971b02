use crate::config::{ConnectionConfig, ConnectionUpdate};
use crate::error::{FailureCause, GenerationError, GenerationResult};
use crate::models::{ChatRequest, ChatResponse, ModelInfo, ModelsResponse};
use crate::profile::ProfileResolver;
use crate::types::{ModelId, RequestId, ServiceCategory, TokenUsage};
use async_trait::async_trait;
use metrics::{counter, histogram};
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use std::future::Future;
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

pub const HTTP_REFERER: &str = "https://github.com/openrouter-agents/openrouter-agents";
const CHAT_COMPLETIONS_PATH: &str = "chat/completions";
const MODELS_PATH: &str = "models";

/// Per-call overrides. Anything left unset is resolved from the bound
/// category and the connection configuration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerateOptions {
    pub system_prompt: Option<String>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    pub force_json: bool,
    pub model: Option<ModelId>,
}

impl GenerateOptions {
    pub fn system_prompt(mut self, system_prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(system_prompt.into());
        self
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn force_json(mut self, force_json: bool) -> Self {
        self.force_json = force_json;
        self
    }

    pub fn model(mut self, model: impl Into<ModelId>) -> Self {
        self.model = Some(model.into());
        self
    }
}

/// A fully assembled request. Everything it needs is copied out of the
/// client, so it is unaffected by later configuration changes.
#[derive(Debug, Clone)]
pub struct PreparedRequest {
    pub id: RequestId,
    pub category: ServiceCategory,
    pub url: String,
    pub api_key: String,
    pub body: ChatRequest,
}

impl PreparedRequest {
    fn fail(&self, cause: impl Into<FailureCause>) -> GenerationError {
        GenerationError::new(self.category, cause.into())
    }

    async fn send(self, http: Client) -> GenerationResult<Completion> {
        let category = self.category.as_str();
        let model = self.body.model.to_string();
        debug!(
            request_id = %self.id,
            category,
            model = %model,
            json_mode = self.body.response_format.is_some(),
            max_tokens = self.body.max_tokens,
            "sending chat completion"
        );

        let start = Instant::now();
        let result = self.exchange(&http).await;
        let latency = start.elapsed();
        histogram!("agent_request_latency_seconds", latency.as_secs_f64(), "category" => category);

        match result {
            Ok(resp) => {
                counter!("agent_requests_total", 1, "category" => category, "result" => "success");
                if let Some(usage) = &resp.usage {
                    counter!("agent_prompt_tokens_total", usage.prompt_tokens as u64, "model" => model.clone());
                    counter!("agent_completion_tokens_total", usage.completion_tokens as u64, "model" => model.clone());
                }
                debug!(request_id = %self.id, elapsed_ms = latency.as_millis() as u64, "chat completion finished");
                Ok(Completion {
                    content: resp.content().to_string(),
                    model: resp.model.map(ModelId::new).unwrap_or(self.body.model),
                    usage: resp.usage,
                    latency,
                })
            }
            Err(err) => {
                counter!("agent_requests_total", 1, "category" => category, "result" => "error");
                warn!(request_id = %self.id, error = %err, "chat completion failed");
                Err(err)
            }
        }
    }

    async fn exchange(&self, http: &Client) -> GenerationResult<ChatResponse> {
        let resp = http
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .header(CONTENT_TYPE, "application/json")
            .header("HTTP-Referer", HTTP_REFERER)
            .header("X-Title", format!("OpenRouter Agents {}", self.category))
            .json(&self.body)
            .send()
            .await
            .map_err(|e| self.fail(e))?;

        let status = resp.status();
        let text = resp.text().await.map_err(|e| self.fail(e))?;
        if !status.is_success() {
            let body = serde_json::from_str(&text).unwrap_or_else(|_| serde_json::json!({}));
            return Err(self.fail(FailureCause::Status { status, body }));
        }
        serde_json::from_str::<ChatResponse>(&text).map_err(|e| self.fail(e))
    }
}

/// Result of one successful round trip.
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    /// `choices[0].message.content`, or empty when the API returned no choice
    pub content: String,
    pub model: ModelId,
    pub usage: Option<TokenUsage>,
    pub latency: Duration,
}

/// Talks to `{base_url}/chat/completions` on behalf of one service category.
pub struct GenerationClient {
    http: Client,
    resolver: ProfileResolver,
    config: RwLock<Arc<ConnectionConfig>>,
    category: RwLock<ServiceCategory>,
}

impl GenerationClient {
    pub fn new(config: ConnectionConfig, category: ServiceCategory, resolver: ProfileResolver) -> Self {
        Self {
            http: Client::new(),
            resolver,
            config: RwLock::new(Arc::new(config)),
            category: RwLock::new(category),
        }
    }

    pub fn with_http_client(mut self, http: Client) -> Self {
        self.http = http;
        self
    }

    /// A sibling client bound to another category, sharing the HTTP pool
    /// and starting from a copy of the current configuration.
    pub fn for_category(&self, category: ServiceCategory) -> Self {
        Self {
            http: self.http.clone(),
            resolver: self.resolver.clone(),
            config: RwLock::new(self.config_snapshot()),
            category: RwLock::new(category),
        }
    }

    pub fn resolver(&self) -> &ProfileResolver {
        &self.resolver
    }

    pub fn service_category(&self) -> ServiceCategory {
        *self.category.read().unwrap_or_else(|e| e.into_inner())
    }

    pub fn set_service_category(&self, category: ServiceCategory) {
        *self.category.write().unwrap_or_else(|e| e.into_inner()) = category;
    }

    /// Returns a copy; mutating it does not reach the client.
    pub fn configuration(&self) -> ConnectionConfig {
        (*self.config_snapshot()).clone()
    }

    /// Shallow-merges `update` and swaps the whole configuration in one step.
    pub fn update_configuration(&self, update: ConnectionUpdate) {
        let mut guard = self.config.write().unwrap_or_else(|e| e.into_inner());
        let merged = guard.merged(update);
        *guard = Arc::new(merged);
    }

    fn config_snapshot(&self) -> Arc<ConnectionConfig> {
        Arc::clone(&self.config.read().unwrap_or_else(|e| e.into_inner()))
    }

    /// Resolves every parameter and captures the configuration as it is now.
    pub fn prepare(&self, prompt: &str, options: &GenerateOptions) -> PreparedRequest {
        let config = self.config_snapshot();
        let category = self.service_category();
        let resolver = &self.resolver;

        let model = resolver.resolve_model(category, options.model.as_ref(), &config.model);
        let system_prompt = options
            .system_prompt
            .clone()
            .unwrap_or_else(|| resolver.resolve_system_prompt(category, options.force_json));
        // temperature must stay within [0, 1] and max_tokens above zero
        let temperature = match options.temperature {
            Some(t) if t.is_finite() => {
                let clamped = t.clamp(0.0, 1.0);
                if clamped != t {
                    debug!(requested = t, clamped, "temperature override out of range, clamping");
                }
                clamped
            }
            Some(t) => {
                debug!(requested = t, "ignoring non-finite temperature override");
                resolver.resolve_temperature(category)
            }
            None => resolver.resolve_temperature(category),
        };
        let max_tokens = match options.max_tokens {
            Some(n) if n > 0 => n,
            Some(_) => {
                debug!("ignoring zero max_tokens override, using the category default");
                resolver.resolve_max_tokens(category, model.as_str())
            }
            None => resolver.resolve_max_tokens(category, model.as_str()),
        };
        let json_mode = options.force_json && resolver.is_json_capable(model.as_str());
        if options.force_json && !json_mode {
            debug!(model = %model, "model not known to support JSON mode, omitting response_format");
        }

        PreparedRequest {
            id: RequestId::new(),
            category,
            url: config.endpoint(CHAT_COMPLETIONS_PATH),
            api_key: config.api_key.clone(),
            body: ChatRequest::new(model, system_prompt, prompt)
                .with_temperature(temperature)
                .with_max_tokens(max_tokens)
                .with_json_mode(json_mode),
        }
    }

    /// One request/response cycle, returning the full completion.
    ///
    /// The request is assembled before the returned future is first polled.
    pub fn complete(
        &self,
        prompt: &str,
        options: &GenerateOptions,
    ) -> impl Future<Output = GenerationResult<Completion>> + Send + 'static {
        let prepared = self.prepare(prompt, options);
        let http = self.http.clone();
        prepared.send(http)
    }

    /// One request/response cycle, returning only the assistant text.
    /// An empty string means the API returned no content.
    pub fn generate(
        &self,
        prompt: &str,
        options: &GenerateOptions,
    ) -> impl Future<Output = GenerationResult<String>> + Send + 'static {
        let completion = self.complete(prompt, options);
        async move { completion.await.map(|c| c.content) }
    }

    /// `GET {base_url}/models`
    pub async fn list_models(&self) -> GenerationResult<Vec<ModelInfo>> {
        let config = self.config_snapshot();
        let category = self.service_category();
        let fail = |cause: FailureCause| GenerationError::new(category, cause);

        let resp = self
            .http
            .get(config.endpoint(MODELS_PATH))
            .bearer_auth(&config.api_key)
            .header("HTTP-Referer", HTTP_REFERER)
            .send()
            .await
            .map_err(|e| fail(e.into()))?;
        let status = resp.status();
        let text = resp.text().await.map_err(|e| fail(e.into()))?;
        if !status.is_success() {
            let body = serde_json::from_str(&text).unwrap_or_else(|_| serde_json::json!({}));
            return Err(fail(FailureCause::Status { status, body }));
        }
        let models: ModelsResponse = serde_json::from_str(&text).map_err(|e| fail(e.into()))?;
        debug!(count = models.data.len(), "fetched model catalog");
        Ok(models.data)
    }
}

/// Something that can answer a prompt for a service category.
#[async_trait]
pub trait Generator: Send + Sync {
    fn category(&self) -> ServiceCategory;
    async fn completion(&self, prompt: &str, options: &GenerateOptions) -> GenerationResult<Completion>;
}

#[async_trait]
impl Generator for GenerationClient {
    fn category(&self) -> ServiceCategory {
        self.service_category()
    }

    async fn completion(&self, prompt: &str, options: &GenerateOptions) -> GenerationResult<Completion> {
        self.complete(prompt, options).await
    }
}
