use crate::client::{Completion, GenerateOptions, Generator};
use crate::error::{FailureCause, GenerationError, GenerationResult};
use crate::types::{ModelId, ServiceCategory};
use async_trait::async_trait;
use std::sync::Mutex;
use std::time::Duration;

/// Canned `Generator` for unit tests; records every prompt it sees.
pub struct FakeGenerator {
    category: ServiceCategory,
    reply: Result<String, String>,
    prompts: Mutex<Vec<(String, GenerateOptions)>>,
}

impl FakeGenerator {
    pub fn replying(category: ServiceCategory, reply: impl Into<String>) -> Self {
        Self {
            category,
            reply: Ok(reply.into()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(category: ServiceCategory, cause: impl Into<String>) -> Self {
        Self {
            category,
            reply: Err(cause.into()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<(String, GenerateOptions)> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl Generator for FakeGenerator {
    fn category(&self) -> ServiceCategory {
        self.category
    }

    async fn completion(&self, prompt: &str, options: &GenerateOptions) -> GenerationResult<Completion> {
        self.prompts
            .lock()
            .unwrap()
            .push((prompt.to_string(), options.clone()));
        match &self.reply {
            Ok(content) => Ok(Completion {
                content: content.clone(),
                model: options.model.clone().unwrap_or_else(|| ModelId::new("fake/model")),
                usage: None,
                latency: Duration::from_millis(1),
            }),
            Err(cause) => Err(GenerationError::new(
                self.category,
                FailureCause::Transport(cause.clone()),
            )),
        }
    }
}
