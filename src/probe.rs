use crate::client::{GenerateOptions, Generator};
use crate::types::{ModelId, ServiceCategory};
use futures::future::join_all;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, warn};

pub const PROBE_PROMPT: &str = "Reply with the single word: pong";
const PROBE_MAX_TOKENS: u32 = 16;

/// Outcome of probing one category
#[derive(Debug, Clone, PartialEq)]
pub struct ProbeReport {
    pub category: ServiceCategory,
    pub model: Option<ModelId>,
    pub latency: Duration,
    pub outcome: Result<usize, String>,
}

impl ProbeReport {
    pub fn is_ok(&self) -> bool {
        self.outcome.is_ok()
    }
}

/// Sends the probe prompt through every generator at once.
pub async fn probe_all(generators: Vec<Arc<dyn Generator>>, model: Option<ModelId>) -> Vec<ProbeReport> {
    let options = GenerateOptions {
        max_tokens: Some(PROBE_MAX_TOKENS),
        model,
        ..Default::default()
    };
    let probes = generators.into_iter().map(|generator| {
        let options = options.clone();
        async move {
            let category = generator.category();
            let start = Instant::now();
            let result = generator.completion(PROBE_PROMPT, &options).await;
            let latency = start.elapsed();
            match result {
                Ok(completion) => {
                    info!(%category, model = %completion.model, ?latency, "probe ok");
                    ProbeReport {
                        category,
                        model: Some(completion.model),
                        latency,
                        outcome: Ok(completion.content.chars().count()),
                    }
                }
                Err(err) => {
                    warn!(%category, error = %err, "probe failed");
                    ProbeReport {
                        category,
                        model: None,
                        latency,
                        outcome: Err(err.to_string()),
                    }
                }
            }
        }
    });
    join_all(probes).await
}
