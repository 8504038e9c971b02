//! Agent presets: each kind binds a service category and knows how to turn
//! a short user request into a full prompt.

use crate::client::{Completion, GenerateOptions, Generator};
use crate::error::GenerationResult;
use crate::types::{ModelId, ServiceCategory};
use crate::utils;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AgentKind {
    MockData,
    Code,
    Translator,
    Docs,
    Custom,
}

impl AgentKind {
    pub const ALL: [AgentKind; 5] = [
        AgentKind::MockData,
        AgentKind::Code,
        AgentKind::Translator,
        AgentKind::Docs,
        AgentKind::Custom,
    ];

    pub fn category(self) -> ServiceCategory {
        match self {
            AgentKind::MockData => ServiceCategory::MockGeneration,
            AgentKind::Code => ServiceCategory::CodeGeneration,
            AgentKind::Translator => ServiceCategory::Translation,
            AgentKind::Docs => ServiceCategory::Documentation,
            AgentKind::Custom => ServiceCategory::Unspecified,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AgentKind::MockData => "mock-data",
            AgentKind::Code => "code",
            AgentKind::Translator => "translator",
            AgentKind::Docs => "docs",
            AgentKind::Custom => "custom",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            AgentKind::MockData => "generate realistic mock data, JSON by default",
            AgentKind::Code => "generate code in a given language",
            AgentKind::Translator => "translate text into a target language",
            AgentKind::Docs => "write technical documentation",
            AgentKind::Custom => "free-form assistant with an optional system prompt",
        }
    }
}

/// One line per preset, for command-line help.
pub fn kinds_help() -> String {
    AgentKind::ALL
        .iter()
        .map(|kind| format!("{:<11} {}", kind.as_str(), kind.description()))
        .collect::<Vec<_>>()
        .join("\n")
}

impl fmt::Display for AgentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AgentKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mock-data" | "mock" | "mockdata" => Ok(AgentKind::MockData),
            "code" | "coder" => Ok(AgentKind::Code),
            "translator" | "translate" => Ok(AgentKind::Translator),
            "docs" | "documentation" => Ok(AgentKind::Docs),
            "custom" => Ok(AgentKind::Custom),
            other => Err(format!(
                "unknown agent kind `{}` (expected one of: mock-data, code, translator, docs, custom)",
                other
            )),
        }
    }
}

/// One invocation of an agent preset.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentTask {
    pub kind: AgentKind,
    pub request: String,
    /// Mock data: number of records
    pub count: Option<u32>,
    /// Mock data: shape the records must follow
    pub schema: Option<String>,
    /// Code: programming language. Translator: target language.
    pub language: Option<String>,
    /// Replaces the category system prompt
    pub system_prompt: Option<String>,
    pub model: Option<ModelId>,
    /// `None` means the preset decides; mock data asks for JSON.
    pub json: Option<bool>,
}

impl AgentTask {
    pub fn new(kind: AgentKind, request: impl Into<String>) -> Self {
        Self {
            kind,
            request: request.into(),
            count: None,
            schema: None,
            language: None,
            system_prompt: None,
            model: None,
            json: None,
        }
    }

    pub fn count(mut self, count: u32) -> Self {
        self.count = Some(count);
        self
    }

    pub fn schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn system_prompt(mut self, system_prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(system_prompt.into());
        self
    }

    pub fn model(mut self, model: impl Into<ModelId>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn json(mut self, json: bool) -> Self {
        self.json = Some(json);
        self
    }

    pub fn wants_json(&self) -> bool {
        self.json.unwrap_or(self.kind == AgentKind::MockData)
    }

    pub fn prompt(&self) -> String {
        let request = self.request.trim();
        match self.kind {
            AgentKind::MockData => {
                let mut prompt = format!(
                    "Generate {} mock data records for: {}.",
                    self.count.unwrap_or(5),
                    request
                );
                if let Some(schema) = &self.schema {
                    prompt.push_str(&format!("\nEach record must follow this schema:\n{}", schema));
                }
                if self.wants_json() {
                    prompt.push_str("\nReturn a JSON object with a single `records` array.");
                }
                prompt
            }
            AgentKind::Code => match &self.language {
                Some(language) => format!("Write {} code for the following task:\n{}", language, request),
                None => format!("Write code for the following task:\n{}", request),
            },
            AgentKind::Translator => format!(
                "Translate the following text into {}:\n\n{}",
                self.language.as_deref().unwrap_or("English"),
                request
            ),
            AgentKind::Docs => format!("Write documentation for the following:\n\n{}", request),
            AgentKind::Custom => request.to_string(),
        }
    }

    pub fn options(&self) -> GenerateOptions {
        GenerateOptions {
            system_prompt: self.system_prompt.clone(),
            temperature: None,
            max_tokens: None,
            force_json: self.wants_json(),
            model: self.model.clone(),
        }
    }
}

/// What an agent produced, parsed when it asked for JSON and got it.
#[derive(Debug, Clone, PartialEq)]
pub enum AgentOutput {
    Json(serde_json::Value),
    Text(String),
}

impl AgentOutput {
    pub fn render(&self) -> String {
        match self {
            AgentOutput::Json(value) => {
                serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
            }
            AgentOutput::Text(text) => text.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AgentRun {
    pub output: AgentOutput,
    pub completion: Completion,
}

/// Runs `task` once against `generator`, which should be bound to
/// `task.kind.category()`.
pub async fn run(generator: &dyn Generator, task: &AgentTask) -> GenerationResult<AgentRun> {
    if generator.category() != task.kind.category() {
        debug!(
            agent = %task.kind,
            bound = %generator.category(),
            "generator bound to a different category than the agent"
        );
    }
    let completion = generator.completion(&task.prompt(), &task.options()).await?;
    info!(
        agent = %task.kind,
        model = %completion.model,
        chars = completion.content.len(),
        "agent run finished"
    );

    let output = if task.wants_json() {
        match utils::parse_json_content(&completion.content) {
            Some(value) => AgentOutput::Json(value),
            None => {
                debug!(agent = %task.kind, "response was not valid JSON, keeping raw text");
                AgentOutput::Text(completion.content.clone())
            }
        }
    } else {
        AgentOutput::Text(completion.content.clone())
    };
    Ok(AgentRun { output, completion })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeGenerator;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn kinds_map_onto_categories() {
        assert_eq!(AgentKind::MockData.category(), ServiceCategory::MockGeneration);
        assert_eq!(AgentKind::Custom.category(), ServiceCategory::Unspecified);
        for kind in AgentKind::ALL {
            assert_eq!(kind.as_str().parse::<AgentKind>(), Ok(kind));
        }
    }

    #[test]
    fn kinds_help_lists_every_preset_with_its_description() {
        let help = kinds_help();
        let lines: Vec<_> = help.lines().collect();
        assert_eq!(lines.len(), AgentKind::ALL.len());
        assert!(lines[0].starts_with("mock-data   generate realistic mock data"));
        assert!(lines[4].starts_with("custom      free-form assistant"));
    }

    #[test]
    fn mock_data_prompt_includes_count_schema_and_json_hint() {
        let task = AgentTask::new(AgentKind::MockData, "users").count(3).schema("{name, email}");
        let prompt = task.prompt();
        assert!(prompt.starts_with("Generate 3 mock data records for: users."));
        assert!(prompt.contains("{name, email}"));
        assert!(prompt.contains("`records` array"));
        assert!(task.options().force_json);

        let text_only = AgentTask::new(AgentKind::MockData, "users").json(false);
        assert!(!text_only.prompt().contains("JSON"));
        assert!(!text_only.options().force_json);
    }

    #[test]
    fn translator_defaults_to_english() {
        let task = AgentTask::new(AgentKind::Translator, "Bonjour");
        assert_eq!(task.prompt(), "Translate the following text into English:\n\nBonjour");
        let task = task.language("German");
        assert!(task.prompt().contains("into German"));
        assert!(!task.options().force_json);
    }

    #[test]
    fn custom_task_forwards_system_prompt_and_model() {
        let task = AgentTask::new(AgentKind::Custom, "  hi  ")
            .system_prompt("Be terse.")
            .model(ModelId::GPT_4O_MINI);
        assert_eq!(task.prompt(), "hi");
        let options = task.options();
        assert_eq!(options.system_prompt.as_deref(), Some("Be terse."));
        assert_eq!(options.model, Some(ModelId::new(ModelId::GPT_4O_MINI)));
    }

    #[tokio::test]
    async fn mock_data_run_parses_fenced_json() {
        let fake = FakeGenerator::replying(
            ServiceCategory::MockGeneration,
            "```json\n{\"records\": [{\"name\": \"Ada\"}]}\n```",
        );
        let outcome = run(&fake, &AgentTask::new(AgentKind::MockData, "people")).await.unwrap();
        assert_eq!(outcome.output, AgentOutput::Json(json!({"records": [{"name": "Ada"}]})));
        assert_eq!(fake.prompts().len(), 1);
    }

    #[tokio::test]
    async fn unparseable_json_is_kept_as_text() {
        let fake = FakeGenerator::replying(ServiceCategory::MockGeneration, "sorry, no data");
        let outcome = run(&fake, &AgentTask::new(AgentKind::MockData, "people")).await.unwrap();
        assert_eq!(outcome.output, AgentOutput::Text("sorry, no data".into()));
    }

    #[tokio::test]
    async fn failures_propagate() {
        let fake = FakeGenerator::failing(ServiceCategory::CodeGeneration, "boom");
        let err = run(&fake, &AgentTask::new(AgentKind::Code, "x")).await.unwrap_err();
        assert!(err.to_string().contains("boom"));
    }
}
