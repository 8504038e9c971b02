//! Model catalog filtering and the offline fallback list.

use crate::models::ModelInfo;
use crate::profile::JsonModeTable;
use crate::types::ModelId;
use regex::RegexBuilder;

/// Shown when the catalog endpoint cannot be reached.
pub const OFFLINE_MODELS: &[&str] = &[
    ModelId::GPT_4_1_NANO,
    ModelId::GPT_4O_MINI,
    ModelId::CLAUDE_3_HAIKU,
    ModelId::CLAUDE_3_5_SONNET,
    ModelId::GEMINI_FLASH,
    ModelId::FALLBACK,
    "mistralai/mistral-7b-instruct:free",
];

pub fn offline_models() -> Vec<ModelInfo> {
    OFFLINE_MODELS.iter().map(|id| ModelInfo::new(*id)).collect()
}

#[derive(Debug, Clone, Default)]
pub struct ModelFilter {
    pub pattern: Option<String>,
    pub json_only: bool,
    pub free_only: bool,
    pub limit: Option<usize>,
}

impl ModelFilter {
    /// Keeps models whose id matches the case-insensitive `pattern` and the
    /// other flags, sorted by id.
    pub fn apply(&self, models: Vec<ModelInfo>, json_models: &JsonModeTable) -> Result<Vec<ModelInfo>, regex::Error> {
        let regex = self
            .pattern
            .as_deref()
            .map(|p| RegexBuilder::new(p).case_insensitive(true).build())
            .transpose()?;

        let mut kept: Vec<ModelInfo> = models
            .into_iter()
            .filter(|m| regex.as_ref().map_or(true, |re| re.is_match(&m.id)))
            .filter(|m| !self.json_only || json_models.is_json_capable(&m.id))
            .filter(|m| !self.free_only || m.is_free())
            .collect();
        kept.sort_by(|a, b| a.id.cmp(&b.id));
        if let Some(limit) = self.limit {
            kept.truncate(limit);
        }
        Ok(kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn ids(models: &[ModelInfo]) -> Vec<&str> {
        models.iter().map(|m| m.id.as_str()).collect()
    }

    #[test]
    fn regex_filter_is_case_insensitive() {
        let filter = ModelFilter {
            pattern: Some("CLAUDE|gemini".into()),
            ..Default::default()
        };
        let kept = filter.apply(offline_models(), &JsonModeTable::default()).unwrap();
        assert_eq!(
            ids(&kept),
            vec![ModelId::CLAUDE_3_HAIKU, ModelId::CLAUDE_3_5_SONNET, ModelId::GEMINI_FLASH]
        );
    }

    #[test]
    fn json_and_free_flags_narrow_the_list() {
        let table = JsonModeTable::default();
        let json_only = ModelFilter {
            json_only: true,
            ..Default::default()
        };
        let kept = json_only.apply(offline_models(), &table).unwrap();
        assert!(kept.iter().all(|m| table.is_json_capable(&m.id)));
        assert!(!ids(&kept).contains(&ModelId::FALLBACK));

        let free = ModelFilter {
            free_only: true,
            limit: Some(1),
            ..Default::default()
        };
        assert_eq!(
            ids(&free.apply(offline_models(), &table).unwrap()),
            vec![ModelId::FALLBACK]
        );
    }

    #[test]
    fn invalid_pattern_is_an_error() {
        let filter = ModelFilter {
            pattern: Some("(".into()),
            ..Default::default()
        };
        assert!(filter.apply(offline_models(), &JsonModeTable::default()).is_err());
        assert!(!offline_models().is_empty());
    }
}
