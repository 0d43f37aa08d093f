//! Pipeline configuration: per-stage model selection, regeneration budget,
//! and the request deadline.

use std::time::Duration;

use scrivener_types::Stage;

/// Shared cap on regenerations per artifact, and job-wide for sequential
/// runs.
pub const DEFAULT_REGENERATION_LIMIT: u32 = 3;

const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 180;

// ---------------------------------------------------------------------------
// StageModels
// ---------------------------------------------------------------------------

/// Model id used for each generative stage.
///
/// Early stages run on a smaller model; references and the final merge get
/// the larger one. Every entry can be overridden with a
/// `SCRIVENER_MODEL_<STAGE>` environment variable.
#[derive(Debug, Clone)]
pub struct StageModels {
    pub summary: String,
    pub structure: String,
    pub content: String,
    pub references: String,
    pub full_content: String,
}

impl Default for StageModels {
    fn default() -> Self {
        Self {
            summary: "gpt-4.1-mini".to_string(),
            structure: "gpt-4.1-mini".to_string(),
            content: "gpt-4.1-mini".to_string(),
            references: "gpt-4.1".to_string(),
            full_content: "gpt-4.1".to_string(),
        }
    }
}

impl StageModels {
    pub fn from_env() -> Self {
        let mut models = Self::default();
        let overrides = [
            ("SCRIVENER_MODEL_SUMMARY", &mut models.summary),
            ("SCRIVENER_MODEL_STRUCTURE", &mut models.structure),
            ("SCRIVENER_MODEL_CONTENT", &mut models.content),
            ("SCRIVENER_MODEL_REFERENCES", &mut models.references),
            ("SCRIVENER_MODEL_FULL_CONTENT", &mut models.full_content),
        ];
        for (var, slot) in overrides {
            if let Ok(value) = std::env::var(var) {
                if !value.trim().is_empty() {
                    *slot = value;
                }
            }
        }
        models
    }

    /// The model id for a stage. The quality-check stages never call the
    /// generation service; they resolve to the merge model for completeness.
    pub fn for_stage(&self, stage: Stage) -> &str {
        match stage {
            Stage::Summary => &self.summary,
            Stage::Structure => &self.structure,
            Stage::Content => &self.content,
            Stage::References => &self.references,
            Stage::FullContent | Stage::Plagiarism | Stage::AiReport => &self.full_content,
        }
    }
}

// ---------------------------------------------------------------------------
// PipelineConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub regeneration_limit: u32,
    pub request_timeout: Duration,
    pub models: StageModels,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            regeneration_limit: DEFAULT_REGENERATION_LIMIT,
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            models: StageModels::default(),
        }
    }
}

impl PipelineConfig {
    pub fn from_env() -> Self {
        let mut config = Self {
            models: StageModels::from_env(),
            ..Self::default()
        };
        if let Some(limit) = env_parse::<u32>("SCRIVENER_REGENERATION_LIMIT") {
            config.regeneration_limit = limit;
        }
        if let Some(secs) = env_parse::<u64>("SCRIVENER_REQUEST_TIMEOUT_SECS") {
            config.request_timeout = Duration::from_secs(secs);
        }
        config
    }
}

fn env_parse<T: std::str::FromStr>(var: &str) -> Option<T> {
    std::env::var(var).ok()?.trim().parse().ok()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_models_split_small_and_large() {
        let models = StageModels::default();
        assert_eq!(models.summary, "gpt-4.1-mini");
        assert_eq!(models.structure, "gpt-4.1-mini");
        assert_eq!(models.content, "gpt-4.1-mini");
        assert_eq!(models.references, "gpt-4.1");
        assert_eq!(models.full_content, "gpt-4.1");
    }

    #[test]
    fn for_stage_resolves_every_stage() {
        let models = StageModels::default();
        assert_eq!(models.for_stage(Stage::Summary), "gpt-4.1-mini");
        assert_eq!(models.for_stage(Stage::References), "gpt-4.1");
        assert_eq!(models.for_stage(Stage::Plagiarism), "gpt-4.1");
    }

    #[test]
    fn default_config_values() {
        let config = PipelineConfig::default();
        assert_eq!(config.regeneration_limit, 3);
        assert_eq!(config.request_timeout, Duration::from_secs(180));
    }

    #[test]
    fn env_overrides_apply() {
        std::env::set_var("SCRIVENER_MODEL_SUMMARY", "test-model");
        std::env::set_var("SCRIVENER_REGENERATION_LIMIT", "5");
        let config = PipelineConfig::from_env();
        std::env::remove_var("SCRIVENER_MODEL_SUMMARY");
        std::env::remove_var("SCRIVENER_REGENERATION_LIMIT");

        assert_eq!(config.models.summary, "test-model");
        assert_eq!(config.regeneration_limit, 5);
        // Untouched entries keep their defaults.
        assert_eq!(config.models.references, "gpt-4.1");
    }
}
