//! Chat prompts loaded from YAML.
//!
//! ```yaml
//! system:
//!   summarize_clinical_report: |
//!     You are a clinical psychologist ...
//! user: {}
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptCategory {
    System,
    User,
}

impl PromptCategory {
    fn as_str(self) -> &'static str {
        match self {
            PromptCategory::System => "system",
            PromptCategory::User => "user",
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Prompts {
    #[serde(default)]
    system: HashMap<String, String>,
    #[serde(default)]
    user: HashMap<String, String>,
}

impl Prompts {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read prompt file: {}", path.display()))?;
        let prompts = Self::parse(&content)
            .with_context(|| format!("Failed to parse prompt file: {}", path.display()))?;
        tracing::debug!(
            path = %path.display(),
            system = prompts.system.len(),
            user = prompts.user.len(),
            "loaded prompts"
        );
        Ok(prompts)
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    pub fn get(&self, category: PromptCategory, name: &str) -> Result<&str> {
        let prompts = match category {
            PromptCategory::System => &self.system,
            PromptCategory::User => &self.user,
        };
        prompts
            .get(name)
            .map(String::as_str)
            .ok_or_else(|| anyhow::anyhow!("Unknown {} prompt: {}", category.as_str(), name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_by_category_and_name() {
        let prompts = Prompts::parse(
            "system:\n  summarize: Summarize this.\nuser:\n  greet: Hello\n",
        )
        .unwrap();
        assert_eq!(prompts.get(PromptCategory::System, "summarize").unwrap(), "Summarize this.");
        assert_eq!(prompts.get(PromptCategory::User, "greet").unwrap(), "Hello");

        let err = prompts.get(PromptCategory::User, "summarize").unwrap_err();
        assert_eq!(err.to_string(), "Unknown user prompt: summarize");
    }

    #[test]
    fn shipped_prompt_file_has_summary_prompt() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("data/prompts.yaml");
        let prompts = Prompts::load(&path).unwrap();
        assert!(prompts
            .get(PromptCategory::System, "summarize_clinical_report")
            .unwrap()
            .contains("[FIRST_NAME]"));
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = Prompts::load(Path::new("/nonexistent/prompts.yaml")).unwrap_err();
        assert!(err.to_string().contains("Failed to read prompt file"));
    }
}
