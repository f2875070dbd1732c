use anyhow::{Context, Result};
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub app: AppConfig,
    #[serde(default)]
    pub db: DbConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub openai: OpenAiConfig,
    #[serde(default)]
    pub conversion: ConversionConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Deployment environment. Development seeds the diagnoses table on start.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Environment {
    CiTesting,
    Testing,
    #[default]
    Development,
    Production,
}

const VALID_ENVIRONMENTS: &str = "ci-testing, testing, development, production";

impl FromStr for Environment {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "ci-testing" => Ok(Environment::CiTesting),
            "testing" => Ok(Environment::Testing),
            "development" => Ok(Environment::Development),
            "production" => Ok(Environment::Production),
            other => anyhow::bail!(
                "Environment must be one of {} (got '{}').",
                VALID_ENVIRONMENTS,
                other
            ),
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Environment::CiTesting => "ci-testing",
            Environment::Testing => "testing",
            Environment::Development => "development",
            Environment::Production => "production",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub environment: Environment,
    #[serde(default = "default_diagnoses_file")]
    pub diagnoses_file: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            environment: Environment::default(),
            diagnoses_file: default_diagnoses_file(),
        }
    }
}

fn default_diagnoses_file() -> PathBuf {
    PathBuf::from("data/diagnoses.json")
}

#[derive(Debug, Deserialize, Clone)]
pub struct DbConfig {
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from("ctk_api.sqlite")
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "0.0.0.0:8000".to_string()
}

#[derive(Deserialize, Clone)]
pub struct OpenAiConfig {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_prompt_file")]
    pub prompt_file: PathBuf,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_model(),
            base_url: default_base_url(),
            prompt_file: default_prompt_file(),
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
        }
    }
}

// The key never shows up in debug output.
impl fmt::Debug for OpenAiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAiConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "**********"))
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("prompt_file", &self.prompt_file)
            .field("timeout_secs", &self.timeout_secs)
            .field("max_retries", &self.max_retries)
            .finish()
    }
}

fn default_model() -> String {
    "gpt-4".to_string()
}
fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}
fn default_prompt_file() -> PathBuf {
    PathBuf::from("data/prompts.yaml")
}
fn default_timeout_secs() -> u64 {
    60
}
fn default_max_retries() -> u32 {
    3
}

#[derive(Debug, Deserialize, Clone)]
pub struct ConversionConfig {
    #[serde(default = "default_pandoc")]
    pub pandoc: PathBuf,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            pandoc: default_pandoc(),
        }
    }
}

fn default_pandoc() -> PathBuf {
    PathBuf::from("pandoc")
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "debug".to_string()
}

impl Config {
    /// Returns the OpenAI API key or an error naming the variable to set.
    pub fn require_api_key(&self) -> Result<&str> {
        self.openai
            .api_key
            .as_deref()
            .filter(|key| !key.is_empty())
            .ok_or_else(|| anyhow::anyhow!("OPENAI_API_KEY environment variable not set"))
    }

    /// Applies environment overrides using `lookup` to resolve variables.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup("CTK_API_ENVIRONMENT") {
            self.app.environment = value.parse()?;
        }
        if let Some(value) = lookup("DIAGNOSES_FILE") {
            self.app.diagnoses_file = PathBuf::from(value);
        }
        if let Some(value) = lookup("SQLITE_FILE") {
            self.db.path = PathBuf::from(value);
        }
        if let Some(value) = lookup("CTK_API_BIND") {
            self.server.bind = value;
        }
        if let Some(value) = lookup("OPENAI_API_KEY") {
            self.openai.api_key = Some(value);
        }
        if let Some(value) = lookup("OPENAI_CHAT_COMPLETION_MODEL") {
            self.openai.model = value;
        }
        if let Some(value) = lookup("OPENAI_BASE_URL") {
            self.openai.base_url = value;
        }
        if let Some(value) = lookup("OPENAI_CHAT_COMPLETION_PROMPT_FILE") {
            self.openai.prompt_file = PathBuf::from(value);
        }
        if let Some(value) = lookup("PANDOC_PATH") {
            self.conversion.pandoc = PathBuf::from(value);
        }
        if let Some(value) = lookup("LOGGER_VERBOSITY") {
            self.logging.level = log_level_name(&value);
        }
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.db.path.as_os_str().is_empty() {
            anyhow::bail!("db.path must not be empty");
        }
        if self.openai.timeout_secs == 0 {
            anyhow::bail!("openai.timeout_secs must be > 0");
        }
        if self.openai.max_retries > 10 {
            anyhow::bail!("openai.max_retries must be <= 10");
        }
        if self.openai.base_url.trim().is_empty() {
            anyhow::bail!("openai.base_url must not be empty");
        }
        Ok(())
    }
}

/// Accepts a level name or a numeric level (10 debug, 20 info, 30 warn,
/// 40 and above error).
fn log_level_name(value: &str) -> String {
    let value = value.trim();
    match value.parse::<u32>() {
        Ok(0..=10) => "debug".to_string(),
        Ok(11..=20) => "info".to_string(),
        Ok(21..=30) => "warn".to_string(),
        Ok(_) => "error".to_string(),
        Err(_) => value.to_lowercase(),
    }
}

/// Parses a TOML configuration document and validates it. No environment
/// overrides are applied.
pub fn parse_config(content: &str) -> Result<Config> {
    let config: Config = toml::from_str(content).with_context(|| "Failed to parse config file")?;
    config.validate()?;
    Ok(config)
}

/// Loads the configuration from `path` (or defaults) and applies environment
/// overrides from the process environment.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let mut config = match path {
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            toml::from_str(&content).with_context(|| "Failed to parse config file")?
        }
        None => Config::default(),
    };

    config.apply_env_overrides(|key| std::env::var(key).ok())?;
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn empty_document_uses_defaults() {
        let config = parse_config("").unwrap();
        assert_eq!(config.app.environment, Environment::Development);
        assert_eq!(config.server.bind, "0.0.0.0:8000");
        assert_eq!(config.openai.model, "gpt-4");
        assert_eq!(config.openai.max_retries, 3);
        assert_eq!(config.conversion.pandoc, PathBuf::from("pandoc"));
        assert!(config.openai.api_key.is_none());
    }

    #[test]
    fn sections_override_defaults() {
        let config = parse_config(
            r#"
[app]
environment = "ci-testing"

[db]
path = "/tmp/ctk.sqlite"

[openai]
model = "gpt-4o"
max_retries = 0
"#,
        )
        .unwrap();
        assert_eq!(config.app.environment, Environment::CiTesting);
        assert_eq!(config.db.path, PathBuf::from("/tmp/ctk.sqlite"));
        assert_eq!(config.openai.model, "gpt-4o");
        assert_eq!(config.openai.max_retries, 0);
    }

    #[test]
    fn unknown_environment_is_rejected() {
        let err = parse_config("[app]\nenvironment = \"staging\"\n").unwrap_err();
        assert!(err.to_string().contains("Failed to parse"));

        let err = "staging".parse::<Environment>().unwrap_err();
        assert!(err.to_string().contains("ci-testing, testing, development, production"));
    }

    #[test]
    fn env_overrides_take_precedence() {
        let vars: HashMap<&str, &str> = [
            ("CTK_API_ENVIRONMENT", "production"),
            ("OPENAI_API_KEY", "sk-test"),
            ("OPENAI_CHAT_COMPLETION_MODEL", "gpt-4-turbo"),
            ("SQLITE_FILE", "other.sqlite"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config
            .apply_env_overrides(|key| vars.get(key).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.app.environment, Environment::Production);
        assert_eq!(config.require_api_key().unwrap(), "sk-test");
        assert_eq!(config.openai.model, "gpt-4-turbo");
        assert_eq!(config.db.path, PathBuf::from("other.sqlite"));
    }

    #[test]
    fn numeric_logger_verbosity_maps_to_level_names() {
        let cases = [
            ("10", "debug"),
            ("20", "info"),
            ("30", "warn"),
            ("40", "error"),
            ("50", "error"),
            ("INFO", "info"),
        ];
        for (value, level) in cases {
            let mut config = Config::default();
            config
                .apply_env_overrides(|key| (key == "LOGGER_VERBOSITY").then(|| value.to_string()))
                .unwrap();
            assert_eq!(config.logging.level, level, "{}", value);
        }
    }

    #[test]
    fn missing_api_key_is_an_error() {
        let config = Config::default();
        let err = config.require_api_key().unwrap_err();
        assert!(err.to_string().contains("OPENAI_API_KEY"));
    }

    #[test]
    fn api_key_is_redacted_in_debug_output() {
        let mut config = Config::default();
        config.openai.api_key = Some("sk-secret".to_string());
        let debug = format!("{:?}", config);
        assert!(!debug.contains("sk-secret"));
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let err = parse_config("[openai]\ntimeout_secs = 0\n").unwrap_err();
        assert!(err.to_string().contains("timeout_secs"));
    }
}
