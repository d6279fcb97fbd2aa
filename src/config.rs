use crate::rag::retrieval::RetrievalConfig;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Fallback summary model when none is configured
pub const DEFAULT_SUMMARY_MODEL: &str = "anthropic.claude-v2";

/// Default embedding model
pub const DEFAULT_EMBEDDING_MODEL: &str = "amazon.titan-embed-text-v1";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub graph: GraphConfig,
    #[serde(default)]
    pub bedrock: BedrockConfig,
    #[serde(default)]
    pub models: ModelsConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    #[serde(default)]
    pub retry: RetryConfig,
}

/// Graph store connection settings (Neo4j HTTP transactional API)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphConfig {
    pub url: String,
    pub database: String,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            url: "http://127.0.0.1:7474".to_string(),
            database: "neo4j".to_string(),
            username: None,
            password: None,
        }
    }
}

/// Bedrock-style model invocation endpoint settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BedrockConfig {
    pub endpoint: String,
    pub api_key: Option<String>,
}

impl Default for BedrockConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://127.0.0.1:8080".to_string(),
            api_key: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelsConfig {
    /// Summary (chat) model identifier; falls back to the fixed default
    /// when unset or empty
    pub summary: Option<String>,
    pub embedding: String,
}

impl Default for ModelsConfig {
    fn default() -> Self {
        Self {
            summary: None,
            embedding: DEFAULT_EMBEDDING_MODEL.to_string(),
        }
    }
}

/// Retry policy settings for the chat model call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub delay_secs: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            delay_secs: 5,
        }
    }
}

impl Config {
    /// Load configuration from the default path, creating it if missing,
    /// then apply environment overrides
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        let mut config = if config_path.exists() {
            Self::load_from(&config_path)?
        } else {
            let config = Config::default();
            config.save_to(&config_path)?;
            config
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Load configuration from an explicit file path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .context("Failed to read config file")?;

        let config: Config = toml::from_str(&contents)
            .context("Failed to parse config file")?;

        Ok(config)
    }

    /// Save configuration to an explicit file path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .context("Failed to create config directory")?;
        }

        let toml_string = toml::to_string_pretty(self)
            .context("Failed to serialize config")?;

        fs::write(path, toml_string)
            .context("Failed to write config file")?;

        Ok(())
    }

    /// Get the configuration file path
    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .context("Could not determine home directory")?;

        Ok(home.join(".edgar-rag").join("config.toml"))
    }

    /// Environment variables override file values
    pub fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var("EDGAR_RAG_SUMMARY_MODEL") {
            self.models.summary = Some(v);
        }
        if let Ok(v) = std::env::var("NEO4J_URI") {
            self.graph.url = v;
        }
        if let Ok(v) = std::env::var("NEO4J_DATABASE") {
            self.graph.database = v;
        }
        if let Ok(v) = std::env::var("NEO4J_USERNAME") {
            self.graph.username = Some(v);
        }
        if let Ok(v) = std::env::var("NEO4J_PASSWORD") {
            self.graph.password = Some(v);
        }
        if let Ok(v) = std::env::var("BEDROCK_ENDPOINT") {
            self.bedrock.endpoint = v;
        }
        if let Ok(v) = std::env::var("BEDROCK_API_KEY") {
            self.bedrock.api_key = Some(v);
        }
    }

    /// Resolve the summary model identifier, falling back to the fixed
    /// default when unset or empty
    pub fn summary_model(&self) -> &str {
        match self.models.summary.as_deref() {
            Some(name) if !name.is_empty() => name,
            _ => DEFAULT_SUMMARY_MODEL,
        }
    }
}
