
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use url::Url;

use crate::chunker::{ChunkingConfig, MAX_CHUNK_SIZE};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub embedding: EmbeddingConfig,
    pub chunking: ChunkingConfig,
    pub ingest: IngestConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EmbeddingConfig {
    pub protocol: String,
    pub host: String,
    pub port: u16,
    pub model: String,
    pub batch_size: u32,
    pub dimension: u32,
    /// Name of the environment variable holding the API key. The key itself
    /// never lives in the config file.
    pub api_key_env: String,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            protocol: "https".to_string(),
            host: "api.openai.com".to_string(),
            port: 443,
            model: "text-embedding-3-small".to_string(),
            batch_size: 64,
            dimension: 1536,
            api_key_env: "OPENAI_API_KEY".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct IngestConfig {
    /// Worker cap for per-file extraction during ingestion
    pub max_workers: usize,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self { max_workers: 5 }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration directory not found or could not be created")]
    DirectoryError,
    #[error("Invalid URL format: {0}")]
    InvalidUrl(String),
    #[error("Invalid protocol: {0} (must be 'http' or 'https')")]
    InvalidProtocol(String),
    #[error("Invalid host: cannot be empty")]
    InvalidHost,
    #[error("Invalid port: {0} (must be between 1 and 65535)")]
    InvalidPort(u16),
    #[error("Invalid model name: {0} (cannot be empty)")]
    InvalidModel(String),
    #[error("Invalid batch size: {0} (must be between 1 and 2048)")]
    InvalidBatchSize(u32),
    #[error("Invalid embedding dimension: {0} (must be between 1 and 8192)")]
    InvalidDimension(u32),
    #[error("Invalid API key variable name: cannot be empty")]
    InvalidApiKeyEnv,
    #[error("Invalid chunk size: {0} (must be between 1 and {MAX_CHUNK_SIZE})")]
    InvalidChunkSize(usize),
    #[error("Chunk overlap ({0}) must be smaller than chunk size ({1})")]
    OverlapTooLarge(usize, usize),
    #[error("Invalid worker count: {0} (must be between 1 and 64)")]
    InvalidMaxWorkers(usize),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parsing error: {0}")]
    TomlParse(#[from] toml::de::Error),
    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

impl Config {
    /// Load configuration from `<config_dir>/config.toml`, falling back to
    /// defaults when the file does not exist.
    #[inline]
    pub fn load<P: AsRef<Path>>(config_dir: P) -> Result<Self> {
        let config_path = config_dir.as_ref().join("config.toml");

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", config_path.display()))?;

        config
            .validate()
            .with_context(|| "Configuration validation failed")?;

        Ok(config)
    }

    /// Write the configuration to `<config_dir>/config.toml`.
    #[inline]
    pub fn save<P: AsRef<Path>>(&self, config_dir: P) -> Result<PathBuf> {
        self.validate()
            .context("Configuration validation failed before saving")?;

        fs::create_dir_all(config_dir.as_ref()).with_context(|| {
            format!(
                "Failed to create config directory: {}",
                config_dir.as_ref().display()
            )
        })?;

        let config_path = config_dir.as_ref().join("config.toml");
        let content = toml::to_string_pretty(self).context("Failed to serialize config to TOML")?;

        fs::write(&config_path, content)
            .with_context(|| format!("Failed to write config file: {}", config_path.display()))?;

        Ok(config_path)
    }

    /// Platform config directory for this application.
    #[inline]
    pub fn default_dir() -> Result<PathBuf, ConfigError> {
        dirs::config_dir()
            .map(|dir| dir.join("ragdex"))
            .ok_or(ConfigError::DirectoryError)
    }

    #[inline]
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.embedding.validate()?;
        self.validate_chunking()?;
        self.ingest.validate()?;
        Ok(())
    }

    fn validate_chunking(&self) -> Result<(), ConfigError> {
        let chunking = &self.chunking;

        if chunking.chunk_size == 0 || chunking.chunk_size > MAX_CHUNK_SIZE {
            return Err(ConfigError::InvalidChunkSize(chunking.chunk_size));
        }

        if chunking.chunk_overlap >= chunking.chunk_size {
            return Err(ConfigError::OverlapTooLarge(
                chunking.chunk_overlap,
                chunking.chunk_size,
            ));
        }

        Ok(())
    }
}

impl EmbeddingConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.protocol != "http" && self.protocol != "https" {
            return Err(ConfigError::InvalidProtocol(self.protocol.clone()));
        }

        if self.host.trim().is_empty() {
            return Err(ConfigError::InvalidHost);
        }

        if self.port == 0 {
            return Err(ConfigError::InvalidPort(self.port));
        }

        self.api_url()?;

        if self.model.trim().is_empty() {
            return Err(ConfigError::InvalidModel(self.model.clone()));
        }

        if self.batch_size == 0 || self.batch_size > 2048 {
            return Err(ConfigError::InvalidBatchSize(self.batch_size));
        }

        if self.dimension == 0 || self.dimension > 8192 {
            return Err(ConfigError::InvalidDimension(self.dimension));
        }

        if self.api_key_env.trim().is_empty() {
            return Err(ConfigError::InvalidApiKeyEnv);
        }

        Ok(())
    }

    pub fn api_url(&self) -> Result<Url, ConfigError> {
        let url_str = format!("{}://{}:{}", self.protocol, self.host, self.port);
        Url::parse(&url_str).map_err(|_| ConfigError::InvalidUrl(url_str))
    }
}

impl IngestConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_workers == 0 || self.max_workers > 64 {
            return Err(ConfigError::InvalidMaxWorkers(self.max_workers));
        }
        Ok(())
    }
}
