//! The configuration struct, mirroring the environment keys in spec §6
//! exactly so operators can grep the spec and find the field.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

fn default_port() -> u16 {
    8080
}

fn default_cache_bytes() -> u64 {
    100 * 1024 * 1024
}

fn default_cache_ttl_secs() -> u64 {
    3600
}

fn default_embed_rate_per_min() -> u32 {
    60
}

fn default_embed_concurrency() -> usize {
    3
}

fn default_embed_base_batch() -> usize {
    100
}

fn default_max_request_bytes() -> u64 {
    1024 * 1024
}

fn default_llm_model() -> String {
    "claude-sonnet-4-5".to_string()
}

fn default_embed_model() -> String {
    "text-embedding-3-small".to_string()
}

fn default_embed_dim() -> usize {
    1536
}

/// Raw, layered configuration as read from environment/files, before the
/// required-field checks in [`Config::validate`] run.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawConfig {
    #[serde(rename = "STORE_URL")]
    pub store_url: Option<String>,
    #[serde(rename = "GRAPH_URL")]
    pub graph_url: Option<String>,
    #[serde(rename = "LLM_API_KEY")]
    pub llm_api_key: Option<String>,
    #[serde(rename = "LLM_BASE_URL")]
    pub llm_base_url: Option<String>,
    #[serde(rename = "LLM_MODEL")]
    pub llm_model: Option<String>,
    #[serde(rename = "EMBED_API_KEY")]
    pub embed_api_key: Option<String>,
    #[serde(rename = "EMBED_BASE_URL")]
    pub embed_base_url: Option<String>,
    #[serde(rename = "EMBED_MODEL")]
    pub embed_model: Option<String>,
    #[serde(rename = "EMBED_DIM")]
    pub embed_dim: Option<usize>,
    #[serde(rename = "PORT")]
    pub port: Option<u16>,
    #[serde(rename = "CACHE_BYTES")]
    pub cache_bytes: Option<u64>,
    #[serde(rename = "CACHE_TTL_SECS")]
    pub cache_ttl_secs: Option<u64>,
    #[serde(rename = "EMBED_RATE_PER_MIN")]
    pub embed_rate_per_min: Option<u32>,
    #[serde(rename = "EMBED_CONCURRENCY")]
    pub embed_concurrency: Option<usize>,
    #[serde(rename = "EMBED_BASE_BATCH")]
    pub embed_base_batch: Option<usize>,
    #[serde(rename = "MAX_REQUEST_BYTES")]
    pub max_request_bytes: Option<u64>,
    #[serde(rename = "CORS_ORIGINS")]
    pub cors_origins: Option<String>,
}

/// Fully validated, defaulted configuration handed to every component at
/// startup (spec §4.7, §6).
#[derive(Debug, Clone)]
pub struct Config {
    pub store_url: String,
    pub graph_url: Option<String>,
    pub llm_api_key: String,
    pub llm_base_url: String,
    pub llm_model: String,
    pub embed_api_key: String,
    pub embed_base_url: String,
    pub embed_model: String,
    pub embed_dim: usize,
    pub port: u16,
    pub cache_bytes: u64,
    pub cache_ttl_secs: u64,
    pub embed_rate_per_min: u32,
    pub embed_concurrency: usize,
    pub embed_base_batch: usize,
    pub max_request_bytes: u64,
    pub cors_origins: Vec<String>,
}

impl RawConfig {
    /// Apply defaults and enforce the required keys, producing a [`Config`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NotConfigured`] if `STORE_URL`, `LLM_API_KEY`,
    /// or `EMBED_API_KEY` is unset.
    pub fn validate(self) -> Result<Config, ConfigError> {
        let store_url = require(self.store_url, "STORE_URL")?;
        let llm_api_key = require(self.llm_api_key, "LLM_API_KEY")?;
        let embed_api_key = require(self.embed_api_key, "EMBED_API_KEY")?;

        let cors_origins = self
            .cors_origins
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Ok(Config {
            store_url,
            graph_url: self.graph_url,
            llm_api_key,
            llm_base_url: self
                .llm_base_url
                .unwrap_or_else(|| "https://api.anthropic.com".to_string()),
            llm_model: self.llm_model.unwrap_or_else(default_llm_model),
            embed_api_key,
            embed_base_url: self
                .embed_base_url
                .unwrap_or_else(|| "https://api.openai.com/v1".to_string()),
            embed_model: self.embed_model.unwrap_or_else(default_embed_model),
            embed_dim: self.embed_dim.unwrap_or_else(default_embed_dim),
            port: self.port.unwrap_or_else(default_port),
            cache_bytes: self.cache_bytes.unwrap_or_else(default_cache_bytes),
            cache_ttl_secs: self
                .cache_ttl_secs
                .unwrap_or_else(default_cache_ttl_secs),
            embed_rate_per_min: self
                .embed_rate_per_min
                .unwrap_or_else(default_embed_rate_per_min),
            embed_concurrency: self
                .embed_concurrency
                .unwrap_or_else(default_embed_concurrency),
            embed_base_batch: self
                .embed_base_batch
                .unwrap_or_else(default_embed_base_batch),
            max_request_bytes: self
                .max_request_bytes
                .unwrap_or_else(default_max_request_bytes),
            cors_origins,
        })
    }
}

fn require(value: Option<String>, key: &str) -> Result<String, ConfigError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ConfigError::NotConfigured {
            key: key.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn configured_raw() -> RawConfig {
        RawConfig {
            store_url: Some("postgres://localhost/rag".into()),
            llm_api_key: Some("sk-llm".into()),
            embed_api_key: Some("sk-embed".into()),
            ..Default::default()
        }
    }

    #[test]
    fn validate_applies_defaults() {
        let config = configured_raw().validate().unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.cache_bytes, 100 * 1024 * 1024);
        assert_eq!(config.embed_rate_per_min, 60);
        assert!(config.cors_origins.is_empty());
    }

    #[test]
    fn validate_rejects_missing_store_url() {
        let mut raw = configured_raw();
        raw.store_url = None;
        let err = raw.validate().unwrap_err();
        assert!(matches!(err, ConfigError::NotConfigured { key } if key == "STORE_URL"));
    }

    #[test]
    fn validate_parses_cors_origins() {
        let mut raw = configured_raw();
        raw.cors_origins = Some("https://a.example, https://b.example".into());
        let config = raw.validate().unwrap();
        assert_eq!(
            config.cors_origins,
            vec!["https://a.example", "https://b.example"]
        );
    }
}
