//! # rag-config
//!
//! Layered configuration loading for the retrieval engine, using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Environment variables, matching the literal keys in spec §6
//!    (`STORE_URL`, `LLM_API_KEY`, ...)
//! 2. Project-level `rag.toml` (current directory)
//! 3. User-level `~/.config/rag-engine/config.toml`
//! 4. Built-in defaults (applied in [`config::RawConfig::validate`])

pub mod config;
pub mod error;

pub use config::Config;
pub use error::ConfigError;

use std::path::PathBuf;

use figment::Figment;
use figment::providers::{Env, Format, Toml};

use config::RawConfig;

fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("rag-engine").join("config.toml"))
}

/// Load configuration from the layered sources described above and
/// validate required keys.
///
/// # Errors
///
/// Returns [`ConfigError::Figment`] if a configured file is malformed, or
/// [`ConfigError::NotConfigured`] if `STORE_URL`, `LLM_API_KEY`, or
/// `EMBED_API_KEY` is unset after all layers are merged.
pub fn load() -> Result<Config, ConfigError> {
    dotenvy::dotenv().ok();

    let mut figment = Figment::new();
    if let Some(user_path) = user_config_path() {
        figment = figment.merge(Toml::file(user_path));
    }
    figment = figment
        .merge(Toml::file("rag.toml"))
        .merge(Env::raw());

    let raw: RawConfig = figment.extract()?;
    raw.validate()
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn env_vars_populate_required_fields() {
        Jail::expect_with(|jail| {
            jail.set_env("STORE_URL", "postgres://localhost/rag");
            jail.set_env("LLM_API_KEY", "sk-llm");
            jail.set_env("EMBED_API_KEY", "sk-embed");

            let figment = Figment::new().merge(Env::raw());
            let raw: RawConfig = figment.extract().unwrap();
            let config = raw.validate().unwrap();

            assert_eq!(config.store_url, "postgres://localhost/rag");
            assert_eq!(config.llm_api_key, "sk-llm");
            Ok(())
        });
    }

    #[test]
    fn project_toml_is_overridden_by_env() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "rag.toml",
                r#"
                STORE_URL = "postgres://file/rag"
                LLM_API_KEY = "file-key"
                EMBED_API_KEY = "file-embed-key"
                PORT = 9000
                "#,
            )?;
            jail.set_env("PORT", "9100");

            let figment = Figment::new()
                .merge(Toml::file("rag.toml"))
                .merge(Env::raw());
            let raw: RawConfig = figment.extract().unwrap();
            let config = raw.validate().unwrap();

            assert_eq!(config.store_url, "postgres://file/rag");
            assert_eq!(config.port, 9100);
            Ok(())
        });
    }
}
