use anyhow::{anyhow, Context, Result};

use crate::extraction::merge::MergePolicy;
use crate::pipeline::ProcessorSettings;

const DEFAULT_LLM_MODEL: &str = "claude-sonnet-4-20250514";

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub anthropic_api_key: String,
    pub llm_model: String,
    pub port: u16,
    pub rust_log: String,
    pub batch_size: usize,
    pub max_workers: usize,
    pub update_max_retries: u32,
    pub max_resume_chars: usize,
    pub merge_policy: MergePolicy,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            anthropic_api_key: require_env("ANTHROPIC_API_KEY")?,
            llm_model: std::env::var("LLM_MODEL").unwrap_or_else(|_| DEFAULT_LLM_MODEL.to_string()),
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            batch_size: parse_env("BATCH_SIZE", 50)?,
            max_workers: parse_env("MAX_WORKERS", 8)?,
            update_max_retries: parse_env("UPDATE_MAX_RETRIES", 3)?,
            max_resume_chars: parse_env(
                "MAX_RESUME_CHARS",
                ProcessorSettings::default().max_resume_chars,
            )?,
            merge_policy: match std::env::var("MERGE_POLICY") {
                Ok(raw) => raw.parse().map_err(|e: String| anyhow!(e))?,
                Err(_) => MergePolicy::default(),
            },
        })
    }

    pub fn processor_settings(&self) -> ProcessorSettings {
        ProcessorSettings {
            merge_policy: self.merge_policy,
            update_max_retries: self.update_max_retries,
            max_workers: self.max_workers,
            batch_size: self.batch_size,
            max_resume_chars: self.max_resume_chars,
        }
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid number, got '{raw}'")),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_env_default_and_invalid() {
        assert_eq!(parse_env::<usize>("PARSER_TEST_UNSET_VAR", 50).unwrap(), 50);

        std::env::set_var("PARSER_TEST_BAD_PORT", "eighty");
        assert!(parse_env::<u16>("PARSER_TEST_BAD_PORT", 8080).is_err());

        std::env::set_var("PARSER_TEST_WORKERS", " 4 ");
        assert_eq!(parse_env::<usize>("PARSER_TEST_WORKERS", 8).unwrap(), 4);
    }
}
