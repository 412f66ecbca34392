use serde::Deserialize;

use crate::models::SchemaVariant;

pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o";
pub const DEFAULT_LLM_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub port: u16,
    /// Absent means every submission fails with `ConfigurationMissing`.
    pub openai_api_key: Option<String>,
    pub openai_base_url: String,
    pub openai_model: String,
    pub llm_timeout_secs: u64,
    pub default_variant: SchemaVariant,
    /// Checkout link surfaced on lead-gated reports.
    pub payment_link: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 3000,
            openai_api_key: None,
            openai_base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            openai_model: DEFAULT_OPENAI_MODEL.to_string(),
            llm_timeout_secs: DEFAULT_LLM_TIMEOUT_SECS,
            default_variant: SchemaVariant::Basic,
            payment_link: None,
        }
    }
}

fn validate_http_url(name: &str, raw: &str) -> anyhow::Result<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        anyhow::bail!("{} cannot be empty", name);
    }
    let parsed =
        url::Url::parse(raw).map_err(|e| anyhow::anyhow!("{} is not a valid URL: {}", name, e))?;
    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        anyhow::bail!("{} must start with http:// or https://", name);
    }
    Ok(raw.to_string())
}

fn non_blank(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let config = Self {
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number between 1-65535"))?,
            openai_api_key: non_blank("OPENAI_API_KEY"),
            openai_base_url: match std::env::var("OPENAI_BASE_URL") {
                Ok(url) => validate_http_url("OPENAI_BASE_URL", &url)?,
                Err(_) => DEFAULT_OPENAI_BASE_URL.to_string(),
            },
            openai_model: std::env::var("OPENAI_MODEL")
                .unwrap_or_else(|_| DEFAULT_OPENAI_MODEL.to_string())
                .trim()
                .to_string(),
            llm_timeout_secs: std::env::var("LLM_TIMEOUT_SECS")
                .unwrap_or_else(|_| DEFAULT_LLM_TIMEOUT_SECS.to_string())
                .parse()
                .ok()
                .filter(|secs: &u64| *secs > 0)
                .ok_or_else(|| anyhow::anyhow!("LLM_TIMEOUT_SECS must be a positive integer"))?,
            default_variant: match std::env::var("DEFAULT_SCHEMA_VARIANT") {
                Ok(raw) => raw
                    .parse()
                    .map_err(|e| anyhow::anyhow!("DEFAULT_SCHEMA_VARIANT: {}", e))?,
                Err(_) => SchemaVariant::Basic,
            },
            payment_link: non_blank("PAYMENT_LINK")
                .map(|link| validate_http_url("PAYMENT_LINK", &link))
                .transpose()?,
        };

        if config.openai_model.is_empty() {
            anyhow::bail!("OPENAI_MODEL cannot be empty");
        }

        // Log successful configuration load (without sensitive values)
        tracing::info!("Configuration loaded successfully");
        if config.openai_api_key.is_none() {
            tracing::warn!("OPENAI_API_KEY not set: assessments will be rejected until it is configured");
        }
        tracing::debug!("Model API: {} ({})", config.openai_base_url, config.openai_model);
        tracing::debug!("Default schema variant: {}", config.default_variant);
        tracing::debug!("Server Port: {}", config.port);

        Ok(config)
    }
}
