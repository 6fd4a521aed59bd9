use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Browser-like User-Agent sent to the crawl service for page rendering.
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the real environment so it can be tested with a `HashMap`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_addr = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u32>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let crawl_api_url = require("CRAWL_API_URL")?;
    let crawl_api_key = require("CRAWL_API_KEY")?;
    let openai_api_key = require("OPENAI_API_KEY")?;

    let env = parse_environment(&or_default("LOTSCAN_ENV", "development"))?;
    let bind_addr = parse_addr("LOTSCAN_BIND_ADDR", "0.0.0.0:3000")?;
    let log_level = or_default("LOTSCAN_LOG_LEVEL", "info");

    let crawl_timeout_secs = parse_u64("LOTSCAN_CRAWL_TIMEOUT_SECS", "45")?;
    let crawl_max_retries = parse_u32("LOTSCAN_CRAWL_MAX_RETRIES", "2")?;
    let crawl_backoff_base_ms = parse_u64("LOTSCAN_CRAWL_BACKOFF_BASE_MS", "2000")?;
    let crawl_rate_limit_wait_ms = parse_u64("LOTSCAN_CRAWL_RATE_LIMIT_WAIT_MS", "5000")?;
    let user_agent = or_default("LOTSCAN_USER_AGENT", DEFAULT_USER_AGENT);

    let openai_base_url = or_default("OPENAI_BASE_URL", "https://api.openai.com/v1");
    let llm_model = or_default("LOTSCAN_LLM_MODEL", "gpt-4o-mini");
    let llm_timeout_secs = parse_u64("LOTSCAN_LLM_TIMEOUT_SECS", "60")?;

    let redirect_max_depth = parse_u32("LOTSCAN_REDIRECT_MAX_DEPTH", "5")?;
    let pipeline_timeout_secs = parse_u64("LOTSCAN_PIPELINE_TIMEOUT_SECS", "180")?;

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        crawl_api_url,
        crawl_api_key,
        crawl_timeout_secs,
        crawl_max_retries,
        crawl_backoff_base_ms,
        crawl_rate_limit_wait_ms,
        user_agent,
        openai_api_key,
        openai_base_url,
        llm_model,
        llm_timeout_secs,
        redirect_max_depth,
        pipeline_timeout_secs,
    })
}

fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "LOTSCAN_ENV".to_string(),
            reason: format!("expected development, test, or production; got \"{other}\""),
        }),
    }
}
