use crate::app_config::AppConfig;
use crate::ConfigError;

pub const DEFAULT_FOODFACTS_BASE_URL: &str = "https://world.openfoodfacts.net/api/v2/";
pub const DEFAULT_SCORER_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/";

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
/// The scoring credential is required: there is no built-in fallback key, so a
/// missing `GOOGLE_API_KEY` stops startup instead of silently using a shared
/// secret.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
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

    let parse_url = |var: &str, default: &str| -> Result<String, ConfigError> {
        let raw = or_default(var, default);
        if raw.starts_with("http://") || raw.starts_with("https://") {
            Ok(raw)
        } else {
            Err(ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: format!("expected an http(s) URL, got {raw:?}"),
            })
        }
    };

    let google_api_key = require("GOOGLE_API_KEY")?;
    let log_level = or_default("NUTRISCAN_LOG_LEVEL", "info");
    let user_agent = or_default("NUTRISCAN_USER_AGENT", "nutriscan/0.1 (barcode-nutrition)");

    let foodfacts_base_url = parse_url("NUTRISCAN_FOODFACTS_BASE_URL", DEFAULT_FOODFACTS_BASE_URL)?;
    let foodfacts_timeout_secs = parse_u64("NUTRISCAN_FOODFACTS_TIMEOUT_SECS", "10")?;

    let scorer_base_url = parse_url("NUTRISCAN_SCORER_BASE_URL", DEFAULT_SCORER_BASE_URL)?;
    let scorer_model = or_default("NUTRISCAN_SCORER_MODEL", "gemini-2.0-flash");
    let scorer_timeout_secs = parse_u64("NUTRISCAN_SCORER_TIMEOUT_SECS", "60")?;

    let upscale_min_dimension = parse_u32("NUTRISCAN_UPSCALE_MIN_DIMENSION", "1000")?;
    let debounce_ms = parse_u64("NUTRISCAN_DEBOUNCE_MS", "3000")?;
    let capture_poll_ms = parse_u64("NUTRISCAN_CAPTURE_POLL_MS", "10")?;
    let session_timeout_secs = parse_u64("NUTRISCAN_SESSION_TIMEOUT_SECS", "120")?;

    Ok(AppConfig {
        google_api_key,
        log_level,
        user_agent,
        foodfacts_base_url,
        foodfacts_timeout_secs,
        scorer_base_url,
        scorer_model,
        scorer_timeout_secs,
        upscale_min_dimension,
        debounce_ms,
        capture_poll_ms,
        session_timeout_secs,
    })
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
