use crate::app_config::{AppConfig, EmailConfig, Environment, NtfyConfig};
use crate::ConfigError;

const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
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
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Every variable is optional; notification channels are only configured when
/// their credentials are present.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::path::PathBuf;

    let optional = |var: &str| -> Option<String> {
        lookup(var)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    let or_default =
        |var: &str, default: &str| -> String { optional(var).unwrap_or_else(|| default.to_string()) };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_u16 = |var: &str, default: &str| -> Result<u16, ConfigError> {
        or_default(var, default)
            .parse::<u16>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        or_default(var, default)
            .parse::<usize>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let env = parse_environment(&or_default("SALEWATCH_ENV", "development"));
    let log_level = optional("SALEWATCH_LOG_LEVEL")
        .unwrap_or_else(|| env.default_log_level().to_string());
    let stores_path = PathBuf::from(or_default("SALEWATCH_STORES_PATH", "./config/stores.yaml"));
    let state_file = PathBuf::from(or_default("SALEWATCH_STATE_FILE", "sale_state.json"));

    let request_timeout_secs = parse_u64("SALEWATCH_REQUEST_TIMEOUT_SECS", "30")?;
    if request_timeout_secs == 0 {
        return Err(invalid(
            "SALEWATCH_REQUEST_TIMEOUT_SECS",
            "must be greater than zero".to_string(),
        ));
    }
    let user_agent = or_default("SALEWATCH_USER_AGENT", DEFAULT_USER_AGENT);
    let accept_language = or_default("SALEWATCH_ACCEPT_LANGUAGE", "sv-SE,sv;q=0.9,en;q=0.8");
    let max_retries = parse_u32("SALEWATCH_MAX_RETRIES", "2")?;
    let retry_backoff_base_ms = parse_u64("SALEWATCH_RETRY_BACKOFF_BASE_MS", "1000")?;
    let max_concurrent_stores = parse_usize("SALEWATCH_MAX_CONCURRENT_STORES", "1")?;

    let ntfy = optional("NTFY_TOPIC").map(|topic| NtfyConfig {
        base_url: or_default("NTFY_BASE_URL", "https://ntfy.sh"),
        topic,
    });

    let smtp_port = parse_u16("SMTP_PORT", "587")?;
    let email = match (optional("EMAIL_ADDRESS"), optional("EMAIL_APP_PASSWORD")) {
        (Some(address), Some(app_password)) => Some(EmailConfig {
            address,
            app_password,
            smtp_host: or_default("SMTP_HOST", "smtp.gmail.com"),
            smtp_port,
        }),
        _ => None,
    };

    Ok(AppConfig {
        env,
        log_level,
        stores_path,
        state_file,
        request_timeout_secs,
        user_agent,
        accept_language,
        max_retries,
        retry_backoff_base_ms,
        max_concurrent_stores,
        ntfy,
        email,
    })
}

/// Parse a string into an `Environment` variant.
///
/// Unrecognized values default to `Environment::Development`.
fn parse_environment(s: &str) -> Environment {
    match s {
        "production" => Environment::Production,
        "test" => Environment::Test,
        _ => Environment::Development,
    }
}
