use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl Environment {
    /// Log filter used when `SALEWATCH_LOG_LEVEL` is unset. Scheduled
    /// production runs only surface warnings.
    #[must_use]
    pub fn default_log_level(&self) -> &'static str {
        match self {
            Environment::Development => "info",
            Environment::Test | Environment::Production => "warn",
        }
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Push delivery through an ntfy server. Present only when `NTFY_TOPIC` is set.
#[derive(Clone)]
pub struct NtfyConfig {
    pub base_url: String,
    pub topic: String,
}

impl std::fmt::Debug for NtfyConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NtfyConfig")
            .field("base_url", &self.base_url)
            .field("topic", &"[redacted]")
            .finish()
    }
}

/// SMTP delivery. Present only when both the address and app password are set;
/// mail is sent from and to the same address.
#[derive(Clone)]
pub struct EmailConfig {
    pub address: String,
    pub app_password: String,
    pub smtp_host: String,
    pub smtp_port: u16,
}

impl std::fmt::Debug for EmailConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmailConfig")
            .field("address", &self.address)
            .field("app_password", &"[redacted]")
            .field("smtp_host", &self.smtp_host)
            .field("smtp_port", &self.smtp_port)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub log_level: String,
    pub stores_path: PathBuf,
    pub state_file: PathBuf,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    pub accept_language: String,
    pub max_retries: u32,
    pub retry_backoff_base_ms: u64,
    pub max_concurrent_stores: usize,
    pub ntfy: Option<NtfyConfig>,
    pub email: Option<EmailConfig>,
}
