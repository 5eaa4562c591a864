use thiserror::Error;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("ntfy returned HTTP {status}")]
    NtfyStatus { status: u16 },

    #[error("invalid email address \"{address}\": {reason}")]
    InvalidAddress { address: String, reason: String },

    #[error("failed to build email: {0}")]
    EmailBuild(#[from] lettre::error::Error),

    #[error("SMTP error: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),
}
