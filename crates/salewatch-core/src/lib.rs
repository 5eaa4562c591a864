pub mod app_config;
pub mod config;
pub mod selector;
pub mod stores;
pub mod verdict;

pub use app_config::{AppConfig, EmailConfig, Environment, NtfyConfig};
pub use config::{load_app_config, load_app_config_from_env};
pub use selector::{SelectorError, SelectorList};
pub use stores::{find_store, load_stores, KeywordPattern, StoreConfig, StoresFile};
pub use verdict::{SaleEvent, SaleVerdict};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read stores file {path}: {source}")]
    StoresFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse stores file: {0}")]
    StoresFileParse(#[from] serde_yaml::Error),

    #[error("stores validation error: {0}")]
    Validation(String),
}
