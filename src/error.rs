use thiserror::Error;

use crate::api::ApiError;
use crate::lifecycle::LifecycleError;

#[derive(Debug, Error)]
pub enum VulntrackError {
    #[error("Config error: {0}")]
    Config(String),

    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),

    #[error("Backend error: {0}")]
    Api(#[from] ApiError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}
