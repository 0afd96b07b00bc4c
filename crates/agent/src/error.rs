//! Agent error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AgentError {
    #[error("Store error: {0}")]
    Store(#[from] kbchat_store::StoreError),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Model API error: {0}")]
    Api(String),

    #[error(transparent)]
    Core(#[from] kbchat_core::CoreError),
}

pub type Result<T> = std::result::Result<T, AgentError>;
