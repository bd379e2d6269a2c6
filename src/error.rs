//! Error types shared across the game, account, and gateway layers.

use thiserror::Error;

/// Rejections from the generator economy.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EconomyError {
    #[error("unknown generator `{id}`")]
    UnknownGenerator { id: String },

    #[error("insufficient funds: need {cost}, have {balance}")]
    InsufficientFunds { cost: f64, balance: f64 },
}

/// Catalog construction errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CatalogError {
    #[error("generator `{id}` not found")]
    NotFound { id: String },

    #[error("catalog must contain at least one generator")]
    Empty,

    #[error("duplicate generator id `{id}`")]
    DuplicateId { id: String },

    #[error("generator `{id}` has invalid base cost {base_cost}")]
    InvalidBaseCost { id: String, base_cost: f64 },

    #[error("generator `{id}` has invalid rate {rate}")]
    InvalidRate { id: String, rate: f64 },
}

/// Failures reading or writing persisted data.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("account `{username}` not found")]
    NotFound { username: String },

    #[error("storage unavailable: {0}")]
    Unavailable(String),

    #[error("snapshot encoding failed: {0}")]
    Encoding(#[from] serde_json::Error),

    #[error("request rejected with status {status}: {message}")]
    Rejected { status: u16, message: String },
}

/// Account store failures.
#[derive(Debug, Error)]
pub enum AccountError {
    #[error("username `{username}` is already taken")]
    UsernameTaken { username: String },

    #[error("invalid username or password")]
    InvalidCredential,

    #[error("account `{username}` not found")]
    NotFound { username: String },

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Configuration parse/validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid config: {reason}")]
    Invalid { reason: String },
}
