//! Error types for Balai Core

use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Validation failed: {0}")]
    Validation(String),

    /// Concurrent scheduling conflict. Carries the id of the record that
    /// already holds the slot: the blocking booking on submit/approve, or
    /// the payment settled under a different transaction ref.
    #[error("Conflict with existing record {0}")]
    Conflict(Uuid),

    #[error("Invalid {entity} transition: cannot {action} from {from}")]
    InvalidTransition {
        entity: &'static str,
        from: &'static str,
        action: &'static str,
    },

    #[error("Booking {0} already has an active payment")]
    DuplicatePayment(Uuid),

    #[error("Ineligible for refund: {0}")]
    IneligibleForRefund(String),

    #[error("Precondition failed: {0}")]
    PreconditionFailed(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// Surfaced after bounded retries of transient store failures.
    #[error("Store unavailable after {0} retries")]
    StoreUnavailable(u32),

    #[error("Config error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
