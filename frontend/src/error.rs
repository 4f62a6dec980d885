//! Error types for the record store and the geolocation lookup.

use thiserror::Error;

/// Record store error
#[derive(Error, Debug)]
pub enum StoreError {
    /// The browser exposes no local storage (disabled, sandboxed, or not a browser)
    #[error("local storage unavailable: {0}")]
    Unavailable(String),

    #[error("failed to read slot `{key}`: {message}")]
    Read { key: String, message: String },

    #[error("failed to write slot `{key}`: {message}")]
    Write { key: String, message: String },

    /// A slot holds JSON that does not match the expected shape
    #[error("slot `{key}` is corrupt: {source}")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode slot `{key}`: {source}")]
    Serialize {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("no registered user for {0}")]
    UserNotFound(String),

    #[error("transaction {id} not found for {email}")]
    TransactionNotFound { id: String, email: String },

    #[error("an account already exists for {0}")]
    AlreadyRegistered(String),

    #[error("email or password is incorrect")]
    InvalidCredentials,

    /// Balance arithmetic left the range a `Decimal` can hold
    #[error("balance for {0} is out of range")]
    Overflow(String),
}

impl StoreError {
    /// True when the error means "nothing there" rather than a broken store.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            StoreError::UserNotFound(_) | StoreError::TransactionNotFound { .. }
        )
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Geolocation lookup error
#[derive(Error, Debug)]
pub enum GeoError {
    #[error("geolocation request failed: {0}")]
    Request(#[from] gloo_net::Error),

    #[error("geolocation service answered with status {0}")]
    Status(u16),

    #[error("geolocation response carried no country code")]
    MissingCountry,
}
