//! # Store Error Types
//!
//! Error types for the cart store, its backends and its configuration.
//!
//! ## How Each Kind Is Handled
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Kind            Raised when                    Handling                │
//! │  ────            ───────────                    ────────                │
//! │  Usage           cart used with no active       returned to caller      │
//! │                  session                                                │
//! │  Hydration       stored snapshot unreadable     logged, empty cart      │
//! │  Persistence     snapshot write failed          logged, memory wins     │
//! │  Core            invalid line item              returned to caller      │
//! │  Connection/     SQLite backend failures        surface as Persistence  │
//! │  Query/...                                      or Hydration            │
//! │  InvalidConfig   bad basket.toml / env          returned from load()    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! An unknown id passed to `increment`/`decrement` is not an error at all;
//! it comes back as `CartChange::Unchanged`.

use basket_core::CoreError;
use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Cart store errors.
#[derive(Debug, Error)]
pub enum StoreError {
    // =========================================================================
    // Cart Contract
    // =========================================================================
    /// The cart was used without an active session behind it.
    ///
    /// ## When This Occurs
    /// - `CartSession::cart()` on a closed or never-opened session
    #[error("Cart used outside an active session: {0}")]
    Usage(String),

    /// The stored snapshot could not be turned back into a cart.
    #[error("Cart snapshot could not be hydrated: {0}")]
    Hydration(String),

    /// The snapshot could not be written to the backend.
    #[error("Cart snapshot could not be persisted: {0}")]
    Persistence(String),

    /// Cart rule violation (wraps CoreError).
    #[error(transparent)]
    Core(#[from] CoreError),

    // =========================================================================
    // Backend
    // =========================================================================
    /// Database connection failed.
    ///
    /// ## When This Occurs
    /// - Database file can't be created
    /// - File permissions issue
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Migration failed.
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Query execution failed.
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// All pooled connections are busy.
    #[error("Connection pool exhausted")]
    PoolExhausted,

    // =========================================================================
    // Configuration
    // =========================================================================
    /// Invalid configuration value.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Failed to read or parse the config file.
    #[error("Failed to load config: {0}")]
    ConfigLoadFailed(String),

    /// Failed to write the config file.
    #[error("Failed to save config: {0}")]
    ConfigSaveFailed(String),

    /// Anything else.
    #[error("Internal store error: {0}")]
    Internal(String),
}

impl StoreError {
    pub fn usage(message: impl Into<String>) -> Self {
        StoreError::Usage(message.into())
    }

    /// True for errors the caller caused by misusing the cart contract.
    pub fn is_usage(&self) -> bool {
        matches!(self, StoreError::Usage(_))
    }
}

/// Convert sqlx errors to StoreError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::Database       → QueryFailed (message kept)
/// sqlx::Error::PoolTimedOut   → PoolExhausted
/// sqlx::Error::PoolClosed     → ConnectionFailed
/// Other                       → Internal
/// ```
impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(db_err) => StoreError::QueryFailed(db_err.message().to_string()),
            sqlx::Error::PoolTimedOut => StoreError::PoolExhausted,
            sqlx::Error::PoolClosed => StoreError::ConnectionFailed("Pool is closed".to_string()),
            _ => StoreError::Internal(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for StoreError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        StoreError::MigrationFailed(err.to_string())
    }
}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        StoreError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::de::Error> for StoreError {
    fn from(err: toml::de::Error) -> Self {
        StoreError::ConfigLoadFailed(err.to_string())
    }
}

impl From<toml::ser::Error> for StoreError {
    fn from(err: toml::ser::Error) -> Self {
        StoreError::ConfigSaveFailed(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use basket_core::ValidationError;

    #[test]
    fn test_usage_error() {
        let err = StoreError::usage("session closed");
        assert!(err.is_usage());
        assert_eq!(
            err.to_string(),
            "Cart used outside an active session: session closed"
        );
    }

    #[test]
    fn test_core_error_passes_through() {
        let core: CoreError = ValidationError::Required {
            field: "id".to_string(),
        }
        .into();
        let err: StoreError = core.into();
        assert!(!err.is_usage());
        assert_eq!(err.to_string(), "Validation error: id is required");
    }

    #[test]
    fn test_pool_closed_maps_to_connection_failed() {
        let err: StoreError = sqlx::Error::PoolClosed.into();
        assert!(matches!(err, StoreError::ConnectionFailed(_)));
    }
}
