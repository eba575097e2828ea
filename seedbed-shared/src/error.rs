/// Error taxonomy shared by the relational and document-store fixtures
///
/// Every fallible operation in this crate returns `StoreResult<T>`. Backend
/// errors (`sqlx::Error`, `redis::RedisError`) are classified on conversion
/// into a small closed set of variants so callers can decide how to recover
/// without matching on driver internals:
///
/// - Connection failures at connect time abort the run (nothing can be done
///   without one); later ones are reported like any other failure
/// - Operational failures (constraint violations, rejected requests, missing
///   records, unmet preconditions) roll back the current unit of work and are
///   reported
/// - Unexpected failures are reported and recovered from the same way
///
/// # Example
///
/// ```
/// use seedbed_shared::error::StoreError;
///
/// let err = StoreError::NotFound("cat 'sonia'".to_string());
/// assert!(err.is_operational());
/// assert!(!err.is_connection());
/// ```

use thiserror::Error;

/// Result type alias used throughout the crate
pub type StoreResult<T> = Result<T, StoreError>;

/// Closed set of failures surfaced by the fixture components
#[derive(Error, Debug)]
pub enum StoreError {
    /// Could not reach or talk to the backend
    #[error("Connection error: {0}")]
    Connection(String),

    /// A write was rejected by a database constraint
    #[error("Constraint violation{}: {message}", constraint_suffix(.constraint))]
    ConstraintViolation {
        /// Name of the violated constraint, when the backend reports one
        constraint: Option<String>,

        /// Backend error message
        message: String,
    },

    /// No row or document matched
    #[error("Not found: {0}")]
    NotFound(String),

    /// The backend refused to execute the request
    #[error("Operation rejected: {0}")]
    OperationRejected(String),

    /// A precondition of the operation was not met
    #[error("Precondition failed: {0}")]
    PreconditionFailed(String),

    /// Anything else
    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

fn constraint_suffix(constraint: &Option<String>) -> String {
    constraint
        .as_ref()
        .map(|c| format!(" on {}", c))
        .unwrap_or_default()
}

impl StoreError {
    /// Whether this failure happened while reaching the backend
    pub fn is_connection(&self) -> bool {
        matches!(self, StoreError::Connection(_))
    }

    /// Whether this is an expected, backend-level failure of a single
    /// unit of work (as opposed to a connection or unexpected failure)
    pub fn is_operational(&self) -> bool {
        matches!(
            self,
            StoreError::ConstraintViolation { .. }
                | StoreError::NotFound(_)
                | StoreError::OperationRejected(_)
                | StoreError::PreconditionFailed(_)
        )
    }
}

/// Classifies sqlx errors
impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => StoreError::NotFound("Row not found".to_string()),
            sqlx::Error::Database(db_err) => {
                use sqlx::error::ErrorKind;

                match db_err.kind() {
                    ErrorKind::UniqueViolation
                    | ErrorKind::ForeignKeyViolation
                    | ErrorKind::NotNullViolation
                    | ErrorKind::CheckViolation => StoreError::ConstraintViolation {
                        constraint: db_err.constraint().map(str::to_string),
                        message: db_err.message().to_string(),
                    },
                    _ => StoreError::OperationRejected(db_err.message().to_string()),
                }
            }
            sqlx::Error::Io(e) => StoreError::Connection(format!("IO error: {}", e)),
            sqlx::Error::Tls(e) => StoreError::Connection(format!("TLS error: {}", e)),
            sqlx::Error::Configuration(e) => {
                StoreError::Connection(format!("Invalid configuration: {}", e))
            }
            sqlx::Error::PoolTimedOut => {
                StoreError::Connection("Timed out waiting for a connection".to_string())
            }
            sqlx::Error::PoolClosed => StoreError::Connection("Connection closed".to_string()),
            other => StoreError::Unexpected(other.to_string()),
        }
    }
}

/// Classifies Redis errors
impl From<redis::RedisError> for StoreError {
    fn from(err: redis::RedisError) -> Self {
        if err.is_io_error() || err.is_connection_refusal() || err.is_connection_dropped() {
            return StoreError::Connection(err.to_string());
        }

        match err.kind() {
            redis::ErrorKind::InvalidClientConfig | redis::ErrorKind::AuthenticationFailed => {
                StoreError::Connection(err.to_string())
            }
            redis::ErrorKind::ResponseError
            | redis::ErrorKind::ExecAbortError
            | redis::ErrorKind::NoScriptError
            | redis::ErrorKind::BusyLoadingError => StoreError::OperationRejected(err.to_string()),
            _ => StoreError::Unexpected(err.to_string()),
        }
    }
}

/// Document decoding failures are unexpected: the collection only ever holds
/// documents written by this crate
impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Unexpected(format!("Malformed document: {}", err))
    }
}
