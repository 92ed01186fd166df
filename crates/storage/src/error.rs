use thiserror::Error;
use validator::ValidationErrors;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("Store unreachable during {operation}: {source}")]
    Connectivity {
        operation: &'static str,
        #[source]
        source: sqlx::Error,
    },

    #[error("Query failed during {operation}: {source}")]
    Query {
        operation: &'static str,
        #[source]
        source: sqlx::Error,
    },

    #[error("Schema bootstrap failed: {0}")]
    Schema(#[source] Box<StorageError>),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, StorageError>;

impl StorageError {
    /// Sort a driver error into the connectivity or query bucket.
    ///
    /// Transport-level failures (pool exhaustion, I/O, TLS, protocol) mean the
    /// connection can no longer be trusted. Anything the server reported back
    /// is a query failure on a healthy connection.
    pub fn from_sqlx(operation: &'static str, source: sqlx::Error) -> Self {
        match source {
            sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed
            | sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::Protocol(_)
            | sqlx::Error::Configuration(_) => StorageError::Connectivity { operation, source },
            source => StorageError::Query { operation, source },
        }
    }

    pub fn is_transient(&self) -> bool {
        matches!(self, StorageError::Connectivity { .. })
    }

    pub fn is_undefined_table(&self) -> bool {
        self.database_code().as_deref() == Some("42P01")
    }

    fn database_code(&self) -> Option<String> {
        match self {
            StorageError::Query {
                source: sqlx::Error::Database(e),
                ..
            } => e.code().map(|code| code.into_owned()),
            StorageError::Schema(inner) => inner.database_code(),
            _ => None,
        }
    }
}
