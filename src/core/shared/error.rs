use diesel::result::{DatabaseErrorKind, Error as DieselError};
use log::error;

pub type StoreResult<T> = Result<T, StoreError>;

/// Broad failure category: request failures versus setup and input problems.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    KnownRequest,
    UnknownRequest,
    Initialization,
    Validation,
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("No {model} record found")]
    NotFound { model: &'static str },
    #[error("Unique constraint failed on {model} ({constraint})")]
    UniqueConstraint {
        model: &'static str,
        constraint: String,
    },
    #[error("Foreign key constraint failed on {model} ({constraint})")]
    ForeignKeyConstraint {
        model: &'static str,
        constraint: String,
    },
    #[error("Null constraint violation on {model}.{column}")]
    NullConstraint { model: &'static str, column: String },
    #[error("Write conflict, the transaction should be retried")]
    WriteConflict,
    #[error("Timed out waiting {waited_ms}ms for a database connection")]
    TransactionStartTimeout { waited_ms: u64 },
    #[error("Transaction ran for {elapsed_ms}ms, exceeding its {timeout_ms}ms timeout")]
    TransactionTimeout { elapsed_ms: u64, timeout_ms: u64 },
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Initialization error: {0}")]
    Initialization(String),
    #[error("Query error: {0}")]
    Query(String),
}

impl StoreError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Prisma-style error code (`P2025`, `P2002`, ...).
    pub fn code(&self) -> Option<&'static str> {
        match self {
            Self::NotFound { .. } => Some("P2025"),
            Self::UniqueConstraint { .. } => Some("P2002"),
            Self::ForeignKeyConstraint { .. } => Some("P2003"),
            Self::NullConstraint { .. } => Some("P2011"),
            Self::WriteConflict => Some("P2034"),
            Self::TransactionStartTimeout { .. } => Some("P2024"),
            Self::TransactionTimeout { .. } => Some("P2028"),
            Self::Validation(_) | Self::Initialization(_) | Self::Query(_) => None,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::Initialization(_) => ErrorKind::Initialization,
            Self::Query(_) => ErrorKind::UnknownRequest,
            _ => ErrorKind::KnownRequest,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub fn from_diesel(err: DieselError, model: &'static str) -> Self {
        match err {
            DieselError::NotFound => Self::NotFound { model },
            DieselError::DatabaseError(kind, info) => {
                let constraint = info
                    .constraint_name()
                    .map(str::to_string)
                    .unwrap_or_else(|| info.message().to_string());
                match kind {
                    DatabaseErrorKind::UniqueViolation => Self::UniqueConstraint { model, constraint },
                    DatabaseErrorKind::ForeignKeyViolation => {
                        Self::ForeignKeyConstraint { model, constraint }
                    }
                    DatabaseErrorKind::NotNullViolation => Self::NullConstraint {
                        model,
                        column: info.column_name().unwrap_or("unknown").to_string(),
                    },
                    DatabaseErrorKind::CheckViolation => Self::Validation(info.message().to_string()),
                    DatabaseErrorKind::SerializationFailure => Self::WriteConflict,
                    DatabaseErrorKind::ClosedConnection | DatabaseErrorKind::UnableToSendCommand => {
                        error!("Database connection lost: {}", info.message());
                        Self::Query(info.message().to_string())
                    }
                    _ => Self::Query(info.message().to_string()),
                }
            }
            DieselError::QueryBuilderError(e) => Self::Validation(e.to_string()),
            other => Self::Query(other.to_string()),
        }
    }
}

impl From<DieselError> for StoreError {
    fn from(err: DieselError) -> Self {
        Self::from_diesel(err, "record")
    }
}

impl From<diesel::ConnectionError> for StoreError {
    fn from(err: diesel::ConnectionError) -> Self {
        Self::Initialization(err.to_string())
    }
}

impl From<diesel::r2d2::PoolError> for StoreError {
    fn from(err: diesel::r2d2::PoolError) -> Self {
        error!("DB connection error: {err}");
        Self::Initialization(err.to_string())
    }
}

/// Attaches the model name to diesel failures, so `NotFound` and constraint
/// errors say which table they came from.
pub trait ModelContext<T> {
    fn for_model(self, model: &'static str) -> StoreResult<T>;
}

impl<T> ModelContext<T> for Result<T, DieselError> {
    fn for_model(self, model: &'static str) -> StoreResult<T> {
        self.map_err(|e| StoreError::from_diesel(e, model))
    }
}
