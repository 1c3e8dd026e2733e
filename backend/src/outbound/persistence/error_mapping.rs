//! Mapping from pool and Diesel failures to [`WorkflowStoreError`].

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::debug;

use crate::domain::ports::WorkflowStoreError;

use super::pool::PoolError;

/// Map pool failures to connection errors, keeping the pool's message.
pub(super) fn map_pool_error(error: PoolError) -> WorkflowStoreError {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => {
            WorkflowStoreError::connection(message)
        }
    }
}

/// Map Diesel errors onto the store's error vocabulary.
///
/// Unique and serialisation violations become `Conflict`, which the domain
/// reports as retryable. Driver messages are logged at debug level and kept
/// out of query errors.
pub(super) fn map_diesel_error(error: DieselError) -> WorkflowStoreError {
    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        other => debug!(error = %other, "diesel operation failed"),
    }

    match error {
        DieselError::DatabaseError(
            DatabaseErrorKind::UniqueViolation | DatabaseErrorKind::SerializationFailure,
            info,
        ) => WorkflowStoreError::conflict(info.message()),
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            WorkflowStoreError::connection("database connection error")
        }
        DieselError::NotFound => WorkflowStoreError::query("record not found"),
        DieselError::QueryBuilderError(_) => WorkflowStoreError::query("database query error"),
        _ => WorkflowStoreError::query("database error"),
    }
}

/// Convert a row count to the port's unsigned count.
pub(super) fn to_count(raw: i64) -> Result<u64, WorkflowStoreError> {
    u64::try_from(raw).map_err(|_| WorkflowStoreError::query("negative row count"))
}
