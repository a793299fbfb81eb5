//! Mapping of sqlx errors onto store errors.

use domain::StoreError;

/// PostgreSQL SQLSTATE for unique_violation.
pub const UNIQUE_VIOLATION: &str = "23505";

/// Returns true if the error is a unique constraint violation.
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(
        err,
        sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some(UNIQUE_VIOLATION)
    )
}

/// Converts a sqlx error, keeping unique violations distinguishable.
pub fn store_error(err: sqlx::Error) -> StoreError {
    if is_unique_violation(&err) {
        StoreError::UniqueViolation
    } else {
        tracing::error!(error = %err, "Database error");
        StoreError::Database(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_not_found_is_database_error() {
        assert!(!is_unique_violation(&sqlx::Error::RowNotFound));
        assert!(matches!(
            store_error(sqlx::Error::RowNotFound),
            StoreError::Database(_)
        ));
    }
}
