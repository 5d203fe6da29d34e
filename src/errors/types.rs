//! Error type definitions for the radio scheduler
//!
//! Repositories fail with [`RepositoryError`]. Services translate those into
//! [`AppError`], keeping the caller-correctable kinds apart from store
//! failures so the web layer can pick a status code without inspecting
//! driver errors.

use thiserror::Error;

/// Failure of a service operation
#[derive(Error, Debug)]
pub enum AppError {
    /// A referenced host, program details or music id did not resolve
    #[error("{message}")]
    Validation { message: String },

    #[error("{resource} {id} not found")]
    NotFound { resource: String, id: String },

    /// The request clashes with what is currently stored
    #[error("{message}")]
    Conflict { message: String },

    /// Persistence failed while performing `operation`; the cause is kept as
    /// the error source and never rendered
    #[error("Unable to {operation}")]
    Store {
        operation: String,
        #[source]
        source: RepositoryError,
    },
}

/// Failure inside a repository or the migration runner
#[derive(Error, Debug)]
pub enum RepositoryError {
    /// Row decoding and connection errors surfaced through `?`
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Query {query} failed: {message}")]
    QueryFailed { query: String, message: String },

    /// Unique or foreign key constraint rejected a write
    #[error("{constraint} constraint violated: {message}")]
    ConstraintViolation { constraint: String, message: String },

    #[error("No row in {table} where {field} = {value}")]
    RecordNotFound {
        table: String,
        field: String,
        value: String,
    },

    /// Optimistic version check lost against another writer
    #[error("Row {id} in {table} changed since it was read")]
    VersionConflict { table: String, id: String },

    #[error("Stored {field} is malformed: {message}")]
    InvalidData { field: String, message: String },

    #[error("Migration {name} failed: {message}")]
    MigrationFailed { name: String, message: String },
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn not_found(resource: impl Into<String>, id: impl ToString) -> Self {
        Self::NotFound {
            resource: resource.into(),
            id: id.to_string(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    /// Wrap a repository failure under the operation that hit it
    pub fn store(operation: impl Into<String>, source: RepositoryError) -> Self {
        Self::Store {
            operation: operation.into(),
            source,
        }
    }

    /// Whether the caller can fix the request and try again
    pub fn is_client_error(&self) -> bool {
        !matches!(self, Self::Store { .. })
    }
}

impl RepositoryError {
    pub fn query_failed(query: impl Into<String>, message: impl ToString) -> Self {
        Self::QueryFailed {
            query: query.into(),
            message: message.to_string(),
        }
    }

    pub fn record_not_found(
        table: impl Into<String>,
        field: impl Into<String>,
        value: impl ToString,
    ) -> Self {
        Self::RecordNotFound {
            table: table.into(),
            field: field.into(),
            value: value.to_string(),
        }
    }

    pub fn version_conflict(table: impl Into<String>, id: impl ToString) -> Self {
        Self::VersionConflict {
            table: table.into(),
            id: id.to_string(),
        }
    }

    pub fn invalid_data(field: impl Into<String>, message: impl ToString) -> Self {
        Self::InvalidData {
            field: field.into(),
            message: message.to_string(),
        }
    }

    /// Classify a failed write. Unique and foreign key violations become
    /// `ConstraintViolation`, anything else `QueryFailed`.
    pub fn from_write(query: &str, error: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_error) = &error {
            let constraint = if db_error.is_unique_violation() {
                Some("unique")
            } else if db_error.is_foreign_key_violation() {
                Some("foreign key")
            } else {
                None
            };
            if let Some(constraint) = constraint {
                return Self::ConstraintViolation {
                    constraint: constraint.to_string(),
                    message: db_error.message().to_string(),
                };
            }
        }
        Self::query_failed(query, error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_error_hides_driver_detail() {
        let error = AppError::store(
            "add radio program",
            RepositoryError::query_failed("insert_radio_program", "disk I/O error"),
        );

        assert_eq!(error.to_string(), "Unable to add radio program");
        assert!(!error.is_client_error());
        let source = std::error::Error::source(&error).map(|s| s.to_string());
        assert_eq!(
            source.as_deref(),
            Some("Query insert_radio_program failed: disk I/O error")
        );
    }

    #[test]
    fn caller_correctable_kinds() {
        assert!(AppError::validation("Invalid Music ID").is_client_error());
        assert!(AppError::not_found("radio program", 7).is_client_error());
        assert!(AppError::conflict("Music already added").is_client_error());
        assert_eq!(
            AppError::not_found("radio program", 7).to_string(),
            "radio program 7 not found"
        );
    }
}
