//! Storage error types
//!
//! Repository and unit-of-work implementations report their failures with
//! [`StorageError`]. The façade in this crate never creates one itself; it only
//! forwards whatever the implementation returned.
//!
//! # Example
//!
//! ```rust
//! use repokit::repository::{StorageError, StorageErrorKind, StorageOperation};
//!
//! let error = StorageError::conflict(StorageOperation::Commit, "row version changed")
//!     .with_entity("Order", "42");
//! assert_eq!(error.kind, StorageErrorKind::Conflict);
//! assert!(error.to_string().contains("[Order: 42]"));
//! ```

use std::fmt;

/// Storage operation that was running when the error occurred
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageOperation {
    /// Fetching a single entity
    Get,
    /// Fetching a list of entities
    GetList,
    /// Fetching one page of entities
    GetPagedList,
    /// Checking whether any entity matches
    Exists,
    /// Counting matching entities
    Count,
    /// Inserting one or more entities
    Insert,
    /// Updating one or more entities
    Update,
    /// Deleting one or more entities
    Delete,
    /// Committing a unit of work
    Commit,
    /// Rolling back a unit of work
    Rollback,
}

impl fmt::Display for StorageOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Get => write!(f, "get"),
            Self::GetList => write!(f, "get_list"),
            Self::GetPagedList => write!(f, "get_paged_list"),
            Self::Exists => write!(f, "exists"),
            Self::Count => write!(f, "count"),
            Self::Insert => write!(f, "insert"),
            Self::Update => write!(f, "update"),
            Self::Delete => write!(f, "delete"),
            Self::Commit => write!(f, "commit"),
            Self::Rollback => write!(f, "rollback"),
        }
    }
}

/// Category of storage error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageErrorKind {
    /// The store rejected the write because of a constraint
    ConstraintViolation,
    /// Concurrent modification detected (optimistic concurrency)
    Conflict,
    /// The store could not be reached
    ConnectionFailed,
    /// Operation timed out
    Timeout,
    /// The store cannot translate the query descriptor
    UnsupportedQuery,
    /// Other failure inside the store
    Other,
}

impl fmt::Display for StorageErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConstraintViolation => write!(f, "constraint_violation"),
            Self::Conflict => write!(f, "conflict"),
            Self::ConnectionFailed => write!(f, "connection_failed"),
            Self::Timeout => write!(f, "timeout"),
            Self::UnsupportedQuery => write!(f, "unsupported_query"),
            Self::Other => write!(f, "other"),
        }
    }
}

/// Structured storage error with operation context
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageError {
    /// The operation being performed when the error occurred
    pub operation: StorageOperation,
    /// The category of error
    pub kind: StorageErrorKind,
    /// Human-readable error message
    pub message: String,
    /// The type of entity involved (e.g., "User", "Order")
    pub entity_type: Option<String>,
    /// The identifier of the entity involved
    pub entity_id: Option<String>,
}

impl StorageError {
    /// Create a new storage error
    pub fn new(
        operation: StorageOperation,
        kind: StorageErrorKind,
        message: impl Into<String>,
    ) -> Self {
        Self {
            operation,
            kind,
            message: message.into(),
            entity_type: None,
            entity_id: None,
        }
    }

    /// Create a constraint violation error
    pub fn constraint_violation(operation: StorageOperation, message: impl Into<String>) -> Self {
        Self::new(operation, StorageErrorKind::ConstraintViolation, message)
    }

    /// Create a concurrency conflict error
    pub fn conflict(operation: StorageOperation, message: impl Into<String>) -> Self {
        Self::new(operation, StorageErrorKind::Conflict, message)
    }

    /// Create a connection failed error
    pub fn connection_failed(operation: StorageOperation, message: impl Into<String>) -> Self {
        Self::new(operation, StorageErrorKind::ConnectionFailed, message)
    }

    /// Create a timeout error
    pub fn timeout(operation: StorageOperation, message: impl Into<String>) -> Self {
        Self::new(operation, StorageErrorKind::Timeout, message)
    }

    /// Create an error for a query descriptor the store cannot execute
    pub fn unsupported_query(operation: StorageOperation, message: impl Into<String>) -> Self {
        Self::new(operation, StorageErrorKind::UnsupportedQuery, message)
    }

    /// Add entity context to an existing error
    #[must_use]
    pub fn with_entity(
        mut self,
        entity_type: impl Into<String>,
        entity_id: impl Into<String>,
    ) -> Self {
        self.entity_type = Some(entity_type.into());
        self.entity_id = Some(entity_id.into());
        self
    }

    /// Check if this error is retriable (transient errors that may succeed on retry)
    ///
    /// # Example
    ///
    /// ```rust
    /// use repokit::repository::{StorageError, StorageOperation};
    ///
    /// assert!(StorageError::timeout(StorageOperation::Commit, "slow").is_retriable());
    /// assert!(!StorageError::conflict(StorageOperation::Commit, "stale").is_retriable());
    /// ```
    pub fn is_retriable(&self) -> bool {
        matches!(
            self.kind,
            StorageErrorKind::ConnectionFailed | StorageErrorKind::Timeout
        )
    }
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Storage {} error during {}: {}",
            self.kind, self.operation, self.message
        )?;
        if let (Some(entity_type), Some(entity_id)) = (&self.entity_type, &self.entity_id) {
            write!(f, " [{}: {}]", entity_type, entity_id)?;
        }
        Ok(())
    }
}

impl std::error::Error for StorageError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_operation_display() {
        assert_eq!(format!("{}", StorageOperation::Get), "get");
        assert_eq!(format!("{}", StorageOperation::GetPagedList), "get_paged_list");
        assert_eq!(format!("{}", StorageOperation::Commit), "commit");
        assert_eq!(format!("{}", StorageOperation::Rollback), "rollback");
    }

    #[test]
    fn test_storage_error_kind_display() {
        assert_eq!(
            format!("{}", StorageErrorKind::ConstraintViolation),
            "constraint_violation"
        );
        assert_eq!(format!("{}", StorageErrorKind::Conflict), "conflict");
        assert_eq!(
            format!("{}", StorageErrorKind::UnsupportedQuery),
            "unsupported_query"
        );
    }

    #[test]
    fn test_new_has_no_entity_context() {
        let error = StorageError::new(
            StorageOperation::Insert,
            StorageErrorKind::Other,
            "disk full",
        );
        assert_eq!(error.operation, StorageOperation::Insert);
        assert!(error.entity_type.is_none());
        assert!(error.entity_id.is_none());
    }

    #[test]
    fn test_display_without_entity() {
        let error = StorageError::constraint_violation(StorageOperation::Insert, "duplicate key");
        let display = error.to_string();
        assert_eq!(
            display,
            "Storage constraint_violation error during insert: duplicate key"
        );
    }

    #[test]
    fn test_display_with_entity() {
        let error = StorageError::connection_failed(StorageOperation::Get, "refused")
            .with_entity("User", "usr_1");
        assert!(error.to_string().ends_with("[User: usr_1]"));
    }

    #[test]
    fn test_is_retriable() {
        assert!(StorageError::connection_failed(StorageOperation::Count, "reset").is_retriable());
        assert!(StorageError::timeout(StorageOperation::GetList, "slow").is_retriable());
        assert!(!StorageError::conflict(StorageOperation::Update, "stale").is_retriable());
        assert!(
            !StorageError::unsupported_query(StorageOperation::GetList, "opaque test")
                .is_retriable()
        );
    }
}
