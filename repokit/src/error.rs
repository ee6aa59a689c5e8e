//! Error types for repokit
//!
//! Two families of failure surface through [`Error`]:
//!
//! - **Local validation**: a required collaborator or operand was absent
//!   ([`Error::InvalidArgument`]), or an expression could not be evaluated
//!   ([`Error::UnboundParameter`], [`Error::TypeMismatch`]). These are raised
//!   synchronously, before any repository I/O.
//! - **Storage**: failures reported by a repository or unit-of-work
//!   implementation ([`Error::Storage`]). The façade never constructs or wraps
//!   these; they reach the caller exactly as the implementation produced them.

use thiserror::Error;

use crate::repository::StorageError;

/// Result type alias using the repokit [`Error`]
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for repokit operations
#[derive(Debug, Error)]
pub enum Error {
    /// A required argument was absent
    #[error("Invalid argument: `{parameter}` must not be absent")]
    InvalidArgument {
        /// Name of the offending parameter
        parameter: &'static str,
    },

    /// An expression referenced a parameter that is not bound by its lambda
    #[error("Unbound parameter `{name}` in expression")]
    UnboundParameter {
        /// Display name of the foreign parameter
        name: String,
    },

    /// An expression produced a value of the wrong kind
    #[error("Type mismatch: expected {expected}, found {found}")]
    TypeMismatch {
        /// The kind the surrounding node required
        expected: &'static str,
        /// The kind that was produced
        found: &'static str,
    },

    /// Error reported by a repository or unit-of-work implementation
    #[error("{0}")]
    Storage(StorageError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(Box<figment::Error>),
}

impl Error {
    /// Create an [`Error::InvalidArgument`] naming `parameter`
    ///
    /// # Example
    ///
    /// ```rust
    /// use repokit::Error;
    ///
    /// let error = Error::invalid_argument("repository");
    /// assert_eq!(error.parameter(), Some("repository"));
    /// ```
    #[must_use]
    pub const fn invalid_argument(parameter: &'static str) -> Self {
        Self::InvalidArgument { parameter }
    }

    /// Name of the offending parameter for [`Error::InvalidArgument`]
    pub fn parameter(&self) -> Option<&'static str> {
        match self {
            Self::InvalidArgument { parameter } => Some(*parameter),
            _ => None,
        }
    }

    /// Whether this error originated in the storage layer
    pub fn is_storage(&self) -> bool {
        matches!(self, Self::Storage(_))
    }
}

/// Unwrap a required argument or fail with [`Error::InvalidArgument`]
pub(crate) fn require<T>(value: Option<T>, parameter: &'static str) -> Result<T> {
    value.ok_or(Error::InvalidArgument { parameter })
}

impl From<StorageError> for Error {
    fn from(err: StorageError) -> Self {
        Error::Storage(err)
    }
}

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Error::Config(Box::new(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::StorageOperation;

    #[test]
    fn test_invalid_argument_names_parameter() {
        let error = Error::invalid_argument("specification");
        assert_eq!(error.parameter(), Some("specification"));
        assert!(error.to_string().contains("`specification`"));
    }

    #[test]
    fn test_require_present_and_absent() {
        assert_eq!(require(Some(3), "page").ok(), Some(3));

        let error = require::<u8>(None, "page").unwrap_err();
        assert!(matches!(error, Error::InvalidArgument { parameter: "page" }));
    }

    #[test]
    fn test_storage_error_display_is_passed_through() {
        let storage = StorageError::timeout(StorageOperation::Commit, "lock wait exceeded");
        let expected = storage.to_string();
        let error: Error = storage.into();
        assert!(error.is_storage());
        assert_eq!(error.to_string(), expected);
    }

    #[test]
    fn test_type_mismatch_display() {
        let error = Error::TypeMismatch {
            expected: "bool",
            found: "int",
        };
        assert_eq!(error.to_string(), "Type mismatch: expected bool, found int");
    }
}
