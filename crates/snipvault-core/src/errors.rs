use thiserror::Error;

/// Result type alias using SnipError
pub type Result<T> = std::result::Result<T, SnipError>;

/// Canonical error type for the snippet store and service
///
/// Every failure in the system maps to one of these variants. Each variant
/// carries enough context (operation name, target id) to present a
/// user-facing message, and maps to a stable error code via [`SnipError::code`]
/// for programmatic handling and test assertions.
///
/// All variants are recoverable: nothing in this system terminates the
/// process, and a failed operation leaves prior state unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SnipError {
    /// The backing storage medium could not be opened or configured
    #[error("storage unavailable: {reason}")]
    StorageUnavailable { reason: String },

    /// The referenced snippet does not exist
    #[error("snippet not found: {id}")]
    NotFound { id: String },

    /// Insert collided with an existing snippet id
    #[error("duplicate snippet id: {id}")]
    DuplicateKey { id: String },

    /// A write transaction failed in the storage medium
    #[error("persistence failure in '{op}': {reason}")]
    PersistenceFailure { op: String, reason: String },

    /// Stored data could not be encoded or decoded
    #[error("serialization failure: {reason}")]
    Serialization { reason: String },

    /// Title is empty or whitespace-only
    #[error("invalid title: {reason}")]
    InvalidTitle { reason: String },
}

impl SnipError {
    /// Get the stable error code for this error
    pub fn code(&self) -> &'static str {
        match self {
            SnipError::StorageUnavailable { .. } => "ERR_STORAGE_UNAVAILABLE",
            SnipError::NotFound { .. } => "ERR_NOT_FOUND",
            SnipError::DuplicateKey { .. } => "ERR_DUPLICATE_KEY",
            SnipError::PersistenceFailure { .. } => "ERR_PERSISTENCE",
            SnipError::Serialization { .. } => "ERR_SERIALIZATION",
            SnipError::InvalidTitle { .. } => "ERR_INVALID_TITLE",
        }
    }

    /// Whether retrying the same user action could succeed
    ///
    /// Everything except a missing record is environment-dependent;
    /// `NotFound` only resolves once the caller picks a different target.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, SnipError::NotFound { .. })
    }
}
