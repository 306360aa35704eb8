//! Error types for listing operations.

use bienes_auth::FieldError;
use thiserror::Error;

/// Result type alias for listing operations
pub type ListingResult<T> = Result<T, ListingError>;

/// Why a request against a listing was turned away.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RefusalReason {
    #[error("listing not found")]
    NotFound,
    #[error("listing belongs to another user")]
    NotOwner,
    #[error("listing is already published")]
    AlreadyPublished,
    #[error("listing has no image")]
    MissingImage,
}

#[derive(Debug, Error)]
pub enum ListingError {
    #[error("Refused: {0}")]
    Refused(RefusalReason),

    #[error("Validation error on {} field(s)", .0.len())]
    Validation(Vec<FieldError>),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),
}

impl ListingError {
    pub fn invalid(field: &str, msg: &str) -> Self {
        Self::Validation(vec![FieldError::new(field, msg)])
    }

    pub fn refusal(&self) -> Option<RefusalReason> {
        match self {
            Self::Refused(reason) => Some(*reason),
            _ => None,
        }
    }
}

impl From<RefusalReason> for ListingError {
    fn from(reason: RefusalReason) -> Self {
        Self::Refused(reason)
    }
}
