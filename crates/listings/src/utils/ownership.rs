//! Ownership check applied before every listing mutation.

use crate::entities::Listing;
use crate::types::{ListingError, RefusalReason};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Authorized,
    Refused(RefusalReason),
}

impl Access {
    pub fn into_result(self) -> Result<(), ListingError> {
        match self {
            Access::Authorized => Ok(()),
            Access::Refused(reason) => Err(ListingError::Refused(reason)),
        }
    }
}

/// Decide whether `actor_id` may mutate the listing. A missing listing is
/// refused the same way as a foreign one so callers handle both uniformly.
pub fn authorize(actor_id: i64, listing: Option<&Listing>) -> Access {
    match listing {
        None => Access::Refused(RefusalReason::NotFound),
        Some(listing) if !listing.is_owned_by(actor_id) => Access::Refused(RefusalReason::NotOwner),
        Some(_) => Access::Authorized,
    }
}
