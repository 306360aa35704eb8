//! Domain entities for listings, messages and reference data.

pub mod catalogue;
pub mod listing;
pub mod message;

pub use catalogue::{Category, CategoryPage, HomePage, PriceTier, ReferenceData};
pub use listing::{
    ImageUpload, Listing, ListingDetail, ListingDraft, ListingForm, OwnerListingPage,
    OwnerListingRow, PublishedListing,
};
pub use message::{InboxMessage, ListingInbox, MessageAuthor};
