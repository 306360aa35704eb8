//! # Bienes Raices Listings Crate
//!
//! Business logic for property listings: the draft → image → published
//! lifecycle with owner checks on every mutation, inquiry messages sent to
//! listing owners, and the public catalogue (home page, categories, search
//! and map feed).
//!
//! ## Architecture
//!
//! - **Entities**: rows and form payloads (`Listing`, `ListingForm`, `InboxMessage`, ...)
//! - **Services**: `ListingService`, `MessageService`, `CatalogueService`
//! - **Storage**: `ImageStore`, the uploads directory
//! - **Types**: `ListingError` and `RefusalReason`
//! - **Utils**: ownership check and form validation
//!
//! ## Usage
//!
//! ```rust,ignore
//! use bienes_listings::{ImageStore, ListingForm, ListingService};
//!
//! let service = ListingService::new(pool, ImageStore::open("public/uploads").await?);
//! let id = service.create_draft(owner_id, &form).await?;
//! ```

pub mod entities;
pub mod services;
pub mod storage;
pub mod types;
pub mod utils;

pub use entities::{
    Category, HomePage, ImageUpload, InboxMessage, Listing, ListingDetail, ListingDraft,
    ListingForm, ListingInbox, MessageAuthor, OwnerListingPage, OwnerListingRow, PriceTier,
    PublishedListing, ReferenceData, CategoryPage,
};
pub use services::{CatalogueService, ListingService, MessageService, PAGE_SIZE};
pub use storage::ImageStore;
pub use types::{ListingError, ListingResult, RefusalReason};
pub use utils::ownership::{authorize, Access};
pub use utils::validation::parse_page;
