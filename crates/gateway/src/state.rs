//! Shared application state for the gateway

use bienes_auth::Authenticator;
use bienes_listings::{CatalogueService, ListingService, MessageService};

/// Cookie and upload settings taken from configuration.
#[derive(Debug, Clone)]
pub struct HttpSettings {
    pub secure_cookies: bool,
    pub max_upload_bytes: usize,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            secure_cookies: false,
            max_upload_bytes: 5 * 1024 * 1024,
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    authenticator: Authenticator,
    listings: ListingService,
    messages: MessageService,
    catalogue: CatalogueService,
    settings: HttpSettings,
}

impl AppState {
    pub fn new(
        authenticator: Authenticator,
        listings: ListingService,
        messages: MessageService,
        catalogue: CatalogueService,
        settings: HttpSettings,
    ) -> Self {
        Self {
            authenticator,
            listings,
            messages,
            catalogue,
            settings,
        }
    }

    pub fn authenticator(&self) -> &Authenticator {
        &self.authenticator
    }

    pub fn listings(&self) -> &ListingService {
        &self.listings
    }

    pub fn messages(&self) -> &MessageService {
        &self.messages
    }

    pub fn catalogue(&self) -> &CatalogueService {
        &self.catalogue
    }

    pub fn settings(&self) -> &HttpSettings {
        &self.settings
    }
}
