//! REST endpoints of the gateway

pub mod auth;
pub mod health;
pub mod listings;
pub mod message;
pub mod public;

use axum::Router;

use crate::AppState;

/// Create all routes
pub fn create_rest_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .merge(health::create_health_routes())
        // Account routes
        .merge(auth::create_auth_routes())
        // Owner dashboard and listing lifecycle
        .merge(listings::create_listing_routes(state.settings().max_upload_bytes))
        // Inquiry messages
        .merge(message::create_message_routes())
        // Home, categories, search and map feed
        .merge(public::create_public_routes())
}
