//! # Bienes Raices Gateway Crate
//!
//! The axum HTTP surface: auth flow, owner dashboard and listing lifecycle,
//! public catalogue and the map feed. Handlers answer with JSON page payloads
//! or `303 See Other` redirects.
//!
//! ## Architecture
//!
//! - **REST**: route modules, one per area
//! - **Session**: `_token` cookie extractors
//! - **Middleware**: double-submit CSRF guard and request tracing
//! - **Page**: the JSON payload a template layer would render
//! - **Params**: path id extractors that redirect on malformed ids
//!
//! ## Usage
//!
//! ```rust,ignore
//! use bienes_gateway::{build_router, AppState};
//!
//! let state = AppState::new(authenticator, listings, messages, catalogue, settings);
//! let app = build_router(state);
//! axum::serve(listener, app).await?;
//! ```

pub mod error;
pub mod middleware;
pub mod page;
pub mod params;
pub mod rest;
pub mod session;
pub mod state;

pub use error::{ApiError, ApiResult};
pub use middleware::CsrfToken;
pub use page::Page;
pub use params::{OwnerId, PublicId};
pub use session::{MaybeUser, RequireUser};
pub use state::{AppState, HttpSettings};

use axum::{middleware as axum_middleware, Router};
use tower_http::services::ServeDir;

/// Create the main application router with all routes
pub fn build_router(state: AppState) -> Router {
    let uploads = ServeDir::new(state.listings().images().dir());

    Router::new()
        .merge(rest::create_rest_routes(&state))
        .nest_service("/uploads", uploads)
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::csrf_guard,
        ))
        .layer(middleware::trace_layer())
        .with_state(state)
}
