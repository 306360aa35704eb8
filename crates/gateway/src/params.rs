//! Path id extractors. A malformed id is treated like a missing record.

use axum::{
    extract::{FromRequestParts, Path},
    http::request::Parts,
};
use tracing::debug;

use crate::ApiError;

async fn path_id<S: Send + Sync>(parts: &mut Parts, state: &S) -> Option<i64> {
    let Path(raw) = Path::<String>::from_request_parts(parts, state).await.ok()?;
    let id = raw.parse::<i64>().ok().filter(|id| *id > 0);
    if id.is_none() {
        debug!(raw = %raw, "malformed path id");
    }
    id
}

/// Listing id on owner routes; a malformed id goes back to the dashboard.
#[derive(Debug, Clone, Copy)]
pub struct OwnerId(pub i64);

#[axum::async_trait]
impl<S: Send + Sync> FromRequestParts<S> for OwnerId {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        path_id(parts, state)
            .await
            .map(Self)
            .ok_or_else(|| ApiError::redirect("/mis-propiedades"))
    }
}

/// Record id on public routes; a malformed id goes to the 404 page.
#[derive(Debug, Clone, Copy)]
pub struct PublicId(pub i64);

#[axum::async_trait]
impl<S: Send + Sync> FromRequestParts<S> for PublicId {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        path_id(parts, state)
            .await
            .map(Self)
            .ok_or_else(|| ApiError::redirect("/404"))
    }
}
