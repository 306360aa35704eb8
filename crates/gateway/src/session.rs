//! Session cookie handling.

use axum::{extract::FromRequestParts, http::request::Parts};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use bienes_auth::{AuthError, SessionAssertion, SessionUser};
use tracing::warn;

use crate::{ApiError, AppState};

pub const SESSION_COOKIE: &str = "_token";

pub fn session_cookie(assertion: &SessionAssertion, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, assertion.token.clone()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .build()
}

pub fn expired_session_cookie() -> Cookie<'static> {
    let mut cookie = Cookie::build((SESSION_COOKIE, ""))
        .path("/")
        .http_only(true)
        .build();
    cookie.make_removal();
    cookie
}

fn session_token(parts: &Parts) -> Option<String> {
    CookieJar::from_headers(&parts.headers)
        .get(SESSION_COOKIE)
        .map(|cookie| cookie.value().to_owned())
        .filter(|value| !value.is_empty())
}

/// The authenticated user. Rejects with a redirect to the login form.
#[derive(Debug, Clone)]
pub struct RequireUser(pub SessionUser);

#[axum::async_trait]
impl FromRequestParts<AppState> for RequireUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = session_token(parts).ok_or(ApiError::Unauthenticated)?;
        let user = state.authenticator().resolve_session(&token).await?;
        Ok(Self(user))
    }
}

/// The user if a valid session cookie is present.
#[derive(Debug, Clone)]
pub struct MaybeUser(pub Option<SessionUser>);

impl MaybeUser {
    pub fn id(&self) -> Option<i64> {
        self.0.as_ref().map(|user| user.id)
    }
}

#[axum::async_trait]
impl FromRequestParts<AppState> for MaybeUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let Some(token) = session_token(parts) else {
            return Ok(Self(None));
        };

        match state.authenticator().resolve_session(&token).await {
            Ok(user) => Ok(Self(Some(user))),
            Err(AuthError::InvalidSession) => {
                warn!("ignoring invalid session cookie");
                Ok(Self(None))
            }
            Err(other) => Err(other.into()),
        }
    }
}
