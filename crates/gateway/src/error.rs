//! Error types for the gateway layer

use axum::{
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Json,
};
use axum_extra::extract::cookie::CookieJar;
use bienes_auth::{AuthError, FieldError};
use bienes_listings::ListingError;
use serde_json::json;
use tracing::{error, warn};

use crate::session::expired_session_cookie;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug)]
pub enum ApiError {
    /// `303 See Other` to the given location.
    Redirect(String),
    /// Missing or invalid session: clear the cookie and go to the login form.
    Unauthenticated,
    /// Field errors without a page to re-render.
    Invalid(Vec<FieldError>),
    Http { status: StatusCode, message: String },
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self::Http {
            status,
            message: message.into(),
        }
    }

    pub fn redirect(location: impl Into<String>) -> Self {
        Self::Redirect(location.into())
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, message)
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    /// Map a listing error on a public route, where a missing listing goes to
    /// the 404 page instead of the owner dashboard.
    pub fn public(error: ListingError) -> Self {
        match error {
            ListingError::Refused(_) => Self::redirect("/404"),
            other => other.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Redirect(location) => Redirect::to(&location).into_response(),
            ApiError::Unauthenticated => (
                CookieJar::new().add(expired_session_cookie()),
                Redirect::to("/auth/login"),
            )
                .into_response(),
            ApiError::Invalid(errores) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(json!({ "errores": errores })),
            )
                .into_response(),
            ApiError::Http { status, message } => {
                (status, Json(json!({ "error": message }))).into_response()
            }
        }
    }
}

impl From<ListingError> for ApiError {
    fn from(error: ListingError) -> Self {
        match error {
            ListingError::Refused(reason) => {
                warn!(?reason, "listing request refused");
                Self::redirect("/mis-propiedades")
            }
            ListingError::Validation(errores) => Self::Invalid(errores),
            ListingError::Database(err) => {
                error!(error = ?err, "listing store error");
                Self::internal_server_error("Hubo un error, intenta de nuevo.")
            }
            ListingError::Storage(err) => {
                error!(error = ?err, "image storage error");
                Self::internal_server_error("Hubo un error, intenta de nuevo.")
            }
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(error: AuthError) -> Self {
        match error {
            AuthError::Validation(errores) => Self::Invalid(errores),
            AuthError::InvalidSession => Self::Unauthenticated,
            AuthError::InvalidToken => Self::bad_request(error.to_string()),
            AuthError::UserExists
            | AuthError::UserNotFound
            | AuthError::NotConfirmed
            | AuthError::BadPassword
            | AuthError::EmailNotRegistered => {
                let field = error.field().unwrap_or("email");
                Self::Invalid(vec![FieldError::new(field, error.to_string())])
            }
            AuthError::Database(_) | AuthError::PasswordHash(_) | AuthError::Token(_) => {
                error!(error = ?error, "auth error");
                Self::internal_server_error("Hubo un error, intenta de nuevo.")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bienes_listings::RefusalReason;
    use axum::http::header::{LOCATION, SET_COOKIE};

    #[test]
    fn refusals_redirect_to_the_dashboard() {
        let response = ApiError::from(ListingError::Refused(RefusalReason::NotOwner)).into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[LOCATION], "/mis-propiedades");
    }

    #[test]
    fn public_refusals_redirect_to_404() {
        let response = ApiError::public(ListingError::Refused(RefusalReason::NotFound)).into_response();
        assert_eq!(response.headers()[LOCATION], "/404");
    }

    #[test]
    fn storage_errors_become_500() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let response = ApiError::from(ListingError::Storage(io)).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn unauthenticated_clears_session_and_redirects_to_login() {
        let response = ApiError::Unauthenticated.into_response();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[LOCATION], "/auth/login");
        let cookie = response.headers()[SET_COOKIE].to_str().unwrap();
        assert!(cookie.starts_with("_token="));
    }

    #[test]
    fn user_facing_auth_errors_are_field_errors() {
        match ApiError::from(AuthError::BadPassword) {
            ApiError::Invalid(errores) => {
                assert_eq!(errores[0].field, "password");
                assert_eq!(errores[0].msg, "El password es incorrecto.");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }
}
