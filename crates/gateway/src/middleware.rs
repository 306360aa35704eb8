//! Middleware for CSRF protection and request tracing

use axum::{
    body::{to_bytes, Body},
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, HeaderMap, Method},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use rand::RngCore;
use std::convert::Infallible;
use tower_http::classify::{ServerErrorsAsFailures, SharedClassifier};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::{debug, Level};

use crate::{ApiError, AppState};

pub const CSRF_COOKIE: &str = "_csrf";
const CSRF_FIELD: &str = "_csrf";
const CSRF_HEADERS: [&str; 2] = ["x-csrf-token", "csrf-token"];
const FORM_BODY_LIMIT: usize = 64 * 1024;

/// The CSRF token for the current request, to embed in rendered forms.
#[derive(Debug, Clone, Default)]
pub struct CsrfToken(pub String);

#[axum::async_trait]
impl<S: Send + Sync> FromRequestParts<S> for CsrfToken {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts.extensions.get::<CsrfToken>().cloned().unwrap_or_default())
    }
}

/// Double-submit cookie check.
///
/// Safe requests get a `_csrf` cookie if they lack one. Every other request
/// must echo the cookie value in an `X-CSRF-Token` header, a `_csrf` query
/// parameter or a `_csrf` field of an urlencoded body.
pub async fn csrf_guard(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let cookie_token = jar
        .get(CSRF_COOKIE)
        .map(|cookie| cookie.value().to_owned())
        .filter(|value| !value.is_empty());

    if is_safe(request.method()) {
        return Ok(match cookie_token {
            Some(token) => {
                request.extensions_mut().insert(CsrfToken(token));
                next.run(request).await
            }
            None => {
                let token = generate_token();
                let cookie = csrf_cookie(token.clone(), state.settings().secure_cookies);
                request.extensions_mut().insert(CsrfToken(token));
                (jar.add(cookie), next.run(request).await).into_response()
            }
        });
    }

    let Some(expected) = cookie_token else {
        debug!(path = %request.uri().path(), "csrf cookie missing");
        return Err(ApiError::forbidden("invalid csrf token"));
    };

    let (submitted, mut request) = submitted_token(request).await?;
    if submitted.as_deref() != Some(expected.as_str()) {
        debug!(path = %request.uri().path(), "csrf token mismatch");
        return Err(ApiError::forbidden("invalid csrf token"));
    }

    request.extensions_mut().insert(CsrfToken(expected));
    Ok(next.run(request).await)
}

/// Request/response tracing, one span per request.
pub fn trace_layer() -> TraceLayer<SharedClassifier<ServerErrorsAsFailures>> {
    TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO))
}

fn is_safe(method: &Method) -> bool {
    matches!(*method, Method::GET | Method::HEAD | Method::OPTIONS)
}

fn csrf_cookie(token: String, secure: bool) -> Cookie<'static> {
    Cookie::build((CSRF_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Strict)
        .secure(secure)
        .build()
}

fn generate_token() -> String {
    let mut bytes = [0u8; 24];
    rand::thread_rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

async fn submitted_token(request: Request) -> Result<(Option<String>, Request), ApiError> {
    if let Some(token) = header_token(request.headers()) {
        return Ok((Some(token), request));
    }

    if let Some(token) = request
        .uri()
        .query()
        .and_then(|query| form_field(query, CSRF_FIELD))
    {
        return Ok((Some(token), request));
    }

    if !is_urlencoded(request.headers()) {
        return Ok((None, request));
    }

    // Read the form body and put it back for the handler's extractor.
    let (parts, body) = request.into_parts();
    let bytes = to_bytes(body, FORM_BODY_LIMIT)
        .await
        .map_err(|_| ApiError::bad_request("form body too large"))?;
    let token = std::str::from_utf8(&bytes)
        .ok()
        .and_then(|body| form_field(body, CSRF_FIELD));

    Ok((token, Request::from_parts(parts, Body::from(bytes))))
}

fn header_token(headers: &HeaderMap) -> Option<String> {
    CSRF_HEADERS.iter().find_map(|name| {
        headers
            .get(*name)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned)
    })
}

fn is_urlencoded(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("application/x-www-form-urlencoded"))
}

/// Look up one field of an `application/x-www-form-urlencoded` string.
fn form_field(encoded: &str, name: &str) -> Option<String> {
    encoded.split('&').find_map(|pair| {
        let mut parts = pair.splitn(2, '=');
        let key = parts.next()?;
        let value = parts.next().unwrap_or("");
        if decode_component(key)? != name {
            return None;
        }
        decode_component(value)
    })
}

fn decode_component(raw: &str) -> Option<String> {
    urlencoding::decode(&raw.replace('+', " "))
        .ok()
        .map(|value| value.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn form_field_decodes_values() {
        let body = "titulo=Casa+grande&_csrf=a%2Bb%3D&lat=10.1";
        assert_eq!(form_field(body, "_csrf").as_deref(), Some("a+b="));
        assert_eq!(form_field(body, "titulo").as_deref(), Some("Casa grande"));
        assert_eq!(form_field(body, "lng"), None);
    }

    #[test]
    fn header_token_checks_both_names() {
        let mut headers = HeaderMap::new();
        headers.insert("csrf-token", "abc".parse().unwrap());
        assert_eq!(header_token(&headers).as_deref(), Some("abc"));
    }

    #[test]
    fn generated_tokens_differ() {
        assert_ne!(generate_token(), generate_token());
    }
}
