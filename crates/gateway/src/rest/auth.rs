//! Account routes: login, logout, registration, confirmation and password
//! reset.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Router,
};
use axum_extra::extract::cookie::CookieJar;
use bienes_auth::AuthError;
use serde::{Deserialize, Serialize};

use crate::session::{expired_session_cookie, session_cookie};
use crate::{ApiError, ApiResult, AppState, CsrfToken, Page};

const LOGIN: &str = "Iniciar Sesion";
const REGISTER: &str = "Crear Cuenta";
const FORGOT: &str = "Recupera tu acceso a Bienes Raices";
const RESET: &str = "Reestablece tu password";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RegisterForm {
    pub nombre: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password: String,
    #[serde(skip_serializing)]
    pub repetir_password: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct EmailForm {
    pub email: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PasswordForm {
    pub password: String,
}

pub fn create_auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/login", get(login_form).post(login))
        .route("/auth/cerrar-sesion", post(logout))
        .route("/auth/registro", get(register_form).post(register))
        .route("/auth/confirmar/:token", get(confirm))
        .route("/auth/olvide-password", get(forgot_form).post(forgot))
        .route(
            "/auth/olvide-password/:token",
            get(reset_form).post(reset),
        )
}

pub async fn login_form(csrf: CsrfToken) -> Page {
    Page::new(LOGIN).csrf(&csrf)
}

pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    csrf: CsrfToken,
    Form(form): Form<LoginForm>,
) -> ApiResult<Response> {
    match state
        .authenticator()
        .authenticate(&form.email, &form.password)
        .await
    {
        Ok(assertion) => {
            let cookie = session_cookie(&assertion, state.settings().secure_cookies);
            Ok((jar.add(cookie), Redirect::to("/mis-propiedades")).into_response())
        }
        Err(err) => {
            let page = Page::new(LOGIN)
                .csrf(&csrf)
                .datos(serde_json::json!({ "email": form.email }));
            form_error(page, err)
        }
    }
}

pub async fn logout(jar: CookieJar) -> impl IntoResponse {
    (jar.add(expired_session_cookie()), Redirect::to("/auth/login"))
}

pub async fn register_form(csrf: CsrfToken) -> Page {
    Page::new(REGISTER).csrf(&csrf)
}

pub async fn register(
    State(state): State<AppState>,
    csrf: CsrfToken,
    Form(form): Form<RegisterForm>,
) -> ApiResult<Response> {
    match state
        .authenticator()
        .register(&form.nombre, &form.email, &form.password, &form.repetir_password)
        .await
    {
        Ok(_) => Ok(Page::new("Cuenta Creada Correctamente")
            .status(StatusCode::CREATED)
            .with(
                "mensaje",
                "Hemos enviado un email de confirmacion, confirma tu cuenta.",
            )
            .into_response()),
        Err(err) => form_error(Page::new(REGISTER).csrf(&csrf).datos(&form), err),
    }
}

pub async fn confirm(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> ApiResult<Page> {
    match state.authenticator().confirm(&token).await {
        Ok(()) => Ok(Page::new("Cuenta Confirmada")
            .with("mensaje", "La cuenta se confirmo correctamente")
            .with("error", false)),
        Err(AuthError::InvalidToken) => Ok(Page::new("Error al confirmar tu cuenta")
            .status(StatusCode::BAD_REQUEST)
            .with("mensaje", AuthError::InvalidToken.to_string())
            .with("error", true)),
        Err(err) => Err(err.into()),
    }
}

pub async fn forgot_form(csrf: CsrfToken) -> Page {
    Page::new(FORGOT).csrf(&csrf)
}

pub async fn forgot(
    State(state): State<AppState>,
    csrf: CsrfToken,
    Form(form): Form<EmailForm>,
) -> ApiResult<Response> {
    match state.authenticator().request_password_reset(&form.email).await {
        Ok(()) => Ok(Page::new("Reestablece tu Password")
            .with("mensaje", "Hemos enviado un email con las instrucciones.")
            .into_response()),
        Err(err) => form_error(
            Page::new(FORGOT)
                .csrf(&csrf)
                .datos(serde_json::json!({ "email": form.email })),
            err,
        ),
    }
}

pub async fn reset_form(
    State(state): State<AppState>,
    Path(token): Path<String>,
    csrf: CsrfToken,
) -> ApiResult<Page> {
    match state.authenticator().check_reset_token(&token).await {
        Ok(()) => Ok(Page::new(RESET).csrf(&csrf)),
        Err(AuthError::InvalidToken) => Ok(invalid_reset_token()),
        Err(err) => Err(err.into()),
    }
}

pub async fn reset(
    State(state): State<AppState>,
    Path(token): Path<String>,
    csrf: CsrfToken,
    Form(form): Form<PasswordForm>,
) -> ApiResult<Response> {
    match state.authenticator().reset_password(&token, &form.password).await {
        Ok(()) => Ok(Page::new("Password Reestablecido")
            .with("mensaje", "Password cambiado correctamente!")
            .into_response()),
        Err(AuthError::InvalidToken) => Ok(invalid_reset_token().into_response()),
        Err(err) => form_error(Page::new(RESET).csrf(&csrf), err),
    }
}

fn invalid_reset_token() -> Page {
    Page::new(RESET)
        .status(StatusCode::BAD_REQUEST)
        .with("mensaje", AuthError::InvalidToken.to_string())
        .with("error", true)
}

/// Re-render a form with the field errors of a user-facing auth failure.
fn form_error(page: Page, err: AuthError) -> ApiResult<Response> {
    match ApiError::from(err) {
        ApiError::Invalid(errores) => Ok(page.errors(errores).into_response()),
        other => Err(other),
    }
}
