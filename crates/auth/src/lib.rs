//! Account lifecycle for the listing service: registration with emailed
//! confirmation, password login issuing a signed session, and token based
//! password reset.

use std::sync::Arc;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use bienes_config::AuthConfig;
use chrono::Utc;
use rand::RngCore;
use serde::Serialize;
use sqlx::{Row, SqlitePool};
use thiserror::Error;
use tracing::{debug, info, warn};

pub mod notifier;
pub mod password;
pub mod session;
pub mod validation;

pub use notifier::{EmailKind, LogNotifier, Notifier, OutgoingEmail, RecordingNotifier, Recipient};
pub use session::{Claims, SessionAssertion, SessionKeys};
pub use validation::FieldError;

#[derive(Clone)]
pub struct Authenticator {
    pool: SqlitePool,
    keys: SessionKeys,
    notifier: Arc<dyn Notifier>,
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid form input")]
    Validation(Vec<FieldError>),
    #[error("El usuario ya esta registrado")]
    UserExists,
    #[error("Hubo un error al confirmar tu cuenta, intenta de nuevo.")]
    InvalidToken,
    #[error("El usuario no existe.")]
    UserNotFound,
    #[error("Tu cuenta no ha sido confirmada.")]
    NotConfirmed,
    #[error("El password es incorrecto.")]
    BadPassword,
    #[error("El email no esta relacionado con ningun usuario.")]
    EmailNotRegistered,
    #[error("invalid session token")]
    InvalidSession,
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("password hashing failed: {0}")]
    PasswordHash(#[from] argon2::password_hash::Error),
    #[error("session signing failed: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),
}

impl AuthError {
    /// Field name the error belongs to when rendered on a form.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            AuthError::UserExists | AuthError::UserNotFound | AuthError::EmailNotRegistered => {
                Some("email")
            }
            AuthError::BadPassword => Some("password"),
            _ => None,
        }
    }
}

/// A registered account awaiting confirmation.
#[derive(Debug, Clone, Serialize)]
pub struct PendingUser {
    pub id: i64,
    pub nombre: String,
    pub email: String,
}

/// The user behind a verified session cookie.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionUser {
    pub id: i64,
    pub nombre: String,
}

impl Authenticator {
    pub fn new(pool: SqlitePool, config: &AuthConfig, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            pool,
            keys: SessionKeys::new(&config.jwt_secret, config.session_ttl_seconds),
            notifier,
        }
    }

    pub fn pool(&self) -> SqlitePool {
        self.pool.clone()
    }

    pub fn keys(&self) -> &SessionKeys {
        &self.keys
    }

    pub async fn register(
        &self,
        nombre: &str,
        email: &str,
        password: &str,
        repetir_password: &str,
    ) -> Result<PendingUser, AuthError> {
        let errors = validation::validate_registration(nombre, email, password, repetir_password);
        if !errors.is_empty() {
            return Err(AuthError::Validation(errors));
        }

        let nombre = nombre.trim();
        let email = email.trim();

        let existing = sqlx::query("SELECT id FROM usuarios WHERE email = ?")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        if existing.is_some() {
            return Err(AuthError::UserExists);
        }

        let password_hash = password::hash_password(password)?;
        let token = generate_token();
        let now = Utc::now().to_rfc3339();

        let inserted = sqlx::query(
            "INSERT INTO usuarios (nombre, email, password, token, confirmado, created_at, updated_at) VALUES (?, ?, ?, ?, 0, ?, ?)",
        )
        .bind(nombre)
        .bind(email)
        .bind(&password_hash)
        .bind(&token)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await;

        let id = match inserted {
            Ok(result) => result.last_insert_rowid(),
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                return Err(AuthError::UserExists)
            }
            Err(error) => return Err(error.into()),
        };

        info!(user_id = id, "registered account pending confirmation");

        let recipient = Recipient {
            nombre: nombre.to_owned(),
            email: email.to_owned(),
            token,
        };
        if let Err(error) = self.notifier.send_confirmation(&recipient) {
            warn!(user_id = id, ?error, "failed to deliver confirmation email");
        }

        Ok(PendingUser {
            id,
            nombre: recipient.nombre,
            email: recipient.email,
        })
    }

    /// Consume a confirmation token. The token is cleared in the same
    /// statement that marks the account confirmed.
    pub async fn confirm(&self, token: &str) -> Result<(), AuthError> {
        if token.is_empty() {
            return Err(AuthError::InvalidToken);
        }

        let result = sqlx::query(
            "UPDATE usuarios SET token = NULL, confirmado = 1, updated_at = ? WHERE token = ?",
        )
        .bind(Utc::now().to_rfc3339())
        .bind(token)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AuthError::InvalidToken);
        }

        info!("account confirmed");
        Ok(())
    }

    pub async fn authenticate(
        &self,
        email: &str,
        password: &str,
    ) -> Result<SessionAssertion, AuthError> {
        let errors = validation::validate_login(email, password);
        if !errors.is_empty() {
            return Err(AuthError::Validation(errors));
        }

        let row = sqlx::query("SELECT id, nombre, password, confirmado FROM usuarios WHERE email = ?")
            .bind(email.trim())
            .fetch_optional(&self.pool)
            .await?;

        let Some(row) = row else {
            return Err(AuthError::UserNotFound);
        };

        let confirmado: bool = row.try_get("confirmado")?;
        if !confirmado {
            return Err(AuthError::NotConfirmed);
        }

        let stored_hash: String = row.try_get("password")?;
        if !password::verify_password(password, &stored_hash)? {
            return Err(AuthError::BadPassword);
        }

        let id: i64 = row.try_get("id")?;
        let nombre: String = row.try_get("nombre")?;
        let assertion = self.keys.issue(id, &nombre)?;

        debug!(user_id = id, "issued session assertion");
        Ok(assertion)
    }

    /// Reissue the account token and email a reset link.
    pub async fn request_password_reset(&self, email: &str) -> Result<(), AuthError> {
        if !validation::is_email(email) {
            return Err(AuthError::Validation(vec![FieldError::new(
                "email",
                "Email obligatorio",
            )]));
        }

        let row = sqlx::query("SELECT id, nombre, email FROM usuarios WHERE email = ?")
            .bind(email.trim())
            .fetch_optional(&self.pool)
            .await?;

        let Some(row) = row else {
            return Err(AuthError::EmailNotRegistered);
        };

        let id: i64 = row.try_get("id")?;
        let token = generate_token();

        sqlx::query("UPDATE usuarios SET token = ?, updated_at = ? WHERE id = ?")
            .bind(&token)
            .bind(Utc::now().to_rfc3339())
            .bind(id)
            .execute(&self.pool)
            .await?;

        let recipient = Recipient {
            nombre: row.try_get("nombre")?,
            email: row.try_get("email")?,
            token,
        };
        if let Err(error) = self.notifier.send_password_reset(&recipient) {
            warn!(user_id = id, ?error, "failed to deliver password reset email");
        }

        info!(user_id = id, "password reset requested");
        Ok(())
    }

    pub async fn check_reset_token(&self, token: &str) -> Result<(), AuthError> {
        self.user_id_for_token(token).await.map(|_| ())
    }

    pub async fn reset_password(&self, token: &str, password: &str) -> Result<(), AuthError> {
        let user_id = self.user_id_for_token(token).await?;

        let errors = validation::validate_new_password(password);
        if !errors.is_empty() {
            return Err(AuthError::Validation(errors));
        }

        let password_hash = password::hash_password(password)?;
        let result = sqlx::query(
            "UPDATE usuarios SET password = ?, token = NULL, updated_at = ? WHERE id = ? AND token = ?",
        )
        .bind(&password_hash)
        .bind(Utc::now().to_rfc3339())
        .bind(user_id)
        .bind(token)
        .execute(&self.pool)
        .await?;

        // Another reset may have consumed the token in between.
        if result.rows_affected() == 0 {
            return Err(AuthError::InvalidToken);
        }

        info!(user_id, "password changed");
        Ok(())
    }

    /// Verify a session cookie and make sure its user still exists.
    pub async fn resolve_session(&self, token: &str) -> Result<SessionUser, AuthError> {
        let claims = self
            .keys
            .verify(token)
            .map_err(|_| AuthError::InvalidSession)?;

        let row = sqlx::query("SELECT id, nombre FROM usuarios WHERE id = ? AND confirmado = 1")
            .bind(claims.id)
            .fetch_optional(&self.pool)
            .await?;

        let Some(row) = row else {
            return Err(AuthError::InvalidSession);
        };

        Ok(SessionUser {
            id: row.try_get("id")?,
            nombre: row.try_get("nombre")?,
        })
    }

    async fn user_id_for_token(&self, token: &str) -> Result<i64, AuthError> {
        if token.is_empty() {
            return Err(AuthError::InvalidToken);
        }

        let row = sqlx::query("SELECT id FROM usuarios WHERE token = ?")
            .bind(token)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(row.try_get("id")?),
            None => Err(AuthError::InvalidToken),
        }
    }
}

fn generate_token() -> String {
    let mut bytes = [0u8; 24];
    rand::thread_rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}
