//! Signed session assertions.
//!
//! A session is never persisted: the server issues an HS256 JWT that carries
//! the user id and display name, and the gateway stores it in the `_token`
//! cookie.

use chrono::{DateTime, Duration, TimeZone, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub id: i64,
    pub nombre: String,
    pub iat: usize,
    pub exp: usize,
}

/// A freshly issued session token and its expiry.
#[derive(Debug, Clone)]
pub struct SessionAssertion {
    pub token: String,
    pub user_id: i64,
    pub expires_at: DateTime<Utc>,
}

#[derive(Clone)]
pub struct SessionKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl SessionKeys {
    pub fn new(secret: &str, ttl_seconds: u64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl: Duration::seconds(i64::try_from(ttl_seconds).unwrap_or(i64::MAX / 1_000)),
        }
    }

    pub fn issue(
        &self,
        user_id: i64,
        nombre: &str,
    ) -> Result<SessionAssertion, jsonwebtoken::errors::Error> {
        self.issue_at(user_id, nombre, Utc::now())
    }

    pub(crate) fn issue_at(
        &self,
        user_id: i64,
        nombre: &str,
        now: DateTime<Utc>,
    ) -> Result<SessionAssertion, jsonwebtoken::errors::Error> {
        let expires_at = now + self.ttl;
        let claims = Claims {
            id: user_id,
            nombre: nombre.to_owned(),
            iat: timestamp(now),
            exp: timestamp(expires_at),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)?;

        Ok(SessionAssertion {
            token,
            user_id,
            expires_at: Utc
                .timestamp_opt(claims.exp as i64, 0)
                .single()
                .unwrap_or(expires_at),
        })
    }

    /// Validate signature and expiry, returning the claims.
    pub fn verify(&self, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        let data = decode::<Claims>(token, &self.decoding, &validation)?;
        Ok(data.claims)
    }
}

fn timestamp(at: DateTime<Utc>) -> usize {
    usize::try_from(at.timestamp()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issued_assertion_verifies() {
        let keys = SessionKeys::new("secret", 3_600);
        let assertion = keys.issue(7, "Jurgen").unwrap();
        let claims = keys.verify(&assertion.token).unwrap();
        assert_eq!(claims.id, 7);
        assert_eq!(claims.nombre, "Jurgen");
        assert_eq!(claims.exp - claims.iat, 3_600);
    }

    #[test]
    fn foreign_secret_is_rejected() {
        let keys = SessionKeys::new("secret", 3_600);
        let other = SessionKeys::new("other", 3_600);
        let assertion = other.issue(7, "Jurgen").unwrap();
        assert!(keys.verify(&assertion.token).is_err());
    }

    #[test]
    fn expired_assertion_is_rejected() {
        let keys = SessionKeys::new("secret", 60);
        let issued = Utc::now() - Duration::hours(2);
        let assertion = keys.issue_at(7, "Jurgen", issued).unwrap();
        assert!(keys.verify(&assertion.token).is_err());
    }
}
