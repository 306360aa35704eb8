//! Inquiry messages from interested users to listing owners.

use chrono::Utc;
use sqlx::{Row, SqlitePool};
use tracing::info;

use crate::entities::{InboxMessage, ListingInbox, MessageAuthor};
use crate::types::{ListingError, ListingResult, RefusalReason};
use crate::utils::ownership::authorize;
use crate::utils::validation::validate_message;
use crate::ListingService;

#[derive(Clone)]
pub struct MessageService {
    pool: SqlitePool,
    listings: ListingService,
}

impl MessageService {
    pub fn new(pool: SqlitePool, listings: ListingService) -> Self {
        Self { pool, listings }
    }

    /// Record a message on a listing. The listing only has to exist.
    pub async fn send(&self, listing_id: i64, author_id: i64, body: &str) -> ListingResult<i64> {
        let exists: Option<i64> = sqlx::query_scalar("SELECT id FROM propiedades WHERE id = ?")
            .bind(listing_id)
            .fetch_optional(&self.pool)
            .await?;
        if exists.is_none() {
            return Err(RefusalReason::NotFound.into());
        }

        let body = validate_message(body).map_err(|err| ListingError::Validation(vec![err]))?;

        let id = sqlx::query(
            "INSERT INTO mensajes (mensaje, propiedad_id, usuario_id, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(body)
        .bind(listing_id)
        .bind(author_id)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?
        .last_insert_rowid();

        info!(listing_id, user_id = author_id, message_id = id, "message sent");
        Ok(id)
    }

    /// Messages of a listing, for its owner only.
    pub async fn list_for_owner(&self, listing_id: i64, actor_id: i64) -> ListingResult<ListingInbox> {
        let listing = self.listings.find(listing_id).await?;
        authorize(actor_id, listing.as_ref()).into_result()?;
        let listing = listing.ok_or(ListingError::Refused(RefusalReason::NotFound))?;

        let rows = sqlx::query(
            r#"
            SELECT m.id, m.mensaje, m.created_at, u.nombre, u.email
            FROM mensajes m
            JOIN usuarios u ON u.id = m.usuario_id
            WHERE m.propiedad_id = ?
            ORDER BY m.id DESC
            "#,
        )
        .bind(listing_id)
        .fetch_all(&self.pool)
        .await?;

        let mensajes = rows
            .into_iter()
            .map(|row| {
                Ok(InboxMessage {
                    id: row.try_get("id")?,
                    mensaje: row.try_get("mensaje")?,
                    created_at: row.try_get("created_at")?,
                    autor: MessageAuthor {
                        nombre: row.try_get("nombre")?,
                        email: row.try_get("email")?,
                    },
                })
            })
            .collect::<Result<Vec<_>, sqlx::Error>>()?;

        Ok(ListingInbox {
            propiedad_id: listing.id,
            titulo: listing.titulo,
            mensajes,
        })
    }
}
