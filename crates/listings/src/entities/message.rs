use serde::Serialize;

/// Public identity of a message author. Credential columns never leave the
/// store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessageAuthor {
    pub nombre: String,
    pub email: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct InboxMessage {
    pub id: i64,
    pub mensaje: String,
    pub created_at: String,
    pub autor: MessageAuthor,
}

/// Messages received on one listing, newest first.
#[derive(Debug, Clone, Serialize)]
pub struct ListingInbox {
    pub propiedad_id: i64,
    pub titulo: String,
    pub mensajes: Vec<InboxMessage>,
}
