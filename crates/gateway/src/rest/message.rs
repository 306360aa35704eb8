//! Inquiry messages: sending from the public detail page and the owner's
//! inbox.

use axum::{
    extract::State,
    response::{IntoResponse, Redirect, Response},
    routing::get,
    Form, Router,
};
use bienes_listings::ListingError;
use serde::{Deserialize, Serialize};

use crate::rest::public::detail_page;
use crate::{
    ApiError, ApiResult, AppState, CsrfToken, MaybeUser, OwnerId, Page, PublicId, RequireUser,
};

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MessageForm {
    pub mensaje: String,
}

pub fn create_message_routes() -> Router<AppState> {
    Router::new().route("/mensajes/:id", get(inbox))
}

pub async fn send(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    csrf: CsrfToken,
    PublicId(id): PublicId,
    Form(form): Form<MessageForm>,
) -> ApiResult<Response> {
    match state.messages().send(id, user.id, &form.mensaje).await {
        Ok(_) => Ok(Redirect::to("/").into_response()),
        Err(ListingError::Validation(errores)) => {
            let viewer = MaybeUser(Some(user));
            let page = match detail_page(&state, id, &viewer, &csrf).await {
                Ok(page) => page,
                // Unpublished listings have no detail page to re-render.
                Err(_) => Page::new("Enviar Mensaje").csrf(&csrf),
            };
            Ok(page.errors(errores).datos(&form).into_response())
        }
        Err(err) => Err(ApiError::public(err)),
    }
}

pub async fn inbox(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    OwnerId(id): OwnerId,
) -> ApiResult<Page> {
    let inbox = state.messages().list_for_owner(id, user.id).await?;
    Ok(Page::new("Mensajes")
        .with("propiedad", serde_json::json!({ "id": inbox.propiedad_id, "titulo": inbox.titulo }))
        .with("mensajes", &inbox.mensajes))
}
