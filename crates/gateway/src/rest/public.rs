//! Public catalogue: home, listing detail, categories, search and the map
//! feed.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Json, Router,
};
use bienes_listings::PublishedListing;
use serde::Deserialize;

use crate::rest::message;
use crate::{ApiError, ApiResult, AppState, CsrfToken, MaybeUser, Page, PublicId};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SearchForm {
    pub termino: String,
}

pub fn create_public_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home))
        .route("/propiedad/:id", get(detail).post(message::send))
        .route("/categorias/:id", get(category))
        .route("/404", get(not_found))
        .route("/buscador", post(search))
        .route("/api/propiedades", get(map_feed))
}

pub async fn home(
    State(state): State<AppState>,
    viewer: MaybeUser,
    csrf: CsrfToken,
) -> ApiResult<Page> {
    let home = state.catalogue().home().await?;
    Ok(Page::new("Inicio")
        .csrf(&csrf)
        .with("usuario", &viewer.0)
        .with("categorias", &home.categorias)
        .with("precios", &home.precios)
        .with("casas", &home.casas)
        .with("departamentos", &home.departamentos))
}

pub async fn detail(
    State(state): State<AppState>,
    viewer: MaybeUser,
    csrf: CsrfToken,
    PublicId(id): PublicId,
) -> ApiResult<Page> {
    detail_page(&state, id, &viewer, &csrf).await
}

pub(crate) async fn detail_page(
    state: &AppState,
    id: i64,
    viewer: &MaybeUser,
    csrf: &CsrfToken,
) -> ApiResult<Page> {
    let detail = state
        .listings()
        .view(id, viewer.id())
        .await
        .map_err(ApiError::public)?;

    Ok(Page::new(detail.propiedad.titulo.clone())
        .csrf(csrf)
        .with("usuario", &viewer.0)
        .with("es_vendedor", detail.es_vendedor)
        .with("propiedad", &detail.propiedad))
}

pub async fn category(
    State(state): State<AppState>,
    csrf: CsrfToken,
    PublicId(id): PublicId,
) -> ApiResult<Page> {
    let page = state
        .catalogue()
        .by_category(id)
        .await
        .map_err(ApiError::public)?;

    Ok(Page::new(format!("{}s en Venta", page.categoria.nombre))
        .csrf(&csrf)
        .with("categoria", &page.categoria)
        .with("propiedades", &page.propiedades))
}

pub async fn not_found(csrf: CsrfToken) -> Page {
    Page::new("No Encontrada")
        .status(StatusCode::NOT_FOUND)
        .csrf(&csrf)
}

pub async fn search(
    State(state): State<AppState>,
    csrf: CsrfToken,
    Form(form): Form<SearchForm>,
) -> ApiResult<Response> {
    let termino = form.termino.trim();
    if termino.is_empty() {
        return Ok(Redirect::to("/").into_response());
    }

    let propiedades = state.catalogue().search(termino).await?;
    Ok(Page::new("Resultados de la Busqueda")
        .csrf(&csrf)
        .with("termino", termino)
        .with("propiedades", &propiedades)
        .into_response())
}

pub async fn map_feed(State(state): State<AppState>) -> ApiResult<Json<Vec<PublishedListing>>> {
    let propiedades = state.catalogue().map_listings().await?;
    Ok(Json(propiedades))
}
