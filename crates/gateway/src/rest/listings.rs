//! Owner dashboard and listing lifecycle routes.

use axum::{
    extract::{DefaultBodyLimit, Multipart, Query, State},
    response::{IntoResponse, Redirect, Response},
    routing::{get, post, put},
    Form, Json, Router,
};
use bienes_listings::{parse_page, ImageUpload, ListingError, ListingForm};
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::{ApiError, ApiResult, AppState, CsrfToken, OwnerId, Page, RequireUser};

const IMAGE_FIELD: &str = "imagen";

#[derive(Debug, Deserialize)]
pub struct DashboardQuery {
    pub pagina: Option<String>,
}

pub fn create_listing_routes(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .route("/mis-propiedades", get(dashboard))
        .route("/propiedades/crear", get(create_form).post(create))
        .route(
            "/propiedades/agregar-imagen/:id",
            get(image_form)
                .post(attach_image)
                .layer(DefaultBodyLimit::max(max_upload_bytes)),
        )
        .route("/propiedades/editar/:id", get(edit_form).post(edit))
        .route("/propiedades/eliminar/:id", post(delete))
        .route("/propiedades/:id", put(toggle))
}

pub async fn dashboard(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    csrf: CsrfToken,
    Query(query): Query<DashboardQuery>,
) -> ApiResult<Response> {
    let Some(pagina) = parse_page(query.pagina.as_deref()) else {
        return Ok(Redirect::to("/mis-propiedades?pagina=1").into_response());
    };

    let page = state.listings().list_for_owner(user.id, pagina).await?;
    if pagina > page.paginas.max(1) {
        return Ok(Redirect::to("/mis-propiedades?pagina=1").into_response());
    }

    Ok(Page::new("Mis Propiedades")
        .csrf(&csrf)
        .with("usuario", &user)
        .with("propiedades", &page.propiedades)
        .with("total", page.total)
        .with("paginas", page.paginas)
        .with("pagina_actual", page.pagina_actual)
        .with("offset", page.offset)
        .with("limit", page.limit)
        .into_response())
}

pub async fn create_form(
    State(state): State<AppState>,
    RequireUser(_user): RequireUser,
    csrf: CsrfToken,
) -> ApiResult<Page> {
    let reference = state.listings().reference_data().await?;
    Ok(Page::new("Crear Propiedad")
        .csrf(&csrf)
        .with("categorias", &reference.categorias)
        .with("precios", &reference.precios)
        .datos(ListingForm::default()))
}

pub async fn create(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    csrf: CsrfToken,
    Form(form): Form<ListingForm>,
) -> ApiResult<Response> {
    match state.listings().create_draft(user.id, &form).await {
        Ok(id) => Ok(Redirect::to(&format!("/propiedades/agregar-imagen/{id}")).into_response()),
        Err(ListingError::Validation(errores)) => {
            let reference = state.listings().reference_data().await?;
            Ok(Page::new("Crear Propiedad")
                .csrf(&csrf)
                .with("categorias", &reference.categorias)
                .with("precios", &reference.precios)
                .errors(errores)
                .datos(&form)
                .into_response())
        }
        Err(err) => Err(err.into()),
    }
}

pub async fn image_form(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    csrf: CsrfToken,
    OwnerId(id): OwnerId,
) -> ApiResult<Page> {
    let listing = state.listings().image_form(id, user.id).await?;
    Ok(Page::new(format!("Agregar Imagen: {}", listing.titulo))
        .csrf(&csrf)
        .with("propiedad", &listing))
}

pub async fn attach_image(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    OwnerId(id): OwnerId,
    mut multipart: Multipart,
) -> ApiResult<Redirect> {
    let mut upload = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| ApiError::new(err.status(), err.body_text()))?
    {
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }

        let file_name = field.file_name().unwrap_or_default().to_owned();
        let content_type = field.content_type().map(str::to_owned);
        let bytes = field
            .bytes()
            .await
            .map_err(|err| ApiError::new(err.status(), err.body_text()))?;

        debug!(listing_id = id, size = bytes.len(), "received image upload");
        upload = Some(ImageUpload {
            file_name,
            content_type,
            bytes,
        });
    }

    let upload = upload.ok_or_else(|| {
        ApiError::from(ListingError::invalid(IMAGE_FIELD, "Selecciona una imagen"))
    })?;

    state.listings().attach_image(id, user.id, upload).await?;
    Ok(Redirect::to("/mis-propiedades"))
}

pub async fn edit_form(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    csrf: CsrfToken,
    OwnerId(id): OwnerId,
) -> ApiResult<Page> {
    let form = state.listings().edit_form(id, user.id).await?;
    let reference = state.listings().reference_data().await?;
    Ok(Page::new(format!("Editar Propiedad: {}", form.titulo))
        .csrf(&csrf)
        .with("categorias", &reference.categorias)
        .with("precios", &reference.precios)
        .datos(&form))
}

pub async fn edit(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    csrf: CsrfToken,
    OwnerId(id): OwnerId,
    Form(form): Form<ListingForm>,
) -> ApiResult<Response> {
    match state.listings().edit(id, user.id, &form).await {
        Ok(()) => Ok(Redirect::to("/mis-propiedades").into_response()),
        Err(ListingError::Validation(errores)) => {
            let reference = state.listings().reference_data().await?;
            Ok(Page::new(format!("Editar Propiedad: {}", form.titulo))
                .csrf(&csrf)
                .with("categorias", &reference.categorias)
                .with("precios", &reference.precios)
                .errors(errores)
                .datos(&form)
                .into_response())
        }
        Err(err) => Err(err.into()),
    }
}

pub async fn delete(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    OwnerId(id): OwnerId,
) -> ApiResult<Redirect> {
    state.listings().delete(id, user.id).await?;
    Ok(Redirect::to("/mis-propiedades"))
}

pub async fn toggle(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    OwnerId(id): OwnerId,
) -> ApiResult<Json<serde_json::Value>> {
    state.listings().toggle(id, user.id).await?;
    Ok(Json(json!({ "resultado": "ok" })))
}
