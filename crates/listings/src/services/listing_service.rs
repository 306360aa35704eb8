//! Listing lifecycle: draft creation, image attachment (the only way to
//! publish), edit, delete, publication toggle and the owner dashboard.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{error, info};

use super::PUBLISHED_LISTING_SELECT;
use crate::entities::{
    Category, ImageUpload, Listing, ListingDetail, ListingDraft, ListingForm, OwnerListingPage,
    OwnerListingRow, PriceTier, PublishedListing, ReferenceData,
};
use crate::storage::ImageStore;
use crate::types::{ListingError, ListingResult, RefusalReason};
use crate::utils::ownership::authorize;
use bienes_auth::FieldError;

pub const PAGE_SIZE: i64 = 10;

#[derive(Clone)]
pub struct ListingService {
    pool: SqlitePool,
    images: ImageStore,
}

impl ListingService {
    pub fn new(pool: SqlitePool, images: ImageStore) -> Self {
        Self { pool, images }
    }

    pub fn images(&self) -> &ImageStore {
        &self.images
    }

    pub async fn reference_data(&self) -> ListingResult<ReferenceData> {
        let categorias = sqlx::query_as::<_, Category>("SELECT id, nombre FROM categorias ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        let precios = sqlx::query_as::<_, PriceTier>("SELECT id, nombre FROM precios ORDER BY id")
            .fetch_all(&self.pool)
            .await?;

        Ok(ReferenceData { categorias, precios })
    }

    /// Store a new unpublished listing without an image.
    pub async fn create_draft(&self, owner_id: i64, form: &ListingForm) -> ListingResult<i64> {
        let draft = self.validated(form).await?;
        let now = Utc::now().to_rfc3339();

        let id = sqlx::query(
            r#"
            INSERT INTO propiedades (titulo, descripcion, habitaciones, estacionamiento, wc, calle, lat, lng,
                                     imagen, publicado, precio_id, categoria_id, usuario_id, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, '', 0, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&draft.titulo)
        .bind(&draft.descripcion)
        .bind(draft.habitaciones)
        .bind(draft.estacionamiento)
        .bind(draft.wc)
        .bind(&draft.calle)
        .bind(&draft.lat)
        .bind(&draft.lng)
        .bind(draft.precio_id)
        .bind(draft.categoria_id)
        .bind(owner_id)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await?
        .last_insert_rowid();

        info!(listing_id = id, user_id = owner_id, "listing draft created");
        Ok(id)
    }

    /// Load a listing for the image form, refusing in the same cases as
    /// [`ListingService::attach_image`].
    pub async fn image_form(&self, id: i64, actor_id: i64) -> ListingResult<Listing> {
        let listing = self.owned(id, actor_id).await?;
        if listing.publicado {
            return Err(RefusalReason::AlreadyPublished.into());
        }
        Ok(listing)
    }

    /// Attach the image and publish the listing.
    pub async fn attach_image(
        &self,
        id: i64,
        actor_id: i64,
        upload: ImageUpload,
    ) -> ListingResult<Listing> {
        let listing = self.image_form(id, actor_id).await?;
        validate_upload(&upload)?;

        let file_name = self.images.save(&upload.file_name, &upload.bytes).await?;

        let updated = sqlx::query(
            "UPDATE propiedades SET imagen = ?, publicado = 1, updated_at = ? WHERE id = ? AND publicado = 0",
        )
        .bind(&file_name)
        .bind(Utc::now().to_rfc3339())
        .bind(id)
        .execute(&self.pool)
        .await;

        let rows = match updated {
            Ok(result) => result.rows_affected(),
            Err(err) => {
                self.discard(&file_name).await;
                return Err(err.into());
            }
        };

        if rows == 0 {
            // A concurrent request published it first.
            self.discard(&file_name).await;
            return Err(RefusalReason::AlreadyPublished.into());
        }

        if listing.has_image() && listing.imagen != file_name {
            self.discard(&listing.imagen).await;
        }

        info!(listing_id = id, user_id = actor_id, file = %file_name, "listing published");
        self.find(id).await?.ok_or(ListingError::Refused(RefusalReason::NotFound))
    }

    pub async fn edit_form(&self, id: i64, actor_id: i64) -> ListingResult<ListingForm> {
        let listing = self.owned(id, actor_id).await?;
        Ok(ListingForm::from(&listing))
    }

    /// Overwrite the descriptive fields. Image and publication are untouched.
    pub async fn edit(&self, id: i64, actor_id: i64, form: &ListingForm) -> ListingResult<()> {
        self.owned(id, actor_id).await?;
        let draft = self.validated(form).await?;

        sqlx::query(
            r#"
            UPDATE propiedades
            SET titulo = ?, descripcion = ?, habitaciones = ?, estacionamiento = ?, wc = ?,
                calle = ?, lat = ?, lng = ?, precio_id = ?, categoria_id = ?, updated_at = ?
            WHERE id = ? AND usuario_id = ?
            "#,
        )
        .bind(&draft.titulo)
        .bind(&draft.descripcion)
        .bind(draft.habitaciones)
        .bind(draft.estacionamiento)
        .bind(draft.wc)
        .bind(&draft.calle)
        .bind(&draft.lat)
        .bind(&draft.lng)
        .bind(draft.precio_id)
        .bind(draft.categoria_id)
        .bind(Utc::now().to_rfc3339())
        .bind(id)
        .bind(actor_id)
        .execute(&self.pool)
        .await?;

        info!(listing_id = id, user_id = actor_id, "listing updated");
        Ok(())
    }

    /// Remove the image, then the row. Messages go with the row.
    pub async fn delete(&self, id: i64, actor_id: i64) -> ListingResult<()> {
        let listing = self.owned(id, actor_id).await?;

        if listing.has_image() {
            self.images.remove(&listing.imagen).await?;
        }

        sqlx::query("DELETE FROM propiedades WHERE id = ? AND usuario_id = ?")
            .bind(id)
            .bind(actor_id)
            .execute(&self.pool)
            .await?;

        info!(listing_id = id, user_id = actor_id, "listing deleted");
        Ok(())
    }

    /// Flip publication, returning the new state.
    pub async fn toggle(&self, id: i64, actor_id: i64) -> ListingResult<bool> {
        let listing = self.owned(id, actor_id).await?;
        if !listing.has_image() {
            return Err(RefusalReason::MissingImage.into());
        }

        let publicado = !listing.publicado;
        sqlx::query("UPDATE propiedades SET publicado = ?, updated_at = ? WHERE id = ?")
            .bind(publicado)
            .bind(Utc::now().to_rfc3339())
            .bind(id)
            .execute(&self.pool)
            .await?;

        info!(listing_id = id, user_id = actor_id, publicado, "listing publication toggled");
        Ok(publicado)
    }

    /// Public detail of a published listing.
    pub async fn view(&self, id: i64, viewer_id: Option<i64>) -> ListingResult<ListingDetail> {
        let query = format!("{PUBLISHED_LISTING_SELECT} WHERE p.id = ? AND p.publicado = 1");
        let propiedad = sqlx::query_as::<_, PublishedListing>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(ListingError::Refused(RefusalReason::NotFound))?;

        let es_vendedor = viewer_id.is_some_and(|viewer| viewer == propiedad.usuario_id);
        Ok(ListingDetail {
            propiedad,
            es_vendedor,
        })
    }

    pub async fn list_for_owner(&self, owner_id: i64, page: i64) -> ListingResult<OwnerListingPage> {
        let page = page.max(1);
        // Pages past the addressable range read as an empty page.
        let offset = (page - 1).saturating_mul(PAGE_SIZE);

        let propiedades = sqlx::query_as::<_, OwnerListingRow>(
            r#"
            SELECT p.id, p.titulo, p.calle, p.imagen, p.publicado, p.created_at,
                   c.nombre AS categoria, pr.nombre AS precio,
                   (SELECT COUNT(*) FROM mensajes m WHERE m.propiedad_id = p.id) AS mensajes
            FROM propiedades p
            JOIN categorias c ON c.id = p.categoria_id
            JOIN precios pr ON pr.id = p.precio_id
            WHERE p.usuario_id = ?
            ORDER BY p.id DESC
            LIMIT ? OFFSET ?
            "#,
        )
        .bind(owner_id)
        .bind(PAGE_SIZE)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM propiedades WHERE usuario_id = ?")
            .bind(owner_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(OwnerListingPage {
            propiedades,
            total,
            paginas: (total + PAGE_SIZE - 1) / PAGE_SIZE,
            pagina_actual: page,
            offset,
            limit: PAGE_SIZE,
        })
    }

    pub async fn find(&self, id: i64) -> ListingResult<Option<Listing>> {
        let listing = sqlx::query_as::<_, Listing>(
            r#"
            SELECT id, titulo, descripcion, habitaciones, estacionamiento, wc, calle, lat, lng,
                   imagen, publicado, precio_id, categoria_id, usuario_id, created_at, updated_at
            FROM propiedades WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(listing)
    }

    async fn owned(&self, id: i64, actor_id: i64) -> ListingResult<Listing> {
        let listing = self.find(id).await?;
        authorize(actor_id, listing.as_ref()).into_result()?;
        listing.ok_or(ListingError::Refused(RefusalReason::NotFound))
    }

    async fn validated(&self, form: &ListingForm) -> ListingResult<ListingDraft> {
        let draft = form.validate().map_err(ListingError::Validation)?;

        let mut errors = Vec::new();
        let categoria: Option<i64> = sqlx::query_scalar("SELECT id FROM categorias WHERE id = ?")
            .bind(draft.categoria_id)
            .fetch_optional(&self.pool)
            .await?;
        if categoria.is_none() {
            errors.push(FieldError::new("categoria", "Seleccione una categoria"));
        }
        let precio: Option<i64> = sqlx::query_scalar("SELECT id FROM precios WHERE id = ?")
            .bind(draft.precio_id)
            .fetch_optional(&self.pool)
            .await?;
        if precio.is_none() {
            errors.push(FieldError::new("precio", "Seleccione un rango de precios"));
        }

        if errors.is_empty() {
            Ok(draft)
        } else {
            Err(ListingError::Validation(errors))
        }
    }

    async fn discard(&self, file_name: &str) {
        if let Err(err) = self.images.remove(file_name).await {
            error!(file = %file_name, error = %err, "failed to remove image");
        }
    }
}

fn validate_upload(upload: &ImageUpload) -> ListingResult<()> {
    if upload.bytes.is_empty() {
        return Err(ListingError::invalid("imagen", "Selecciona una imagen"));
    }
    if let Some(content_type) = &upload.content_type {
        if !content_type.starts_with("image/") {
            return Err(ListingError::invalid("imagen", "El archivo debe ser una imagen"));
        }
    }
    Ok(())
}
