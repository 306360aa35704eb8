use bytes::Bytes;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::utils::validation;
use bienes_auth::FieldError;

/// A row of `propiedades`.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Listing {
    pub id: i64,
    pub titulo: String,
    pub descripcion: String,
    pub habitaciones: i64,
    pub estacionamiento: i64,
    pub wc: i64,
    pub calle: String,
    pub lat: String,
    pub lng: String,
    /// Generated file name inside the uploads directory, `''` until attached.
    pub imagen: String,
    pub publicado: bool,
    pub precio_id: i64,
    pub categoria_id: i64,
    pub usuario_id: i64,
    pub created_at: String,
    pub updated_at: String,
}

impl Listing {
    pub fn has_image(&self) -> bool {
        !self.imagen.is_empty()
    }

    pub fn is_owned_by(&self, user_id: i64) -> bool {
        self.usuario_id == user_id
    }
}

/// Raw create/edit form as submitted. Every field arrives as text so that a
/// rejected submission can be echoed back unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ListingForm {
    pub titulo: String,
    pub descripcion: String,
    pub categoria: String,
    pub precio: String,
    pub habitaciones: String,
    pub estacionamiento: String,
    pub wc: String,
    pub calle: String,
    pub lat: String,
    pub lng: String,
}

impl ListingForm {
    pub fn validate(&self) -> Result<ListingDraft, Vec<FieldError>> {
        validation::validate_listing_form(self)
    }
}

impl From<&Listing> for ListingForm {
    fn from(listing: &Listing) -> Self {
        Self {
            titulo: listing.titulo.clone(),
            descripcion: listing.descripcion.clone(),
            categoria: listing.categoria_id.to_string(),
            precio: listing.precio_id.to_string(),
            habitaciones: listing.habitaciones.to_string(),
            estacionamiento: listing.estacionamiento.to_string(),
            wc: listing.wc.to_string(),
            calle: listing.calle.clone(),
            lat: listing.lat.clone(),
            lng: listing.lng.clone(),
        }
    }
}

/// Typed descriptive fields of a listing, produced by a successful
/// [`ListingForm::validate`].
#[derive(Debug, Clone, PartialEq)]
pub struct ListingDraft {
    pub titulo: String,
    pub descripcion: String,
    pub categoria_id: i64,
    pub precio_id: i64,
    pub habitaciones: i64,
    pub estacionamiento: i64,
    pub wc: i64,
    pub calle: String,
    pub lat: String,
    pub lng: String,
}

/// An uploaded image as received from the multipart body.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

/// One row of the owner's dashboard.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct OwnerListingRow {
    pub id: i64,
    pub titulo: String,
    pub calle: String,
    pub imagen: String,
    pub publicado: bool,
    pub categoria: String,
    pub precio: String,
    pub mensajes: i64,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct OwnerListingPage {
    pub propiedades: Vec<OwnerListingRow>,
    /// All listings of the owner, independent of the page.
    pub total: i64,
    pub paginas: i64,
    pub pagina_actual: i64,
    pub offset: i64,
    pub limit: i64,
}

/// A published listing joined with its category and price tier names.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct PublishedListing {
    pub id: i64,
    pub titulo: String,
    pub descripcion: String,
    pub habitaciones: i64,
    pub estacionamiento: i64,
    pub wc: i64,
    pub calle: String,
    pub lat: String,
    pub lng: String,
    pub imagen: String,
    pub categoria_id: i64,
    pub categoria: String,
    pub precio_id: i64,
    pub precio: String,
    #[serde(skip_serializing)]
    pub usuario_id: i64,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ListingDetail {
    pub propiedad: PublishedListing,
    /// True when the viewer owns the listing; anonymous viewers are never sellers.
    pub es_vendedor: bool,
}
