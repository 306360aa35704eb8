//! Services over the listing store.

pub mod catalogue_service;
pub mod listing_service;
pub mod message_service;

pub use catalogue_service::CatalogueService;
pub use listing_service::{ListingService, PAGE_SIZE};
pub use message_service::MessageService;

/// Columns of [`crate::entities::PublishedListing`], shared by the public reads.
pub(crate) const PUBLISHED_LISTING_SELECT: &str = r#"
    SELECT p.id, p.titulo, p.descripcion, p.habitaciones, p.estacionamiento, p.wc,
           p.calle, p.lat, p.lng, p.imagen,
           p.categoria_id, c.nombre AS categoria,
           p.precio_id, pr.nombre AS precio,
           p.usuario_id, p.created_at
    FROM propiedades p
    JOIN categorias c ON c.id = p.categoria_id
    JOIN precios pr ON pr.id = p.precio_id
"#;
