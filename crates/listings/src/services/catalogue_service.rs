//! Public, read-only views over published listings.

use sqlx::SqlitePool;

use super::PUBLISHED_LISTING_SELECT;
use crate::entities::{Category, CategoryPage, HomePage, PriceTier, PublishedListing};
use crate::types::{ListingError, ListingResult, RefusalReason};

const CATEGORY_HOUSE: i64 = 1;
const CATEGORY_APARTMENT: i64 = 2;
const HOME_ROW_SIZE: i64 = 3;

#[derive(Clone)]
pub struct CatalogueService {
    pool: SqlitePool,
}

impl CatalogueService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn home(&self) -> ListingResult<HomePage> {
        let categorias = sqlx::query_as::<_, Category>("SELECT id, nombre FROM categorias ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        let precios = sqlx::query_as::<_, PriceTier>("SELECT id, nombre FROM precios ORDER BY id")
            .fetch_all(&self.pool)
            .await?;

        Ok(HomePage {
            categorias,
            precios,
            casas: self.latest_in(CATEGORY_HOUSE, HOME_ROW_SIZE).await?,
            departamentos: self.latest_in(CATEGORY_APARTMENT, HOME_ROW_SIZE).await?,
        })
    }

    pub async fn by_category(&self, categoria_id: i64) -> ListingResult<CategoryPage> {
        let categoria = sqlx::query_as::<_, Category>("SELECT id, nombre FROM categorias WHERE id = ?")
            .bind(categoria_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(ListingError::Refused(RefusalReason::NotFound))?;

        let query = format!(
            "{PUBLISHED_LISTING_SELECT} WHERE p.publicado = 1 AND p.categoria_id = ? ORDER BY p.created_at DESC"
        );
        let propiedades = sqlx::query_as::<_, PublishedListing>(&query)
            .bind(categoria_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(CategoryPage {
            categoria,
            propiedades,
        })
    }

    /// Published listings whose title or description contains `term`,
    /// ignoring ASCII case.
    pub async fn search(&self, term: &str) -> ListingResult<Vec<PublishedListing>> {
        let pattern = format!("%{}%", escape_like(term.trim()));
        let query = format!(
            r"{PUBLISHED_LISTING_SELECT} WHERE p.publicado = 1 AND (p.titulo LIKE ?1 ESCAPE '\' OR p.descripcion LIKE ?1 ESCAPE '\') ORDER BY p.created_at DESC"
        );
        let propiedades = sqlx::query_as::<_, PublishedListing>(&query)
            .bind(pattern)
            .fetch_all(&self.pool)
            .await?;
        Ok(propiedades)
    }

    /// Every published listing, for the map.
    pub async fn map_listings(&self) -> ListingResult<Vec<PublishedListing>> {
        let query = format!("{PUBLISHED_LISTING_SELECT} WHERE p.publicado = 1 ORDER BY p.id");
        let propiedades = sqlx::query_as::<_, PublishedListing>(&query)
            .fetch_all(&self.pool)
            .await?;
        Ok(propiedades)
    }

    async fn latest_in(&self, categoria_id: i64, limit: i64) -> ListingResult<Vec<PublishedListing>> {
        let query = format!(
            "{PUBLISHED_LISTING_SELECT} WHERE p.publicado = 1 AND p.categoria_id = ? ORDER BY p.created_at DESC, p.id DESC LIMIT ?"
        );
        let propiedades = sqlx::query_as::<_, PublishedListing>(&query)
            .bind(categoria_id)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;
        Ok(propiedades)
    }
}

fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
