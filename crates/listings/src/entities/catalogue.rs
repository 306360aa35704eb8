use serde::Serialize;
use sqlx::FromRow;

use super::listing::PublishedListing;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct Category {
    pub id: i64,
    pub nombre: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct PriceTier {
    pub id: i64,
    pub nombre: String,
}

/// Select options for the create and edit forms.
#[derive(Debug, Clone, Serialize)]
pub struct ReferenceData {
    pub categorias: Vec<Category>,
    pub precios: Vec<PriceTier>,
}

#[derive(Debug, Clone, Serialize)]
pub struct HomePage {
    pub categorias: Vec<Category>,
    pub precios: Vec<PriceTier>,
    pub casas: Vec<PublishedListing>,
    pub departamentos: Vec<PublishedListing>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryPage {
    pub categoria: Category,
    pub propiedades: Vec<PublishedListing>,
}
