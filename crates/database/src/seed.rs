//! Reference data and bulk maintenance used by the `seed-data` and
//! `clear-data` commands.

use sqlx::SqlitePool;
use tracing::info;

use crate::DatabaseResult;

pub const CATEGORIES: [(i64, &str); 5] = [
    (1, "Casa"),
    (2, "Departamento"),
    (3, "Bodega"),
    (4, "Terreno"),
    (5, "Cabaña"),
];

pub const PRICE_TIERS: [(i64, &str); 10] = [
    (1, "0 - $10,000 USD"),
    (2, "$10,000 - $30,000 USD"),
    (3, "$30,000 - $50,000 USD"),
    (4, "$50,000 - $75,000 USD"),
    (5, "$75,000 - $100,000 USD"),
    (6, "$100,000 - $150,000 USD"),
    (7, "$150,000 - $200,000 USD"),
    (8, "$200,000 - $300,000 USD"),
    (9, "$300,000 - $500,000 USD"),
    (10, "+ $500,000 USD"),
];

/// Row counts touched by a maintenance command.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Affected {
    pub categorias: u64,
    pub precios: u64,
    pub propiedades: u64,
    pub mensajes: u64,
    pub usuarios: u64,
}

/// Insert any missing categories and price tiers. Existing rows are kept.
pub async fn seed_reference_data(pool: &SqlitePool) -> DatabaseResult<Affected> {
    let mut tx = pool.begin().await?;
    let mut affected = Affected::default();

    for (id, nombre) in CATEGORIES {
        affected.categorias += sqlx::query("INSERT OR IGNORE INTO categorias (id, nombre) VALUES (?, ?)")
            .bind(id)
            .bind(nombre)
            .execute(&mut *tx)
            .await?
            .rows_affected();
    }

    for (id, nombre) in PRICE_TIERS {
        affected.precios += sqlx::query("INSERT OR IGNORE INTO precios (id, nombre) VALUES (?, ?)")
            .bind(id)
            .bind(nombre)
            .execute(&mut *tx)
            .await?
            .rows_affected();
    }

    tx.commit().await?;
    info!(
        categorias = affected.categorias,
        precios = affected.precios,
        "reference data seeded"
    );
    Ok(affected)
}

/// Delete users, listings and messages. Reference data stays.
pub async fn clear_data(pool: &SqlitePool) -> DatabaseResult<Affected> {
    let mut tx = pool.begin().await?;

    // Children first so the counts are not hidden by cascades.
    let mensajes = sqlx::query("DELETE FROM mensajes").execute(&mut *tx).await?;
    let propiedades = sqlx::query("DELETE FROM propiedades").execute(&mut *tx).await?;
    let usuarios = sqlx::query("DELETE FROM usuarios").execute(&mut *tx).await?;

    tx.commit().await?;

    Ok(Affected {
        mensajes: mensajes.rows_affected(),
        propiedades: propiedades.rows_affected(),
        usuarios: usuarios.rows_affected(),
        ..Affected::default()
    })
}
