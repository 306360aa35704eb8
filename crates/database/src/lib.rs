//! Bienes Raices Database Crate
//!
//! Connection management and schema migrations for the credential store
//! (`usuarios`), the listing store (`propiedades`, `mensajes`) and the static
//! reference data (`categorias`, `precios`).

use bienes_config::DatabaseConfig;
use sqlx::SqlitePool;

pub mod connection;
pub mod error;
pub mod migrations;
pub mod seed;

pub use connection::prepare_database;
pub use error::{DatabaseError, DatabaseResult};
pub use migrations::{run_migrations, MIGRATOR};
pub use seed::{clear_data, seed_reference_data, Affected};

/// Initialize the database with migrations
pub async fn initialize_database(config: &DatabaseConfig) -> DatabaseResult<SqlitePool> {
    let pool = prepare_database(config)
        .await
        .map_err(|e| DatabaseError::Connection(format!("{e:#}")))?;

    run_migrations(&pool)
        .await
        .map_err(|e| DatabaseError::Migration(format!("{e:#}")))?;

    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn create_test_database() -> (SqlitePool, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("test.db");
        let config = DatabaseConfig {
            url: format!("sqlite://{}", db_path.display()),
            max_connections: 2,
        };

        let pool = initialize_database(&config).await.unwrap();
        (pool, temp_dir)
    }

    #[tokio::test]
    async fn test_foreign_keys_enabled() {
        let (pool, _temp_dir) = create_test_database().await;

        let result: (bool,) = sqlx::query_as("PRAGMA foreign_keys")
            .fetch_one(&pool)
            .await
            .unwrap();

        assert!(result.0);
    }

    #[tokio::test]
    async fn test_reference_data_is_present_after_migrations() {
        let (pool, _temp_dir) = create_test_database().await;

        let categorias: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM categorias")
            .fetch_one(&pool)
            .await
            .unwrap();
        let precios: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM precios")
            .fetch_one(&pool)
            .await
            .unwrap();

        assert_eq!(categorias, 5);
        assert_eq!(precios, 10);
    }

    #[tokio::test]
    async fn test_published_listing_requires_image() {
        let (pool, _temp_dir) = create_test_database().await;

        sqlx::query(
            "INSERT INTO usuarios (nombre, email, password, confirmado, created_at, updated_at) VALUES ('Ana', 'ana@x.com', 'hash', 1, '', '')",
        )
        .execute(&pool)
        .await
        .unwrap();

        let result = sqlx::query(
            "INSERT INTO propiedades (titulo, descripcion, habitaciones, estacionamiento, wc, calle, lat, lng, imagen, publicado, precio_id, categoria_id, usuario_id, created_at, updated_at) VALUES ('Casa', 'Desc', 1, 1, 1, 'Calle', '10.1', '-84.0', '', 1, 1, 1, 1, '', '')",
        )
        .execute(&pool)
        .await;

        assert!(result.is_err(), "schema must reject published rows without an image");
    }
}
