#![allow(dead_code)]

use std::str::FromStr;

use bytes::Bytes;
use bienes_listings::{
    CatalogueService, ImageStore, ImageUpload, ListingForm, ListingService, MessageService,
};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    SqlitePool,
};
use tempfile::TempDir;

pub type TestResult<T = ()> = Result<T, Box<dyn std::error::Error>>;

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations");

pub struct TestContext {
    pub pool: SqlitePool,
    pub listings: ListingService,
    pub messages: MessageService,
    pub catalogue: CatalogueService,
    pub images: ImageStore,
    _temp_dir: TempDir,
}

impl TestContext {
    pub async fn new() -> TestResult<Self> {
        let temp_dir = TempDir::new()?;
        let db_path = temp_dir.path().join("listings.sqlite");
        let db_url = format!("sqlite://{}", db_path.display());

        let mut options = SqliteConnectOptions::from_str(&db_url)?;
        options = options.create_if_missing(true);
        options = options.foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        MIGRATOR.run(&pool).await?;

        let images = ImageStore::open(temp_dir.path().join("uploads")).await?;
        let listings = ListingService::new(pool.clone(), images.clone());
        let messages = MessageService::new(pool.clone(), listings.clone());
        let catalogue = CatalogueService::new(pool.clone());

        Ok(Self {
            pool,
            listings,
            messages,
            catalogue,
            images,
            _temp_dir: temp_dir,
        })
    }

    /// Insert a confirmed user directly and return its id.
    pub async fn user(&self, nombre: &str, email: &str) -> TestResult<i64> {
        let id = sqlx::query(
            "INSERT INTO usuarios (nombre, email, password, token, confirmado, created_at, updated_at) VALUES (?, ?, 'not-a-hash', NULL, 1, '', '')",
        )
        .bind(nombre)
        .bind(email)
        .execute(&self.pool)
        .await?
        .last_insert_rowid();
        Ok(id)
    }

    pub async fn draft(&self, owner_id: i64, titulo: &str) -> TestResult<i64> {
        let id = self.listings.create_draft(owner_id, &form(titulo, "1")).await?;
        Ok(id)
    }

    pub async fn published(&self, owner_id: i64, titulo: &str, categoria: &str) -> TestResult<i64> {
        let id = self.listings.create_draft(owner_id, &form(titulo, categoria)).await?;
        self.listings.attach_image(id, owner_id, upload("casa.jpg")).await?;
        Ok(id)
    }

    pub fn image_exists(&self, file_name: &str) -> bool {
        self.images
            .path_of(file_name)
            .map(|path| path.exists())
            .unwrap_or(false)
    }
}

pub fn form(titulo: &str, categoria: &str) -> ListingForm {
    ListingForm {
        titulo: titulo.to_string(),
        descripcion: format!("{titulo} con vista al mar"),
        categoria: categoria.to_string(),
        precio: "3".into(),
        habitaciones: "3".into(),
        estacionamiento: "1".into(),
        wc: "2".into(),
        calle: "Calle 5".into(),
        lat: "10.1".into(),
        lng: "-84.1".into(),
    }
}

pub fn upload(file_name: &str) -> ImageUpload {
    ImageUpload {
        file_name: file_name.to_string(),
        content_type: Some("image/jpeg".into()),
        bytes: Bytes::from_static(b"\xff\xd8\xff\xe0fake-jpeg"),
    }
}
