use std::sync::Arc;

use anyhow::{Context, Result};
use bienes_auth::{Authenticator, LogNotifier, Notifier};
use bienes_config::AppConfig;
use bienes_database::initialize_database;
use bienes_gateway::{AppState, HttpSettings};
use bienes_listings::{CatalogueService, ImageStore, ListingService, MessageService};
use sqlx::SqlitePool;
use tracing::info;

pub mod telemetry {
    use anyhow::Result;
    use tracing_subscriber::{fmt::SubscriberBuilder, EnvFilter};

    pub fn init_tracing() -> Result<()> {
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        let subscriber = SubscriberBuilder::default()
            .with_env_filter(env_filter)
            .finish();

        tracing::subscriber::set_global_default(subscriber)
            .map_err(|error| anyhow::anyhow!("failed to set tracing subscriber: {error}"))
    }
}

/// Every service of the application wired to one pool.
#[derive(Clone)]
pub struct BackendServices {
    pub db_pool: SqlitePool,
    pub authenticator: Authenticator,
    pub listings: ListingService,
    pub messages: MessageService,
    pub catalogue: CatalogueService,
    http: HttpSettings,
}

impl BackendServices {
    pub async fn initialise(config: &AppConfig) -> Result<Self> {
        let notifier: Arc<dyn Notifier> = Arc::new(LogNotifier::new(config.mail.clone()));
        Self::initialise_with_notifier(config, notifier).await
    }

    pub async fn initialise_with_notifier(
        config: &AppConfig,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self> {
        let db_pool = initialize_database(&config.database)
            .await
            .context("failed to initialise database")?;

        let authenticator = Authenticator::new(db_pool.clone(), &config.auth, notifier);

        let images = ImageStore::open(&config.uploads.dir)
            .await
            .with_context(|| format!("failed to open upload directory {}", config.uploads.dir))?;
        info!(dir = %images.dir().display(), "image store ready");

        let listings = ListingService::new(db_pool.clone(), images);
        let messages = MessageService::new(db_pool.clone(), listings.clone());
        let catalogue = CatalogueService::new(db_pool.clone());

        Ok(Self {
            db_pool,
            authenticator,
            listings,
            messages,
            catalogue,
            http: HttpSettings {
                secure_cookies: config.auth.secure_cookies,
                max_upload_bytes: config.uploads.max_bytes,
            },
        })
    }

    /// State for the HTTP router.
    pub fn gateway_state(&self) -> AppState {
        AppState::new(
            self.authenticator.clone(),
            self.listings.clone(),
            self.messages.clone(),
            self.catalogue.clone(),
            self.http.clone(),
        )
    }
}

pub async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::warn!(?error, "failed to listen for shutdown signal");
    }
    info!("shutdown signal received");
}
