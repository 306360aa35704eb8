use anyhow::Context;
use bienes_auth::password::hash_password;
use bienes_config::{load as load_config, AppConfig};
use bienes_database::{clear_data as clear_tables, seed_reference_data};
use bienes_gateway::build_router;
use bienes_runtime::{telemetry, BackendServices};
use chrono::Utc;
use clap::{Parser, Subcommand};
use sqlx::SqlitePool;
use tokio::net::TcpListener;
use tracing::info;

const DEMO_PASSWORD: &str = "admin123";
const DEMO_USERS: [(&str, &str); 2] = [
    ("Jurgen", "jurgenmejias@admin.com"),
    ("Daniel", "jurgendaniel@admin.com"),
];

#[derive(Parser)]
#[command(name = "bienes-raices")]
#[command(about = "Bienes Raices listing service (serves HTTP by default)")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve,
    /// Insert reference data and two confirmed demo users
    SeedData,
    /// Delete all users, listings and messages
    ClearData,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    telemetry::init_tracing().context("failed to initialise tracing")?;
    let config = load_config().context("failed to load configuration")?;

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => run_server(&config).await,
        Commands::SeedData => seed_data(&config).await,
        Commands::ClearData => clear_data(&config).await,
    }
}

async fn run_server(config: &AppConfig) -> anyhow::Result<()> {
    info!("starting Bienes Raices");

    let services = BackendServices::initialise(config)
        .await
        .context("failed to initialise backend services")?;
    let app = build_router(services.gateway_state());

    let address = format!("{}:{}", config.http.address, config.http.port);
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind http listener on {address}"))?;

    info!(%address, "http server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(bienes_runtime::shutdown_signal())
        .await
        .context("http server error")?;

    info!("server shut down");
    Ok(())
}

async fn seed_data(config: &AppConfig) -> anyhow::Result<()> {
    info!("seeding database");

    let services = BackendServices::initialise(config)
        .await
        .context("failed to initialise backend services")?;

    let reference = seed_reference_data(&services.db_pool)
        .await
        .context("failed to seed reference data")?;
    let usuarios = seed_demo_users(&services.db_pool).await?;

    println!("Database seeded:");
    println!("- {} categorias inserted", reference.categorias);
    println!("- {} precios inserted", reference.precios);
    println!("- {usuarios} usuarios inserted (password: {DEMO_PASSWORD})");

    Ok(())
}

async fn seed_demo_users(pool: &SqlitePool) -> anyhow::Result<u64> {
    let now = Utc::now().to_rfc3339();
    let mut inserted = 0;

    for (nombre, email) in DEMO_USERS {
        let hash = hash_password(DEMO_PASSWORD)
            .map_err(|error| anyhow::anyhow!("failed to hash demo password: {error}"))?;

        inserted += sqlx::query(
            r#"
            INSERT OR IGNORE INTO usuarios (nombre, email, password, token, confirmado, created_at, updated_at)
            VALUES (?, ?, ?, NULL, 1, ?, ?)
            "#,
        )
        .bind(nombre)
        .bind(email)
        .bind(&hash)
        .bind(&now)
        .bind(&now)
        .execute(pool)
        .await
        .with_context(|| format!("failed to insert demo user {email}"))?
        .rows_affected();
    }

    Ok(inserted)
}

async fn clear_data(config: &AppConfig) -> anyhow::Result<()> {
    info!("clearing all data from database");

    let services = BackendServices::initialise(config)
        .await
        .context("failed to initialise backend services")?;

    let affected = clear_tables(&services.db_pool)
        .await
        .context("failed to clear database")?;

    println!("Database cleared:");
    println!("- {} mensajes deleted", affected.mensajes);
    println!("- {} propiedades deleted", affected.propiedades);
    println!("- {} usuarios deleted", affected.usuarios);

    Ok(())
}
