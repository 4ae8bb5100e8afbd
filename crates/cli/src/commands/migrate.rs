//! Database migration commands.
//!
//! Migrations are embedded at compile time from each service crate:
//!
//! - storefront: `crates/storefront/migrations/` (schema `catalog`)
//! - admin: `crates/admin/migrations/` (schema `admin`, enum types, sessions)
//!
//! # Environment Variables
//!
//! - `STOREFRONT_DATABASE_URL` - `PostgreSQL` connection string for storefront
//! - `ADMIN_DATABASE_URL` - `PostgreSQL` connection string for admin
//! - `DATABASE_URL` - fallback for either when the specific one is unset

use secrecy::{ExposeSecret, SecretString};
use sqlx::PgPool;
use sqlx::migrate::Migrator;
use thiserror::Error;

static STOREFRONT_MIGRATIONS: Migrator = sqlx::migrate!("../storefront/migrations");
static ADMIN_MIGRATIONS: Migrator = sqlx::migrate!("../admin/migrations");

/// Errors raised while running migrations.
#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("Missing environment variable: {0} (or DATABASE_URL)")]
    MissingEnvVar(&'static str),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Run storefront database migrations.
///
/// # Errors
///
/// Returns an error if the database URL is missing, the connection fails or
/// a migration fails.
pub async fn storefront() -> Result<(), MigrationError> {
    run("storefront", "STOREFRONT_DATABASE_URL", &STOREFRONT_MIGRATIONS).await
}

/// Run admin database migrations.
///
/// # Errors
///
/// Returns an error if the database URL is missing, the connection fails or
/// a migration fails.
pub async fn admin() -> Result<(), MigrationError> {
    run("admin", "ADMIN_DATABASE_URL", &ADMIN_MIGRATIONS).await
}

async fn run(
    name: &str,
    env_var: &'static str,
    migrator: &Migrator,
) -> Result<(), MigrationError> {
    let _ = dotenvy::dotenv();

    let database_url = pick_database_url(
        std::env::var(env_var).ok(),
        std::env::var("DATABASE_URL").ok(),
    )
    .ok_or(MigrationError::MissingEnvVar(env_var))?;

    tracing::info!("Connecting to {name} database...");
    let pool = PgPool::connect(database_url.expose_secret()).await?;

    tracing::info!(
        migrations = migrator.iter().count(),
        "Running {name} migrations..."
    );
    migrator.run(&pool).await?;

    tracing::info!("{name} migrations complete");
    Ok(())
}

/// Prefer the service-specific URL; blank values count as unset.
fn pick_database_url(specific: Option<String>, fallback: Option<String>) -> Option<SecretString> {
    specific
        .filter(|url| !url.trim().is_empty())
        .or_else(|| fallback.filter(|url| !url.trim().is_empty()))
        .map(SecretString::from)
}
