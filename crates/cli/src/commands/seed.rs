//! Seed the document store with default content.
//!
//! Projects are only seeded into an empty collection. Skills and company are
//! seeded when missing, or overwritten with the defaults under `--force`.

use thiserror::Error;

use portfolio_core::seed::{default_company, default_skills};
use portfolio_core::{CompanyPatch, CompanySection};
use portfolio_site::db::{
    self, CompanyRepository, PgDocumentStore, ProjectRepository, RepositoryError,
    SkillsRepository,
};

/// Errors that can occur while seeding.
#[derive(Debug, Error)]
pub enum SeedError {
    #[error("Missing environment variable: PORTFOLIO_DATABASE_URL or DATABASE_URL")]
    MissingDatabaseUrl,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Seed every collection.
///
/// # Errors
///
/// Returns `SeedError` if the database is unreachable or a write fails.
pub async fn run(force: bool) -> Result<(), SeedError> {
    let database_url = super::database_url().ok_or(SeedError::MissingDatabaseUrl)?;
    let pool = db::create_pool(&database_url).await?;
    let store = PgDocumentStore::new(pool);

    let projects = ProjectRepository::new(&store).ensure_seeded().await?;
    tracing::info!(seeded = projects, "Projects");

    let skills = SkillsRepository::new(&store);
    if force {
        skills.replace(default_skills()).await?;
        tracing::info!("Skills reset to defaults");
    } else {
        tracing::info!(seeded = skills.ensure_seeded().await?, "Skills");
    }

    let company = CompanyRepository::new(&store);
    if force {
        company.merge(&full_company_patch()).await?;
        tracing::info!("Company record reset to defaults");
    } else {
        tracing::info!(seeded = company.ensure_seeded().await?, "Company");
    }

    Ok(())
}

fn full_company_patch() -> CompanyPatch {
    let defaults = default_company();
    let mut patch = CompanyPatch::default();
    for section in CompanySection::ALL {
        patch.set(section, defaults.section(section).clone());
    }
    patch
}
