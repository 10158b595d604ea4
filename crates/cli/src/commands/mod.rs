//! CLI subcommand implementations.

pub mod api;
pub mod migrate;
pub mod password;
pub mod seed;

use secrecy::SecretString;

/// Database URL from `PORTFOLIO_DATABASE_URL`, falling back to `DATABASE_URL`.
pub(crate) fn database_url() -> Option<SecretString> {
    dotenvy::dotenv().ok();
    ["PORTFOLIO_DATABASE_URL", "DATABASE_URL"]
        .into_iter()
        .filter_map(|key| std::env::var(key).ok())
        .find(|value| !value.is_empty())
        .map(SecretString::from)
}
