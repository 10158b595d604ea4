//! Password hashing command.

use portfolio_site::services::auth::{AuthError, hash_password};

/// Print an Argon2 PHC hash suitable for `ADMIN_PASSWORD_HASH`.
///
/// # Errors
///
/// Returns `AuthError::PasswordHash` if hashing fails.
pub fn hash(password: &str) -> Result<(), AuthError> {
    let phc = hash_password(password)?;

    #[allow(clippy::print_stdout)]
    {
        println!("{phc}");
    }
    Ok(())
}
