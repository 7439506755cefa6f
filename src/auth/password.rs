use std::sync::OnceLock;

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

use crate::error::AppError;

/// Hashes a plaintext password with Argon2 and a fresh random salt.
///
/// Returns the PHC string, which embeds the salt and parameters.
pub fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default().hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

/// Checks a plaintext password against a stored PHC string.
///
/// `Ok(false)` means a mismatch; `Err` means the stored hash itself is unusable.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, AppError> {
    let parsed_hash = PasswordHash::new(hash)?;
    match Argon2::default().verify_password(password.as_bytes(), &parsed_hash) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(e.into()),
    }
}

/// Runs [`hash_password`] on the blocking pool.
pub async fn hash_password_blocking(password: String) -> Result<String, AppError> {
    tokio::task::spawn_blocking(move || hash_password(&password)).await?
}

/// Runs [`verify_password`] on the blocking pool.
pub async fn verify_password_blocking(password: String, hash: String) -> Result<bool, AppError> {
    tokio::task::spawn_blocking(move || verify_password(&password, &hash)).await?
}

/// Hash of a throwaway password, built with the same parameters as real ones.
fn decoy_hash() -> Result<&'static str, AppError> {
    static DECOY: OnceLock<String> = OnceLock::new();
    if let Some(hash) = DECOY.get() {
        return Ok(hash);
    }
    let hash = hash_password("decoy-password")?;
    Ok(DECOY.get_or_init(|| hash))
}

/// Does the work of a real verification when there is no stored hash to check.
///
/// Always reports a mismatch, whatever the password.
pub async fn verify_decoy_blocking(password: String) -> Result<bool, AppError> {
    tokio::task::spawn_blocking(move || {
        let hash = decoy_hash()?;
        verify_password(&password, hash).map(|_| false)
    })
    .await?
}
