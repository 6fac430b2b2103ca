//! Credential hashing for stored user passwords.
//!
//! Every hash is Argon2id with a fixed cost. Verification reads the cost back
//! out of the PHC string, so rows hashed under an older policy still verify.

use anyhow::anyhow;
use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use rand::rngs::OsRng;
use tracing::error;

/// Memory cost in KiB.
pub const HASH_MEMORY_KIB: u32 = 19 * 1024;
pub const HASH_ITERATIONS: u32 = 2;
pub const HASH_PARALLELISM: u32 = 1;

fn hasher() -> anyhow::Result<Argon2<'static>> {
    let params = Params::new(HASH_MEMORY_KIB, HASH_ITERATIONS, HASH_PARALLELISM, None)
        .map_err(|e| anyhow!("argon2 params: {e}"))?;
    Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
}

/// Hashes a sign-up password into a PHC string for the `users.password` column.
pub fn hash_password(plain: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = hasher()?
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|e| {
            error!(error = %e, "password hashing failed");
            anyhow!("hash password: {e}")
        })?;
    Ok(hash.to_string())
}

/// Checks a sign-in attempt against the stored hash. `Ok(false)` on mismatch;
/// `Err` only when the stored value is not a readable hash.
pub fn verify_password(plain: &str, stored: &str) -> anyhow::Result<bool> {
    let parsed = PasswordHash::new(stored).map_err(|e| anyhow!("stored password hash: {e}"))?;
    Ok(hasher()?
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok())
}
