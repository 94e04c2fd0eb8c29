//! Password hashing and verification.
//!
//! Raw passwords never reach the database or the logs: `hash_password`
//! salts and hashes with Argon2 before `Db::insert` is called, and
//! `verify_password` re-derives the hash for comparison rather than
//! storing anything reversible.

use crate::error::AuthError;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use rand::rngs::OsRng;

/// Hash `raw` with a fresh per-call salt. Returns the PHC string format
/// (`$argon2id$v=19$...`), which bundles the salt and parameters, so no
/// separate salt column is needed in the user store.
pub fn hash_password(raw: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(raw.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AuthError::Hash(e.to_string()))
}

/// Constant-time verification of `raw` against a stored PHC hash string.
/// A malformed stored hash is treated as a verification failure rather
/// than a panic or a crash.
pub fn verify_password(raw: &str, stored_hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(stored_hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(raw.as_bytes(), &parsed)
        .is_ok()
}
