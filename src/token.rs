//! Admission token generation, persistence, and verification.
//!
//! The token gates `/join`: a client must present the exact 32-character
//! hex string written to the token file at the most recent server start.
//! Rotating the token (a fresh server start) invalidates any connection
//! that has not yet joined, but does not evict already-joined sessions,
//! since verification happens once, at `/join` time, against an in-memory
//! copy cached here rather than by re-reading the file per attempt.

use crate::error::TokenError;
use rand::Rng;
use std::io::Write;
use std::path::{Path, PathBuf};

pub const TOKEN_LEN: usize = 32;

const HEX_DIGITS: &[u8; 16] = b"0123456789ABCDEF";

/// Holds the admission token in memory for fast verification.
pub struct TokenStore {
    value: String,
}

impl TokenStore {
    /// Generate a fresh token, overwrite `path` with it, and cache it.
    ///
    /// Matches the reference behavior: one nibble at a time from a
    /// cryptographically secure source, world-readable file, no trailing
    /// newline.
    pub fn initialize(path: &Path) -> Result<Self, TokenError> {
        let value = generate();
        write_file(path, &value)?;
        Ok(Self { value })
    }

    /// Load the token cached at the last `initialize` call and write it to
    /// a different path as well. Exposed mainly for tests that want a
    /// known token without going through file I/O twice.
    pub fn from_value(value: impl Into<String>) -> Self {
        Self { value: value.into() }
    }

    /// Byte-for-byte comparison against the cached token. A candidate of
    /// the wrong length is rejected without touching the token file.
    pub fn verify(&self, candidate: &str) -> bool {
        candidate.len() == TOKEN_LEN && candidate.as_bytes() == self.value.as_bytes()
    }

    pub fn value(&self) -> &str {
        &self.value
    }
}

fn generate() -> String {
    let mut rng = rand::thread_rng();
    let mut s = String::with_capacity(TOKEN_LEN);
    for _ in 0..TOKEN_LEN {
        let nibble = rng.gen_range(0..16);
        s.push(HEX_DIGITS[nibble] as char);
    }
    s
}

fn write_file(path: &Path, value: &str) -> Result<(), TokenError> {
    let mut file = std::fs::File::create(path).map_err(TokenError::Create)?;
    file.write_all(value.as_bytes()).map_err(TokenError::Write)?;
    Ok(())
}

/// Default location of the token file, relative to the working directory.
pub fn default_path() -> PathBuf {
    PathBuf::from("TOKEN")
}
