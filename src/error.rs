use thiserror::Error;

/// Failures from the embedded user store.
#[derive(Debug, Error)]
pub enum DbError {
    #[error("SQLite: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("Integrity: {0}")]
    IntegrityCheckFailed(String),
    #[error("IO: {0}")]
    Io(#[from] std::io::Error),
}

pub type DbResult<T> = Result<T, DbError>;

/// Failures reading, creating, or verifying the admission token.
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("could not create token file: {0}")]
    Create(std::io::Error),
    #[error("could not write token file: {0}")]
    Write(std::io::Error),
}

/// Failures during password hashing or verification.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("password hash error: {0}")]
    Hash(String),
}

/// Fatal, startup-only failures that abort the process.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("could not bind listener on port {port}: {source}")]
    Bind {
        port: u16,
        source: std::io::Error,
    },
    #[error(transparent)]
    Token(#[from] TokenError),
    #[error(transparent)]
    Db(#[from] DbError),
}
