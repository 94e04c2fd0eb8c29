//! Durable user store: `username -> {password_hash, banned, ban_end}`.
//!
//! Backed by an embedded SQLite file (`users.db`), matching the
//! reference implementation's single-file relational store. The concrete
//! backing store is an implementation detail; only `exists`, `insert`,
//! and `get_record` are load-bearing for the session state machine.

use crate::error::{DbError, DbResult};
use rusqlite::{Connection, OptionalExtension};
use std::path::Path;

const SCHEMA_SQL: &str = include_str!("storage/schema.sql");

/// A persisted user record, minus the username (used as the lookup key).
#[derive(Debug, Clone, PartialEq)]
pub struct UserRecord {
    pub password_hash: String,
    pub banned: bool,
    /// Unix epoch seconds; meaningless unless `banned` is set.
    pub ban_end: i64,
}

pub struct Db {
    conn: Connection,
}

impl Db {
    pub fn open(path: &Path) -> DbResult<Self> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.apply_pragmas()?;
        db.apply_schema()?;
        Ok(db)
    }

    pub fn open_in_memory() -> DbResult<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.apply_pragmas()?;
        db.apply_schema()?;
        Ok(db)
    }

    pub fn integrity_check(&self) -> DbResult<()> {
        let result: String = self
            .conn
            .pragma_query_value(None, "integrity_check", |row| row.get(0))?;
        if result != "ok" {
            return Err(DbError::IntegrityCheckFailed(result));
        }
        Ok(())
    }

    /// `true` if `username` already has a record, unique-index lookup.
    pub fn exists(&self, username: &str) -> DbResult<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM users WHERE username = ?1",
            [username],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Insert a freshly signed-up user. Relies on the schema's unique
    /// index as the store-level uniqueness guarantee; callers should
    /// still pre-check with `exists` to give a clean user-facing error
    /// rather than a raw constraint violation.
    pub fn insert(&self, username: &str, password_hash: &str) -> DbResult<()> {
        self.conn.execute(
            "INSERT INTO users (username, password, banned, banEnd) VALUES (?1, ?2, 0, 0)",
            rusqlite::params![username, password_hash],
        )?;
        Ok(())
    }

    pub fn get_record(&self, username: &str) -> DbResult<Option<UserRecord>> {
        let record = self
            .conn
            .query_row(
                "SELECT password, banned, banEnd FROM users WHERE username = ?1",
                [username],
                |row| {
                    Ok(UserRecord {
                        password_hash: row.get(0)?,
                        banned: row.get::<_, i64>(1)? != 0,
                        ban_end: row.get(2)?,
                    })
                },
            )
            .optional()?;
        Ok(record)
    }

    fn apply_pragmas(&self) -> DbResult<()> {
        self.conn
            .execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=FULL; PRAGMA foreign_keys=ON;")?;
        Ok(())
    }

    fn apply_schema(&self) -> DbResult<()> {
        self.conn.execute_batch(SCHEMA_SQL)?;
        Ok(())
    }
}

/// Default location of the user store, relative to the working directory.
pub fn default_path() -> std::path::PathBuf {
    std::path::PathBuf::from("users.db")
}
