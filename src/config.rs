//! Command-line configuration, following the `clap` derive style the
//! teacher's CLI-facing binaries use (`services/streamer/src/main.rs`).
//! Everything here is an override of a sensible default; the compile-time
//! tunables in `consts.rs` are not configurable at runtime, same split the
//! teacher keeps between CLI args and its own `const` tunables.

use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "chatd", version, about = "A single-writer TCP chat server")]
pub struct Config {
    /// TCP port to listen on.
    #[arg(short, long, default_value_t = crate::consts::PORT)]
    pub port: u16,

    /// Path to the admission token file. A fresh token is generated here
    /// on every startup.
    #[arg(long)]
    pub token_path: Option<PathBuf>,

    /// Path to the SQLite user store.
    #[arg(long)]
    pub db_path: Option<PathBuf>,
}

impl Config {
    /// Resolve the data directory the default token/db paths live under,
    /// following `receiver::main`'s `dirs::data_local_dir()` fallback.
    fn data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("chatd")
    }

    pub fn token_path(&self) -> PathBuf {
        self.token_path
            .clone()
            .unwrap_or_else(|| Self::data_dir().join("token"))
    }

    pub fn db_path(&self) -> PathBuf {
        self.db_path
            .clone()
            .unwrap_or_else(|| Self::data_dir().join("chatd.sqlite3"))
    }
}
