//! `chatd`: a multi-user TCP chat server built on a single-writer event
//! loop. One task (the Serializer) owns every connection's session state
//! and is the only task that ever writes to a client socket; everything
//! else (Acceptor, per-connection Readers) only ever produces `Event`s
//! onto an unbounded queue. See `src/serializer.rs` for the state
//! machine this is built around.

pub mod acceptor;
pub mod auth;
pub mod config;
pub mod consts;
pub mod db;
pub mod error;
pub mod event;
pub mod protocol;
pub mod ratelimit;
pub mod reader;
pub mod replies;
pub mod serializer;
pub mod session;
pub mod token;

pub use db::Db;
pub use error::ServerError;
pub use token::TokenStore;
