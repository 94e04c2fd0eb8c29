//! Session records and the three disjoint tables that hold them.
//!
//! The Serializer is the sole owner of `SessionTables` and of every
//! `Session` inside it (§5's "Shared-resource policy"): a `Session` is
//! moved between `offline`/`joined`/`online` by removing it from one
//! `HashMap` and inserting it into another, never by copying it while a
//! stale copy remains reachable elsewhere. This keeps invariant I1 (a
//! connection identity is in at most one table at a time) trivially true
//! by construction rather than by convention.

use crate::event::ConnId;
use std::collections::HashMap;
use tokio::net::tcp::OwnedWriteHalf;
use tokio::time::Instant;

/// Per-session record. `writer` is the only handle to the connection's
/// write half; only the Serializer ever calls into it (Readers never
/// write, per §5).
pub struct Session {
    pub conn: ConnId,
    pub writer: OwnedWriteHalf,
    pub username: Option<String>,
    /// `None` until the first rate-limited check (`may_proceed`) passes
    /// for this session; see `ratelimit::may_proceed` for why that
    /// matters on a session's very first login/signup attempt.
    pub last_msg_time: Option<Instant>,
    pub strike: u32,
    pub banned: bool,
    pub ban_end: Instant,
    pub pass_retry: u32,
}

impl Session {
    pub fn new(conn: ConnId, writer: OwnedWriteHalf) -> Self {
        let now = Instant::now();
        Self {
            conn,
            writer,
            username: None,
            last_msg_time: None,
            strike: 0,
            banned: false,
            ban_end: now,
            pass_retry: 0,
        }
    }
}

/// Which of the three tables a connection identity currently occupies,
/// or none at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    None,
    Offline,
    Joined,
    Online,
}

/// The three disjoint session tables. Exclusively owned and mutated by
/// the Serializer task.
#[derive(Default)]
pub struct SessionTables {
    pub offline: HashMap<ConnId, Session>,
    pub joined: HashMap<ConnId, Session>,
    pub online: HashMap<ConnId, Session>,
}

impl SessionTables {
    pub fn new() -> Self {
        Self::default()
    }

    /// Where `conn` currently lives, by linear check across the three
    /// tables (each is small relative to a typical connection count, and
    /// this keeps the three maps genuinely independent rather than
    /// requiring a fourth index to stay in sync).
    pub fn phase_of(&self, conn: ConnId) -> Phase {
        if self.offline.contains_key(&conn) {
            Phase::Offline
        } else if self.joined.contains_key(&conn) {
            Phase::Joined
        } else if self.online.contains_key(&conn) {
            Phase::Online
        } else {
            Phase::None
        }
    }

    /// Remove `conn` from whichever table it is in, if any, and return
    /// the session record.
    pub fn remove(&mut self, conn: ConnId) -> Option<Session> {
        self.offline
            .remove(&conn)
            .or_else(|| self.joined.remove(&conn))
            .or_else(|| self.online.remove(&conn))
    }
}
