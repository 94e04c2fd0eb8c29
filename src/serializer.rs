//! The Serializer: the single task that owns every `Session` and is the
//! only writer of session state and of client sockets (§4.4/§5). It
//! drains the event queue one event at a time, so every transition
//! below runs to completion before the next event is even looked at —
//! this is what makes the whole session state machine lock-free.
//!
//! Table insertion always happens before the reply that announces the
//! new phase is written, so a crash mid-write can never leave a session
//! further along than its table says it is.

use crate::auth;
use crate::consts::PASS_RETRY_LIMIT;
use crate::db::Db;
use crate::event::{ConnId, Event};
use crate::ratelimit::{may_proceed, Gate};
use crate::replies;
use crate::session::{Phase, Session, SessionTables};
use crate::token::TokenStore;
use tokio::io::AsyncWriteExt;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::time::Instant;
use tracing::{debug, info, warn};

pub struct Serializer {
    tables: SessionTables,
    db: Db,
    token: TokenStore,
}

impl Serializer {
    pub fn new(db: Db, token: TokenStore) -> Self {
        Self {
            tables: SessionTables::new(),
            db,
            token,
        }
    }

    /// Drain the event queue until every Reader/Acceptor sender is
    /// dropped (the channel closes). There is no other exit.
    pub async fn run(mut self, mut events: UnboundedReceiver<Event>) {
        while let Some(event) = events.recv().await {
            debug!(event = ?event, "dequeued");
            self.handle(event).await;
        }
    }

    async fn handle(&mut self, event: Event) {
        match event {
            Event::Connect(conn, writer) => self.on_connect(conn, writer),
            Event::Quit(conn) => self.on_quit(conn),
            Event::Join(conn, token) => self.on_join(conn, &token).await,
            Event::Signup(conn, username, password) => {
                self.on_signup(conn, username, password).await
            }
            Event::Login(conn, username, password) => {
                self.on_login(conn, username, password).await
            }
            Event::Text(conn, body) => self.on_text(conn, body).await,
        }
    }

    /// A connection identity appearing twice (it should not, since
    /// `ConnId` is assigned fresh per accept, but the table API makes
    /// this safe either way) leaves the session in `offline` exactly
    /// once; the duplicate write half is simply dropped.
    fn on_connect(&mut self, conn: ConnId, writer: tokio::net::tcp::OwnedWriteHalf) {
        if self.tables.phase_of(conn) != Phase::None {
            warn!(conn, "duplicate Connect for already-known conn, ignoring");
            return;
        }
        self.tables.offline.insert(conn, Session::new(conn, writer));
        info!(conn, "connected");
    }

    fn on_quit(&mut self, conn: ConnId) {
        if let Some(session) = self.tables.remove(conn) {
            match &session.username {
                Some(username) => info!(conn, username, "disconnected"),
                None => info!(conn, "disconnected"),
            }
        }
    }

    /// `/join` is never rate-limited (§4.5 only names chat text, signup,
    /// and login); it only depends on the static server token.
    async fn on_join(&mut self, conn: ConnId, token: &str) {
        match self.tables.phase_of(conn) {
            Phase::None => {}
            Phase::Offline => {
                if self.token.verify(token) {
                    let session = self.tables.offline.remove(&conn).unwrap();
                    self.tables.joined.insert(conn, session);
                    let s = self.tables.joined.get_mut(&conn).unwrap();
                    write_reply(s, replies::AUTH_OK).await;
                } else {
                    let s = self.tables.offline.get_mut(&conn).unwrap();
                    write_reply(s, replies::AUTH_BAD_TOKEN).await;
                }
            }
            Phase::Joined => {
                let s = self.tables.joined.get_mut(&conn).unwrap();
                write_reply(s, replies::ALREADY_JOINED).await;
            }
            Phase::Online => {
                let s = self.tables.online.get_mut(&conn).unwrap();
                write_reply(s, replies::ALREADY_ONLINE).await;
            }
        }
    }

    async fn on_signup(&mut self, conn: ConnId, username: String, password: String) {
        match self.tables.phase_of(conn) {
            Phase::None => {}
            Phase::Offline => {
                let s = self.tables.offline.get_mut(&conn).unwrap();
                write_reply(s, replies::NEEDS_TOKEN).await;
            }
            Phase::Online => {
                let s = self.tables.online.get_mut(&conn).unwrap();
                write_reply(s, replies::USERNAME_TAKEN).await;
            }
            Phase::Joined => {
                let now = Instant::now();
                let gate = may_proceed(self.tables.joined.get_mut(&conn).unwrap(), now);
                match gate {
                    Gate::Silent => {}
                    Gate::Banned { remaining_secs } => {
                        let s = self.tables.joined.get_mut(&conn).unwrap();
                        write_reply(s, &replies::banned(remaining_secs)).await;
                    }
                    Gate::Allowed => {
                        self.tables.joined.get_mut(&conn).unwrap().last_msg_time = Some(now);
                        self.complete_signup(conn, username, password).await;
                    }
                }
            }
        }
    }

    async fn complete_signup(&mut self, conn: ConnId, username: String, password: String) {
        match self.db.exists(&username) {
            Ok(true) => {
                let s = self.tables.joined.get_mut(&conn).unwrap();
                write_reply(s, replies::USERNAME_TAKEN).await;
            }
            Ok(false) => match auth::hash_password(&password) {
                Ok(hash) => match self.db.insert(&username, &hash) {
                    Ok(()) => {
                        let mut session = self.tables.joined.remove(&conn).unwrap();
                        session.username = Some(username.clone());
                        session.pass_retry = 0;
                        self.tables.online.insert(conn, session);
                        let s = self.tables.online.get_mut(&conn).unwrap();
                        write_reply(s, &replies::welcome(&username)).await;
                        info!(conn, username, "signed up");
                    }
                    Err(e) => {
                        let s = self.tables.joined.get_mut(&conn).unwrap();
                        write_reply(s, &replies::database_error(&e.to_string())).await;
                    }
                },
                Err(e) => {
                    warn!(conn, error = %e, "password hashing failed");
                    let s = self.tables.joined.get_mut(&conn).unwrap();
                    write_reply(s, &replies::database_error("could not hash password")).await;
                }
            },
            Err(e) => {
                let s = self.tables.joined.get_mut(&conn).unwrap();
                write_reply(s, &replies::database_error(&e.to_string())).await;
            }
        }
    }

    async fn on_login(&mut self, conn: ConnId, username: String, password: String) {
        match self.tables.phase_of(conn) {
            Phase::None => {}
            Phase::Offline => {
                let s = self.tables.offline.get_mut(&conn).unwrap();
                write_reply(s, replies::NEEDS_TOKEN).await;
            }
            Phase::Online => {
                let s = self.tables.online.get_mut(&conn).unwrap();
                write_reply(s, replies::ALREADY_ONLINE).await;
            }
            Phase::Joined => {
                let now = Instant::now();
                let gate = may_proceed(self.tables.joined.get_mut(&conn).unwrap(), now);
                match gate {
                    Gate::Silent => {}
                    Gate::Banned { remaining_secs } => {
                        let s = self.tables.joined.get_mut(&conn).unwrap();
                        write_reply(s, &replies::banned(remaining_secs)).await;
                    }
                    Gate::Allowed => {
                        self.tables.joined.get_mut(&conn).unwrap().last_msg_time = Some(now);
                        self.complete_login(conn, username, password, now).await;
                    }
                }
            }
        }
    }

    /// The PassRetry counter is bumped and (if it trips the limit) the
    /// ban is applied on the very same mutable borrow of the session
    /// that is still sitting in `joined` — there is no separate
    /// remove-then-reinsert step where an update could be dropped
    /// between the increment and the ban transition (§9's write-back
    /// bug cannot recur here by construction).
    async fn complete_login(&mut self, conn: ConnId, username: String, password: String, now: Instant) {
        match self.db.get_record(&username) {
            Ok(None) => {
                let s = self.tables.joined.get_mut(&conn).unwrap();
                write_reply(s, replies::USERNAME_UNKNOWN).await;
            }
            Ok(Some(record)) => {
                if auth::verify_password(&password, &record.password_hash) {
                    let mut session = self.tables.joined.remove(&conn).unwrap();
                    session.username = Some(username.clone());
                    session.pass_retry = 0;
                    self.tables.online.insert(conn, session);
                    let s = self.tables.online.get_mut(&conn).unwrap();
                    write_reply(s, &replies::welcome(&username)).await;
                    info!(conn, username, "logged in");
                } else {
                    let s = self.tables.joined.get_mut(&conn).unwrap();
                    s.pass_retry += 1;
                    if s.pass_retry >= PASS_RETRY_LIMIT {
                        s.banned = true;
                        s.ban_end = now + crate::consts::BAN_TIMEOUT;
                        write_reply(s, replies::RETRIES_EXHAUSTED).await;
                    } else {
                        let chances_left = PASS_RETRY_LIMIT - s.pass_retry;
                        write_reply(s, &replies::wrong_password(chances_left)).await;
                    }
                }
            }
            Err(e) => {
                let s = self.tables.joined.get_mut(&conn).unwrap();
                write_reply(s, &replies::database_error(&e.to_string())).await;
            }
        }
    }

    async fn on_text(&mut self, conn: ConnId, body: String) {
        match self.tables.phase_of(conn) {
            Phase::None => {}
            Phase::Offline => {
                let s = self.tables.offline.get_mut(&conn).unwrap();
                write_reply(s, replies::NEEDS_LOGIN).await;
            }
            Phase::Joined => {
                let s = self.tables.joined.get_mut(&conn).unwrap();
                write_reply(s, replies::NEEDS_LOGIN).await;
            }
            Phase::Online => {
                let now = Instant::now();
                let gate = may_proceed(self.tables.online.get_mut(&conn).unwrap(), now);
                match gate {
                    Gate::Silent => {}
                    Gate::Banned { remaining_secs } => {
                        let s = self.tables.online.get_mut(&conn).unwrap();
                        write_reply(s, &replies::banned(remaining_secs)).await;
                    }
                    Gate::Allowed => {
                        self.tables.online.get_mut(&conn).unwrap().last_msg_time = Some(now);
                        let username = self
                            .tables
                            .online
                            .get(&conn)
                            .and_then(|s| s.username.clone())
                            .unwrap_or_default();
                        self.broadcast_text(&username, &body).await;
                    }
                }
            }
        }
    }

    /// Broadcast is sent to every online session, including the author
    /// (spec §4.7: the sender sees its own line echoed back like anyone
    /// else).
    async fn broadcast_text(&mut self, username: &str, body: &str) {
        let line = replies::chat_line(username, body);
        for (conn, session) in self.tables.online.iter_mut() {
            if let Err(e) = session.writer.write_all(line.as_bytes()).await {
                warn!(conn = *conn, error = %e, "broadcast write failed");
            }
        }
    }
}

/// Write a reply, logging (but not otherwise acting on) a failed write.
/// A dead socket is cleaned up later by the Reader's EOF/error posting
/// `Quit`, not synchronously here (§4.9).
async fn write_reply(session: &mut Session, text: &str) {
    if let Err(e) = session.writer.write_all(text.as_bytes()).await {
        warn!(conn = session.conn, error = %e, "reply write failed");
    }
}
