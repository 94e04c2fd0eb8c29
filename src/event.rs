//! Typed events carried from Readers to the Serializer over the event
//! queue. `ConnId` is an opaque, process-local routing key: it is never
//! shown to users nor persisted (invariant I4).

use tokio::net::tcp::OwnedWriteHalf;

/// Connection identity: a server-assigned sequence number, not the peer
/// address. Using a counter instead of `SocketAddr` means two connections
/// from behind the same NAT/proxy never collide, and no part of the
/// session state machine depends on the shape of a network address.
pub type ConnId = u64;

pub enum Event {
    /// Carries the connection's write half: the Acceptor splits the
    /// accepted `TcpStream` and hands the write half to the Serializer
    /// here so that, from this point on, only the Serializer ever writes
    /// to the socket (§5).
    Connect(ConnId, OwnedWriteHalf),
    Join(ConnId, String),
    Signup(ConnId, String, String),
    Login(ConnId, String, String),
    Text(ConnId, String),
    Quit(ConnId),
}

impl Event {
    pub fn conn(&self) -> ConnId {
        match self {
            Event::Connect(c, _)
            | Event::Join(c, _)
            | Event::Signup(c, _, _)
            | Event::Login(c, _, _)
            | Event::Text(c, _)
            | Event::Quit(c) => *c,
        }
    }
}

impl std::fmt::Debug for Event {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Event::Connect(c, _) => write!(f, "Connect({c})"),
            Event::Join(c, tok) => write!(f, "Join({c}, len={})", tok.len()),
            Event::Signup(c, u, _) => write!(f, "Signup({c}, {u})"),
            Event::Login(c, u, _) => write!(f, "Login({c}, {u})"),
            Event::Text(c, t) => write!(f, "Text({c}, len={})", t.len()),
            Event::Quit(c) => write!(f, "Quit({c})"),
        }
    }
}
