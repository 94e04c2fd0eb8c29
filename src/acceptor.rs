//! Acceptor: binds the listener, spawns a Reader per accepted
//! connection, and posts the one `Connect` event for it (§9 resolves
//! the reference implementation's acceptor/reader duplicate-`Connect`
//! inconsistency by having only the Acceptor post it).

use crate::event::{ConnId, Event};
use crate::reader;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::net::TcpListener;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{info, warn};

/// Runs until the listener itself fails (treated as fatal by the
/// caller); per-connection accept errors are logged and do not stop the
/// loop (§4.10).
pub async fn run(listener: TcpListener, events: UnboundedSender<Event>) {
    let next_conn = AtomicU64::new(1);
    loop {
        match listener.accept().await {
            Ok((stream, peer)) => {
                let conn: ConnId = next_conn.fetch_add(1, Ordering::Relaxed);
                info!(conn, %peer, "accepted connection");
                let (read_half, write_half) = stream.into_split();
                if events.send(Event::Connect(conn, write_half)).is_err() {
                    warn!(conn, "serializer gone, dropping new connection");
                    continue;
                }
                tokio::spawn(reader::run(conn, read_half, events.clone()));
            }
            Err(e) => {
                warn!(error = %e, "accept error");
            }
        }
    }
}
