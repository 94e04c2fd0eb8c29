//! Connection Reader: one task per accepted connection. Frames the byte
//! stream on `\n`, turns each complete line into a typed `Event`, and
//! posts it to the event queue. Holds no session state of its own
//! beyond its read buffer and never writes to the connection (§5).

use crate::consts::READ_BUF;
use crate::event::{ConnId, Event};
use crate::protocol::{parse_line, Line};
use tokio::io::AsyncReadExt;
use tokio::net::tcp::OwnedReadHalf;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, warn};

/// Read from `read_half` until EOF or error, dispatching one `Event` per
/// complete `\n`-terminated line. Partial reads are reassembled across
/// calls; a leftover tail without a trailing newline is kept for the
/// next read, so a slow or chunked sender is never misframed.
pub async fn run(conn: ConnId, mut read_half: OwnedReadHalf, events: UnboundedSender<Event>) {
    let mut buf = vec![0u8; READ_BUF];
    let mut pending: Vec<u8> = Vec::new();

    loop {
        let n = match read_half.read(&mut buf).await {
            Ok(0) => {
                debug!(conn, "connection reached EOF");
                break;
            }
            Ok(n) => n,
            Err(e) => {
                warn!(conn, error = %e, "read error");
                break;
            }
        };

        pending.extend_from_slice(&buf[..n]);

        while let Some(newline_pos) = pending.iter().position(|&b| b == b'\n') {
            let line_bytes: Vec<u8> = pending.drain(..=newline_pos).collect();
            dispatch_line(conn, &line_bytes, &events);
        }
    }

    let _ = events.send(Event::Quit(conn));
}

fn dispatch_line(conn: ConnId, line_bytes: &[u8], events: &UnboundedSender<Event>) {
    let Ok(line) = std::str::from_utf8(line_bytes) else {
        warn!(conn, "dropped non-UTF-8 line");
        return;
    };
    let event = match parse_line(line) {
        Line::Join(token) => Some(Event::Join(conn, token)),
        Line::Signup(user, pass) => Some(Event::Signup(conn, user, pass)),
        Line::Login(user, pass) => Some(Event::Login(conn, user, pass)),
        Line::Chat(body) => Some(Event::Text(conn, body)),
        // /exit is a client-side hint; the server relies on the
        // subsequent FIN (read EOF) to post Quit. Unrecognized commands
        // are dropped silently per spec §4.1/§7.
        Line::Exit | Line::Unrecognized => None,
    };
    if let Some(event) = event {
        let _ = events.send(event);
    }
}
