//! Shared harness for the end-to-end tests: starts a real `chatd` server
//! in-process against an ephemeral port, the same shape as the teacher's
//! `run_raw_ws_server_once` + `join_server_task` helpers.

use chatd::{Db, TokenStore};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

pub struct TestServer {
    pub addr: std::net::SocketAddr,
    pub token: String,
    _token_dir: tempfile::TempDir,
}

/// Bind on `127.0.0.1:0`, spawn the acceptor and serializer tasks against
/// an in-memory user store and a freshly generated token, and return the
/// bound address plus the token a client needs to `/join` with.
pub async fn start_server() -> TestServer {
    let token_dir = tempfile::tempdir().unwrap();
    let token_store = TokenStore::initialize(&token_dir.path().join("TOKEN")).unwrap();
    let token = token_store.value().to_string();

    let db = Db::open_in_memory().unwrap();

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let (events_tx, events_rx) = tokio::sync::mpsc::unbounded_channel();
    let serializer = chatd::serializer::Serializer::new(db, token_store);
    tokio::spawn(serializer.run(events_rx));
    tokio::spawn(chatd::acceptor::run(listener, events_tx));

    TestServer {
        addr,
        token,
        _token_dir: token_dir,
    }
}

pub async fn connect(server: &TestServer) -> TcpStream {
    TcpStream::connect(server.addr).await.unwrap()
}

pub async fn send_line(stream: &mut TcpStream, line: &str) {
    stream.write_all(line.as_bytes()).await.unwrap();
    stream.write_all(b"\n").await.unwrap();
}

/// Read whatever the server has written since the last read, waiting up
/// to 500ms for at least one byte. Each server reply is written with a
/// single `write_all`, so one client-side `read` reliably captures one
/// reply on an otherwise quiet loopback connection.
pub async fn read_reply(stream: &mut TcpStream) -> String {
    let mut buf = vec![0u8; 4096];
    let n = tokio::time::timeout(Duration::from_millis(500), stream.read(&mut buf))
        .await
        .expect("timed out waiting for a reply")
        .expect("read error");
    String::from_utf8_lossy(&buf[..n]).into_owned()
}

pub async fn join(stream: &mut TcpStream, token: &str) -> String {
    send_line(stream, &format!("/join {token}")).await;
    read_reply(stream).await
}

/// `true` if no bytes arrive within `dur` — used to confirm a silent
/// rate-limit strike produced no reply at all.
pub async fn no_reply_within(stream: &mut TcpStream, dur: Duration) -> bool {
    let mut buf = [0u8; 64];
    tokio::time::timeout(dur, stream.read(&mut buf))
        .await
        .is_err()
}
