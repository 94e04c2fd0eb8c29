//! End-to-end scenarios 1, 3, and 6.

mod common;

use common::{connect, join, read_reply, send_line, start_server};
use std::time::Duration;

#[tokio::test]
async fn happy_path_signup_and_chat_broadcasts_to_both_peers() {
    let server = start_server().await;

    let mut a = connect(&server).await;
    assert_eq!(join(&mut a, &server.token).await, "Authentication successfull.");
    send_line(&mut a, "/signup alice pw1").await;
    assert_eq!(read_reply(&mut a).await, "Welcome alice");

    let mut b = connect(&server).await;
    assert_eq!(join(&mut b, &server.token).await, "Authentication successfull.");
    send_line(&mut b, "/signup bob pw2").await;
    assert_eq!(read_reply(&mut b).await, "Welcome bob");

    // alice's last_msg_time was just set by the signup itself; wait past
    // COOLDOWN_SEC so this chat line isn't its own sub-cooldown strike.
    tokio::time::sleep(Duration::from_millis(1100)).await;

    send_line(&mut a, "hello").await;
    assert_eq!(read_reply(&mut a).await, "alice: hello\n");
    assert_eq!(read_reply(&mut b).await, "alice: hello\n");
}

#[tokio::test]
async fn duplicate_signup_keeps_the_new_session_in_joined() {
    let server = start_server().await;

    let mut a = connect(&server).await;
    join(&mut a, &server.token).await;
    send_line(&mut a, "/signup alice pw1").await;
    assert_eq!(read_reply(&mut a).await, "Welcome alice");

    let mut c = connect(&server).await;
    join(&mut c, &server.token).await;
    send_line(&mut c, "/signup alice other").await;
    assert_eq!(read_reply(&mut c).await, "This username already exists.");

    // Still only joined, not online: a second /join attempt from the same
    // session is rejected the "already joined" way, not "already online".
    send_line(&mut c, &format!("/join {}", server.token)).await;
    assert_eq!(
        read_reply(&mut c).await,
        "You are already joined the server.\nTry logging in or signing up."
    );
}

#[tokio::test]
async fn chat_before_login_is_rejected() {
    let server = start_server().await;

    let mut c = connect(&server).await;
    join(&mut c, &server.token).await;
    send_line(&mut c, "hi").await;
    assert_eq!(
        read_reply(&mut c).await,
        "You must be logged in to send messages.\n"
    );
}
