//! Rate limiter / ban engine (`may_proceed`), applied uniformly to chat
//! text, signup attempts, and login attempts.
//!
//! `may_proceed` both reads and mutates the session in place; callers
//! must re-store the session into its table afterwards so strikes and
//! bans persist across events (§4.5 — a concrete bug in the original
//! source was forgetting this write-back on the failure path).

use crate::consts::{BAN_LIMIT, BAN_TIMEOUT};
use crate::session::Session;
use std::time::Duration;
use tokio::time::Instant;

/// Outcome of a rate-limit check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gate {
    /// Caller may proceed; caller is responsible for updating
    /// `last_msg_time` before re-storing the session.
    Allowed,
    /// Sub-cooldown strike accumulated; no reply is sent (silent strike
    /// accumulation, possibly the strike that just set `banned = true`).
    Silent,
    /// Already banned and the ban has not yet expired.
    Banned { remaining_secs: i64 },
}

/// `true` if `delta` falls inside the cooldown window (a sub-cooldown
/// repeat), i.e. the previous check was too recent to allow another.
fn within_cooldown(delta: Duration) -> bool {
    delta <= crate::consts::COOLDOWN
}

/// Evaluate and update ban/strike state for `session` at time `now`.
///
/// `last_msg_time` starts as `None` (a session that has never had a
/// rate-limited event checked is never flagged on its first one — this
/// is why `/join`, which is not rate-limited at all, and a session's
/// very first login/signup attempt always go through). Once any check
/// passes, the caller records `now` into `last_msg_time`; from then on
/// a repeat within `COOLDOWN` is a strike, including the chat message
/// sent immediately after a successful login, whose `last_msg_time` was
/// just set to the login's own timestamp.
pub fn may_proceed(session: &mut Session, now: Instant) -> Gate {
    if !session.banned {
        let flagged = match session.last_msg_time {
            None => false,
            Some(last) => within_cooldown(now.saturating_duration_since(last)),
        };
        if flagged {
            session.strike += 1;
            if session.strike >= BAN_LIMIT {
                session.banned = true;
                session.ban_end = now + BAN_TIMEOUT;
            }
            return Gate::Silent;
        }
        return Gate::Allowed;
    }

    if session.ban_end > now {
        let remaining = session
            .ban_end
            .saturating_duration_since(now)
            .as_secs_f64()
            .round() as i64;
        return Gate::Banned {
            remaining_secs: remaining.max(0),
        };
    }

    session.strike = 0;
    session.banned = false;
    Gate::Allowed
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::{TcpListener, TcpStream};

    async fn dummy_session() -> Session {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (client, (accepted, _)) =
            tokio::try_join!(TcpStream::connect(addr), async { listener.accept().await })
                .unwrap();
        drop(client);
        let (_r, w) = accepted.into_split();
        Session::new(1, w)
    }

    #[tokio::test]
    async fn first_call_with_no_baseline_is_allowed() {
        // /join never calls may_proceed, and a session's very first
        // rate-limited event (signup/login) must not be flagged just
        // because it happens quickly after connecting.
        let mut s = dummy_session().await;
        assert_eq!(s.last_msg_time, None);
        let now = Instant::now();
        assert_eq!(may_proceed(&mut s, now), Gate::Allowed);
        assert_eq!(s.strike, 0);
    }

    #[tokio::test]
    async fn immediate_repeat_after_baseline_is_sub_cooldown() {
        // Matches scenario 5: last_msg_time is set at login time, so a
        // message sent immediately after is itself within the cooldown
        // window.
        let mut s = dummy_session().await;
        let t0 = Instant::now();
        s.last_msg_time = Some(t0);
        assert_eq!(may_proceed(&mut s, t0), Gate::Silent);
        assert_eq!(s.strike, 1);
    }

    #[tokio::test]
    async fn five_rapid_calls_ban_on_the_fifth_silently() {
        let mut s = dummy_session().await;
        let t0 = Instant::now();
        s.last_msg_time = Some(t0);
        for i in 1..=4 {
            assert_eq!(may_proceed(&mut s, t0), Gate::Silent);
            assert_eq!(s.strike, i);
            assert!(!s.banned);
        }
        assert_eq!(may_proceed(&mut s, t0), Gate::Silent);
        assert_eq!(s.strike, 5);
        assert!(s.banned, "5th sub-cooldown attempt must flip banned");
    }

    #[tokio::test]
    async fn sixth_call_while_banned_reports_remaining_time() {
        let mut s = dummy_session().await;
        let t0 = Instant::now();
        s.last_msg_time = Some(t0);
        for _ in 1..=5 {
            may_proceed(&mut s, t0);
        }
        assert!(s.banned);
        let still_within_ban = t0 + Duration::from_secs(10);
        match may_proceed(&mut s, still_within_ban) {
            Gate::Banned { remaining_secs } => assert!(remaining_secs > 0),
            other => panic!("expected Banned, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn ban_clears_once_ban_end_has_passed() {
        let mut s = dummy_session().await;
        let t0 = Instant::now();
        s.last_msg_time = Some(t0);
        for _ in 1..=5 {
            may_proceed(&mut s, t0);
        }
        assert!(s.banned);
        let after_ban = t0 + crate::consts::BAN_TIMEOUT + Duration::from_secs(1);
        assert_eq!(may_proceed(&mut s, after_ban), Gate::Allowed);
        assert!(!s.banned);
        assert_eq!(s.strike, 0);
    }

    #[tokio::test]
    async fn delta_above_cooldown_is_allowed_and_does_not_touch_strike() {
        let mut s = dummy_session().await;
        let t0 = Instant::now();
        s.last_msg_time = Some(t0);
        let later = t0 + Duration::from_secs(2);
        assert_eq!(may_proceed(&mut s, later), Gate::Allowed);
        assert_eq!(s.strike, 0);
    }
}
