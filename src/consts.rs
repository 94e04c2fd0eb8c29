//! Compile-time tunables, named after the spec's glossary of constants.

use std::time::Duration;

/// Minimum interval between chat/signup/login attempts before a strike.
pub const COOLDOWN_SEC: u64 = 1;
pub const COOLDOWN: Duration = Duration::from_secs(COOLDOWN_SEC);

/// Strikes before a session is temporarily banned.
pub const BAN_LIMIT: u32 = 5;

/// Duration of a temporary ban, once triggered.
pub const BAN_TIMEOUT_SEC: u64 = 180;
pub const BAN_TIMEOUT: Duration = Duration::from_secs(BAN_TIMEOUT_SEC);

/// Wrong passwords tolerated before a login-lockout ban.
pub const PASS_RETRY_LIMIT: u32 = 3;

/// Minimum per-read buffer size for a Connection Reader.
pub const READ_BUF: usize = 512;

/// Default TCP port.
pub const PORT: u16 = 6969;
