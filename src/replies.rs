//! Canonical server reply strings, reproduced byte-for-byte from spec §6.
//! Clients may depend on these exact strings (and the preserved typos),
//! so none of them are touched up.

pub const AUTH_OK: &str = "Authentication successfull.";
pub const AUTH_BAD_TOKEN: &str = "Provided token is not valid.";
pub const ALREADY_JOINED: &str =
    "You are already joined the server.\nTry logging in or signing up.";
pub const ALREADY_ONLINE: &str = "You are currently logged in.";
pub const USERNAME_TAKEN: &str = "This username already exists.";
pub const USERNAME_UNKNOWN: &str =
    "Username does not exist. You can create new user using /signup command.";
pub const NEEDS_TOKEN: &str = "You should provide the token first with the /join command.\n";
pub const NEEDS_LOGIN: &str = "You must be logged in to send messages.\n";

pub fn welcome(username: &str) -> String {
    format!("Welcome {username}")
}

pub fn wrong_password(chances_left: u32) -> String {
    format!(
        "Incorrect password. You have {chances_left} chances before getting banned for 3 minuetes."
    )
}

pub const RETRIES_EXHAUSTED: &str = "Reached the limit of retries. Youre banned for 180 seconds.";

pub fn banned(remaining_secs: i64) -> String {
    format!("You're banned. Try again in {remaining_secs} seconds.\n")
}

pub fn database_error(detail: &str) -> String {
    format!("Database error: {detail}")
}

pub fn chat_line(username: &str, body: &str) -> String {
    format!("{username}: {body}\n")
}
