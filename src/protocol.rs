//! Wire protocol: line framing is done by the reader; this module turns
//! one already-framed line into either a recognized command or chat text.
//!
//! A command line begins with `/`, followed by ASCII tokens separated by
//! single spaces. Anything else is chat text. Trailing `\r`/`\n` must
//! already be stripped by the caller.

/// One parsed line, before it is turned into a typed `Event` (that step
/// needs the connection identity, which this module doesn't know about).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Line {
    Join(String),
    Signup(String, String),
    Login(String, String),
    Exit,
    /// Recognized leading token, wrong argument count, or unrecognized
    /// leading token: dropped silently per spec, never dispatched.
    Unrecognized,
    Chat(String),
}

/// Strip a trailing `\r\n` or `\n`.
pub fn strip_newline(raw: &str) -> &str {
    raw.strip_suffix('\n')
        .map(|s| s.strip_suffix('\r').unwrap_or(s))
        .unwrap_or(raw)
}

pub fn parse_line(raw: &str) -> Line {
    let line = strip_newline(raw);
    if !line.starts_with('/') {
        return Line::Chat(line.to_string());
    }
    let mut tokens = line.split(' ').filter(|t| !t.is_empty());
    let Some(command) = tokens.next() else {
        return Line::Unrecognized;
    };
    let args: Vec<&str> = tokens.collect();
    match command {
        "/join" => match args.as_slice() {
            [token] => Line::Join((*token).to_string()),
            _ => Line::Unrecognized,
        },
        "/signup" => match args.as_slice() {
            [user, pass] => Line::Signup((*user).to_string(), (*pass).to_string()),
            _ => Line::Unrecognized,
        },
        "/login" => match args.as_slice() {
            [user, pass] => Line::Login((*user).to_string(), (*pass).to_string()),
            _ => Line::Unrecognized,
        },
        "/exit" => Line::Exit,
        _ => Line::Unrecognized,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chat_is_any_line_not_starting_with_slash() {
        assert_eq!(parse_line("hello\n"), Line::Chat("hello".to_string()));
        assert_eq!(parse_line("hello\r\n"), Line::Chat("hello".to_string()));
        assert_eq!(parse_line(""), Line::Chat("".to_string()));
    }

    #[test]
    fn join_parses_single_arg() {
        assert_eq!(
            parse_line("/join deadbeefdeadbeefdeadbeefdead\n"),
            Line::Join("deadbeefdeadbeefdeadbeefdead".to_string())
        );
    }

    #[test]
    fn join_wrong_arity_is_unrecognized() {
        assert_eq!(parse_line("/join\n"), Line::Unrecognized);
        assert_eq!(parse_line("/join a b\n"), Line::Unrecognized);
    }

    #[test]
    fn signup_and_login_parse_two_args() {
        assert_eq!(
            parse_line("/signup alice pw1\n"),
            Line::Signup("alice".to_string(), "pw1".to_string())
        );
        assert_eq!(
            parse_line("/login alice pw1\n"),
            Line::Login("alice".to_string(), "pw1".to_string())
        );
    }

    #[test]
    fn exit_takes_no_args() {
        assert_eq!(parse_line("/exit\n"), Line::Exit);
    }

    #[test]
    fn unknown_command_is_dropped_silently() {
        assert_eq!(parse_line("/nonsense foo\n"), Line::Unrecognized);
    }

    #[test]
    fn chat_beginning_with_literal_slash_is_only_ever_a_command_or_unrecognized() {
        // A lone "/" with no following token is unrecognized, not chat.
        assert_eq!(parse_line("/\n"), Line::Unrecognized);
    }
}
