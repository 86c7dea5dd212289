//! Parsing of user input lines.

use client_blockchain_core::BlockNumber;

/// What a line of user input asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    /// Plain text: publish a post
    Post(String),
    /// `/reply <announcement-uri> <text>`
    Reply { in_reply_to: String, text: String },
    /// `/profile <name>`
    Profile(String),
    /// `/connections`
    Connections,
    /// `/count`
    PostCount,
    /// `/resync [block]`
    Resync(Option<u64>),
    /// `/quit`
    Quit,
    Empty,
    Unknown(String),
}

pub fn parse_line(line: &str) -> Input {
    let line = line.trim();
    if line.is_empty() {
        return Input::Empty;
    }
    let Some(command) = line.strip_prefix('/') else {
        return Input::Post(line.to_string());
    };

    let (name, rest) = command
        .split_once(char::is_whitespace)
        .map(|(name, rest)| (name, rest.trim()))
        .unwrap_or((command, ""));

    match name {
        "reply" => {
            let (target, text) = rest
                .split_once(char::is_whitespace)
                .map(|(target, text)| (target, text.trim()))
                .unwrap_or((rest, ""));
            Input::Reply {
                in_reply_to: target.to_string(),
                text: text.to_string(),
            }
        }
        "profile" if !rest.is_empty() => Input::Profile(rest.to_string()),
        "connections" => Input::Connections,
        "count" => Input::PostCount,
        "resync" if rest.is_empty() => Input::Resync(None),
        "resync" => match rest.parse() {
            Ok(block) => Input::Resync(Some(block)),
            Err(_) => Input::Unknown(line.to_string()),
        },
        "quit" | "exit" => Input::Quit,
        _ => Input::Unknown(line.to_string()),
    }
}

/// Start block for `/resync`: the requested block, else the configured one.
pub fn resync_block(requested: Option<BlockNumber>, configured: BlockNumber) -> BlockNumber {
    requested.unwrap_or(configured)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_is_a_post() {
        assert_eq!(parse_line("  hello world "), Input::Post("hello world".into()));
        assert_eq!(parse_line("   "), Input::Empty);
    }

    #[test]
    fn reply_splits_target_and_text() {
        assert_eq!(
            parse_line("/reply dsnp://0xAA/0x01 nice one"),
            Input::Reply {
                in_reply_to: "dsnp://0xAA/0x01".into(),
                text: "nice one".into(),
            }
        );
        assert_eq!(
            parse_line("/reply"),
            Input::Reply {
                in_reply_to: String::new(),
                text: String::new(),
            }
        );
    }

    #[test]
    fn commands() {
        assert_eq!(parse_line("/profile Ann Lee"), Input::Profile("Ann Lee".into()));
        assert_eq!(parse_line("/resync"), Input::Resync(None));
        assert_eq!(parse_line("/resync 42"), Input::Resync(Some(42)));
        assert_eq!(parse_line("/count"), Input::PostCount);
        assert_eq!(parse_line("/quit"), Input::Quit);
        assert!(matches!(parse_line("/profile"), Input::Unknown(_)));
        assert!(matches!(parse_line("/resync soon"), Input::Unknown(_)));
    }

    #[test]
    fn bare_resync_uses_configured_block() {
        let Input::Resync(requested) = parse_line("/resync") else {
            panic!("expected resync");
        };
        assert_eq!(resync_block(requested, 12), 12);
        assert_eq!(resync_block(Some(42), 12), 42);
    }
}
