//! Chat message record broadcast by the server.

use crate::wire_record;

/// Username the server signs its own messages with.
pub const SERVER_NAME: &str = "Server";

/// Greeting sent to every new connection.
pub const WELCOME_TEXT: &str = "Welcome! What is your username?";

/// Reply to a username that does not fit a text field.
pub const USERNAME_TOO_LONG: &str = "Username too long, pick a shorter one.";

/// Reply to a chat line that does not fit a text field.
pub const LINE_TOO_LONG: &str = "Message too long, it was not sent.";

wire_record! {
    /// One chat line, attributed to its sender.
    #[derive(Debug, Clone, Default, PartialEq, Eq)]
    pub struct ChatMessage {
        pub username: String,
        pub body: String,
    }
}

impl ChatMessage {
    pub fn new(username: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            body: body.into(),
        }
    }

    /// The greeting a session opens with.
    pub fn welcome() -> Self {
        Self::notice(WELCOME_TEXT)
    }

    /// A message signed by the server.
    pub fn notice(body: impl Into<String>) -> Self {
        Self::new(SERVER_NAME, body)
    }
}
