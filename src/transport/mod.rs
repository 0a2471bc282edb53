//! TCP chat transport built on the frame protocol.
//!
//! Clients send raw text frames; the server answers with encoded
//! [`ChatMessage`] records broadcast to every connected session.

mod client;
mod message;
mod server;

pub use client::{ChatClient, ClientConfig, DEFAULT_SERVER_ADDR};
pub use message::{ChatMessage, LINE_TOO_LONG, SERVER_NAME, USERNAME_TOO_LONG, WELCOME_TEXT};
pub use server::{
    handle_connection, Server, ServerConfig, DEFAULT_BIND_ADDR, DEFAULT_BROADCAST_CAPACITY,
};
