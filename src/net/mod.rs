//! Networking
//!
//! - `protocol`: line format for the handshake and gameplay commands
//! - `relay`: dumb rebroadcast server; never interprets gameplay
//! - `client`: connects a local stage to a relay

pub mod client;
pub mod protocol;
pub mod relay;

pub use client::{CommandSender, Connection, connect, spawn_receiver};
pub use relay::Relay;
