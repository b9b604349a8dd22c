//! oscbridge-core/src/lib.rs
//!
//! Core of the OSC relay bridge: a UDP listener that renders inbound OSC
//! as log lines, a sender that turns typed commands into OSC messages, and
//! the lifecycle object that owns both. Front ends attach through
//! [`UiChannel`]; nothing in here knows what the UI looks like.

pub mod bridge;
pub mod channel;
pub mod codec;
pub mod config;
pub mod error;

pub use bridge::{BridgeState, OscBridge};
pub use channel::{UiChannel, UiMessage};
pub use config::BridgeConfig;
pub use error::{BridgeError, Result};
