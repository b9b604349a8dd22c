//! oscbridge-core/src/error.rs
//!
//! Error taxonomy for the relay bridge. Everything here except
//! [`BridgeError::Bind`] and a failed `open` is non-fatal to the bridge as a
//! whole: a bad command or a failed transmit is reported to the caller and
//! the bridge keeps running.

use std::net::SocketAddr;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("Settings error: {0}")]
    Config(String),

    #[error("Invalid peer endpoint: {0}")]
    InvalidEndpoint(String),

    #[error("Failed to bind UDP port {port}: {source}")]
    Bind {
        port: u16,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed command: {0}")]
    MalformedCommand(String),

    #[error("Transmit to {peer} failed: {source}")]
    Transmit {
        peer: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("Bridge is not running")]
    NotRunning,
}

pub type Result<T> = std::result::Result<T, BridgeError>;
