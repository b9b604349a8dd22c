//! oscbridge-core/src/config.rs
//!
//! Operator settings for the bridge, read from a TOML file before `open` is
//! called. The bridge itself never touches the filesystem; it takes a
//! validated [`BridgeConfig`] value.

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::{BridgeError, Result};

/// The three values the bridge needs: where the peer is, and which local
/// port to listen on.
#[derive(Debug, Clone, Deserialize)]
pub struct BridgeConfig {
    /// Hostname or IP of the OSC peer.
    pub peer_address: String,
    /// UDP port the peer listens on.
    pub peer_port: u16,
    /// Local UDP port for inbound OSC.
    pub listen_port: u16,
}

impl BridgeConfig {
    /// Read and validate a settings file. Any failure (missing file, bad
    /// TOML, missing key, out-of-range value) is a `Config` error; the
    /// bridge never starts on partial settings.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            BridgeError::Config(format!("Cannot read settings file {}: {e}", path.display()))
        })?;
        let config: BridgeConfig = toml::from_str(&content).map_err(|e| {
            BridgeError::Config(format!("Cannot parse settings file {}: {e}", path.display()))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that can never name a usable endpoint.
    pub fn validate(&self) -> Result<()> {
        if self.peer_address.trim().is_empty() {
            return Err(BridgeError::Config("peer_address is empty".to_string()));
        }
        if self.peer_port == 0 {
            return Err(BridgeError::Config(
                "peer_port must be between 1 and 65535".to_string(),
            ));
        }
        if self.listen_port == 0 {
            return Err(BridgeError::Config(
                "listen_port must be between 1 and 65535".to_string(),
            ));
        }
        Ok(())
    }
}
