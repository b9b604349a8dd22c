//! oscbridge-core/src/bridge/mod.rs
//!
//! The bridge object: the state machine that ties the listener and sender
//! together. `open` brings both up (or neither), `close` tears both down,
//! `send` relays one command while running. All state lives behind one
//! RwLock; there are no globals.

mod listener;
mod sender;

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::channel::UiChannel;
use crate::config::BridgeConfig;
use crate::error::{BridgeError, Result};
use self::listener::OscListener;
use self::sender::OscSender;

/// Where the bridge is in its lifecycle. `Running` means the listen port is
/// bound, the receive task is live, and the sender has a configured peer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BridgeState {
    Stopped,
    Running,
}

struct RunningBridge {
    listener: OscListener,
    sender: OscSender,
}

impl RunningBridge {
    // A session whose receive task has halted on a socket failure no longer
    // counts as running, even before close() reaps it.
    fn is_live(&self) -> bool {
        !self.listener.is_finished()
    }

    async fn shutdown(self) {
        // Dropping the sender closes its socket; the listener needs an
        // explicit stop so its task is joined before the port is reused.
        self.listener.stop().await;
    }
}

/// One relay bridge between a UI and an OSC peer.
pub struct OscBridge {
    running: Arc<RwLock<Option<RunningBridge>>>,
    ui: UiChannel,
}

impl OscBridge {
    /// A bridge starts out `Stopped`; inbound lines will go to `ui` once it
    /// is opened.
    pub fn new(ui: UiChannel) -> Self {
        Self {
            running: Arc::new(RwLock::new(None)),
            ui,
        }
    }

    /// Bring the bridge up with the given settings. If it is already
    /// running, the old listener and sender are fully torn down first, so
    /// `open` doubles as "apply new settings". On any failure nothing stays
    /// half-started: the state is `Stopped` and the listen port is free.
    pub async fn open(&self, config: &BridgeConfig) -> Result<()> {
        config.validate()?;

        let mut guard = self.running.write().await;
        if let Some(old) = guard.take() {
            info!("Bridge already running; closing it before re-opening");
            old.shutdown().await;
        }

        let listener = OscListener::start(config.listen_port, self.ui.clone()).await?;
        let sender = match OscSender::configure(&config.peer_address, config.peer_port).await {
            Ok(s) => s,
            Err(e) => {
                // All-or-nothing: a dead sender must not leave a live listener.
                listener.stop().await;
                return Err(e);
            }
        };

        info!(
            "Bridge running => peer {}, listening on port {}",
            sender.peer(),
            config.listen_port
        );
        *guard = Some(RunningBridge { listener, sender });
        Ok(())
    }

    /// Tear the bridge down. Waits for the receive task to exit and for any
    /// in-flight `send` to finish, then releases both sockets. Closing a
    /// stopped bridge is a no-op.
    pub async fn close(&self) {
        let mut guard = self.running.write().await;
        match guard.take() {
            Some(running) => {
                running.shutdown().await;
                info!("Bridge stopped");
            }
            None => debug!("Bridge close requested while already stopped"),
        }
    }

    /// Relay one command line to the peer. Errors are per-message: a
    /// malformed command or failed transmit leaves the bridge running and
    /// the next command unaffected.
    pub async fn send(&self, raw: &str) -> Result<()> {
        let guard = self.running.read().await;
        match guard.as_ref() {
            Some(running) if running.is_live() => running.sender.send(raw).await,
            _ => Err(BridgeError::NotRunning),
        }
    }

    /// `Stopped` covers both a closed bridge and one whose receive task has
    /// halted; `close` still owns the cleanup either way.
    pub async fn state(&self) -> BridgeState {
        match self.running.read().await.as_ref() {
            Some(running) if running.is_live() => BridgeState::Running,
            _ => BridgeState::Stopped,
        }
    }
}
