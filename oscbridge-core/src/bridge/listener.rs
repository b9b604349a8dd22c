//! oscbridge-core/src/bridge/listener.rs
//!
//! Inbound half of the bridge: binds the listen port, then a spawned task
//! turns every datagram into a log line for the UI queue. The task runs
//! until its watch signal fires or the socket goes bad.

use std::io;
use std::net::SocketAddr;

use tokio::net::UdpSocket;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::channel::UiChannel;
use crate::codec::{self, Decoded};
use crate::error::{BridgeError, Result};

/// Handle to a running receive task. Owns the stop signal and the join
/// handle; dropping it without `stop` leaves the task to notice the closed
/// watch channel and exit on its own.
pub(crate) struct OscListener {
    local_addr: SocketAddr,
    stop_tx: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl OscListener {
    /// Bind `0.0.0.0:listen_port` and spawn the receive loop. The port stays
    /// held until `stop`.
    pub(crate) async fn start(listen_port: u16, ui: UiChannel) -> Result<Self> {
        let socket = UdpSocket::bind(("0.0.0.0", listen_port))
            .await
            .map_err(|e| BridgeError::Bind {
                port: listen_port,
                source: e,
            })?;
        let local_addr = socket.local_addr().map_err(|e| BridgeError::Bind {
            port: listen_port,
            source: e,
        })?;
        info!("OSC listener bound on {local_addr}");

        let (stop_tx, stop_rx) = watch::channel(false);
        let task = tokio::spawn(receive_loop(socket, stop_rx, ui));

        Ok(Self {
            local_addr,
            stop_tx,
            task,
        })
    }

    /// Signal the receive task and wait for it to finish. The socket is
    /// closed (and the port free again) once this returns.
    pub(crate) async fn stop(self) {
        let _ = self.stop_tx.send(true);
        if let Err(e) = self.task.await {
            error!("Listener task ended abnormally => {e}");
        }
        debug!("OSC listener on {} released", self.local_addr);
    }

    /// True once the receive task has ended, whether stopped or halted by a
    /// socket failure.
    pub(crate) fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

async fn receive_loop(socket: UdpSocket, mut stop_rx: watch::Receiver<bool>, ui: UiChannel) {
    let mut buf = vec![0u8; rosc::decoder::MTU];
    loop {
        tokio::select! {
            res = socket.recv_from(&mut buf) => {
                match res {
                    Ok((size, source)) => {
                        match codec::decode_datagram(&buf[..size], source) {
                            Decoded::Message(line) => {
                                debug!("OSC in => {line}");
                                ui.push_log(line);
                            }
                            Decoded::Warning(line) => {
                                warn!("OSC in => {line}");
                                ui.push_log(line);
                            }
                        }
                    }
                    Err(e) if is_transient(&e) => {
                        error!("Error receiving OSC datagram (continuing) => {e}");
                    }
                    Err(e) => {
                        error!("Receive failed, listener halting => {e}");
                        ui.push_log(format!("receive failed: {e}; listener halted"));
                        break;
                    }
                }
            }
            res = stop_rx.changed() => {
                if res.is_err() || *stop_rx.borrow() {
                    break;
                }
            }
        }
    }
}

// Per-datagram noise (e.g. an ICMP port-unreachable surfacing as a reset on
// some platforms) must not kill the listener.
fn is_transient(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::Interrupted | io::ErrorKind::WouldBlock | io::ErrorKind::ConnectionReset
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::{timeout, Duration};

    #[tokio::test]
    async fn finished_task_shows_through_is_finished() {
        let (ui, _rx) = UiChannel::new(Some(4));
        let mut listener = OscListener::start(0, ui).await.unwrap();
        assert!(!listener.is_finished());

        // Swap the stop sender out so the original drops; the receive task
        // notices the closed watch channel and ends without a stop() call.
        let (replacement, _) = watch::channel(false);
        drop(std::mem::replace(&mut listener.stop_tx, replacement));

        timeout(Duration::from_secs(1), &mut listener.task)
            .await
            .expect("receive task should end on its own")
            .unwrap();
        assert!(listener.is_finished());
    }
}
