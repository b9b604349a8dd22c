//! oscbridge-shell/src/console.rs
//!
//! Console front end: stdout is the log pane, stdin lines are operator
//! commands. Everything flows through the UI queue so the bridge never knows
//! which front end it is talking to.

use std::path::Path;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::sync::{mpsc, watch};
use tracing::{error, info};

use oscbridge_core::{BridgeConfig, OscBridge, UiChannel, UiMessage};

/// Echo the active settings into the log pane so every session starts with a
/// record of where traffic goes.
pub fn push_settings_banner(ui: &UiChannel, path: &Path, config: &BridgeConfig) {
    ui.push_log("---------- settings ----------");
    ui.push_log(format!("file: {}", path.display()));
    ui.push_log(format!("peer_address: {}", config.peer_address));
    ui.push_log(format!("peer_port: {}", config.peer_port));
    ui.push_log(format!("listen_port: {}", config.listen_port));
    ui.push_log("------------------------------");
}

/// Drive the console until Ctrl-C or stdin EOF. Inbound lines print; outbound
/// commands go to the bridge, with per-command failures shown in the pane
/// rather than ending the session. EOF counts as closing the window: queued
/// commands are flushed, then the caller is expected to stop the bridge.
pub async fn run(bridge: &OscBridge, ui: UiChannel, mut ui_rx: mpsc::Receiver<UiMessage>) {
    let (eof_tx, mut eof_rx) = watch::channel(false);
    let stdin_task = tokio::spawn(read_commands(
        BufReader::new(tokio::io::stdin()),
        ui,
        eof_tx,
    ));

    loop {
        tokio::select! {
            maybe_msg = ui_rx.recv() => {
                match maybe_msg {
                    Some(msg) => dispatch(bridge, msg).await,
                    None => {
                        info!("UI queue closed; leaving console loop");
                        break;
                    }
                }
            }
            res = eof_rx.changed() => {
                if res.is_err() || *eof_rx.borrow() {
                    // Commands already queued still count; flush them before
                    // the session ends.
                    while let Ok(msg) = ui_rx.try_recv() {
                        dispatch(bridge, msg).await;
                    }
                    info!("stdin closed; shutting down...");
                    break;
                }
            }
            res = tokio::signal::ctrl_c() => {
                if let Err(e) = res {
                    error!("Failed to listen for Ctrl-C => {e}");
                }
                info!("Ctrl-C detected; shutting down...");
                break;
            }
        }
    }

    stdin_task.abort();
}

async fn dispatch(bridge: &OscBridge, msg: UiMessage) {
    match msg {
        UiMessage::Inbound(line) => println!("{line}"),
        UiMessage::Outbound(raw) => {
            if let Err(e) = bridge.send(&raw).await {
                error!("Send failed => {e}");
                println!("send failed: {e}");
            }
        }
    }
}

/// Feed non-empty command lines into the UI queue, then raise the end-of-input
/// signal once the reader runs dry (or fails).
async fn read_commands<R>(reader: R, ui: UiChannel, eof_tx: watch::Sender<bool>)
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                ui.send_command(line).await;
            }
            Ok(None) => break,
            Err(e) => {
                error!("Error reading stdin => {e}");
                break;
            }
        }
    }
    let _ = eof_tx.send(true);
}
