//! oscbridge-core/src/channel.rs
//!
//! The seam between the bridge and whatever front end is attached (console,
//! window, test harness). One bounded MPSC queue carries both directions'
//! messages; the front end owns the receiver and routes by variant.

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::{debug, warn};

/// Messages crossing the UI boundary.
#[derive(Debug, Clone, PartialEq)]
pub enum UiMessage {
    /// Bridge => UI: one rendered line for the log pane.
    Inbound(String),
    /// UI => bridge: one raw command line typed by the operator.
    Outbound(String),
}

/// Default queue depth. The log pane is human-paced; anything past this is
/// noise we can afford to drop.
const DEFAULT_BUFFER_SIZE: usize = 1024;

/// Cloneable sending half of the UI queue. The bridge's listener holds one
/// clone, the front end's input reader another.
#[derive(Clone)]
pub struct UiChannel {
    tx: mpsc::Sender<UiMessage>,
}

impl UiChannel {
    /// Create the queue. Returns the channel handle plus the receiver the
    /// front end drains.
    pub fn new(buffer_size: Option<usize>) -> (Self, mpsc::Receiver<UiMessage>) {
        // tokio's bounded channel refuses a zero buffer; treat a zero request
        // as the smallest usable queue.
        let depth = buffer_size.unwrap_or(DEFAULT_BUFFER_SIZE).max(1);
        let (tx, rx) = mpsc::channel(depth);
        (Self { tx }, rx)
    }

    /// Fire-and-forget log append. Never blocks the caller: if the UI cannot
    /// keep up the line is dropped (and noted in the trace log). Delivery
    /// failures never surface as errors to the bridge.
    pub fn push_log(&self, line: impl Into<String>) {
        let line = line.into();
        if let Err(e) = self.tx.try_send(UiMessage::Inbound(line)) {
            match e {
                TrySendError::Full(_) => warn!("UI queue full; dropping a log line"),
                TrySendError::Closed(_) => debug!("UI queue closed; dropping a log line"),
            }
        }
    }

    /// Queue one operator command for the front end's dispatch loop. Unlike
    /// log lines, commands wait for space rather than drop.
    pub async fn send_command(&self, raw: impl Into<String>) {
        if self.tx.send(UiMessage::Outbound(raw.into())).await.is_err() {
            debug!("UI queue closed; command discarded");
        }
    }
}
