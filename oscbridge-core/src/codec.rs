//! oscbridge-core/src/codec.rs
//!
//! Pure translation between the console's text world and OSC packets.
//! Outbound: one command line becomes one [`rosc::OscMessage`]. Inbound: one
//! datagram becomes one rendered log line. No sockets here.

use std::net::SocketAddr;

use rosc::{OscMessage, OscPacket, OscType};

use crate::error::{BridgeError, Result};

/// Outcome of decoding one inbound datagram. Both variants carry a line for
/// the log pane; only `Message` means the peer sent something well-formed.
#[derive(Debug, Clone, PartialEq)]
pub enum Decoded {
    Message(String),
    Warning(String),
}

/// Builds an OSC message from a raw command line.
///
/// The first whitespace-separated token is the OSC address. The first
/// argument, if present, is sent as a float (`0.0` when it does not parse as
/// a number); every later argument is sent as a string. A line with no
/// address token is malformed.
pub fn encode_command(raw: &str) -> Result<OscMessage> {
    let mut tokens = raw.split_whitespace();
    let addr = tokens
        .next()
        .ok_or_else(|| BridgeError::MalformedCommand("command has no address token".to_string()))?;

    let args = tokens
        .enumerate()
        .map(|(i, tok)| {
            if i == 0 {
                OscType::Float(tok.parse().unwrap_or(0.0))
            } else {
                OscType::String(tok.to_string())
            }
        })
        .collect();

    Ok(OscMessage {
        addr: addr.to_string(),
        args,
    })
}

/// Renders one inbound datagram as a log line.
///
/// Undecodable bytes and OSC bundles come back as `Decoded::Warning` so the
/// pane still shows that *something* arrived; the listener never treats
/// either as fatal.
pub fn decode_datagram(data: &[u8], source: SocketAddr) -> Decoded {
    match rosc::decoder::decode_udp(data) {
        Ok((_remainder, OscPacket::Message(msg))) => {
            Decoded::Message(render_message(&msg, source))
        }
        Ok((_remainder, OscPacket::Bundle(bundle))) => Decoded::Warning(format!(
            "[{source}] unsupported OSC bundle ({} entries)",
            bundle.content.len()
        )),
        Err(e) => Decoded::Warning(format!(
            "[{source}] unparseable OSC datagram ({} bytes): {e}",
            data.len()
        )),
    }
}

fn render_message(msg: &OscMessage, source: SocketAddr) -> String {
    if msg.args.is_empty() {
        return format!("[{source}] {}", msg.addr);
    }
    let args = msg
        .args
        .iter()
        .map(render_arg)
        .collect::<Vec<_>>()
        .join(" ");
    format!("[{source}] {} {args}", msg.addr)
}

fn render_arg(arg: &OscType) -> String {
    match arg {
        OscType::Int(v) => v.to_string(),
        OscType::Long(v) => v.to_string(),
        OscType::Float(v) => v.to_string(),
        OscType::Double(v) => v.to_string(),
        OscType::String(s) => s.clone(),
        OscType::Bool(b) => b.to_string(),
        other => format!("{other:?}"),
    }
}
