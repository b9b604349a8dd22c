//! oscbridge-core/src/bridge/sender.rs
//!
//! Outbound half of the bridge: one ephemeral UDP socket, configured for a
//! single peer endpoint at `open` time. Each command becomes exactly one
//! datagram; UDP keeps concurrent `send_to` calls from interleaving.

use std::net::{IpAddr, SocketAddr};

use rosc::OscPacket;
use tokio::net::UdpSocket;
use tracing::debug;

use crate::codec;
use crate::error::{BridgeError, Result};

pub(crate) struct OscSender {
    socket: UdpSocket,
    peer: SocketAddr,
}

impl OscSender {
    /// Resolve the peer endpoint and bind the outbound socket. Fails with
    /// `InvalidEndpoint` when the address cannot name a UDP destination.
    pub(crate) async fn configure(peer_address: &str, peer_port: u16) -> Result<Self> {
        let peer = resolve_endpoint(peer_address, peer_port).await?;
        // The local socket family has to match the peer, or every send_to
        // fails with an address-family error.
        let local = if peer.is_ipv4() {
            ("0.0.0.0", 0)
        } else {
            ("::", 0)
        };
        let socket = UdpSocket::bind(local)
            .await
            .map_err(|e| BridgeError::Bind { port: 0, source: e })?;
        debug!("OSC sender ready => peer {peer}");
        Ok(Self { socket, peer })
    }

    pub(crate) fn peer(&self) -> SocketAddr {
        self.peer
    }

    /// Encode one command line and transmit it. A failure reports the peer it
    /// was aimed at; the socket stays usable for the next command.
    pub(crate) async fn send(&self, raw: &str) -> Result<()> {
        let msg = codec::encode_command(raw)?;
        let addr = msg.addr.clone();
        let buf = rosc::encoder::encode(&OscPacket::Message(msg))
            .map_err(|e| BridgeError::MalformedCommand(format!("OSC encode error: {e}")))?;

        self.socket
            .send_to(&buf, self.peer)
            .await
            .map_err(|e| BridgeError::Transmit {
                peer: self.peer,
                source: e,
            })?;

        debug!("OSC out => {addr} ({} bytes) to {}", buf.len(), self.peer);
        Ok(())
    }
}

async fn resolve_endpoint(peer_address: &str, peer_port: u16) -> Result<SocketAddr> {
    let peer_address = peer_address.trim();
    if peer_address.is_empty() {
        return Err(BridgeError::InvalidEndpoint(
            "peer address is empty".to_string(),
        ));
    }
    if peer_port == 0 {
        return Err(BridgeError::InvalidEndpoint(
            "peer port must be between 1 and 65535".to_string(),
        ));
    }

    // IP literals skip the resolver; anything else goes through DNS.
    if let Ok(ip) = peer_address.parse::<IpAddr>() {
        return Ok(SocketAddr::new(ip, peer_port));
    }
    let mut addrs = tokio::net::lookup_host((peer_address, peer_port))
        .await
        .map_err(|e| {
            BridgeError::InvalidEndpoint(format!("cannot resolve '{peer_address}': {e}"))
        })?;
    addrs.next().ok_or_else(|| {
        BridgeError::InvalidEndpoint(format!("'{peer_address}' resolved to no addresses"))
    })
}
