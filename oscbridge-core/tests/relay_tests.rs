// tests/relay_tests.rs
//
// End-to-end datagram flow over loopback: inbound datagrams become UI log
// lines, outbound commands become OSC datagrams, and per-message failures
// never take the bridge down.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use rosc::{OscMessage, OscPacket, OscType};
use tokio::net::UdpSocket;
use tokio::sync::mpsc;
use tokio::time::timeout;

use oscbridge_core::{BridgeConfig, BridgeError, BridgeState, OscBridge, UiChannel, UiMessage};

fn free_udp_port() -> u16 {
    let sock = std::net::UdpSocket::bind("127.0.0.1:0").expect("bind probe socket");
    sock.local_addr().expect("probe local addr").port()
}

fn test_config(listen_port: u16, peer_port: u16) -> BridgeConfig {
    BridgeConfig {
        peer_address: "127.0.0.1".to_string(),
        peer_port,
        listen_port,
    }
}

async fn next_log_line(rx: &mut mpsc::Receiver<UiMessage>) -> String {
    match timeout(Duration::from_secs(2), rx.recv()).await {
        Ok(Some(UiMessage::Inbound(line))) => line,
        Ok(Some(other)) => panic!("expected a log line, got {other:?}"),
        Ok(None) => panic!("UI queue closed"),
        Err(_) => panic!("timed out waiting for a log line"),
    }
}

#[tokio::test]
async fn test_inbound_datagram_becomes_a_log_line() -> Result<()> {
    let listen_port = free_udp_port();
    let (ui, mut rx) = UiChannel::new(Some(64));
    let bridge = OscBridge::new(ui);
    bridge.open(&test_config(listen_port, free_udp_port())).await?;

    let remote = UdpSocket::bind("127.0.0.1:0").await?;
    let msg = OscMessage {
        addr: "/status/ping".to_string(),
        args: vec![OscType::Float(1.0), OscType::String("hello".to_string())],
    };
    let bytes = rosc::encoder::encode(&OscPacket::Message(msg))?;
    remote.send_to(&bytes, ("127.0.0.1", listen_port)).await?;

    let line = next_log_line(&mut rx).await;
    assert!(line.contains("/status/ping"), "line was: {line}");
    assert!(line.contains("hello"), "line was: {line}");
    // The source endpoint is part of the rendering.
    let remote_addr = remote.local_addr()?;
    assert!(line.contains(&remote_addr.to_string()), "line was: {line}");

    bridge.close().await;
    Ok(())
}

#[tokio::test]
async fn test_malformed_datagram_warns_and_listener_survives() -> Result<()> {
    let listen_port = free_udp_port();
    let (ui, mut rx) = UiChannel::new(Some(64));
    let bridge = OscBridge::new(ui);
    bridge.open(&test_config(listen_port, free_udp_port())).await?;

    let remote = UdpSocket::bind("127.0.0.1:0").await?;
    remote
        .send_to(b"this is not osc", ("127.0.0.1", listen_port))
        .await?;

    let warning = next_log_line(&mut rx).await;
    assert!(warning.contains("unparseable"), "line was: {warning}");

    // A well-formed datagram after the garbage must still come through.
    let msg = OscMessage {
        addr: "/after/garbage".to_string(),
        args: vec![],
    };
    let bytes = rosc::encoder::encode(&OscPacket::Message(msg))?;
    remote.send_to(&bytes, ("127.0.0.1", listen_port)).await?;

    let line = next_log_line(&mut rx).await;
    assert!(line.contains("/after/garbage"), "line was: {line}");
    assert_eq!(bridge.state().await, BridgeState::Running);

    bridge.close().await;
    Ok(())
}

#[tokio::test]
async fn test_outbound_command_reaches_the_peer() -> Result<()> {
    let peer = UdpSocket::bind("127.0.0.1:0").await?;
    let peer_port = peer.local_addr()?.port();

    let (ui, _rx) = UiChannel::new(Some(16));
    let bridge = OscBridge::new(ui);
    bridge.open(&test_config(free_udp_port(), peer_port)).await?;

    bridge.send("/mixer/level 0.8 main").await?;

    let mut buf = vec![0u8; rosc::decoder::MTU];
    let (size, _) = timeout(Duration::from_secs(2), peer.recv_from(&mut buf)).await??;
    let (_, packet) = rosc::decoder::decode_udp(&buf[..size])?;
    match packet {
        OscPacket::Message(m) => {
            assert_eq!(m.addr, "/mixer/level");
            assert_eq!(
                m.args,
                vec![OscType::Float(0.8), OscType::String("main".to_string())]
            );
        }
        other => panic!("expected a message, got {other:?}"),
    }

    bridge.close().await;
    Ok(())
}

#[tokio::test]
async fn test_bad_command_does_not_stop_the_bridge() -> Result<()> {
    let peer = UdpSocket::bind("127.0.0.1:0").await?;
    let peer_port = peer.local_addr()?.port();

    let (ui, _rx) = UiChannel::new(Some(16));
    let bridge = OscBridge::new(ui);
    bridge.open(&test_config(free_udp_port(), peer_port)).await?;

    assert!(matches!(
        bridge.send("   ").await,
        Err(BridgeError::MalformedCommand(_))
    ));
    assert_eq!(bridge.state().await, BridgeState::Running);

    // The next command goes out as if nothing happened.
    bridge.send("/still/alive").await?;
    let mut buf = vec![0u8; rosc::decoder::MTU];
    let (size, _) = timeout(Duration::from_secs(2), peer.recv_from(&mut buf)).await??;
    let (_, packet) = rosc::decoder::decode_udp(&buf[..size])?;
    match packet {
        OscPacket::Message(m) => assert_eq!(m.addr, "/still/alive"),
        other => panic!("expected a message, got {other:?}"),
    }

    bridge.close().await;
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_sends_all_arrive_wellformed() -> Result<()> {
    const SENDS: usize = 1000;

    let peer = UdpSocket::bind("127.0.0.1:0").await?;
    let peer_port = peer.local_addr()?.port();

    let (ui, _rx) = UiChannel::new(Some(16));
    let bridge = Arc::new(OscBridge::new(ui));
    bridge.open(&test_config(free_udp_port(), peer_port)).await?;

    // Drain the peer socket as datagrams arrive so the OS buffer never fills.
    let collector = tokio::spawn(async move {
        let mut buf = vec![0u8; rosc::decoder::MTU];
        let mut seen = Vec::with_capacity(SENDS);
        while seen.len() < SENDS {
            match timeout(Duration::from_secs(5), peer.recv_from(&mut buf)).await {
                Ok(Ok((size, _))) => {
                    let (_, packet) = rosc::decoder::decode_udp(&buf[..size])
                        .expect("every datagram should decode cleanly");
                    match packet {
                        OscPacket::Message(m) => seen.push(m),
                        other => panic!("unexpected packet kind: {other:?}"),
                    }
                }
                Ok(Err(e)) => panic!("recv failed: {e}"),
                Err(_) => break,
            }
        }
        seen
    });

    let mut tasks = Vec::with_capacity(SENDS);
    for i in 0..SENDS {
        let bridge = bridge.clone();
        tasks.push(tokio::spawn(async move {
            bridge.send(&format!("/burst/{i} {i} payload")).await
        }));
    }
    for t in tasks {
        t.await.expect("send task should not panic")?;
    }

    let seen = collector.await.expect("collector should not panic");
    assert_eq!(
        seen.len(),
        SENDS,
        "every command should arrive as its own datagram"
    );
    for m in &seen {
        assert!(m.addr.starts_with("/burst/"), "addr was: {}", m.addr);
        assert_eq!(m.args.len(), 2);
        assert!(matches!(m.args[0], OscType::Float(_)));
        assert_eq!(m.args[1], OscType::String("payload".to_string()));
    }

    bridge.close().await;
    Ok(())
}
