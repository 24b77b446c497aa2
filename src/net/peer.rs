// Per-connection peer actor.
//
// Connecting → Handshaking → Connected → Disconnected. The actor owns the
// socket; the node talks to it through an outbound channel and receives
// inbound payloads as events. Messages from one peer are processed in
// arrival order.

use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::time::timeout;
use tracing::debug;

use crate::config::Config;
use crate::net::protocol::{
    FramedStream, Height, Payload, Ping, Pong, Verack, Version, WireError,
};

#[derive(Debug, thiserror::Error)]
pub enum NetError {
    #[error(transparent)]
    Wire(#[from] WireError),
    #[error("peer network or magic does not match ours")]
    NetworkMismatch,
    #[error("handshake did not complete in time")]
    HandshakeTimeout,
    #[error("connection to ourselves")]
    SelfConnection,
    #[error("no pong inside the keepalive window")]
    PeerUnresponsive,
    #[error("unexpected {0} during handshake")]
    UnexpectedMessage(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeerState {
    Connecting,
    Handshaking,
    Connected,
    Disconnected,
}

/// The node's side of a peer actor.
pub struct PeerHandle {
    pub addr: String,
    pub outbound: mpsc::UnboundedSender<Payload>,
    pub state: PeerState,
    pub start_height: u64,
    pub is_outbound: bool,
}

impl PeerHandle {
    pub fn is_alive(&self) -> bool {
        !self.outbound.is_closed()
    }

    pub fn send(&self, payload: Payload) {
        let _ = self.outbound.send(payload);
    }
}

#[derive(Debug)]
pub enum PeerEvent {
    Connected { peer: String, start_height: u64 },
    Payload { peer: String, payload: Payload },
    Disconnected { peer: String },
}

/// Identity shared by every peer actor of one node.
pub struct PeerContext {
    pub config: Arc<Config>,
    /// Random per-process nonce echoed in Version; seeing our own nonce
    /// back means we dialed ourselves.
    pub node_nonce: u64,
    pub listen_port: u16,
}

impl PeerContext {
    fn version(&self, start_height: u64) -> Version {
        Version {
            network: self.config.network.name().to_string(),
            magic: self.config.magic().to_vec(),
            protocol_version: crate::config::PROTOCOL_VERSION,
            services: 0,
            timestamp: now_secs(),
            from_ip: self.config.p2p_bind.clone(),
            from_port: self.listen_port as u32,
            nonce: self.node_nonce,
            user_agent: crate::config::USER_AGENT.to_string(),
            start_height,
            relay: true,
        }
    }

    fn validate_version(&self, remote: &Version) -> Result<(), NetError> {
        if remote.network != self.config.network.name() || remote.magic != self.config.magic() {
            return Err(NetError::NetworkMismatch);
        }
        if remote.nonce == self.node_nonce {
            return Err(NetError::SelfConnection);
        }
        let loopback = matches!(remote.from_ip.as_str(), "127.0.0.1" | "::1" | "localhost");
        if loopback && remote.from_port == self.listen_port as u32 {
            return Err(NetError::SelfConnection);
        }
        Ok(())
    }
}

fn now_secs() -> i64 {
    SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_secs() as i64).unwrap_or(0)
}

fn now_ms() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_millis() as u64).unwrap_or(0)
}

/// Runs a peer until disconnect; always emits a final Disconnected event.
pub async fn run_peer(
    stream: TcpStream,
    peer_key: String,
    is_initiator: bool,
    start_height: u64,
    ctx: Arc<PeerContext>,
    outbound_rx: mpsc::UnboundedReceiver<Payload>,
    events: mpsc::UnboundedSender<PeerEvent>,
) {
    if let Err(err) =
        drive_peer(stream, &peer_key, is_initiator, start_height, &ctx, outbound_rx, &events).await
    {
        debug!(peer = %peer_key, %err, "peer terminated");
    }
    let _ = events.send(PeerEvent::Disconnected { peer: peer_key });
}

async fn drive_peer<S: AsyncRead + AsyncWrite + Unpin>(
    stream: S,
    peer_key: &str,
    is_initiator: bool,
    start_height: u64,
    ctx: &PeerContext,
    mut outbound_rx: mpsc::UnboundedReceiver<Payload>,
    events: &mpsc::UnboundedSender<PeerEvent>,
) -> Result<(), NetError> {
    let mut framed = FramedStream::new(stream, ctx.config.max_frame_bytes);

    let remote = timeout(
        Duration::from_millis(ctx.config.handshake_timeout_ms),
        handshake(&mut framed, is_initiator, start_height, ctx),
    )
    .await
    .map_err(|_| NetError::HandshakeTimeout)??;

    let _ = events.send(PeerEvent::Connected {
        peer: peer_key.to_string(),
        start_height: remote.start_height,
    });

    // Both sides announce their height right after verack.
    framed.send(&Payload::Height(Height { height: start_height })).await?;

    let mut ping_timer =
        tokio::time::interval(Duration::from_millis(ctx.config.ping_interval_ms));
    ping_timer.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    ping_timer.tick().await; // immediate first tick
    let mut last_ping_nonce: Option<u32> = None;
    let mut last_pong_ms = now_ms();

    loop {
        tokio::select! {
            inbound = framed.recv() => {
                match inbound? {
                    None => return Ok(()),
                    Some(Payload::Ping(ping)) => {
                        framed.send(&Payload::Pong(Pong { nonce: ping.nonce })).await?;
                    }
                    Some(Payload::Pong(pong)) => {
                        if last_ping_nonce == Some(pong.nonce) {
                            last_pong_ms = now_ms();
                            last_ping_nonce = None;
                        }
                    }
                    Some(payload) => {
                        let _ = events.send(PeerEvent::Payload {
                            peer: peer_key.to_string(),
                            payload,
                        });
                    }
                }
            }
            outbound = outbound_rx.recv() => {
                match outbound {
                    // Node dropped the handle: orderly local close.
                    None => return Ok(()),
                    Some(payload) => framed.send(&payload).await?,
                }
            }
            _ = ping_timer.tick() => {
                if now_ms().saturating_sub(last_pong_ms) >= ctx.config.pong_timeout_ms {
                    return Err(NetError::PeerUnresponsive);
                }
                let nonce = rand::random::<u32>();
                last_ping_nonce = Some(nonce);
                framed.send(&Payload::Ping(Ping { nonce })).await?;
            }
        }
    }
}

/// Version/Verack exchange. The initiator opens; the responder validates,
/// answers with its own Version and a Verack, and the initiator closes the
/// loop with its Verack.
async fn handshake<S: AsyncRead + AsyncWrite + Unpin>(
    framed: &mut FramedStream<S>,
    is_initiator: bool,
    start_height: u64,
    ctx: &PeerContext,
) -> Result<Version, NetError> {
    let ours = Payload::Version(ctx.version(start_height));
    if is_initiator {
        framed.send(&ours).await?;
        let remote = expect_version(framed).await?;
        ctx.validate_version(&remote)?;
        expect_verack(framed).await?;
        framed.send(&Payload::Verack(Verack {})).await?;
        Ok(remote)
    } else {
        let remote = expect_version(framed).await?;
        ctx.validate_version(&remote)?;
        framed.send(&ours).await?;
        framed.send(&Payload::Verack(Verack {})).await?;
        expect_verack(framed).await?;
        Ok(remote)
    }
}

async fn expect_version<S: AsyncRead + AsyncWrite + Unpin>(
    framed: &mut FramedStream<S>,
) -> Result<Version, NetError> {
    match framed.recv().await? {
        Some(Payload::Version(version)) => Ok(version),
        Some(other) => Err(NetError::UnexpectedMessage(other.name())),
        None => Err(NetError::UnexpectedMessage("eof")),
    }
}

async fn expect_verack<S: AsyncRead + AsyncWrite + Unpin>(
    framed: &mut FramedStream<S>,
) -> Result<(), NetError> {
    match framed.recv().await? {
        Some(Payload::Verack(_)) => Ok(()),
        Some(other) => Err(NetError::UnexpectedMessage(other.name())),
        None => Err(NetError::UnexpectedMessage("eof")),
    }
}
