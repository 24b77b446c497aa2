// Wire protocol — every frame is [4 bytes BE length][protobuf Envelope].
//
// Block and Tx payloads carry the canonical codec bytes, identical to what
// the chain store persists, so received blocks go to disk without
// re-serialization. Frames above the configured cap close the connection.

use prost::Message;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

#[derive(Debug, thiserror::Error)]
pub enum WireError {
    #[error("frame of {len} bytes exceeds cap of {max}")]
    FrameTooLarge { len: usize, max: usize },
    #[error("invalid frame: {0}")]
    InvalidFrame(&'static str),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Handshake payload. `nonce` detects self-connections; `magic` keeps
/// networks apart even when ports collide.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Version {
    #[prost(string, tag = "1")]
    pub network: String,
    #[prost(bytes = "vec", tag = "2")]
    pub magic: Vec<u8>,
    #[prost(uint32, tag = "3")]
    pub protocol_version: u32,
    #[prost(uint64, tag = "4")]
    pub services: u64,
    #[prost(int64, tag = "5")]
    pub timestamp: i64,
    #[prost(string, tag = "6")]
    pub from_ip: String,
    #[prost(uint32, tag = "7")]
    pub from_port: u32,
    #[prost(uint64, tag = "8")]
    pub nonce: u64,
    #[prost(string, tag = "9")]
    pub user_agent: String,
    #[prost(uint64, tag = "10")]
    pub start_height: u64,
    #[prost(bool, tag = "11")]
    pub relay: bool,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Verack {}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Ping {
    #[prost(uint32, tag = "1")]
    pub nonce: u32,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Pong {
    #[prost(uint32, tag = "1")]
    pub nonce: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ::prost::Enumeration)]
#[repr(i32)]
pub enum InvType {
    Block = 0,
    Transaction = 1,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct InvItem {
    #[prost(enumeration = "InvType", tag = "1")]
    pub kind: i32,
    #[prost(bytes = "vec", tag = "2")]
    pub hash: Vec<u8>,
}

impl InvItem {
    pub fn block(hash: [u8; 32]) -> Self {
        InvItem { kind: InvType::Block as i32, hash: hash.to_vec() }
    }

    pub fn hash32(&self) -> Option<[u8; 32]> {
        self.hash.as_slice().try_into().ok()
    }
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Inv {
    #[prost(message, repeated, tag = "1")]
    pub items: Vec<InvItem>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GetData {
    #[prost(message, repeated, tag = "1")]
    pub items: Vec<InvItem>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct BlockMsg {
    /// Canonical block bytes (primitives::codec).
    #[prost(bytes = "vec", tag = "1")]
    pub block: Vec<u8>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TxMsg {
    /// Canonical transaction bytes (primitives::codec).
    #[prost(bytes = "vec", tag = "1")]
    pub tx: Vec<u8>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Addr {
    #[prost(string, repeated, tag = "1")]
    pub addresses: Vec<String>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GetAddr {}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GetHeaders {
    #[prost(uint64, tag = "1")]
    pub start_height: u64,
    /// 0 means "no upper bound".
    #[prost(uint64, tag = "2")]
    pub stop: u64,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct HeaderSummary {
    #[prost(uint64, tag = "1")]
    pub index: u64,
    #[prost(bytes = "vec", tag = "2")]
    pub previous_hash: Vec<u8>,
    #[prost(uint64, tag = "3")]
    pub timestamp: u64,
    #[prost(bytes = "vec", tag = "4")]
    pub merkle_root: Vec<u8>,
    #[prost(uint64, tag = "5")]
    pub nonce: u64,
    #[prost(uint32, tag = "6")]
    pub difficulty: u32,
    #[prost(bytes = "vec", tag = "7")]
    pub hash: Vec<u8>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Headers {
    #[prost(message, repeated, tag = "1")]
    pub headers: Vec<HeaderSummary>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GetBlocks {
    #[prost(uint64, tag = "1")]
    pub start_height: u64,
    #[prost(uint64, tag = "2")]
    pub stop_height: u64,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Height {
    #[prost(uint64, tag = "1")]
    pub height: u64,
}

/// The one-of wrapper every frame carries.
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Envelope {
    #[prost(
        oneof = "Payload",
        tags = "1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14"
    )]
    pub payload: Option<Payload>,
}

#[derive(Clone, PartialEq, ::prost::Oneof)]
pub enum Payload {
    #[prost(message, tag = "1")]
    Version(Version),
    #[prost(message, tag = "2")]
    Verack(Verack),
    #[prost(message, tag = "3")]
    Ping(Ping),
    #[prost(message, tag = "4")]
    Pong(Pong),
    #[prost(message, tag = "5")]
    Inv(Inv),
    #[prost(message, tag = "6")]
    GetData(GetData),
    #[prost(message, tag = "7")]
    Block(BlockMsg),
    #[prost(message, tag = "8")]
    Tx(TxMsg),
    #[prost(message, tag = "9")]
    Addr(Addr),
    #[prost(message, tag = "10")]
    GetAddr(GetAddr),
    #[prost(message, tag = "11")]
    GetHeaders(GetHeaders),
    #[prost(message, tag = "12")]
    Headers(Headers),
    #[prost(message, tag = "13")]
    GetBlocks(GetBlocks),
    #[prost(message, tag = "14")]
    Height(Height),
}

impl Payload {
    /// Short tag for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Payload::Version(_) => "version",
            Payload::Verack(_) => "verack",
            Payload::Ping(_) => "ping",
            Payload::Pong(_) => "pong",
            Payload::Inv(_) => "inv",
            Payload::GetData(_) => "getdata",
            Payload::Block(_) => "block",
            Payload::Tx(_) => "tx",
            Payload::Addr(_) => "addr",
            Payload::GetAddr(_) => "getaddr",
            Payload::GetHeaders(_) => "getheaders",
            Payload::Headers(_) => "headers",
            Payload::GetBlocks(_) => "getblocks",
            Payload::Height(_) => "height",
        }
    }
}

pub fn encode_frame(payload: &Payload, max_frame: usize) -> Result<Vec<u8>, WireError> {
    let envelope = Envelope { payload: Some(payload.clone()) };
    let body = envelope.encode_to_vec();
    if body.len() > max_frame {
        return Err(WireError::FrameTooLarge { len: body.len(), max: max_frame });
    }
    let mut frame = Vec::with_capacity(4 + body.len());
    frame.extend_from_slice(&(body.len() as u32).to_be_bytes());
    frame.extend_from_slice(&body);
    Ok(frame)
}

/// Length-prefixed envelope stream. Reads are buffered; a partial frame
/// stays in the buffer until the rest arrives.
pub struct FramedStream<S> {
    stream: S,
    buf: Vec<u8>,
    max_frame: usize,
}

impl<S: AsyncRead + AsyncWrite + Unpin> FramedStream<S> {
    pub fn new(stream: S, max_frame: usize) -> Self {
        FramedStream { stream, buf: Vec::new(), max_frame }
    }

    pub async fn send(&mut self, payload: &Payload) -> Result<(), WireError> {
        let frame = encode_frame(payload, self.max_frame)?;
        self.stream.write_all(&frame).await?;
        Ok(())
    }

    /// Next payload, or None on clean EOF.
    pub async fn recv(&mut self) -> Result<Option<Payload>, WireError> {
        loop {
            if self.buf.len() >= 4 {
                let body_len =
                    u32::from_be_bytes(self.buf[..4].try_into().expect("slice is 4 bytes")) as usize;
                if body_len > self.max_frame {
                    return Err(WireError::FrameTooLarge { len: body_len, max: self.max_frame });
                }
                if self.buf.len() >= 4 + body_len {
                    let envelope = Envelope::decode(&self.buf[4..4 + body_len])
                        .map_err(|_| WireError::InvalidFrame("undecodable envelope"))?;
                    self.buf.drain(..4 + body_len);
                    let payload =
                        envelope.payload.ok_or(WireError::InvalidFrame("empty envelope"))?;
                    return Ok(Some(payload));
                }
            }

            let mut tmp = [0u8; 4096];
            let n = self.stream.read(&mut tmp).await?;
            if n == 0 {
                return Ok(None);
            }
            self.buf.extend_from_slice(&tmp[..n]);
        }
    }
}
