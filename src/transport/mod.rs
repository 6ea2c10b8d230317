//! The peer transport substrate a relay runs over.
//!
//! A transport opens one stream per message (`dial`), delivers every inbound stream to the
//! relay as an [Inbound] frame once the remote end closes it, and reports peers coming and
//! going as [ConnectionEvent]s.
pub mod memory;
pub mod tcp;

pub use memory::{MemoryTransport, Switchboard};
pub use tcp::TcpTransport;

use crate::peer_id::PeerId;
use crate::protocol::Protocol;
use crate::Result;

use actix::Recipient;
use bytes::Bytes;
use futures::future::LocalBoxFuture;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use std::collections::HashSet;
use std::fmt;
use std::io;

/// Upper bound on the bytes accepted from one inbound stream.
pub const MAX_MESSAGE_LEN: usize = 4 * 1024 * 1024;

/// A bidirectional byte stream opened for a single protocol message.
pub trait Duplex: AsyncRead + AsyncWrite + Unpin {}

impl<T: AsyncRead + AsyncWrite + Unpin> Duplex for T {}

pub type Stream = Box<dyn Duplex>;

pub type DialOutput = LocalBoxFuture<'static, std::result::Result<Stream, DialError>>;

pub type HandleOutput = LocalBoxFuture<'static, Result<()>>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialError {
    /// The peer did not register a handler for the protocol.
    UnsupportedProtocol(Protocol),
    /// No connection to the peer exists or it could not be reached.
    Unreachable(PeerId),
    Io(String),
}

impl fmt::Display for DialError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            DialError::UnsupportedProtocol(protocol) => write!(f, "unsupported protocol {}", protocol),
            DialError::Unreachable(peer) => write!(f, "peer {} unreachable", peer),
            DialError::Io(err) => write!(f, "io: {}", err),
        }
    }
}

impl std::convert::From<std::io::Error> for DialError {
    fn from(error: std::io::Error) -> Self {
        DialError::Io(format!("{}", error))
    }
}

/// A complete message read from an inbound stream.
#[derive(Debug, Clone, Message)]
#[rtype(result = "()")]
pub struct Inbound {
    pub peer: PeerId,
    pub protocol: Protocol,
    pub bytes: Bytes,
}

#[derive(Debug, Clone, Message)]
#[rtype(result = "()")]
pub enum ConnectionEvent {
    Connected { peer: PeerId, protocols: HashSet<Protocol> },
    Disconnected { peer: PeerId },
}

pub trait Transport {
    /// The handle remote peers know this node by.
    fn local_peer(&self) -> PeerId;

    /// Opens a stream to `peer` for `protocol`.
    fn dial(&self, peer: PeerId, protocol: Protocol) -> DialOutput;

    /// Registers the handlers for inbound streams of `protocols` and for connection events.
    fn handle(
        &self,
        protocols: HashSet<Protocol>,
        inbound: Recipient<Inbound>,
        lifecycle: Recipient<ConnectionEvent>,
    ) -> HandleOutput;
}

/// Awaits the dial, writes `bytes` as the only message on the stream, then closes it.
pub async fn send_message(
    dial: DialOutput,
    bytes: Bytes,
) -> std::result::Result<(), DialError> {
    let mut stream = dial.await?;
    stream.write_all(&bytes).await?;
    stream.shutdown().await?;
    Ok(())
}

/// Reads `stream` to its end, appending to `buf`. Fails once `buf` would grow past
/// [MAX_MESSAGE_LEN].
pub async fn read_message<R: AsyncRead + Unpin>(stream: R, buf: &mut Vec<u8>) -> io::Result<()> {
    let limit = (MAX_MESSAGE_LEN + 1).saturating_sub(buf.len()) as u64;
    let _ = stream.take(limit).read_to_end(buf).await?;
    if buf.len() > MAX_MESSAGE_LEN {
        return Err(io::Error::new(io::ErrorKind::InvalidData, "message exceeds the size limit"));
    }
    Ok(())
}
