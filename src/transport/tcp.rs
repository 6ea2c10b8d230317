//! A TCP transport: every message travels on its own connection.
//!
//! The dialer opens with a length-delimited `Hello` frame naming itself, its listening address
//! and the protocol id; everything after the frame until the dialer closes the write half is
//! the message.
use super::{read_message, ConnectionEvent, DialError, DialOutput, HandleOutput, Inbound, Stream};
use super::Transport;
use crate::colored::Colorize;
use crate::peer_id::PeerId;
use crate::peer_meta::PeerMetadata;
use crate::protocol::{Protocol, PROTOCOL_VERSION};
use crate::Result;

use actix::Recipient;
use bytes::Bytes;
use futures::{SinkExt, StreamExt};
use tokio::net::{TcpListener, TcpStream};
use tokio_util::codec::{FramedRead, FramedWrite, LengthDelimitedCodec};
use tracing::{debug, error, info};

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::net::SocketAddr;
use std::rc::Rc;

/// Upper bound on the encoded `Hello` frame.
const MAX_HELLO_LEN: usize = 1024;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Hello {
    peer: PeerId,
    listen: SocketAddr,
    protocol: String,
}

type Directory = Rc<RefCell<HashMap<PeerId, SocketAddr>>>;

/// Adds `peer` to the directory, returning whether it was unknown.
fn learn(directory: &Directory, peer: PeerMetadata) -> bool {
    directory.borrow_mut().insert(peer.id, peer.ip).is_none()
}

fn hello_codec() -> LengthDelimitedCodec {
    LengthDelimitedCodec::builder().max_frame_length(MAX_HELLO_LEN).new_codec()
}

fn all_protocols() -> HashSet<Protocol> {
    Protocol::ALL.iter().cloned().collect()
}

#[derive(Clone)]
pub struct TcpTransport {
    local: PeerMetadata,
    bootstrap_peers: Vec<PeerMetadata>,
    protocol_version: String,
    directory: Directory,
}

impl TcpTransport {
    /// A transport listening on `listen`, known to others by the hash of that address.
    pub fn new(listen: SocketAddr, bootstrap_peers: Vec<PeerMetadata>) -> Self {
        TcpTransport::with_peer_id(PeerId::from_ip(&listen), listen, bootstrap_peers)
    }

    pub fn with_peer_id(id: PeerId, listen: SocketAddr, bootstrap_peers: Vec<PeerMetadata>) -> Self {
        TcpTransport {
            local: PeerMetadata::new(id, listen),
            bootstrap_peers,
            protocol_version: PROTOCOL_VERSION.to_owned(),
            directory: Rc::new(RefCell::new(HashMap::default())),
        }
    }

    /// Speaks the protocol ids of `version` instead of the built-in one.
    pub fn with_protocol_version(mut self, version: &str) -> Self {
        self.protocol_version = version.to_owned();
        self
    }

    pub fn local_metadata(&self) -> PeerMetadata {
        self.local
    }

    /// The peers this transport can currently dial.
    pub fn known_peers(&self) -> Vec<PeerMetadata> {
        self.directory.borrow().iter().map(|(id, ip)| PeerMetadata::new(*id, *ip)).collect()
    }
}

impl Transport for TcpTransport {
    fn local_peer(&self) -> PeerId {
        self.local.id
    }

    fn dial(&self, peer: PeerId, protocol: Protocol) -> DialOutput {
        let ip = self.directory.borrow().get(&peer).cloned();
        let hello = Hello {
            peer: self.local.id,
            listen: self.local.ip,
            protocol: protocol.id(&self.protocol_version),
        };
        Box::pin(async move {
            let ip = ip.ok_or(DialError::Unreachable(peer))?;
            let socket = TcpStream::connect(ip).await.map_err(|err| {
                debug!("[{}] connect to {} failed: {}", "tcp".yellow(), ip, err);
                DialError::Unreachable(peer)
            })?;
            let hello = bincode::serialize(&hello).map_err(|err| DialError::Io(format!("{:?}", err)))?;
            let mut framed = FramedWrite::new(socket, hello_codec());
            framed.send(Bytes::from(hello)).await?;
            let stream: Stream = Box::new(framed.into_inner());
            Ok(stream)
        })
    }

    fn handle(
        &self,
        protocols: HashSet<Protocol>,
        inbound: Recipient<Inbound>,
        lifecycle: Recipient<ConnectionEvent>,
    ) -> HandleOutput {
        let local = self.local;
        let directory = self.directory.clone();
        let bootstrap_peers = self.bootstrap_peers.clone();
        let version = self.protocol_version.clone();
        Box::pin(async move {
            let listener = TcpListener::bind(local.ip).await?;
            info!("[{}] {} listening on {}", "tcp".yellow(), local.id, local.ip);
            for peer in bootstrap_peers {
                if peer.id != local.id && learn(&directory, peer) {
                    // bootstrap peers are assumed to speak every protocol
                    let _ = lifecycle
                        .do_send(ConnectionEvent::Connected { peer: peer.id, protocols: all_protocols() });
                }
            }
            let receiver = Rc::new(Receiver { protocols, version, directory, inbound, lifecycle });
            actix::spawn(listen(listener, receiver));
            Ok(())
        })
    }
}

struct Receiver {
    protocols: HashSet<Protocol>,
    version: String,
    directory: Directory,
    inbound: Recipient<Inbound>,
    lifecycle: Recipient<ConnectionEvent>,
}

async fn listen(listener: TcpListener, receiver: Rc<Receiver>) {
    loop {
        match listener.accept().await {
            Ok((socket, ip)) => {
                let receiver = receiver.clone();
                actix::spawn(async move {
                    if let Err(err) = receive(socket, receiver).await {
                        debug!("[{}] dropped stream from {}: {:?}", "tcp".yellow(), ip, err);
                    }
                });
            }
            Err(err) => {
                error!("[{}] accept failed: {}", "tcp".yellow(), err);
                return;
            }
        }
    }
}

async fn receive(socket: TcpStream, receiver: Rc<Receiver>) -> Result<()> {
    let mut framed = FramedRead::new(socket, hello_codec());
    let hello = match framed.next().await {
        Some(frame) => frame?,
        None => return Ok(()),
    };
    let hello: Hello = bincode::deserialize(&hello)?;
    let protocol = Protocol::from_id(&hello.protocol, &receiver.version)?;
    if !receiver.protocols.contains(&protocol) {
        debug!("[{}] no handler for {} from {}", "tcp".yellow(), protocol, hello.peer);
        return Ok(());
    }
    if learn(&receiver.directory, PeerMetadata::new(hello.peer, hello.listen)) {
        let connected = ConnectionEvent::Connected { peer: hello.peer, protocols: all_protocols() };
        let _ = receiver.lifecycle.do_send(connected);
    }

    let mut bytes = framed.read_buffer().to_vec();
    let mut socket = framed.into_inner();
    read_message(&mut socket, &mut bytes).await?;
    let _ = receiver.inbound.do_send(Inbound { peer: hello.peer, protocol, bytes: Bytes::from(bytes) });
    Ok(())
}
