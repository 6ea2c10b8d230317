//! An in-process transport where a [Switchboard] actor plays the role of the network.
//!
//! Peers register the protocols they handle, links between peers are created explicitly and
//! every dial is backed by a tokio in-memory duplex whose far end is read to completion and
//! handed to the remote peer as one [Inbound] frame.
use super::{read_message, ConnectionEvent, DialError, DialOutput, HandleOutput, Inbound, Stream};
use super::Transport;
use crate::colored::Colorize;
use crate::peer_id::PeerId;
use crate::protocol::Protocol;
use crate::{Error, Result};

use actix::{Actor, Addr, Context, Handler, Recipient};
use bytes::Bytes;
use tracing::debug;

use std::collections::{HashMap, HashSet};

const STREAM_BUFFER: usize = 64 * 1024;

struct Endpoint {
    protocols: HashSet<Protocol>,
    inbound: Recipient<Inbound>,
    lifecycle: Recipient<ConnectionEvent>,
}

/// The registry of peers and the symmetric links between them.
pub struct Switchboard {
    endpoints: HashMap<PeerId, Endpoint>,
    links: HashSet<(PeerId, PeerId)>,
}

fn link_key(a: PeerId, b: PeerId) -> (PeerId, PeerId) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

impl Switchboard {
    pub fn new() -> Self {
        Switchboard { endpoints: HashMap::default(), links: HashSet::new() }
    }

    pub fn is_linked(&self, a: PeerId, b: PeerId) -> bool {
        self.links.contains(&link_key(a, b))
    }
}

impl Default for Switchboard {
    fn default() -> Self {
        Switchboard::new()
    }
}

impl Actor for Switchboard {
    type Context = Context<Self>;

    fn started(&mut self, _ctx: &mut Context<Self>) {
        debug!("[{}] started", "switchboard".yellow());
    }
}

#[derive(Clone, Message)]
#[rtype(result = "()")]
pub struct Register {
    pub peer: PeerId,
    pub protocols: HashSet<Protocol>,
    pub inbound: Recipient<Inbound>,
    pub lifecycle: Recipient<ConnectionEvent>,
}

impl Handler<Register> for Switchboard {
    type Result = ();

    fn handle(&mut self, msg: Register, _ctx: &mut Context<Self>) -> Self::Result {
        debug!("[{}] registered {} for {:?}", "switchboard".yellow(), msg.peer, msg.protocols);
        let endpoint =
            Endpoint { protocols: msg.protocols, inbound: msg.inbound, lifecycle: msg.lifecycle };
        let _ = self.endpoints.insert(msg.peer, endpoint);
    }
}

/// Connects two registered peers; both sides are told about the other.
#[derive(Debug, Clone, Message)]
#[rtype(result = "Result<()>")]
pub struct Link {
    pub a: PeerId,
    pub b: PeerId,
}

impl Handler<Link> for Switchboard {
    type Result = Result<()>;

    fn handle(&mut self, msg: Link, _ctx: &mut Context<Self>) -> Self::Result {
        let (a, b) = match (self.endpoints.get(&msg.a), self.endpoints.get(&msg.b)) {
            (Some(a), Some(b)) => (a, b),
            (None, _) => return Err(Error::Dial(DialError::Unreachable(msg.a))),
            (_, None) => return Err(Error::Dial(DialError::Unreachable(msg.b))),
        };
        if !self.links.insert(link_key(msg.a, msg.b)) {
            return Ok(());
        }
        let _ = a
            .lifecycle
            .do_send(ConnectionEvent::Connected { peer: msg.b, protocols: b.protocols.clone() });
        let _ = b
            .lifecycle
            .do_send(ConnectionEvent::Connected { peer: msg.a, protocols: a.protocols.clone() });
        Ok(())
    }
}

#[derive(Debug, Clone, Message)]
#[rtype(result = "()")]
pub struct Unlink {
    pub a: PeerId,
    pub b: PeerId,
}

impl Handler<Unlink> for Switchboard {
    type Result = ();

    fn handle(&mut self, msg: Unlink, _ctx: &mut Context<Self>) -> Self::Result {
        if !self.links.remove(&link_key(msg.a, msg.b)) {
            return;
        }
        if let Some(a) = self.endpoints.get(&msg.a) {
            let _ = a.lifecycle.do_send(ConnectionEvent::Disconnected { peer: msg.b });
        }
        if let Some(b) = self.endpoints.get(&msg.b) {
            let _ = b.lifecycle.do_send(ConnectionEvent::Disconnected { peer: msg.a });
        }
    }
}

/// Resolves the inbound handler of `to` for a dial from `from`.
#[derive(Debug, Clone, Message)]
#[rtype(result = "std::result::Result<Recipient<Inbound>, DialError>")]
pub struct Lookup {
    pub from: PeerId,
    pub to: PeerId,
    pub protocol: Protocol,
}

impl Handler<Lookup> for Switchboard {
    type Result = std::result::Result<Recipient<Inbound>, DialError>;

    fn handle(&mut self, msg: Lookup, _ctx: &mut Context<Self>) -> Self::Result {
        if !self.is_linked(msg.from, msg.to) {
            return Err(DialError::Unreachable(msg.to));
        }
        match self.endpoints.get(&msg.to) {
            Some(endpoint) if endpoint.protocols.contains(&msg.protocol) => {
                Ok(endpoint.inbound.clone())
            }
            Some(_) => Err(DialError::UnsupportedProtocol(msg.protocol)),
            None => Err(DialError::Unreachable(msg.to)),
        }
    }
}

/// A peer's handle onto a [Switchboard].
#[derive(Clone)]
pub struct MemoryTransport {
    local: PeerId,
    switchboard: Addr<Switchboard>,
}

impl MemoryTransport {
    pub fn new(switchboard: Addr<Switchboard>) -> Self {
        MemoryTransport { local: PeerId::generate(), switchboard }
    }

    pub fn with_peer_id(local: PeerId, switchboard: Addr<Switchboard>) -> Self {
        MemoryTransport { local, switchboard }
    }
}

impl Transport for MemoryTransport {
    fn local_peer(&self) -> PeerId {
        self.local
    }

    fn dial(&self, peer: PeerId, protocol: Protocol) -> DialOutput {
        let local = self.local;
        let lookup = self.switchboard.send(Lookup { from: local, to: peer, protocol });
        Box::pin(async move {
            let inbound = lookup.await.map_err(|_| DialError::Unreachable(peer))??;
            let (local_end, mut remote_end) = tokio::io::duplex(STREAM_BUFFER);
            actix::spawn(async move {
                let mut buf = vec![];
                match read_message(&mut remote_end, &mut buf).await {
                    Ok(_) => {
                        let bytes = Bytes::from(buf);
                        let _ = inbound.do_send(Inbound { peer: local, protocol, bytes });
                    }
                    Err(err) => debug!("[{}] stream from {} failed: {}", "memory".yellow(), local, err),
                }
            });
            let stream: Stream = Box::new(local_end);
            Ok(stream)
        })
    }

    fn handle(
        &self,
        protocols: HashSet<Protocol>,
        inbound: Recipient<Inbound>,
        lifecycle: Recipient<ConnectionEvent>,
    ) -> HandleOutput {
        let register = self.switchboard.send(Register { peer: self.local, protocols, inbound, lifecycle });
        Box::pin(async move { register.await.map_err(Error::Actix) })
    }
}
