use crate::address::MessageId;
use crate::message::Payload;
use crate::peer_id::PeerId;
use crate::protocol::Protocol;

use actix::Recipient;

use std::fmt;

/// Why a message stopped propagating at this node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DropReason {
    /// The gas budget or the hop budget ran out.
    ResourceExceeded,
    /// The route probe was already seen here.
    DuplicateMessage,
    /// No route or route-ack reservation exists for the message id.
    NoReservedPath,
    InvalidProofOfEntry,
}

impl fmt::Display for DropReason {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            DropReason::ResourceExceeded => write!(f, "resource exceeded"),
            DropReason::DuplicateMessage => write!(f, "duplicate message"),
            DropReason::NoReservedPath => write!(f, "no reserved path"),
            DropReason::InvalidProofOfEntry => write!(f, "invalid proof of entry"),
        }
    }
}

#[derive(Debug, Clone, Message)]
#[rtype(result = "()")]
pub enum RelayEvent {
    /// The first peer connected.
    Ready,
    Connection(PeerId),
    /// A frame was received from a peer.
    MessageTransport { peer: PeerId, protocol: Protocol },
    /// A route-ack confirmed the path for a payload this node originated, which is now sent.
    PathConfirmed { message_id: MessageId, next_hop: PeerId },
    /// A payload addressed to this node arrived.
    Delivered(Payload),
    Dropped { message_id: MessageId, reason: DropReason },
}

/// Registers a recipient for every subsequent [RelayEvent].
#[derive(Message)]
#[rtype(result = "()")]
pub struct Subscribe(pub Recipient<RelayEvent>);
