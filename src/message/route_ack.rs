use super::codec::{self, Decode, Encode};
use super::transport_node::{decode_transport_nodes, encode_transport_nodes, TransportNode};
use super::transport_node::TRANSPORT_NODE_LEN;
use crate::address::{MessageId, MESSAGE_ID_LEN};
use crate::Result;

use bytes::{BufMut, Bytes, BytesMut};

/// Reverse-path confirmation, built once by the destination from the cheapest route candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteAckMessage {
    pub message_id: MessageId,
    pub transport_nodes: Vec<TransportNode>,
}

impl RouteAckMessage {
    pub fn new(message_id: MessageId, transport_nodes: Vec<TransportNode>) -> Self {
        RouteAckMessage { message_id, transport_nodes }
    }
}

impl Encode for RouteAckMessage {
    fn encode(&self, buf: &mut BytesMut) {
        buf.put_slice(self.message_id.as_bytes());
        encode_transport_nodes(&self.transport_nodes, buf);
    }

    fn encoded_len(&self) -> usize {
        MESSAGE_ID_LEN + self.transport_nodes.len() * TRANSPORT_NODE_LEN
    }
}

impl Decode for RouteAckMessage {
    fn decode(buf: &mut Bytes) -> Result<Self> {
        let message_id = codec::get_message_id(buf, "route_ack.message_id")?;
        let transport_nodes = decode_transport_nodes(buf)?;
        Ok(RouteAckMessage { message_id, transport_nodes })
    }
}
