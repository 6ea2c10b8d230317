use super::codec::{self, Decode, Encode, U256_LEN};
use super::payload::Payload;
use super::transport_node::{decode_transport_nodes, encode_transport_nodes, TransportNode};
use super::transport_node::TRANSPORT_NODE_LEN;
use crate::address::{Address, MessageId, ADDRESS_LEN, MESSAGE_ID_LEN};
use crate::Result;

use bytes::{BufMut, Bytes, BytesMut};
use primitive_types::U256;

/// Flood-propagated path discovery probe.
///
/// Created by the sender with `gas_used = 0` and no transport nodes; every relay that is not
/// the destination appends itself, adds its cost to `gas_used` and decrements `ttl`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMessage {
    pub message_id: MessageId,
    pub to: Address,
    pub from: Address,
    pub gas_limit: U256,
    pub gas_used: U256,
    pub message_size: U256,
    pub ttl: u16,
    pub transport_nodes: Vec<TransportNode>,
}

const HEADER_LEN: usize = MESSAGE_ID_LEN + 2 * ADDRESS_LEN + 3 * U256_LEN + 2;

impl RouteMessage {
    /// Derives the discovery probe for a payload this node is about to send.
    pub fn for_payload(payload: &Payload, ttl: u16) -> Self {
        RouteMessage {
            message_id: payload.message_id,
            to: payload.to,
            from: payload.from,
            gas_limit: payload.max_gas,
            gas_used: U256::zero(),
            message_size: U256::from(payload.encoded_len()),
            ttl,
            transport_nodes: vec![],
        }
    }
}

impl Encode for RouteMessage {
    fn encode(&self, buf: &mut BytesMut) {
        buf.put_slice(self.message_id.as_bytes());
        buf.put_slice(self.to.as_bytes());
        buf.put_slice(self.from.as_bytes());
        codec::put_u256(buf, &self.gas_limit);
        codec::put_u256(buf, &self.gas_used);
        codec::put_u256(buf, &self.message_size);
        buf.put_u16(self.ttl);
        encode_transport_nodes(&self.transport_nodes, buf);
    }

    fn encoded_len(&self) -> usize {
        HEADER_LEN + self.transport_nodes.len() * TRANSPORT_NODE_LEN
    }
}

impl Decode for RouteMessage {
    fn decode(buf: &mut Bytes) -> Result<Self> {
        let message_id = codec::get_message_id(buf, "route.message_id")?;
        let to = codec::get_address(buf, "route.to")?;
        let from = codec::get_address(buf, "route.from")?;
        let gas_limit = codec::get_u256(buf, "route.gas_limit")?;
        let gas_used = codec::get_u256(buf, "route.gas_used")?;
        let message_size = codec::get_u256(buf, "route.message_size")?;
        let ttl = codec::get_u16(buf, "route.ttl")?;
        let transport_nodes = decode_transport_nodes(buf)?;
        Ok(RouteMessage {
            message_id,
            to,
            from,
            gas_limit,
            gas_used,
            message_size,
            ttl,
            transport_nodes,
        })
    }
}
