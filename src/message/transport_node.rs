use super::codec::{self, Encode, U256_LEN};
use crate::address::{Address, ADDRESS_LEN};
use crate::Result;

use bytes::{Buf, BufMut, Bytes, BytesMut};
use primitive_types::U256;

/// One hop already traversed by a route candidate: the relay's address and the gas it charged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportNode {
    pub address: Address,
    pub gas_used: U256,
}

pub const TRANSPORT_NODE_LEN: usize = ADDRESS_LEN + U256_LEN;

impl TransportNode {
    pub fn new(address: Address, gas_used: U256) -> Self {
        TransportNode { address, gas_used }
    }

    pub fn decode(buf: &mut Bytes) -> Result<TransportNode> {
        let address = codec::get_address(buf, "transport_node.address")?;
        let gas_used = codec::get_u256(buf, "transport_node.gas_used")?;
        Ok(TransportNode { address, gas_used })
    }
}

impl Encode for TransportNode {
    fn encode(&self, buf: &mut BytesMut) {
        buf.put_slice(self.address.as_bytes());
        codec::put_u256(buf, &self.gas_used);
    }

    fn encoded_len(&self) -> usize {
        TRANSPORT_NODE_LEN
    }
}

/// Decodes transport nodes until the buffer is exhausted.
pub fn decode_transport_nodes(buf: &mut Bytes) -> Result<Vec<TransportNode>> {
    let mut nodes = Vec::with_capacity(buf.remaining() / TRANSPORT_NODE_LEN);
    while buf.has_remaining() {
        nodes.push(TransportNode::decode(buf)?);
    }
    Ok(nodes)
}

pub fn encode_transport_nodes(nodes: &[TransportNode], buf: &mut BytesMut) {
    for node in nodes.iter() {
        node.encode(buf);
    }
}
