use super::codec::{self, Decode, Encode, U256_LEN};
use crate::address::{Address, MessageId, ADDRESS_LEN, MESSAGE_ID_LEN};
use crate::poe::ProofOfEntry;
use crate::util;
use crate::Result;

use bytes::{BufMut, Bytes, BytesMut};
use primitive_types::U256;

/// The application data of a delivery attempt, sent once a path has been confirmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payload {
    pub to: Address,
    pub from: Address,
    pub poe: [u8; 32],
    pub poe_nonce: u32,
    /// Creation time in unix seconds.
    pub time: u64,
    pub max_gas: U256,
    pub used_gas: U256,
    /// Content hash fixed at construction; relays never update it.
    pub message_id: MessageId,
    pub body: Bytes,
}

/// The caller-supplied part of a payload, see [Payload::expand].
#[derive(Debug, Clone)]
pub struct NewPayload {
    pub to: Address,
    pub from: Address,
    pub poe: ProofOfEntry,
    pub max_gas: U256,
    pub body: Bytes,
}

const HEADER_LEN: usize = 2 * ADDRESS_LEN + 32 + 4 + 8 + 2 * U256_LEN + MESSAGE_ID_LEN;

impl Payload {
    /// Stamps a new payload with the current time, zero used gas and its message id.
    pub fn expand(new: NewPayload) -> Payload {
        Payload::expand_at(new, util::unix_now())
    }

    pub fn expand_at(new: NewPayload, time: u64) -> Payload {
        let message_id =
            message_id(&new.from, &new.to, &new.poe.poe, new.poe.nonce, time, &new.max_gas, &new.body);
        Payload {
            to: new.to,
            from: new.from,
            poe: new.poe.poe,
            poe_nonce: new.poe.nonce,
            time,
            max_gas: new.max_gas,
            used_gas: U256::zero(),
            message_id,
            body: new.body,
        }
    }
}

/// `SHA-256(from || to || poe || poe_nonce(4) || time(8) || max_gas(32) || body)`
pub fn message_id(
    from: &Address,
    to: &Address,
    poe: &[u8; 32],
    poe_nonce: u32,
    time: u64,
    max_gas: &U256,
    body: &[u8],
) -> MessageId {
    let mut max_gas_bytes = [0u8; U256_LEN];
    max_gas.to_big_endian(&mut max_gas_bytes);
    MessageId::new(util::sha256(&[
        from.as_bytes(),
        to.as_bytes(),
        poe,
        &poe_nonce.to_be_bytes(),
        &time.to_be_bytes(),
        &max_gas_bytes,
        body,
    ]))
}

impl Encode for Payload {
    fn encode(&self, buf: &mut BytesMut) {
        buf.put_slice(self.to.as_bytes());
        buf.put_slice(self.from.as_bytes());
        buf.put_slice(&self.poe);
        buf.put_u32(self.poe_nonce);
        buf.put_u64(self.time);
        codec::put_u256(buf, &self.max_gas);
        codec::put_u256(buf, &self.used_gas);
        buf.put_slice(self.message_id.as_bytes());
        buf.put_slice(&self.body);
    }

    fn encoded_len(&self) -> usize {
        HEADER_LEN + self.body.len()
    }
}

impl Decode for Payload {
    fn decode(buf: &mut Bytes) -> Result<Self> {
        let to = codec::get_address(buf, "payload.to")?;
        let from = codec::get_address(buf, "payload.from")?;
        let poe = codec::get_bytes32(buf, "payload.poe")?;
        let poe_nonce = codec::get_u32(buf, "payload.poe_nonce")?;
        let time = codec::get_u64(buf, "payload.time")?;
        let max_gas = codec::get_u256(buf, "payload.max_gas")?;
        let used_gas = codec::get_u256(buf, "payload.used_gas")?;
        let message_id = codec::get_message_id(buf, "payload.message_id")?;
        // the body is whatever remains of the stream
        let body = buf.split_off(0);
        Ok(Payload { to, from, poe, poe_nonce, time, max_gas, used_gas, message_id, body })
    }
}
