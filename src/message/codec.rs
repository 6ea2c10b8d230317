//! Fixed-layout big-endian field codec shared by the message types.
//!
//! Every integer is written at a fixed width; the 256-bit gas fields always take 32 bytes
//! regardless of their magnitude.

use crate::address::{Address, MessageId, ADDRESS_LEN, MESSAGE_ID_LEN};
use crate::{Error, Result};

use bytes::{Buf, BufMut, Bytes, BytesMut};
use primitive_types::U256;

pub const U256_LEN: usize = 32;

/// A message with a deterministic binary layout.
pub trait Encode {
    fn encode(&self, buf: &mut BytesMut);

    fn encoded_len(&self) -> usize;

    fn to_bytes(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(self.encoded_len());
        self.encode(&mut buf);
        buf.freeze()
    }
}

pub trait Decode: Sized {
    /// Decodes a message, consuming the whole buffer.
    fn decode(buf: &mut Bytes) -> Result<Self>;

    fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut buf = Bytes::copy_from_slice(bytes);
        Self::decode(&mut buf)
    }
}

fn ensure(buf: &Bytes, field: &'static str, expected: usize) -> Result<()> {
    if buf.remaining() < expected {
        Err(Error::MalformedMessage { field, expected, remaining: buf.remaining() })
    } else {
        Ok(())
    }
}

pub fn get_address(buf: &mut Bytes, field: &'static str) -> Result<Address> {
    ensure(buf, field, ADDRESS_LEN)?;
    let mut bytes = [0u8; ADDRESS_LEN];
    buf.copy_to_slice(&mut bytes);
    Ok(Address::new(bytes))
}

pub fn get_message_id(buf: &mut Bytes, field: &'static str) -> Result<MessageId> {
    ensure(buf, field, MESSAGE_ID_LEN)?;
    let mut bytes = [0u8; MESSAGE_ID_LEN];
    buf.copy_to_slice(&mut bytes);
    Ok(MessageId::new(bytes))
}

pub fn get_bytes32(buf: &mut Bytes, field: &'static str) -> Result<[u8; 32]> {
    ensure(buf, field, 32)?;
    let mut bytes = [0u8; 32];
    buf.copy_to_slice(&mut bytes);
    Ok(bytes)
}

pub fn get_u256(buf: &mut Bytes, field: &'static str) -> Result<U256> {
    ensure(buf, field, U256_LEN)?;
    let value = U256::from_big_endian(&buf[..U256_LEN]);
    buf.advance(U256_LEN);
    Ok(value)
}

pub fn get_u64(buf: &mut Bytes, field: &'static str) -> Result<u64> {
    ensure(buf, field, 8)?;
    Ok(buf.get_u64())
}

pub fn get_u32(buf: &mut Bytes, field: &'static str) -> Result<u32> {
    ensure(buf, field, 4)?;
    Ok(buf.get_u32())
}

pub fn get_u16(buf: &mut Bytes, field: &'static str) -> Result<u16> {
    ensure(buf, field, 2)?;
    Ok(buf.get_u16())
}

pub fn put_u256(buf: &mut BytesMut, value: &U256) {
    let mut bytes = [0u8; U256_LEN];
    value.to_big_endian(&mut bytes);
    buf.put_slice(&bytes);
}
