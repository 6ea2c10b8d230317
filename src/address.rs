//! Account addresses and message identifiers.
//!
//! An [Address] is the 20-byte account identity carried in the `to`/`from` fields of the
//! wire messages; a [MessageId] is the 32-byte content hash correlating the route, route-ack
//! and payload legs of a single delivery attempt.

use std::convert::TryInto;
use std::fmt;
use std::str::FromStr;

use rand::{self, Rng};

pub const ADDRESS_LEN: usize = 20;
pub const MESSAGE_ID_LEN: usize = 32;

/// A 20-byte account address, displayed as `0x`-prefixed lowercase hex.
#[derive(Hash, Eq, PartialEq, Ord, PartialOrd, Copy, Clone, Serialize, Deserialize, Default)]
pub struct Address([u8; ADDRESS_LEN]);

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl FromStr for Address {
    type Err = crate::Error;

    /// Parses a hex address, with or without the `0x` prefix.
    fn from_str(s: &str) -> Result<Self, crate::Error> {
        let s = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(s)?;
        let bytes: [u8; ADDRESS_LEN] =
            bytes.as_slice().try_into().map_err(|_| crate::Error::TryFromStringError)?;
        Ok(Address(bytes))
    }
}

impl From<[u8; ADDRESS_LEN]> for Address {
    fn from(bytes: [u8; ADDRESS_LEN]) -> Self {
        Address(bytes)
    }
}

impl Address {
    pub fn new(bytes: [u8; ADDRESS_LEN]) -> Address {
        Address(bytes)
    }

    /// Takes the trailing 20 bytes of a 32-byte digest (the usual account derivation).
    pub fn from_digest(digest: &[u8; 32]) -> Address {
        let mut bytes = [0u8; ADDRESS_LEN];
        bytes.copy_from_slice(&digest[32 - ADDRESS_LEN..]);
        Address(bytes)
    }

    /// Generate a random `Address`
    pub fn generate() -> Address {
        let mut rng = rand::thread_rng();
        let v: [u8; ADDRESS_LEN] = rng.gen();
        Address(v)
    }

    pub fn zero() -> Address {
        Address([0u8; ADDRESS_LEN])
    }

    pub fn bytes(&self) -> [u8; ADDRESS_LEN] {
        self.0
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

/// A 32-byte message identifier.
#[derive(Hash, Eq, PartialEq, Ord, PartialOrd, Copy, Clone, Serialize, Deserialize, Default)]
pub struct MessageId([u8; MESSAGE_ID_LEN]);

impl fmt::Debug for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl From<[u8; MESSAGE_ID_LEN]> for MessageId {
    fn from(bytes: [u8; MESSAGE_ID_LEN]) -> Self {
        MessageId(bytes)
    }
}

impl MessageId {
    pub fn new(bytes: [u8; MESSAGE_ID_LEN]) -> MessageId {
        MessageId(bytes)
    }

    pub fn generate() -> MessageId {
        let mut rng = rand::thread_rng();
        let v: [u8; MESSAGE_ID_LEN] = rng.gen();
        MessageId(v)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Shortened form for log lines.
    pub fn short(&self) -> String {
        hex::encode(&self.0[..4])
    }
}
