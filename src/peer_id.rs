//! Transport peer handles.
//!
//! See the documentation of [PeerId] for details.

use std::convert::TryInto;
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;

use base58check::{FromBase58Check, ToBase58Check};
use rand::{self, Rng};

use crate::util;

/// Handle of a peer on the transport substrate.
///
/// The `PeerId` wraps a 32-byte hash and is independent of the account [Address] a node relays
/// for: the former selects a connection, the latter is what messages are addressed to.
///
/// They are displayed using the Base58check format.
///
/// [Address]: crate::address::Address
#[derive(Hash, Eq, PartialEq, Ord, PartialOrd, Copy, Clone, Serialize, Deserialize, Default)]
pub struct PeerId([u8; 32]);

impl std::fmt::Debug for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0.to_base58check(0))
    }
}

impl std::fmt::Display for PeerId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0.to_base58check(0))
    }
}

impl FromStr for PeerId {
    type Err = crate::Error;

    /// Converts a base58check encoded string to bytes of a PeerId
    fn from_str(id_str: &str) -> Result<Self, crate::Error> {
        let (vsn, bytes) =
            id_str.from_base58check().map_err(|_| crate::Error::TryFromStringError)?;
        if vsn != 0 {
            return Err(crate::Error::TryFromStringError);
        }
        let bytes: [u8; 32] =
            bytes.as_slice().try_into().map_err(|_| crate::Error::TryFromStringError)?;
        Ok(PeerId(bytes))
    }
}

impl PeerId {
    /// By default a new id is created by hashing an input byte slice
    pub fn new(bytes: &[u8]) -> PeerId {
        PeerId(util::hash(bytes))
    }

    /// Converts a `SocketAddr` into an *untrusted* identity.
    pub fn from_ip(ip: &SocketAddr) -> PeerId {
        PeerId::new(format!("{:?}", ip).as_bytes())
    }

    /// Generate a random `PeerId`
    pub fn generate() -> PeerId {
        let mut rng = rand::thread_rng();
        let v: [u8; 32] = rng.gen();
        PeerId(v)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}
