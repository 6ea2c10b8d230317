//! Identity providers backing a relay's account address.
//!
//! The address is produced by a signer that may live out of process, so [Signer::address]
//! is asynchronous and fallible even for the local implementations.

use crate::address::Address;
use crate::util;
use crate::{Error, Result};

use ed25519_dalek::Keypair;
use futures::future::{self, LocalBoxFuture};
use rand::rngs::OsRng;

pub trait Signer {
    fn address(&self) -> LocalBoxFuture<'static, Result<Address>>;
}

/// A signer holding an ed25519 keypair; the address is the tail of BLAKE2b-256(public key).
pub struct KeypairSigner {
    keypair: Keypair,
}

impl KeypairSigner {
    pub fn new(keypair: Keypair) -> Self {
        KeypairSigner { keypair }
    }

    pub fn generate() -> Self {
        let mut csprng = OsRng {};
        KeypairSigner { keypair: Keypair::generate(&mut csprng) }
    }

    /// Reads a hex encoded keypair (secret followed by public key).
    pub fn from_hex(keypair_hex: &str) -> Result<Self> {
        let keypair_bytes = hex::decode(keypair_hex)?;
        let keypair = Keypair::from_bytes(&keypair_bytes)?;
        Ok(KeypairSigner { keypair })
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.keypair.to_bytes())
    }

    pub fn derive_address(&self) -> Address {
        Address::from_digest(&util::hash(self.keypair.public.as_bytes()))
    }
}

impl Signer for KeypairSigner {
    fn address(&self) -> LocalBoxFuture<'static, Result<Address>> {
        Box::pin(future::ready(Ok(self.derive_address())))
    }
}

/// A signer with a fixed address, or none at all.
pub struct StaticSigner {
    address: Option<Address>,
}

impl StaticSigner {
    pub fn new(address: Address) -> Self {
        StaticSigner { address: Some(address) }
    }

    /// A signer that never yields an address.
    pub fn unavailable() -> Self {
        StaticSigner { address: None }
    }
}

impl Signer for StaticSigner {
    fn address(&self) -> LocalBoxFuture<'static, Result<Address>> {
        Box::pin(future::ready(self.address.ok_or(Error::IdentityUnavailable)))
    }
}
