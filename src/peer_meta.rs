use crate::peer_id::PeerId;
use crate::{Error, Result};

use std::net::SocketAddr;

/// A peer reachable over TCP.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct PeerMetadata {
    /// The announced id of the peer, or the hash of its ip for plain `IP` descriptions.
    pub id: PeerId,
    /// The peers listening address.
    pub ip: SocketAddr,
}

impl PeerMetadata {
    pub fn new(id: PeerId, ip: SocketAddr) -> Self {
        PeerMetadata { id, ip }
    }

    /// Parse a peer description from the format `IP` or `ID@IP` to its ID and address
    pub fn from_id_and_ip(s: &str) -> Result<PeerMetadata> {
        let parts: Vec<&str> = s.split('@').collect();
        if parts.len() == 1 {
            let ip: SocketAddr = parts[0].parse().map_err(|_| Error::PeerParseError)?;
            let id = PeerId::from_ip(&ip);
            Ok(PeerMetadata { id, ip })
        } else if parts.len() == 2 {
            let id: PeerId = parts[0].parse().map_err(|_| Error::PeerParseError)?;
            let ip: SocketAddr = parts[1].parse().map_err(|_| Error::PeerParseError)?;
            Ok(PeerMetadata { id, ip })
        } else {
            Err(Error::PeerParseError)
        }
    }
}
