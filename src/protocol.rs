//! Protocol identifiers used to select the stream type at dial time.
//!
//! An id has the form `/malabar/<name>/<version>`; peers only exchange streams when both run
//! the same protocol version.
use crate::Error;

use std::fmt;

pub const PROTOCOL_VERSION: &str = "0.1.0";

const PROTOCOL_PREFIX: &str = "/malabar";

#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum Protocol {
    Payload,
    Route,
    RouteAck,
}

impl Protocol {
    pub const ALL: [Protocol; 3] = [Protocol::Payload, Protocol::Route, Protocol::RouteAck];

    pub fn name(&self) -> &'static str {
        match self {
            Protocol::Payload => "payload",
            Protocol::Route => "route",
            Protocol::RouteAck => "route-ack",
        }
    }

    /// The stream id of this protocol at `version`, e.g. `/malabar/route/0.1.0`.
    pub fn id(&self, version: &str) -> String {
        format!("{}/{}/{}", PROTOCOL_PREFIX, self.name(), version)
    }

    /// Resolves a stream id, accepting only ids of `version`.
    pub fn from_id(id: &str, version: &str) -> Result<Protocol, Error> {
        Protocol::ALL
            .iter()
            .find(|protocol| protocol.id(version) == id)
            .cloned()
            .ok_or_else(|| Error::UnknownProtocol(id.to_owned()))
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
