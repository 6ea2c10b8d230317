//! Malabar: a gas-metered relay protocol over a peer-to-peer transport.
//!
//! A sender floods a `Route` probe towards a destination address, the destination picks the
//! cheapest candidate path and answers with a `RouteAck` that retraces it, and the sender then
//! pushes the `Payload` hop-by-hop along the reserved path.
#[macro_use]
extern crate serde_derive;
#[macro_use(Message, MessageResponse)]
extern crate actix_derive;
extern crate colored;

pub mod address;
pub mod identity;
pub mod integration_test;
pub mod message;
pub mod node;
pub mod peer_id;
pub mod peer_meta;
pub mod poe;
pub mod protocol;
pub mod relay;
pub mod settings;
pub mod transport;
pub mod util;

#[derive(Debug)]
pub enum Error {
    IO(std::io::Error),
    Dalek(ed25519_dalek::ed25519::Error),
    Actix(actix::MailboxError),
    Hex(hex::FromHexError),
    Bincode(String),
    Config(String),
    /// A blocking task panicked or was cancelled.
    Task(String),

    // codec errors
    /// The buffer ended before a field of the declared layout could be read.
    MalformedMessage { field: &'static str, expected: usize, remaining: usize },
    /// A stream was opened for a protocol id this node does not know.
    UnknownProtocol(String),

    // transport errors
    Dial(transport::DialError),

    // relay errors
    /// No nonce in the 32-bit space meets the configured difficulty.
    ProofOfEntryUnsolvable,

    // identity errors
    /// The identity provider could not produce an address.
    IdentityUnavailable,
    /// Error caused by converting from a `String` to an `Id` or `Address`
    TryFromStringError,
    /// Error when parsing a peer description `ID@IP`
    PeerParseError,
}

impl std::error::Error for Error {}

impl std::convert::From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Error::IO(error)
    }
}

impl std::convert::From<ed25519_dalek::ed25519::Error> for Error {
    fn from(error: ed25519_dalek::ed25519::Error) -> Self {
        Error::Dalek(error)
    }
}

impl std::convert::From<actix::MailboxError> for Error {
    fn from(error: actix::MailboxError) -> Self {
        Error::Actix(error)
    }
}

impl std::convert::From<hex::FromHexError> for Error {
    fn from(error: hex::FromHexError) -> Self {
        Error::Hex(error)
    }
}

impl std::convert::From<Box<bincode::ErrorKind>> for Error {
    fn from(error: Box<bincode::ErrorKind>) -> Self {
        Error::Bincode(format!("{:?}", error))
    }
}

impl std::convert::From<config::ConfigError> for Error {
    fn from(error: config::ConfigError) -> Self {
        Error::Config(format!("{}", error))
    }
}

impl std::convert::From<tokio::task::JoinError> for Error {
    fn from(error: tokio::task::JoinError) -> Self {
        Error::Task(format!("{}", error))
    }
}

impl std::convert::From<transport::DialError> for Error {
    fn from(error: transport::DialError) -> Self {
        Error::Dial(error)
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
