//! Wire messages of the relay protocol.
//!
//! All integers are big-endian and fixed width; the layouts are the network contract:
//!
//! ```text
//! Payload        to(20) from(20) poe(32) poe_nonce(4) time(8) max_gas(32) used_gas(32)
//!                message_id(32) body(remaining)
//! Route          message_id(32) to(20) from(20) gas_limit(32) gas_used(32) message_size(32)
//!                ttl(2) [TransportNode]*
//! RouteAck       message_id(32) [TransportNode]*
//! TransportNode  address(20) gas_used(32)
//! ```
//!
//! Exactly one message is carried per stream, so variable-length tails (the payload body and
//! the transport node list) run to the end of the buffer.
pub mod codec;
mod payload;
mod route;
mod route_ack;
mod transport_node;

pub use codec::{Decode, Encode};
pub use payload::{message_id, NewPayload, Payload};
pub use route::RouteMessage;
pub use route_ack::RouteAckMessage;
pub use transport_node::{TransportNode, TRANSPORT_NODE_LEN};
