use super::aggregation::Aggregation;
use super::config::RelayConfig;
use super::events::{DropReason, RelayEvent, Subscribe};
use super::gas::{GasCost, MessageSizeCost};

use crate::address::{Address, MessageId};
use crate::colored::Colorize;
use crate::identity::Signer;
use crate::message::{Decode, Encode, NewPayload, Payload, RouteAckMessage, RouteMessage};
use crate::message::TransportNode;
use crate::peer_id::PeerId;
use crate::poe;
use crate::protocol::Protocol;
use crate::transport::{self, ConnectionEvent, Inbound, Transport};
use crate::{Error, Result};

use actix::{Actor, ActorContext, AsyncContext, Context, Handler, MessageResult, Recipient};
use actix::{fut, ActorFutureExt, ResponseActFuture, WrapFuture};
use bytes::Bytes;
use primitive_types::U256;
use tracing::{debug, error, info, warn};

use std::collections::{HashMap, HashSet};
use std::rc::Rc;

/// One relay node.
///
/// Every frame, lifecycle event, request and timer is handled on the actor's turn, so the four
/// routing tables below are never touched concurrently. All of them are keyed by message id and
/// an entry lives for exactly one delivery attempt.
pub struct Relay {
    config: RelayConfig,
    signer: Box<dyn Signer>,
    transport: Rc<dyn Transport>,
    gas_cost: Box<dyn GasCost>,
    /// Resolved from the signer before the first frame is handled.
    address: Option<Address>,
    /// Connected peers and the protocols they handle.
    peers: HashMap<PeerId, HashSet<Protocol>>,
    ready: bool,
    subscribers: Vec<Recipient<RelayEvent>>,
    /// The peer that most recently forwarded a route probe here.
    route_message_origins: HashMap<MessageId, PeerId>,
    /// The peer a route-ack came from, which is where the payload goes next.
    route_ack_message_origins: HashMap<MessageId, PeerId>,
    /// Candidates collected while this node is the destination.
    route_messages: HashMap<MessageId, Aggregation>,
    /// Payloads originated here that wait for a route-ack.
    outgoing_messages: HashMap<MessageId, Payload>,
}

impl Relay {
    pub fn new(config: RelayConfig, signer: Box<dyn Signer>, transport: Rc<dyn Transport>) -> Self {
        Relay {
            config,
            signer,
            transport,
            gas_cost: Box::new(MessageSizeCost),
            address: None,
            peers: HashMap::default(),
            ready: false,
            subscribers: vec![],
            route_message_origins: HashMap::default(),
            route_ack_message_origins: HashMap::default(),
            route_messages: HashMap::default(),
            outgoing_messages: HashMap::default(),
        }
    }

    pub fn with_gas_cost(mut self, gas_cost: Box<dyn GasCost>) -> Self {
        self.gas_cost = gas_cost;
        self
    }

    fn publish(&self, event: RelayEvent) {
        for subscriber in self.subscribers.iter() {
            let _ = subscriber.do_send(event.clone());
        }
    }

    fn drop_message(&self, message_id: MessageId, reason: DropReason) {
        debug!("[{}] dropped {}: {}", "relay".cyan(), message_id.short(), reason);
        self.publish(RelayEvent::Dropped { message_id, reason });
    }

    /// Sends one message to `peer`. A failed dial only means the peer is skipped.
    fn send_to(&self, ctx: &mut Context<Self>, peer: PeerId, protocol: Protocol, bytes: Bytes) {
        let dial = self.transport.dial(peer, protocol);
        let send = transport::send_message(dial, bytes).into_actor(self).map(
            move |result, _actor, _ctx| {
                if let Err(err) = result {
                    debug!("[{}] skipped {} for {}: {}", "relay".cyan(), peer, protocol, err);
                }
            },
        );
        ctx.spawn(send);
    }

    /// Sends to every connected peer handling `protocol`, except `except`.
    fn flood(
        &self,
        ctx: &mut Context<Self>,
        protocol: Protocol,
        bytes: Bytes,
        except: Option<PeerId>,
    ) -> usize {
        let targets: Vec<PeerId> = self
            .peers
            .iter()
            .filter(|(peer, protocols)| Some(**peer) != except && protocols.contains(&protocol))
            .map(|(peer, _)| *peer)
            .collect();
        for peer in targets.iter() {
            self.send_to(ctx, *peer, protocol, bytes.clone());
        }
        targets.len()
    }

    fn initiate(&mut self, ctx: &mut Context<Self>, payload: Payload) -> MessageId {
        let message_id = payload.message_id;
        let route = RouteMessage::for_payload(&payload, self.config.default_ttl);
        let _ = self.outgoing_messages.insert(message_id, payload);
        let n = self.flood(ctx, Protocol::Route, route.to_bytes(), None);
        info!(
            "[{}] initiated {} to {} (flooded to {} peers)",
            "relay".cyan(),
            message_id.short(),
            route.to,
            n
        );
        message_id
    }

    fn on_route_message(
        &mut self,
        ctx: &mut Context<Self>,
        mut route: RouteMessage,
        from_peer: PeerId,
        me: Address,
    ) {
        let message_id = route.message_id;
        let is_destination = route.to == me;
        if is_destination {
            let aggregation = self.route_messages.entry(message_id).or_insert_with(Aggregation::new);
            let arrivals = aggregation.push(route.clone(), from_peer);
            debug!(
                "[{}] candidate #{} for {} with gas {}",
                "relay".cyan(),
                arrivals,
                message_id.short(),
                route.gas_used
            );
            if arrivals == 1 {
                ctx.notify_later(
                    CheckAggregation { message_id, arrivals },
                    self.config.aggregation_window(),
                );
            }
        } else {
            if self.route_message_origins.contains_key(&message_id)
                || self.outgoing_messages.contains_key(&message_id)
            {
                self.drop_message(message_id, DropReason::DuplicateMessage);
                return;
            }
            let cost = self.gas_cost.cost(&route);
            match route.gas_used.checked_add(cost) {
                Some(gas_used) if gas_used <= route.gas_limit => route.gas_used = gas_used,
                _ => {
                    self.drop_message(message_id, DropReason::ResourceExceeded);
                    return;
                }
            }
            route.transport_nodes.push(TransportNode::new(me, cost));
        }

        let _ = self.route_message_origins.insert(message_id, from_peer);
        route.ttl = route.ttl.saturating_sub(1);
        if route.ttl == 0 {
            if !is_destination {
                self.drop_message(message_id, DropReason::ResourceExceeded);
            }
            return;
        }
        let _ = self.flood(ctx, Protocol::Route, route.to_bytes(), Some(from_peer));
    }

    fn on_route_ack_message(
        &mut self,
        ctx: &mut Context<Self>,
        ack: RouteAckMessage,
        from_peer: PeerId,
    ) {
        let message_id = ack.message_id;
        if let Some(payload) = self.outgoing_messages.remove(&message_id) {
            info!(
                "[{}] path for {} confirmed over {} hops",
                "relay".cyan(),
                message_id.short(),
                ack.transport_nodes.len()
            );
            self.send_to(ctx, from_peer, Protocol::Payload, payload.to_bytes());
            self.publish(RelayEvent::PathConfirmed { message_id, next_hop: from_peer });
            return;
        }
        match self.route_message_origins.remove(&message_id) {
            Some(origin) => {
                let _ = self.route_ack_message_origins.insert(message_id, from_peer);
                self.send_to(ctx, origin, Protocol::RouteAck, ack.to_bytes());
            }
            None => self.drop_message(message_id, DropReason::NoReservedPath),
        }
    }

    fn on_payload_message(
        &mut self,
        ctx: &mut Context<Self>,
        payload: Payload,
        _from_peer: PeerId,
        me: Address,
    ) {
        let message_id = payload.message_id;
        if self.config.enforce_proof_of_entry
            && !poe::verify_with_difficulty(
                &payload.poe,
                &payload.from,
                payload.poe_nonce,
                self.config.poe_difficulty,
            )
        {
            self.drop_message(message_id, DropReason::InvalidProofOfEntry);
            return;
        }
        if payload.to == me {
            info!(
                "[{}] delivered {} from {}: {}",
                "relay".cyan(),
                message_id.short(),
                payload.from,
                String::from_utf8_lossy(&payload.body)
            );
            self.publish(RelayEvent::Delivered(payload));
            return;
        }
        match self.route_ack_message_origins.remove(&message_id) {
            Some(next_hop) => self.send_to(ctx, next_hop, Protocol::Payload, payload.to_bytes()),
            None => self.drop_message(message_id, DropReason::NoReservedPath),
        }
    }
}

impl Actor for Relay {
    type Context = Context<Self>;

    fn started(&mut self, ctx: &mut Context<Self>) {
        let address = self.signer.address();
        let protocols = Protocol::ALL.iter().cloned().collect();
        let handle =
            self.transport.handle(protocols, ctx.address().recipient(), ctx.address().recipient());
        let start = async move {
            let address = address.await?;
            handle.await?;
            Ok::<Address, Error>(address)
        };
        // No frame is handled before the address is known.
        ctx.wait(start.into_actor(self).map(|result, actor, ctx| match result {
            Ok(address) => {
                info!(
                    "[{}] {} started as {}",
                    "relay".cyan(),
                    actor.transport.local_peer(),
                    address
                );
                actor.address = Some(address);
            }
            Err(err) => {
                error!("[{}] failed to start: {:?}", "relay".cyan(), err);
                ctx.stop();
            }
        }));
    }
}

impl Handler<Inbound> for Relay {
    type Result = ();

    fn handle(&mut self, msg: Inbound, ctx: &mut Context<Self>) -> Self::Result {
        let me = match self.address {
            Some(address) => address,
            None => return,
        };
        let (peer, protocol, mut bytes) = (msg.peer, msg.protocol, msg.bytes);
        self.publish(RelayEvent::MessageTransport { peer, protocol });
        let decoded = match protocol {
            Protocol::Route => {
                RouteMessage::decode(&mut bytes).map(|route| self.on_route_message(ctx, route, peer, me))
            }
            Protocol::RouteAck => {
                RouteAckMessage::decode(&mut bytes).map(|ack| self.on_route_ack_message(ctx, ack, peer))
            }
            Protocol::Payload => Payload::decode(&mut bytes)
                .map(|payload| self.on_payload_message(ctx, payload, peer, me)),
        };
        if let Err(err) = decoded {
            warn!("[{}] bad {} frame from {}: {:?}", "relay".cyan(), protocol, peer, err);
        }
    }
}

impl Handler<ConnectionEvent> for Relay {
    type Result = ();

    fn handle(&mut self, msg: ConnectionEvent, _ctx: &mut Context<Self>) -> Self::Result {
        match msg {
            ConnectionEvent::Connected { peer, protocols } => {
                debug!("[{}] connected to {}", "relay".cyan(), peer);
                let _ = self.peers.insert(peer, protocols);
                self.publish(RelayEvent::Connection(peer));
                if !self.ready {
                    self.ready = true;
                    self.publish(RelayEvent::Ready);
                }
            }
            ConnectionEvent::Disconnected { peer } => {
                debug!("[{}] disconnected from {}", "relay".cyan(), peer);
                let _ = self.peers.remove(&peer);
            }
        }
    }
}

/// Fires once the aggregation window for `message_id` has passed.
#[derive(Debug, Clone, Message)]
#[rtype(result = "()")]
pub struct CheckAggregation {
    message_id: MessageId,
    /// The arrival count when the check was scheduled.
    arrivals: u64,
}

impl Handler<CheckAggregation> for Relay {
    type Result = ();

    fn handle(&mut self, msg: CheckAggregation, ctx: &mut Context<Self>) -> Self::Result {
        let arrivals = match self.route_messages.get(&msg.message_id) {
            Some(aggregation) => aggregation.arrivals(),
            None => return,
        };
        if arrivals != msg.arrivals {
            // more candidates arrived during the window, wait for it to go quiet
            let check = CheckAggregation { message_id: msg.message_id, arrivals };
            ctx.notify_later(check, self.config.aggregation_window());
            return;
        }
        let aggregation = match self.route_messages.remove(&msg.message_id) {
            Some(aggregation) => aggregation,
            None => return,
        };
        let candidates = aggregation.len();
        if let Some((route, peer)) = aggregation.into_cheapest() {
            info!(
                "[{}] selected path for {} with gas {} out of {} candidates",
                "relay".cyan(),
                route.message_id.short(),
                route.gas_used,
                candidates
            );
            let ack = RouteAckMessage::new(route.message_id, route.transport_nodes);
            self.send_to(ctx, peer, Protocol::RouteAck, ack.to_bytes());
        }
    }
}

/// Sends an already built payload: floods its route probe and keeps the payload until a
/// route-ack confirms a path.
#[derive(Debug, Clone, Message)]
#[rtype(result = "MessageId")]
pub struct Initiate {
    pub payload: Payload,
}

impl Handler<Initiate> for Relay {
    type Result = MessageResult<Initiate>;

    fn handle(&mut self, msg: Initiate, ctx: &mut Context<Self>) -> Self::Result {
        MessageResult(self.initiate(ctx, msg.payload))
    }
}

/// Builds a payload from this node's address, solving the proof-of-entry, and initiates it.
///
/// The proof-of-entry is solved on the blocking pool; the relay keeps handling frames meanwhile.
#[derive(Debug, Clone, Message)]
#[rtype(result = "Result<MessageId>")]
pub struct Dispatch {
    pub to: Address,
    pub body: Bytes,
    pub max_gas: U256,
}

impl Handler<Dispatch> for Relay {
    type Result = ResponseActFuture<Self, Result<MessageId>>;

    fn handle(&mut self, msg: Dispatch, _ctx: &mut Context<Self>) -> Self::Result {
        let from = match self.address {
            Some(address) => address,
            None => return Box::pin(fut::ready(Err(Error::IdentityUnavailable))),
        };
        let difficulty = self.config.poe_difficulty;
        let solve = tokio::task::spawn_blocking(move || poe::solve(&from, difficulty));
        Box::pin(solve.into_actor(self).map(move |solved, actor, ctx| -> Result<MessageId> {
            let poe = solved?.ok_or(Error::ProofOfEntryUnsolvable)?;
            let new = NewPayload { to: msg.to, from, poe, max_gas: msg.max_gas, body: msg.body };
            Ok(actor.initiate(ctx, Payload::expand(new)))
        }))
    }
}

impl Handler<Subscribe> for Relay {
    type Result = ();

    fn handle(&mut self, msg: Subscribe, _ctx: &mut Context<Self>) -> Self::Result {
        self.subscribers.push(msg.0);
    }
}

#[derive(Debug, Clone, Message)]
#[rtype(result = "Vec<PeerId>")]
pub struct GetPeers;

impl Handler<GetPeers> for Relay {
    type Result = MessageResult<GetPeers>;

    fn handle(&mut self, _msg: GetPeers, _ctx: &mut Context<Self>) -> Self::Result {
        MessageResult(self.peers.keys().cloned().collect())
    }
}

#[derive(Debug, Clone, Message)]
#[rtype(result = "Identity")]
pub struct GetIdentity;

#[derive(Debug, Clone, PartialEq, Eq, MessageResponse)]
pub struct Identity {
    pub peer: PeerId,
    pub address: Option<Address>,
}

impl Handler<GetIdentity> for Relay {
    type Result = Identity;

    fn handle(&mut self, _msg: GetIdentity, _ctx: &mut Context<Self>) -> Self::Result {
        Identity { peer: self.transport.local_peer(), address: self.address }
    }
}

#[derive(Debug, Clone, Message)]
#[rtype(result = "bool")]
pub struct IsReady;

impl Handler<IsReady> for Relay {
    type Result = bool;

    fn handle(&mut self, _msg: IsReady, _ctx: &mut Context<Self>) -> Self::Result {
        self.ready
    }
}

#[derive(Debug, Clone, Message)]
#[rtype(result = "RelayStats")]
pub struct GetStats;

/// Sizes of the routing tables.
#[derive(Debug, Clone, Default, PartialEq, Eq, MessageResponse)]
pub struct RelayStats {
    pub peers: usize,
    pub route_message_origins: usize,
    pub route_ack_message_origins: usize,
    /// Message ids this node is aggregating candidates for.
    pub pending_aggregations: usize,
    pub outgoing_messages: usize,
}

impl Handler<GetStats> for Relay {
    type Result = RelayStats;

    fn handle(&mut self, _msg: GetStats, _ctx: &mut Context<Self>) -> Self::Result {
        RelayStats {
            peers: self.peers.len(),
            route_message_origins: self.route_message_origins.len(),
            route_ack_message_origins: self.route_ack_message_origins.len(),
            pending_aggregations: self.route_messages.len(),
            outgoing_messages: self.outgoing_messages.len(),
        }
    }
}

#[cfg(test)]
mod relay_tests;
