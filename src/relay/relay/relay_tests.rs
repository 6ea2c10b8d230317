//! Tests for the relay state machine, driven by scripted fake peers on a switchboard.

use super::*;

use crate::identity::StaticSigner;
use crate::message::TRANSPORT_NODE_LEN;
use crate::relay::testing::{Recorded, Recorder, TakeEvents};
use crate::relay::FlatCost;
use crate::transport::memory::{Link, Unlink};
use crate::transport::testing::{Drain, Drained, Sink};
use crate::transport::{send_message, MemoryTransport, Switchboard};

use actix::Addr;
use futures::future::{self, Either};

async fn sleep_ms(m: u64) {
    tokio::time::sleep(std::time::Duration::from_millis(m)).await;
}

fn test_config() -> RelayConfig {
    RelayConfig { aggregation_window_ms: 200, ..RelayConfig::default() }
}

/// A relay under test with its identity and event log.
struct Node {
    addr: Addr<Relay>,
    peer: PeerId,
    address: Address,
    recorder: Addr<Recorder>,
}

impl Node {
    async fn start(
        switchboard: &Addr<Switchboard>,
        config: RelayConfig,
        gas_cost: Box<dyn GasCost>,
    ) -> Node {
        Node::start_as(switchboard, config, gas_cost, Address::generate()).await
    }

    async fn start_as(
        switchboard: &Addr<Switchboard>,
        config: RelayConfig,
        gas_cost: Box<dyn GasCost>,
        address: Address,
    ) -> Node {
        let transport = MemoryTransport::new(switchboard.clone());
        let peer = transport.local_peer();
        let relay = Relay::new(config, Box::new(StaticSigner::new(address)), Rc::new(transport))
            .with_gas_cost(gas_cost);
        let addr = relay.start();
        let recorder = Recorder::default().start();
        addr.send(Subscribe(recorder.clone().recipient())).await.unwrap();
        let identity = addr.send(GetIdentity).await.unwrap();
        assert_eq!(identity, Identity { peer, address: Some(address) });
        Node { addr, peer, address, recorder }
    }

    async fn events(&self) -> Vec<RelayEvent> {
        let Recorded(events) = self.recorder.send(TakeEvents).await.unwrap();
        events
    }

    async fn drops(&self) -> Vec<DropReason> {
        self.events()
            .await
            .into_iter()
            .filter_map(|event| match event {
                RelayEvent::Dropped { reason, .. } => Some(reason),
                _ => None,
            })
            .collect()
    }

    async fn stats(&self) -> RelayStats {
        self.addr.send(GetStats).await.unwrap()
    }
}

/// A scripted peer that speaks the wire protocol directly.
struct FakePeer {
    transport: MemoryTransport,
    sink: Addr<Sink>,
}

impl FakePeer {
    async fn start(switchboard: &Addr<Switchboard>) -> FakePeer {
        let transport = MemoryTransport::new(switchboard.clone());
        let sink = Sink::default().start();
        let protocols = Protocol::ALL.iter().cloned().collect();
        transport.handle(protocols, sink.clone().recipient(), sink.clone().recipient()).await.unwrap();
        FakePeer { transport, sink }
    }

    fn peer(&self) -> PeerId {
        self.transport.local_peer()
    }

    async fn send<M: Encode>(&self, to: PeerId, protocol: Protocol, msg: &M) {
        send_message(self.transport.dial(to, protocol), msg.to_bytes()).await.unwrap();
    }

    async fn frames(&self, protocol: Protocol) -> Vec<Bytes> {
        let Drained(frames, _) = self.sink.send(Drain).await.unwrap();
        frames.into_iter().filter(|frame| frame.protocol == protocol).map(|frame| frame.bytes).collect()
    }

    async fn routes(&self) -> Vec<RouteMessage> {
        let frames = self.frames(Protocol::Route).await;
        frames.iter().map(|bytes| RouteMessage::from_bytes(bytes).unwrap()).collect()
    }

    async fn acks(&self) -> Vec<RouteAckMessage> {
        let frames = self.frames(Protocol::RouteAck).await;
        frames.iter().map(|bytes| RouteAckMessage::from_bytes(bytes).unwrap()).collect()
    }

    async fn payloads(&self) -> Vec<Payload> {
        let frames = self.frames(Protocol::Payload).await;
        frames.iter().map(|bytes| Payload::from_bytes(bytes).unwrap()).collect()
    }
}

async fn link(switchboard: &Addr<Switchboard>, a: PeerId, b: PeerId) {
    switchboard.send(Link { a, b }).await.unwrap().unwrap();
}

fn payload(from: Address, to: Address, body: &'static [u8]) -> Payload {
    let poe = poe::solve(&from, poe::CURRENT_DIFFICULTY).unwrap();
    Payload::expand(NewPayload {
        to,
        from,
        poe,
        max_gas: U256::from(1_000_000),
        body: Bytes::from_static(body),
    })
}

fn route(to: Address, gas_limit: u64, ttl: u16) -> RouteMessage {
    RouteMessage {
        message_id: MessageId::generate(),
        to,
        from: Address::generate(),
        gas_limit: U256::from(gas_limit),
        gas_used: U256::zero(),
        message_size: U256::from(60),
        ttl,
        transport_nodes: vec![],
    }
}

#[actix_rt::test]
async fn test_gas_limit_stops_the_flood() {
    let switchboard = Switchboard::new().start();
    let flat = || -> Box<dyn GasCost> { Box::new(FlatCost(U256::from(60))) };
    let r1 = Node::start(&switchboard, test_config(), flat()).await;
    let r2 = Node::start(&switchboard, test_config(), flat()).await;
    let r3 = Node::start(&switchboard, test_config(), flat()).await;
    let sender = FakePeer::start(&switchboard).await;
    let observer = FakePeer::start(&switchboard).await;
    link(&switchboard, sender.peer(), r1.peer).await;
    link(&switchboard, r1.peer, r2.peer).await;
    link(&switchboard, r2.peer, r3.peer).await;
    link(&switchboard, r1.peer, observer.peer()).await;

    let discovery = route(Address::generate(), 100, 10);
    sender.send(r1.peer, Protocol::Route, &discovery).await;
    sleep_ms(100).await;

    // hop 1 charged 60 and forwarded
    let routes = observer.routes().await;
    assert_eq!(routes.len(), 1);
    assert_eq!(routes[0].message_id, discovery.message_id);
    assert_eq!(routes[0].gas_used, U256::from(60));
    assert_eq!(routes[0].ttl, 9);
    assert_eq!(routes[0].transport_nodes, vec![TransportNode::new(r1.address, U256::from(60))]);
    assert_eq!(routes[0].encoded_len(), discovery.encoded_len() + TRANSPORT_NODE_LEN);

    // hop 2 would reach 120 > 100
    assert_eq!(r2.drops().await, vec![DropReason::ResourceExceeded]);
    assert_eq!(r2.stats().await.route_message_origins, 0);
    assert_eq!(r3.stats().await.route_message_origins, 0);
    assert!(r1.drops().await.is_empty());
}

#[actix_rt::test]
async fn test_ttl_exhaustion() {
    let switchboard = Switchboard::new().start();
    let relay = Node::start(&switchboard, test_config(), Box::new(MessageSizeCost)).await;
    let sender = FakePeer::start(&switchboard).await;
    let observer = FakePeer::start(&switchboard).await;
    link(&switchboard, sender.peer(), relay.peer).await;
    link(&switchboard, relay.peer, observer.peer()).await;

    sender.send(relay.peer, Protocol::Route, &route(Address::generate(), 1000, 1)).await;
    sleep_ms(100).await;

    assert!(observer.routes().await.is_empty());
    assert_eq!(relay.stats().await.route_message_origins, 1);
    assert_eq!(relay.drops().await, vec![DropReason::ResourceExceeded]);
}

#[actix_rt::test]
async fn test_duplicate_route_is_dropped() {
    let switchboard = Switchboard::new().start();
    let relay = Node::start(&switchboard, test_config(), Box::new(MessageSizeCost)).await;
    let a = FakePeer::start(&switchboard).await;
    let b = FakePeer::start(&switchboard).await;
    let observer = FakePeer::start(&switchboard).await;
    link(&switchboard, a.peer(), relay.peer).await;
    link(&switchboard, b.peer(), relay.peer).await;
    link(&switchboard, observer.peer(), relay.peer).await;

    let discovery = route(Address::generate(), 1000, 10);
    a.send(relay.peer, Protocol::Route, &discovery).await;
    sleep_ms(50).await;
    b.send(relay.peer, Protocol::Route, &discovery).await;
    sleep_ms(50).await;

    assert_eq!(observer.routes().await.len(), 1);
    // the first copy was flooded to `b` and the second never reaches `a`
    assert_eq!(b.routes().await.len(), 1);
    assert!(a.routes().await.is_empty());
    assert_eq!(relay.drops().await, vec![DropReason::DuplicateMessage]);
}

#[actix_rt::test]
async fn test_destination_acks_cheapest_candidate() {
    let switchboard = Switchboard::new().start();
    let destination = Node::start(&switchboard, test_config(), Box::new(MessageSizeCost)).await;
    let mut senders = vec![];
    for _ in 0..3 {
        let sender = FakePeer::start(&switchboard).await;
        link(&switchboard, sender.peer(), destination.peer).await;
        senders.push(sender);
    }

    let base = route(destination.address, 1000, 10);
    for (sender, gas_used) in senders.iter().zip([300u64, 100, 200].iter()) {
        let mut candidate = base.clone();
        candidate.gas_used = U256::from(*gas_used);
        candidate.transport_nodes = vec![TransportNode::new(Address::generate(), U256::from(*gas_used))];
        sender.send(destination.peer, Protocol::Route, &candidate).await;
    }
    sleep_ms(100).await;
    assert_eq!(destination.stats().await.pending_aggregations, 1);
    sleep_ms(700).await;

    assert!(senders[0].acks().await.is_empty());
    assert!(senders[2].acks().await.is_empty());
    let acks = senders[1].acks().await;
    assert_eq!(acks.len(), 1);
    assert_eq!(acks[0].message_id, base.message_id);
    assert_eq!(acks[0].transport_nodes.len(), 1);
    assert_eq!(acks[0].transport_nodes[0].gas_used, U256::from(100));
    assert_eq!(destination.stats().await.pending_aggregations, 0);
}

#[actix_rt::test]
async fn test_late_candidates_are_still_aggregated() {
    let switchboard = Switchboard::new().start();
    let config = RelayConfig { aggregation_window_ms: 400, ..RelayConfig::default() };
    let destination = Node::start(&switchboard, config, Box::new(MessageSizeCost)).await;
    let early = FakePeer::start(&switchboard).await;
    let middle = FakePeer::start(&switchboard).await;
    let late = FakePeer::start(&switchboard).await;
    for sender in [&early, &middle, &late].iter() {
        link(&switchboard, sender.peer(), destination.peer).await;
    }

    let base = route(destination.address, 1000, 1);
    let with_gas = |gas_used: u64| {
        let mut candidate = base.clone();
        candidate.gas_used = U256::from(gas_used);
        candidate
    };
    // arrivals trickle in just inside each window
    early.send(destination.peer, Protocol::Route, &with_gas(300)).await;
    sleep_ms(200).await;
    middle.send(destination.peer, Protocol::Route, &with_gas(200)).await;
    sleep_ms(400).await;
    late.send(destination.peer, Protocol::Route, &with_gas(100)).await;
    sleep_ms(1000).await;

    assert!(early.acks().await.is_empty());
    assert!(middle.acks().await.is_empty());
    assert_eq!(late.acks().await.len(), 1);
}

#[actix_rt::test]
async fn test_route_ack_is_one_shot() {
    let switchboard = Switchboard::new().start();
    let relay = Node::start(&switchboard, test_config(), Box::new(MessageSizeCost)).await;
    let upstream = FakePeer::start(&switchboard).await;
    let downstream = FakePeer::start(&switchboard).await;
    link(&switchboard, upstream.peer(), relay.peer).await;
    link(&switchboard, relay.peer, downstream.peer()).await;

    let discovery = route(Address::generate(), 1000, 10);
    upstream.send(relay.peer, Protocol::Route, &discovery).await;
    sleep_ms(50).await;
    assert_eq!(downstream.routes().await.len(), 1);

    let ack = RouteAckMessage::new(discovery.message_id, vec![]);
    downstream.send(relay.peer, Protocol::RouteAck, &ack).await;
    sleep_ms(50).await;
    downstream.send(relay.peer, Protocol::RouteAck, &ack).await;
    sleep_ms(50).await;

    assert_eq!(upstream.acks().await, vec![ack]);
    let stats = relay.stats().await;
    assert_eq!(stats.route_message_origins, 0);
    assert_eq!(stats.route_ack_message_origins, 1);
    assert_eq!(relay.drops().await, vec![DropReason::NoReservedPath]);
}

#[actix_rt::test]
async fn test_payload_follows_reserved_path_once() {
    let switchboard = Switchboard::new().start();
    let relay = Node::start(&switchboard, test_config(), Box::new(MessageSizeCost)).await;
    let sender = FakePeer::start(&switchboard).await;
    let receiver = FakePeer::start(&switchboard).await;
    link(&switchboard, sender.peer(), relay.peer).await;
    link(&switchboard, relay.peer, receiver.peer()).await;

    let payload = payload(Address::generate(), Address::generate(), b"hello");
    sender.send(relay.peer, Protocol::Route, &RouteMessage::for_payload(&payload, 10)).await;
    sleep_ms(50).await;
    receiver.send(relay.peer, Protocol::RouteAck, &RouteAckMessage::new(payload.message_id, vec![])).await;
    sleep_ms(50).await;
    assert_eq!(sender.acks().await.len(), 1);

    sender.send(relay.peer, Protocol::Payload, &payload).await;
    sleep_ms(50).await;
    sender.send(relay.peer, Protocol::Payload, &payload).await;
    sleep_ms(50).await;

    assert_eq!(receiver.payloads().await, vec![payload]);
    assert_eq!(relay.stats().await.route_ack_message_origins, 0);
    assert_eq!(relay.drops().await, vec![DropReason::NoReservedPath]);
}

#[actix_rt::test]
async fn test_payload_without_reservation_is_dropped() {
    let switchboard = Switchboard::new().start();
    let relay = Node::start(&switchboard, test_config(), Box::new(MessageSizeCost)).await;
    let sender = FakePeer::start(&switchboard).await;
    let other = FakePeer::start(&switchboard).await;
    link(&switchboard, sender.peer(), relay.peer).await;
    link(&switchboard, relay.peer, other.peer()).await;

    sender.send(relay.peer, Protocol::Payload, &payload(Address::generate(), Address::generate(), b"x")).await;
    sleep_ms(50).await;

    assert!(other.payloads().await.is_empty());
    assert_eq!(relay.drops().await, vec![DropReason::NoReservedPath]);
}

#[actix_rt::test]
async fn test_delivery_checks_proof_of_entry() {
    let switchboard = Switchboard::new().start();
    let destination = Node::start(&switchboard, test_config(), Box::new(MessageSizeCost)).await;
    let sender = FakePeer::start(&switchboard).await;
    link(&switchboard, sender.peer(), destination.peer).await;
    let _ = destination.events().await;

    let mut forged = payload(Address::generate(), destination.address, b"forged");
    forged.poe = [0u8; 32];
    sender.send(destination.peer, Protocol::Payload, &forged).await;
    let genuine = payload(Address::generate(), destination.address, b"genuine");
    sender.send(destination.peer, Protocol::Payload, &genuine).await;
    sleep_ms(50).await;

    let mut delivered = vec![];
    let mut drops = vec![];
    for event in destination.events().await {
        match event {
            RelayEvent::Delivered(payload) => delivered.push(payload),
            RelayEvent::Dropped { message_id, reason } => drops.push((message_id, reason)),
            _ => (),
        }
    }
    assert_eq!(delivered, vec![genuine]);
    assert_eq!(drops, vec![(forged.message_id, DropReason::InvalidProofOfEntry)]);
}

#[actix_rt::test]
async fn test_unenforced_proof_of_entry() {
    let switchboard = Switchboard::new().start();
    let config = RelayConfig { enforce_proof_of_entry: false, ..test_config() };
    let destination = Node::start(&switchboard, config, Box::new(MessageSizeCost)).await;
    let sender = FakePeer::start(&switchboard).await;
    link(&switchboard, sender.peer(), destination.peer).await;

    let mut unproven = payload(Address::generate(), destination.address, b"anything");
    unproven.poe = [1u8; 32];
    sender.send(destination.peer, Protocol::Payload, &unproven).await;
    sleep_ms(50).await;

    let delivered = destination.events().await.into_iter().any(|event| match event {
        RelayEvent::Delivered(payload) => payload == unproven,
        _ => false,
    });
    assert!(delivered);
}

#[actix_rt::test]
async fn test_dispatch_sends_payload_once_path_is_confirmed() {
    let switchboard = Switchboard::new().start();
    let sender = Node::start(&switchboard, test_config(), Box::new(MessageSizeCost)).await;
    let next_hop = FakePeer::start(&switchboard).await;
    link(&switchboard, sender.peer, next_hop.peer()).await;

    let to = Address::generate();
    let body = Bytes::from_static(b"gas metered");
    let dispatch = Dispatch { to, body: body.clone(), max_gas: U256::from(5000) };
    let message_id = sender.addr.send(dispatch).await.unwrap().unwrap();
    sleep_ms(50).await;

    let routes = next_hop.routes().await;
    assert_eq!(routes.len(), 1);
    assert_eq!(routes[0].message_id, message_id);
    assert_eq!(routes[0].from, sender.address);
    assert_eq!(routes[0].to, to);
    assert_eq!(routes[0].gas_limit, U256::from(5000));
    assert_eq!(routes[0].gas_used, U256::zero());
    assert_eq!(routes[0].ttl, 10);
    assert!(routes[0].transport_nodes.is_empty());
    assert_eq!(sender.stats().await.outgoing_messages, 1);

    let ack = RouteAckMessage::new(message_id, vec![]);
    next_hop.send(sender.peer, Protocol::RouteAck, &ack).await;
    sleep_ms(50).await;
    next_hop.send(sender.peer, Protocol::RouteAck, &ack).await;
    sleep_ms(50).await;

    let payloads = next_hop.payloads().await;
    assert_eq!(payloads.len(), 1);
    assert_eq!(payloads[0].message_id, message_id);
    assert_eq!(payloads[0].body, body);
    assert_eq!(routes[0].message_size, U256::from(payloads[0].encoded_len()));
    assert!(poe::verify(&payloads[0].poe, &sender.address, payloads[0].poe_nonce));
    assert_eq!(sender.stats().await.outgoing_messages, 0);

    let events = sender.events().await;
    assert!(events.iter().any(|event| match event {
        RelayEvent::PathConfirmed { message_id: id, next_hop: hop } => {
            *id == message_id && *hop == next_hop.peer()
        }
        _ => false,
    }));
}

#[actix_rt::test]
async fn test_relay_keeps_handling_messages_while_solving() {
    let switchboard = Switchboard::new().start();
    // the first nonce meeting difficulty 3 for this address is 1554886
    let address = Address::new([11u8; 20]);
    let config = RelayConfig { poe_difficulty: 3, ..test_config() };
    let sender = Node::start_as(&switchboard, config, Box::new(MessageSizeCost), address).await;
    let next_hop = FakePeer::start(&switchboard).await;
    link(&switchboard, sender.peer, next_hop.peer()).await;

    let dispatch =
        Dispatch { to: Address::generate(), body: Bytes::from_static(b"slow"), max_gas: U256::from(5000) };
    let dispatch = Box::pin(sender.addr.send(dispatch));
    let stats = Box::pin(sender.addr.send(GetStats));
    let message_id = match future::select(dispatch, stats).await {
        Either::Right((stats, dispatch)) => {
            assert_eq!(stats.unwrap().outgoing_messages, 0);
            dispatch.await.unwrap().unwrap()
        }
        Either::Left(_) => panic!("dispatch completed before the relay answered"),
    };
    sleep_ms(50).await;

    let routes = next_hop.routes().await;
    assert_eq!(routes.len(), 1);
    assert_eq!(routes[0].message_id, message_id);
    next_hop.send(sender.peer, Protocol::RouteAck, &RouteAckMessage::new(message_id, vec![])).await;
    sleep_ms(50).await;
    let payloads = next_hop.payloads().await;
    assert_eq!(payloads.len(), 1);
    assert_eq!(payloads[0].poe_nonce, 1554886);
    assert!(poe::verify_with_difficulty(&payloads[0].poe, &address, payloads[0].poe_nonce, 3));
}

#[actix_rt::test]
async fn test_failed_dial_does_not_stop_the_flood() {
    let switchboard = Switchboard::new().start();
    let relay = Node::start(&switchboard, test_config(), Box::new(MessageSizeCost)).await;
    let sender = FakePeer::start(&switchboard).await;
    let observer = FakePeer::start(&switchboard).await;
    link(&switchboard, sender.peer(), relay.peer).await;
    link(&switchboard, relay.peer, observer.peer()).await;

    // known to the relay but without a link on the switchboard
    let stale = PeerId::generate();
    let protocols = Protocol::ALL.iter().cloned().collect();
    relay.addr.send(ConnectionEvent::Connected { peer: stale, protocols }).await.unwrap();
    assert_eq!(relay.stats().await.peers, 3);

    sender.send(relay.peer, Protocol::Route, &route(Address::generate(), 1000, 10)).await;
    sleep_ms(50).await;

    assert_eq!(observer.routes().await.len(), 1);
    assert_eq!(relay.stats().await.route_message_origins, 1);
    assert!(relay.drops().await.is_empty());
}

#[actix_rt::test]
async fn test_sender_drops_echo_of_its_own_route() {
    let switchboard = Switchboard::new().start();
    let sender = Node::start(&switchboard, test_config(), Box::new(MessageSizeCost)).await;
    let peer = FakePeer::start(&switchboard).await;
    link(&switchboard, sender.peer, peer.peer()).await;

    let echo = payload(sender.address, Address::generate(), b"echo");
    let id = sender.addr.send(Initiate { payload: echo }).await.unwrap();
    sleep_ms(50).await;
    let routes = peer.routes().await;
    assert_eq!(routes[0].message_id, id);
    peer.send(sender.peer, Protocol::Route, &routes[0]).await;
    sleep_ms(50).await;

    assert!(peer.routes().await.is_empty());
    assert_eq!(sender.drops().await, vec![DropReason::DuplicateMessage]);
}

#[actix_rt::test]
async fn test_malformed_frame_is_ignored() {
    let switchboard = Switchboard::new().start();
    let relay = Node::start(&switchboard, test_config(), Box::new(MessageSizeCost)).await;
    let peer = FakePeer::start(&switchboard).await;
    link(&switchboard, peer.peer(), relay.peer).await;
    let _ = relay.events().await;

    let truncated = RouteAckMessage::new(MessageId::generate(), vec![]).to_bytes().slice(0..10);
    send_message(peer.transport.dial(relay.peer, Protocol::RouteAck), truncated).await.unwrap();
    sleep_ms(50).await;

    let events = relay.events().await;
    assert_eq!(events.len(), 1);
    match &events[0] {
        RelayEvent::MessageTransport { peer: from, protocol } => {
            assert_eq!(*from, peer.peer());
            assert_eq!(*protocol, Protocol::RouteAck);
        }
        other => panic!("unexpected: {:?}", other),
    }
    assert_eq!(relay.stats().await, RelayStats { peers: 1, ..RelayStats::default() });
}

#[actix_rt::test]
async fn test_connection_events() {
    let switchboard = Switchboard::new().start();
    let relay = Node::start(&switchboard, test_config(), Box::new(MessageSizeCost)).await;
    assert!(!relay.addr.send(IsReady).await.unwrap());

    let a = FakePeer::start(&switchboard).await;
    let b = FakePeer::start(&switchboard).await;
    link(&switchboard, a.peer(), relay.peer).await;
    link(&switchboard, b.peer(), relay.peer).await;
    sleep_ms(20).await;

    assert!(relay.addr.send(IsReady).await.unwrap());
    let mut peers = relay.addr.send(GetPeers).await.unwrap();
    peers.sort();
    let mut expected = vec![a.peer(), b.peer()];
    expected.sort();
    assert_eq!(peers, expected);

    let events = relay.events().await;
    let ready = events.iter().filter(|event| matches!(event, RelayEvent::Ready)).count();
    let connections = events.iter().filter(|event| matches!(event, RelayEvent::Connection(_))).count();
    assert_eq!((ready, connections), (1, 2));

    switchboard.send(Unlink { a: a.peer(), b: relay.peer }).await.unwrap();
    sleep_ms(20).await;
    assert_eq!(relay.addr.send(GetPeers).await.unwrap(), vec![b.peer()]);
}

#[actix_rt::test]
async fn test_unavailable_identity_stops_the_relay() {
    let switchboard = Switchboard::new().start();
    let transport = MemoryTransport::new(switchboard.clone());
    let relay =
        Relay::new(test_config(), Box::new(StaticSigner::unavailable()), Rc::new(transport)).start();
    sleep_ms(50).await;
    assert!(!relay.connected());
}
