use crate::address::Address;
use crate::identity::{KeypairSigner, Signer};
use crate::peer_id::PeerId;
use crate::relay::testing::{Recorded, Recorder, TakeEvents};
use crate::relay::{GasCost, GetStats, Relay, RelayConfig, RelayEvent, RelayStats, Subscribe};
use crate::transport::memory::Link;
use crate::transport::{MemoryTransport, Switchboard, Transport};

use actix::{Actor, Addr};

use std::rc::Rc;

pub async fn sleep_ms(m: u64) {
    tokio::time::sleep(std::time::Duration::from_millis(m)).await;
}

/// A relay started for a test together with the log of its events.
pub struct TestNode {
    pub relay: Addr<Relay>,
    pub peer: PeerId,
    pub address: Address,
    recorder: Addr<Recorder>,
}

impl TestNode {
    pub async fn attach(relay: Addr<Relay>, peer: PeerId, address: Address) -> TestNode {
        let recorder = Recorder::default().start();
        relay.send(Subscribe(recorder.clone().recipient())).await.unwrap();
        TestNode { relay, peer, address, recorder }
    }

    pub async fn on_switchboard(
        switchboard: &Addr<Switchboard>,
        config: RelayConfig,
        gas_cost: Box<dyn GasCost>,
    ) -> TestNode {
        let signer = KeypairSigner::generate();
        let address = signer.address().await.unwrap();
        let transport = MemoryTransport::new(switchboard.clone());
        let peer = transport.local_peer();
        let relay = Relay::new(config, Box::new(signer), Rc::new(transport)).with_gas_cost(gas_cost);
        TestNode::attach(relay.start(), peer, address).await
    }

    pub async fn events(&self) -> Vec<RelayEvent> {
        let Recorded(events) = self.recorder.send(TakeEvents).await.unwrap();
        events
    }

    pub async fn stats(&self) -> RelayStats {
        self.relay.send(GetStats).await.unwrap()
    }
}

pub async fn link(switchboard: &Addr<Switchboard>, a: &TestNode, b: &TestNode) {
    switchboard.send(Link { a: a.peer, b: b.peer }).await.unwrap().unwrap();
}
