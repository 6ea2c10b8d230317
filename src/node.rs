use crate::address::MessageId;
use crate::identity::KeypairSigner;
use crate::peer_id::PeerId;
use crate::relay::{Dispatch, IsReady, Relay};
use crate::settings::Settings;
use crate::transport::{TcpTransport, Transport};
use crate::Result;

use actix::{Actor, Addr};
use tracing::info;

use std::io::{Read, Write};
use std::path::PathBuf;
use std::rc::Rc;
use std::time::Duration;

const KEYPAIR_DIR: &str = ".malabar";
const READY_POLL: Duration = Duration::from_millis(250);

/// Starts a relay over TCP. Must be called from within a running actix system.
pub fn run(settings: Settings) -> Result<Addr<Relay>> {
    let listener_ip = settings.listener_ip()?;
    let bootstrap_peers = settings.bootstrap_peers()?;
    let transport = TcpTransport::new(listener_ip, bootstrap_peers)
        .with_protocol_version(&settings.relay.protocol_version);
    let signer = match settings.keypair {
        Some(ref keypair_hex) => KeypairSigner::from_hex(keypair_hex)?,
        None => read_or_generate_keypair(&transport.local_peer())?,
    };
    info!("node {} is starting on {}", transport.local_peer(), listener_ip);

    let relay = Relay::new(settings.relay, Box::new(signer), Rc::new(transport));
    Ok(relay.start())
}

/// Waits for the relay to see its first peer, then dispatches.
pub async fn dispatch_when_ready(relay: Addr<Relay>, dispatch: Dispatch) -> Result<MessageId> {
    while !relay.send(IsReady).await? {
        tokio::time::sleep(READY_POLL).await;
    }
    relay.send(dispatch).await?
}

fn keypair_path(peer: &PeerId) -> PathBuf {
    let home = dirs::home_dir().unwrap_or_else(std::env::temp_dir);
    home.join(KEYPAIR_DIR).join(format!("{}.keypair", peer))
}

fn read_or_generate_keypair(peer: &PeerId) -> Result<KeypairSigner> {
    let path = keypair_path(peer);
    match std::fs::File::open(&path) {
        Ok(mut file) => {
            let mut contents = String::new();
            let _ = file.read_to_string(&mut contents)?;
            info!("using keypair from {}", path.display());
            KeypairSigner::from_hex(contents.trim())
        }
        Err(_) => {
            let signer = KeypairSigner::generate();
            if let Some(dir) = path.parent() {
                std::fs::create_dir_all(dir)?;
            }
            let mut file = std::fs::File::create(&path)?;
            file.write_all(signer.to_hex().as_bytes())?;
            info!("generated keypair at {}", path.display());
            Ok(signer)
        }
    }
}
