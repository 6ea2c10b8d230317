use crate::peer_meta::PeerMetadata;
use crate::relay::RelayConfig;
use crate::{Error, Result};

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment, File};

use std::net::SocketAddr;

const ENV_PREFIX: &str = "MALABAR";

fn default_listener_ip() -> String {
    "127.0.0.1:4000".to_owned()
}

/// Node level settings, read from an optional file and `MALABAR__*` environment variables.
#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    #[serde(default = "default_listener_ip")]
    pub listener_ip: String,
    /// Peers given as `ID@IP` or `IP`.
    #[serde(default)]
    pub bootstrap_peers: Vec<String>,
    /// Hex encoded ed25519 keypair; one is read from or written to the home directory if unset.
    #[serde(default)]
    pub keypair: Option<String>,
    #[serde(default)]
    pub relay: RelayConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            listener_ip: default_listener_ip(),
            bootstrap_peers: vec![],
            keypair: None,
            relay: RelayConfig::default(),
        }
    }
}

impl Settings {
    pub fn load(path: Option<&str>) -> Result<Self> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::with_name(path));
        }
        Settings::build(builder)
    }

    fn build(builder: ConfigBuilder<DefaultState>) -> Result<Self> {
        let environment = Environment::with_prefix(ENV_PREFIX).separator("__").try_parsing(true);
        let settings = builder.add_source(environment).build()?.try_deserialize()?;
        Ok(settings)
    }

    pub fn listener_ip(&self) -> Result<SocketAddr> {
        self.listener_ip.parse().map_err(|_| Error::PeerParseError)
    }

    pub fn bootstrap_peers(&self) -> Result<Vec<PeerMetadata>> {
        self.bootstrap_peers.iter().map(|peer| PeerMetadata::from_id_and_ip(peer)).collect()
    }
}
