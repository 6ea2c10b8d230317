use crate::protocol::PROTOCOL_VERSION;

use std::time::Duration;

fn default_ttl() -> u16 {
    10
}
fn default_aggregation_window_ms() -> u64 {
    5000
}
fn default_poe_difficulty() -> usize {
    crate::poe::CURRENT_DIFFICULTY
}
fn default_true() -> bool {
    true
}
fn default_protocol_version() -> String {
    PROTOCOL_VERSION.to_owned()
}

/// Protocol parameters of a relay node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelayConfig {
    /// Hop budget given to the route probes this node originates.
    #[serde(default = "default_ttl")]
    pub default_ttl: u16,
    /// How long a destination collects route candidates before picking one.
    #[serde(default = "default_aggregation_window_ms")]
    pub aggregation_window_ms: u64,
    /// Leading zero bytes required of a proof-of-entry.
    #[serde(default = "default_poe_difficulty")]
    pub poe_difficulty: usize,
    #[serde(default = "default_true")]
    pub enforce_proof_of_entry: bool,
    /// Version suffix of the stream protocol ids this node speaks.
    #[serde(default = "default_protocol_version")]
    pub protocol_version: String,
}

impl Default for RelayConfig {
    fn default() -> Self {
        RelayConfig {
            default_ttl: default_ttl(),
            aggregation_window_ms: default_aggregation_window_ms(),
            poe_difficulty: default_poe_difficulty(),
            enforce_proof_of_entry: default_true(),
            protocol_version: default_protocol_version(),
        }
    }
}

impl RelayConfig {
    pub fn aggregation_window(&self) -> Duration {
        Duration::from_millis(self.aggregation_window_ms)
    }
}
