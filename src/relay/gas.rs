use crate::message::RouteMessage;

use primitive_types::U256;

/// The charge a relay adds to a route probe's `gas_used` for carrying it one hop.
pub trait GasCost {
    fn cost(&self, route: &RouteMessage) -> U256;
}

/// Charges the size of the payload being routed, once per hop.
#[derive(Debug, Clone, Copy, Default)]
pub struct MessageSizeCost;

impl GasCost for MessageSizeCost {
    fn cost(&self, route: &RouteMessage) -> U256 {
        route.message_size
    }
}

/// Charges the same amount at every hop.
#[derive(Debug, Clone, Copy)]
pub struct FlatCost(pub U256);

impl GasCost for FlatCost {
    fn cost(&self, _route: &RouteMessage) -> U256 {
        self.0
    }
}
