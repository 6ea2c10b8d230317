use crate::message::RouteMessage;
use crate::peer_id::PeerId;

/// Route candidates collected by a destination for one message id.
///
/// `arrivals` only ever grows; an aggregation check compares the value it was scheduled with
/// against the current one to detect whether the window stayed quiet.
#[derive(Debug, Clone, Default)]
pub struct Aggregation {
    candidates: Vec<(RouteMessage, PeerId)>,
    arrivals: u64,
}

impl Aggregation {
    pub fn new() -> Self {
        Aggregation { candidates: vec![], arrivals: 0 }
    }

    /// Buffers a candidate delivered by `peer` and returns the arrival count.
    pub fn push(&mut self, route: RouteMessage, peer: PeerId) -> u64 {
        self.candidates.push((route, peer));
        self.arrivals += 1;
        self.arrivals
    }

    pub fn arrivals(&self) -> u64 {
        self.arrivals
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// The candidate with the least `gas_used`, the earliest arrival on ties.
    pub fn into_cheapest(self) -> Option<(RouteMessage, PeerId)> {
        self.candidates.into_iter().min_by_key(|(route, _)| route.gas_used)
    }
}
