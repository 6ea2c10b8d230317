use super::RelayEvent;

use actix::{Actor, Context, Handler};

/// Collects the events a relay publishes.
#[derive(Default)]
pub struct Recorder {
    events: Vec<RelayEvent>,
}

impl Actor for Recorder {
    type Context = Context<Self>;
}

impl Handler<RelayEvent> for Recorder {
    type Result = ();

    fn handle(&mut self, msg: RelayEvent, _ctx: &mut Context<Self>) -> Self::Result {
        self.events.push(msg);
    }
}

#[derive(Debug, Clone, MessageResponse)]
pub struct Recorded(pub Vec<RelayEvent>);

#[derive(Debug, Clone, Message)]
#[rtype(result = "Recorded")]
pub struct TakeEvents;

impl Handler<TakeEvents> for Recorder {
    type Result = Recorded;

    fn handle(&mut self, _msg: TakeEvents, _ctx: &mut Context<Self>) -> Self::Result {
        Recorded(std::mem::take(&mut self.events))
    }
}
