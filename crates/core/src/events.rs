use crate::TokenId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum LadderEvent {
    Transferred {
        token: TokenId,
        from: usize,
        to: usize,
        y: f64,
    },
    Finished { token: TokenId, lane: usize },
}

#[derive(Debug, Default, Clone)]
pub struct EventBus {
    queue: Vec<LadderEvent>,
}

impl EventBus {
    pub fn push(&mut self, event: LadderEvent) {
        self.queue.push(event);
    }

    pub fn drain(&mut self) -> impl Iterator<Item = LadderEvent> + '_ {
        self.queue.drain(..)
    }
}
