use crate::{LadderBoard, LadderEvent};
use serde::{Deserialize, Serialize};

/// Index of a token in its run; equal to the candidate's position in the
/// input list and to the lane it starts in.
pub type TokenId = usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenState {
    Descending,
    /// Sliding along a rung towards `target`.
    Transferring { target: usize },
    Finished,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    pub id: TokenId,
    pub lane: usize,
    pub x: f64,
    pub y: f64,
    pub speed: f64,
    pub state: TokenState,
}

impl Token {
    pub fn new(id: TokenId, board: &LadderBoard, speed: f64) -> Self {
        Self {
            id,
            lane: id,
            x: board.lane_x(id),
            y: 0.0,
            speed,
            state: TokenState::Descending,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.state == TokenState::Finished
    }

    pub fn pending_lane(&self) -> Option<usize> {
        match self.state {
            TokenState::Transferring { target } => Some(target),
            _ => None,
        }
    }

    /// Advance one tick. Returns an event when the token lands in a new lane
    /// or reaches the bottom.
    pub fn step(&mut self, board: &LadderBoard) -> Option<LadderEvent> {
        match self.state {
            TokenState::Finished => None,
            TokenState::Transferring { target } => self.slide(board, target),
            TokenState::Descending => self.descend(board),
        }
    }

    fn slide(&mut self, board: &LadderBoard, target: usize) -> Option<LadderEvent> {
        let motion = board.motion();
        let target_x = board.lane_x(target);
        let dx = target_x - self.x;
        if dx.abs() >= motion.snap_threshold {
            self.x += dx.signum() * self.speed.min(dx.abs());
            return None;
        }
        let from = self.lane;
        self.x = target_x;
        self.lane = target;
        // Drop below the rung so the next descent does not cross it again.
        self.y += motion.exit_nudge;
        self.state = TokenState::Descending;
        Some(LadderEvent::Transferred {
            token: self.id,
            from,
            to: target,
            y: self.y,
        })
    }

    fn descend(&mut self, board: &LadderBoard) -> Option<LadderEvent> {
        let next = self.y + self.speed;
        if let Some(rung) = board.next_rung(self.lane, self.y, next) {
            self.y = rung.y;
            self.state = TokenState::Transferring {
                target: rung.other_side(self.lane),
            };
            return None;
        }
        self.y = next;
        if self.y < board.height() {
            return None;
        }
        self.y = board.height();
        self.state = TokenState::Finished;
        Some(LadderEvent::Finished {
            token: self.id,
            lane: self.lane,
        })
    }
}
