use crate::{
    normalize_prizes, ConfigError, DrawError, DrawRng, EventBus, LadderBoard, LadderConfig,
    LadderEvent, Pairing,
};
use tracing::{info, trace};

mod token;

pub use token::{Token, TokenId, TokenState};

/// Snapshot returned after each call to [`LadderRun::advance`].
#[derive(Debug, Clone, PartialEq)]
pub struct LadderProgress {
    pub done: bool,
    pub finished: usize,
    /// Present only once every token has finished.
    pub result: Option<Vec<Pairing>>,
}

/// Advance every unfinished token by up to `ticks` steps. Returns `true` once
/// all tokens have finished.
pub fn advance_ladder(board: &LadderBoard, tokens: &mut [Token], ticks: u32) -> bool {
    for _ in 0..ticks {
        if all_finished(tokens) {
            break;
        }
        for token in tokens.iter_mut() {
            token.step(board);
        }
    }
    all_finished(tokens)
}

fn all_finished(tokens: &[Token]) -> bool {
    tokens.iter().all(Token::is_finished)
}

/// One ladder game: a board, one token per candidate and the prize waiting
/// at the bottom of each lane.
///
/// The run does nothing on its own. A clock (frame callback, timer, or a
/// plain loop) calls [`advance`](Self::advance) until it reports `done`;
/// dropping the run abandons it.
#[derive(Debug, Clone)]
pub struct LadderRun {
    board: LadderBoard,
    tokens: Vec<Token>,
    names: Vec<String>,
    lane_prizes: Vec<String>,
    steps: u64,
    events: EventBus,
}

impl LadderRun {
    /// Normalizes the prizes onto the lanes, lays out a fresh board and
    /// spawns one token per candidate at the top of its own lane.
    pub fn new<R: DrawRng + ?Sized>(
        candidates: Vec<String>,
        prizes: &[String],
        config: &LadderConfig,
        rng: &mut R,
    ) -> Result<Self, DrawError> {
        config.validate()?;
        if candidates.is_empty() {
            return Err(DrawError::EmptyCandidates);
        }
        if prizes.is_empty() {
            return Err(DrawError::EmptyPrizes);
        }
        let lane_prizes = normalize_prizes(prizes, candidates.len(), rng);
        let board = LadderBoard::generate(candidates.len(), config, rng);
        let spread = config.speed_max - config.speed_min;
        let speeds: Vec<f64> = (0..candidates.len())
            .map(|_| config.speed_min + rng.unit() * spread)
            .collect();
        Self::with_board(board, candidates, lane_prizes, &speeds)
    }

    /// Run over a prepared board. `names`, `lane_prizes` and `speeds` each
    /// need one entry per lane, and the board must pass
    /// [`LadderBoard::check_traversable`].
    pub fn with_board(
        board: LadderBoard,
        names: Vec<String>,
        lane_prizes: Vec<String>,
        speeds: &[f64],
    ) -> Result<Self, DrawError> {
        let lanes = board.lane_count();
        if names.len() != lanes || lane_prizes.len() != lanes || speeds.len() != lanes {
            return Err(DrawError::LaneMismatch {
                lanes,
                names: names.len(),
                prizes: lane_prizes.len(),
                speeds: speeds.len(),
            });
        }
        if names.is_empty() {
            return Err(DrawError::EmptyCandidates);
        }
        if speeds.iter().any(|speed| !(*speed > 0.0)) {
            return Err(ConfigError::NotPositive { field: "speed" }.into());
        }
        board.check_traversable()?;
        let tokens = speeds
            .iter()
            .enumerate()
            .map(|(id, speed)| Token::new(id, &board, *speed))
            .collect();
        Ok(Self {
            board,
            tokens,
            names,
            lane_prizes,
            steps: 0,
            events: EventBus::default(),
        })
    }

    pub fn advance(&mut self, ticks: u32) -> LadderProgress {
        let was_done = self.is_done();
        for _ in 0..ticks {
            if self.is_done() {
                break;
            }
            for token in &mut self.tokens {
                if let Some(event) = token.step(&self.board) {
                    if let LadderEvent::Transferred { token: id, from, to, y } = &event {
                        trace!(token = id, from, to, y, "token crossed rung");
                    }
                    self.events.push(event);
                }
            }
            self.steps += 1;
        }
        let done = self.is_done();
        if done && !was_done {
            info!(
                lanes = self.board.lane_count(),
                rungs = self.board.rungs().len(),
                steps = self.steps,
                "ladder run finished"
            );
        }
        LadderProgress {
            done,
            finished: self.finished_count(),
            result: self.result(),
        }
    }

    /// Drive the run with a plain loop, giving up past the step budget.
    pub fn run_to_completion(mut self) -> Result<Vec<Pairing>, DrawError> {
        while !self.is_done() {
            if self.budget_exhausted() {
                return Err(DrawError::SimulationStalled { steps: self.steps });
            }
            self.advance(1);
        }
        Ok(self.pairings())
    }

    /// Upper bound on ticks until every token finishes: a full descent at
    /// the slowest speed plus, for each rung, the hit tick, the slide across
    /// one lane gap and the snap tick.
    pub fn step_budget(&self) -> u64 {
        let slowest = self
            .tokens
            .iter()
            .map(|token| token.speed)
            .fold(f64::INFINITY, f64::min);
        if !slowest.is_finite() {
            return 0;
        }
        let descent = (self.board.height() / slowest).ceil() as u64 + 1;
        let per_rung = (self.board.lane_spacing() / slowest).ceil() as u64 + 2;
        descent + self.board.rungs().len() as u64 * per_rung
    }

    /// Unfinished after `step_budget` ticks. Never true on a board that
    /// passed [`LadderBoard::check_traversable`].
    pub fn budget_exhausted(&self) -> bool {
        !self.is_done() && self.steps >= self.step_budget()
    }

    pub fn is_done(&self) -> bool {
        all_finished(&self.tokens)
    }

    pub fn finished_count(&self) -> usize {
        self.tokens.iter().filter(|token| token.is_finished()).count()
    }

    /// Candidate to prize pairs in candidate order, once every token is done.
    pub fn result(&self) -> Option<Vec<Pairing>> {
        self.is_done().then(|| self.pairings())
    }

    fn pairings(&self) -> Vec<Pairing> {
        self.tokens
            .iter()
            .map(|token| Pairing {
                giver: self.names[token.id].clone(),
                receiver: self.lane_prizes[token.lane].clone(),
            })
            .collect()
    }

    pub fn board(&self) -> &LadderBoard {
        &self.board
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Prize shown under each lane.
    pub fn lane_prizes(&self) -> &[String] {
        &self.lane_prizes
    }

    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn drain_events(&mut self) -> impl Iterator<Item = LadderEvent> + '_ {
        self.events.drain()
    }
}
