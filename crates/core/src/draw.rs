use crate::{
    derangement_pairing, full_shuffle, pick_n, pick_single, prize_pairing, ConfigError,
    DrawRng, DrawSettings, Fortune, FortuneTable, LadderConfig, LadderRun, Pairing,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum DrawError {
    #[error("candidate list is empty")]
    EmptyCandidates,
    #[error("prize list is empty")]
    EmptyPrizes,
    #[error("ladder has {lanes} lanes but got {names} names, {prizes} prizes, {speeds} speeds")]
    LaneMismatch {
        lanes: usize,
        names: usize,
        prizes: usize,
        speeds: usize,
    },
    #[error("rungs at y={upper} and y={lower} share a lane closer than the exit nudge {nudge}")]
    CrowdedRungs { upper: f64, lower: f64, nudge: f64 },
    #[error("rung on slot {slot} at y={y} lies outside the board height {height}")]
    RungOutOfBand { slot: usize, y: f64, height: f64 },
    #[error("ladder run did not finish within {steps} steps")]
    SimulationStalled { steps: u64 },
    #[error("invalid config: {0}")]
    InvalidConfig(#[from] ConfigError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DrawMode {
    PickN,
    Shuffle,
    Single,
    Pairing,
    GiftLadder,
    DailyFortune,
    Countdown,
}

/// What a mode asks of its caller, for building input forms and help text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ModeInfo {
    pub key: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub requires_count: bool,
    pub requires_timer: bool,
    pub requires_dual_input: bool,
    pub no_input: bool,
}

impl ModeInfo {
    const fn plain(key: &'static str, title: &'static str, description: &'static str) -> Self {
        Self {
            key,
            title,
            description,
            requires_count: false,
            requires_timer: false,
            requires_dual_input: false,
            no_input: false,
        }
    }
}

impl DrawMode {
    pub const ALL: [DrawMode; 7] = [
        DrawMode::PickN,
        DrawMode::Shuffle,
        DrawMode::Single,
        DrawMode::Pairing,
        DrawMode::GiftLadder,
        DrawMode::DailyFortune,
        DrawMode::Countdown,
    ];

    pub fn info(self) -> ModeInfo {
        match self {
            Self::PickN => ModeInfo {
                requires_count: true,
                ..ModeInfo::plain(
                    "pick_n",
                    "Pick X",
                    "Draw the requested number of winners from the list.",
                )
            },
            Self::Shuffle => {
                ModeInfo::plain("shuffle", "Shuffle", "Put the whole list in random order.")
            }
            Self::Single => {
                ModeInfo::plain("single", "Single", "One winner out of everyone.")
            }
            Self::Pairing => ModeInfo::plain(
                "pairing",
                "Pairing",
                "Gift exchange: everyone draws someone else.",
            ),
            Self::GiftLadder => ModeInfo {
                requires_dual_input: true,
                ..ModeInfo::plain(
                    "gift_ladder",
                    "Gift Ladder",
                    "Enter people and gifts, then let the ladder decide who gets what.",
                )
            },
            Self::DailyFortune => ModeInfo {
                no_input: true,
                ..ModeInfo::plain(
                    "daily_fortune",
                    "Fortune",
                    "Shake the fortune sticks for today's luck and lucky charms.",
                )
            },
            Self::Countdown => ModeInfo {
                requires_timer: true,
                ..ModeInfo::plain(
                    "countdown",
                    "Countdown",
                    "Count down before revealing a single winner.",
                )
            },
        }
    }

    pub fn key(self) -> &'static str {
        self.info().key
    }

    pub fn from_key(key: &str) -> Option<Self> {
        let key = key.trim().to_ascii_lowercase().replace('-', "_");
        Self::ALL.into_iter().find(|mode| mode.key() == key)
    }

    pub fn uses_candidates(self) -> bool {
        !self.info().no_input
    }
}

impl fmt::Display for DrawMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DrawResult {
    Names(Vec<String>),
    Pairs(Vec<Pairing>),
    Fortune(Fortune),
}

/// Plain-text form used when a result is copied or shared.
impl fmt::Display for DrawResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Names(names) => write!(f, "{}", names.join("\n")),
            Self::Pairs(pairs) => {
                let lines: Vec<String> = pairs
                    .iter()
                    .map(|pair| format!("{} -> {}", pair.giver, pair.receiver))
                    .collect();
                write!(f, "{}", lines.join("\n"))
            }
            Self::Fortune(fortune) => write!(
                f,
                "[Today's fortune: {}]\n{}\nLucky color: {}\nLucky item: {}",
                fortune.fortune, fortune.description, fortune.lucky_color_name, fortune.lucky_item
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrawRequest {
    pub mode: DrawMode,
    #[serde(default)]
    pub candidates: Vec<String>,
    #[serde(default)]
    pub prizes: Vec<String>,
    #[serde(default)]
    pub settings: DrawSettings,
}

impl DrawRequest {
    pub fn new(mode: DrawMode) -> Self {
        Self {
            mode,
            candidates: Vec::new(),
            prizes: Vec::new(),
            settings: DrawSettings::default(),
        }
    }

    pub fn with_candidates<S: AsRef<str>>(mut self, raw: &[S]) -> Self {
        self.candidates = raw.iter().map(|item| item.as_ref().to_string()).collect();
        self
    }

    pub fn with_prizes<S: AsRef<str>>(mut self, raw: &[S]) -> Self {
        self.prizes = raw.iter().map(|item| item.as_ref().to_string()).collect();
        self
    }

    pub fn with_count(mut self, count: usize) -> Self {
        self.settings.pick_count = count;
        self
    }
}

/// What [`DrawEngine::start`] hands back: a finished result, or a ladder
/// run for the caller to drive.
#[derive(Debug, Clone)]
pub enum DrawSession {
    Resolved(DrawResult),
    Ladder(LadderRun),
}

impl DrawSession {
    /// Drive any ladder run to the end with a plain loop.
    pub fn finish(self) -> Result<DrawResult, DrawError> {
        match self {
            Self::Resolved(result) => Ok(result),
            Self::Ladder(run) => run.run_to_completion().map(DrawResult::Pairs),
        }
    }
}

/// Trim every entry and drop the blank ones.
pub fn normalize_list<S: AsRef<str>>(raw: &[S]) -> Vec<String> {
    raw.iter()
        .map(|item| item.as_ref().trim())
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

/// One entry per line, normalized.
pub fn parse_list(text: &str) -> Vec<String> {
    normalize_list(&text.lines().collect::<Vec<_>>())
}

/// Routes a request to its generator.
#[derive(Debug, Clone, Default)]
pub struct DrawEngine {
    ladder: LadderConfig,
    fortunes: FortuneTable,
}

impl DrawEngine {
    pub fn new(ladder: LadderConfig, fortunes: FortuneTable) -> Result<Self, DrawError> {
        ladder.validate()?;
        fortunes.validate()?;
        Ok(Self { ladder, fortunes })
    }

    pub fn ladder_config(&self) -> &LadderConfig {
        &self.ladder
    }

    pub fn fortunes(&self) -> &FortuneTable {
        &self.fortunes
    }

    pub fn start<R: DrawRng + ?Sized>(
        &self,
        request: &DrawRequest,
        rng: &mut R,
    ) -> Result<DrawSession, DrawError> {
        let mode = request.mode;
        if !mode.uses_candidates() {
            return Ok(DrawSession::Resolved(self.fortune(rng)?));
        }

        let candidates = normalize_list(&request.candidates);
        if candidates.is_empty() {
            return Err(DrawError::EmptyCandidates);
        }
        debug!(%mode, candidates = candidates.len(), "starting draw");

        let result = match mode {
            DrawMode::Single | DrawMode::Countdown => {
                DrawResult::Names(pick_single(&candidates, rng).into_iter().collect())
            }
            DrawMode::PickN => {
                let count = request.settings.pick_count.clamp(1, candidates.len());
                DrawResult::Names(pick_n(&candidates, count, rng))
            }
            DrawMode::Shuffle => DrawResult::Names(full_shuffle(&candidates, rng)),
            DrawMode::Pairing => DrawResult::Pairs(derangement_pairing(&candidates, rng)),
            DrawMode::GiftLadder => {
                let prizes = normalize_list(&request.prizes);
                if prizes.is_empty() {
                    return Err(DrawError::EmptyPrizes);
                }
                if self.ladder.is_visual(candidates.len()) {
                    let run = LadderRun::new(candidates, &prizes, &self.ladder, rng)?;
                    return Ok(DrawSession::Ladder(run));
                }
                debug!(
                    candidates = candidates.len(),
                    limit = self.ladder.visual_lane_limit,
                    "ladder too wide to animate, pairing directly"
                );
                DrawResult::Pairs(prize_pairing(&candidates, &prizes, rng))
            }
            DrawMode::DailyFortune => self.fortune(rng)?,
        };
        Ok(DrawSession::Resolved(result))
    }

    fn fortune<R: DrawRng + ?Sized>(&self, rng: &mut R) -> Result<DrawResult, DrawError> {
        self.fortunes
            .draw(rng)
            .map(DrawResult::Fortune)
            .ok_or(DrawError::InvalidConfig(ConfigError::EmptyFortuneTable(
                "fortune",
            )))
    }

    /// Start and, for ladder runs, drive the simulation to the end.
    pub fn draw<R: DrawRng + ?Sized>(
        &self,
        request: &DrawRequest,
        rng: &mut R,
    ) -> Result<DrawResult, DrawError> {
        self.start(request, rng)?.finish()
    }
}

/// Draw with the default ladder geometry and fortune tables.
pub fn draw<R: DrawRng + ?Sized, S: AsRef<str>>(
    mode: DrawMode,
    candidates: &[S],
    prizes: &[S],
    count: usize,
    rng: &mut R,
) -> Result<DrawResult, DrawError> {
    let request = DrawRequest::new(mode)
        .with_candidates(candidates)
        .with_prizes(prizes)
        .with_count(count);
    DrawEngine::default().draw(&request, rng)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RngState;

    #[test]
    fn normalize_trims_and_drops_blanks() {
        assert_eq!(
            normalize_list(&["  Alice ", "", "\t", "Bob", " Bob "]),
            vec!["Alice", "Bob", "Bob"]
        );
        assert_eq!(parse_list("a\n\n  b\r\n c  \n"), vec!["a", "b", "c"]);
    }

    #[test]
    fn mode_keys_round_trip() {
        for mode in DrawMode::ALL {
            assert_eq!(DrawMode::from_key(mode.key()), Some(mode));
        }
        assert_eq!(DrawMode::from_key("Gift-Ladder"), Some(DrawMode::GiftLadder));
        assert_eq!(DrawMode::from_key("lottery"), None);
    }

    #[test]
    fn mode_info_flags() {
        assert!(DrawMode::PickN.info().requires_count);
        assert!(DrawMode::Countdown.info().requires_timer);
        assert!(DrawMode::GiftLadder.info().requires_dual_input);
        assert!(!DrawMode::DailyFortune.uses_candidates());
        assert!(DrawMode::Shuffle.uses_candidates());
    }

    #[test]
    fn mode_serializes_as_key() {
        let text = serde_json::to_string(&DrawMode::DailyFortune).expect("serialize");
        assert_eq!(text, "\"daily_fortune\"");
    }

    #[test]
    fn pairs_render_one_per_line() {
        let result = DrawResult::Pairs(vec![Pairing::new("A", "B"), Pairing::new("B", "A")]);
        assert_eq!(result.to_string(), "A -> B\nB -> A");
        let names = DrawResult::Names(vec!["x".to_string(), "y".to_string()]);
        assert_eq!(names.to_string(), "x\ny");
    }

    #[test]
    fn fortune_renders_four_lines() {
        let fortune = FortuneTable::default()
            .draw(&mut RngState::from_seed(1))
            .expect("fortune");
        let text = DrawResult::Fortune(fortune.clone()).to_string();
        assert_eq!(text.lines().count(), 4);
        assert!(text.contains(&fortune.lucky_item));
    }

    #[test]
    fn engine_rejects_bad_config() {
        let config = LadderConfig {
            min_spacing: 1.0,
            ..LadderConfig::default()
        };
        assert!(matches!(
            DrawEngine::new(config, FortuneTable::default()),
            Err(DrawError::InvalidConfig(_))
        ));
    }

    #[test]
    fn request_deserializes_with_defaults() {
        let request: DrawRequest =
            serde_json::from_str(r#"{ "mode": "pick_n", "candidates": ["a", "b"] }"#)
                .expect("parse");
        assert_eq!(request.settings, DrawSettings::default());
        assert!(request.prizes.is_empty());
    }
}
