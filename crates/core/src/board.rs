use crate::{ConfigError, DrawError, DrawRng, LadderConfig};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// A horizontal bar across connector slot `slot`, joining lanes `slot` and
/// `slot + 1` at height `y`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rung {
    pub slot: usize,
    pub y: f64,
}

impl Rung {
    pub fn touches(&self, lane: usize) -> bool {
        self.slot == lane || self.slot + 1 == lane
    }

    /// Lane reached by crossing from `lane`.
    pub fn other_side(&self, lane: usize) -> usize {
        if lane == self.slot {
            self.slot + 1
        } else {
            self.slot
        }
    }

    fn shares_lane_with(&self, other: &Rung) -> bool {
        self.slot.abs_diff(other.slot) <= 1
    }
}

/// Per-board motion constants the traversal reads.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MotionRules {
    pub snap_threshold: f64,
    pub exit_nudge: f64,
}

impl MotionRules {
    pub fn from_config(config: &LadderConfig) -> Self {
        Self {
            snap_threshold: config.snap_threshold,
            exit_nudge: config.exit_nudge,
        }
    }
}

impl Default for MotionRules {
    fn default() -> Self {
        Self::from_config(&LadderConfig::default())
    }
}

/// Immutable ladder layout. Tokens enter at `y = 0` and finish at
/// `y = height`; rungs are kept sorted by ascending `y`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LadderBoard {
    lane_count: usize,
    height: f64,
    lane_spacing: f64,
    min_spacing: f64,
    motion: MotionRules,
    rungs: Vec<Rung>,
}

impl LadderBoard {
    /// Lays out rungs for `lane_count` lanes.
    ///
    /// Makes `rungs_per_lane * lane_count` placement attempts. Each attempt
    /// draws a slot and a height inside the band and is kept only when no
    /// accepted rung touching either of its lanes sits within `min_spacing`.
    /// Rejected attempts are dropped, so the board may hold fewer rungs than
    /// attempts.
    pub fn generate<R: DrawRng + ?Sized>(
        lane_count: usize,
        config: &LadderConfig,
        rng: &mut R,
    ) -> Self {
        let slot_count = lane_count.saturating_sub(1);
        let attempts = if slot_count == 0 {
            0
        } else {
            config.rungs_per_lane * lane_count
        };
        let band_start = config.band_margin;
        let band_len = config.band_height - config.band_margin * 2.0;

        let mut rungs: Vec<Rung> = Vec::with_capacity(attempts);
        for _ in 0..attempts {
            let candidate = Rung {
                slot: rng.below(slot_count),
                y: band_start + rng.unit() * band_len,
            };
            let crowded = rungs.iter().any(|rung| {
                rung.shares_lane_with(&candidate)
                    && (rung.y - candidate.y).abs() < config.min_spacing
            });
            if !crowded {
                rungs.push(candidate);
            }
        }
        debug!(
            lanes = lane_count,
            attempts,
            accepted = rungs.len(),
            "ladder board generated"
        );

        Self::from_rungs(
            lane_count,
            config.band_height,
            config.lane_spacing,
            config.min_spacing,
            MotionRules::from_config(config),
            rungs,
        )
    }

    /// Board from an explicit rung list. Rungs on slots outside the board are
    /// dropped.
    pub fn from_rungs(
        lane_count: usize,
        height: f64,
        lane_spacing: f64,
        min_spacing: f64,
        motion: MotionRules,
        mut rungs: Vec<Rung>,
    ) -> Self {
        rungs.retain(|rung| rung.slot + 1 < lane_count);
        rungs.sort_by(|a, b| a.y.total_cmp(&b.y));
        Self {
            lane_count,
            height,
            lane_spacing,
            min_spacing,
            motion,
            rungs,
        }
    }

    pub fn lane_count(&self) -> usize {
        self.lane_count
    }

    pub fn slot_count(&self) -> usize {
        self.lane_count.saturating_sub(1)
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn lane_spacing(&self) -> f64 {
        self.lane_spacing
    }

    pub fn min_spacing(&self) -> f64 {
        self.min_spacing
    }

    pub fn motion(&self) -> MotionRules {
        self.motion
    }

    pub fn rungs(&self) -> &[Rung] {
        &self.rungs
    }

    pub fn lane_x(&self, lane: usize) -> f64 {
        lane as f64 * self.lane_spacing
    }

    /// First rung touching `lane` with `from <= y <= to`.
    pub fn next_rung(&self, lane: usize, from: f64, to: f64) -> Option<&Rung> {
        let start = self.rungs.partition_point(|rung| rung.y < from);
        self.rungs[start..]
            .iter()
            .take_while(|rung| rung.y <= to)
            .find(|rung| rung.touches(lane))
    }

    /// Checks that a token walking the board meets every rung the layout
    /// implies. Rungs must lie in `[0, height)`, and two rungs sharing a
    /// lane must be at least `exit_nudge` apart, or the drop after a
    /// crossing jumps over the lower one.
    pub fn check_traversable(&self) -> Result<(), DrawError> {
        let nudge = self.motion.exit_nudge;
        for (idx, rung) in self.rungs.iter().enumerate() {
            if !(rung.y >= 0.0 && rung.y < self.height) {
                return Err(DrawError::RungOutOfBand {
                    slot: rung.slot,
                    y: rung.y,
                    height: self.height,
                });
            }
            let crowded = self.rungs[idx + 1..]
                .iter()
                .take_while(|other| other.y - rung.y < nudge)
                .find(|other| other.shares_lane_with(rung));
            if let Some(lower) = crowded {
                return Err(DrawError::CrowdedRungs {
                    upper: rung.y,
                    lower: lower.y,
                    nudge,
                });
            }
        }
        Ok(())
    }

    /// Lane each top entry ends in when every rung is crossed, computed
    /// directly from the layout.
    pub fn trace(&self) -> Vec<usize> {
        let mut at_lane: Vec<usize> = (0..self.lane_count).collect();
        for rung in &self.rungs {
            at_lane.swap(rung.slot, rung.slot + 1);
        }
        let mut end_lane = vec![0; self.lane_count];
        for (lane, start) in at_lane.into_iter().enumerate() {
            end_lane[start] = lane;
        }
        end_lane
    }
}

/// Board with default geometry apart from the given height and spacing.
/// The spacing must clear one step plus the exit nudge.
pub fn build_ladder_board<R: DrawRng + ?Sized>(
    lane_count: usize,
    height: f64,
    min_spacing: f64,
    rng: &mut R,
) -> Result<LadderBoard, ConfigError> {
    let config = LadderConfig {
        band_height: height,
        band_margin: LadderConfig::default().band_margin.min(height / 4.0),
        min_spacing,
        ..LadderConfig::default()
    };
    config.validate()?;
    Ok(LadderBoard::generate(lane_count, &config, rng))
}
