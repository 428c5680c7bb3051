use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("ladder config: {field} must be positive")]
    NotPositive { field: &'static str },
    #[error("ladder config: speed_min {min} exceeds speed_max {max}")]
    InvertedSpeedRange { min: f64, max: f64 },
    #[error("ladder config: band_margin {margin} leaves no room in band_height {height}")]
    BandTooShort { height: f64, margin: f64 },
    #[error(
        "ladder config: min_spacing {spacing} must exceed speed_max + exit_nudge ({reach})"
    )]
    SpacingTooTight { spacing: f64, reach: f64 },
    #[error("fortune table has an empty {0} list")]
    EmptyFortuneTable(&'static str),
}

/// Geometry and motion of the ladder board, in board units (one unit per
/// pixel of the reference canvas).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LadderConfig {
    /// Vertical extent tokens travel, from the top entry to the prize row.
    pub band_height: f64,
    /// Rung-free band at the top and the bottom.
    pub band_margin: f64,
    pub lane_spacing: f64,
    /// Least vertical gap between two rungs that share a lane.
    pub min_spacing: f64,
    /// Rung attempts per lane.
    pub rungs_per_lane: usize,
    pub speed_min: f64,
    pub speed_max: f64,
    pub snap_threshold: f64,
    /// Drop applied after a transfer so the rung just crossed is not hit again.
    pub exit_nudge: f64,
    /// Above this many candidates the ladder is resolved without a board.
    pub visual_lane_limit: usize,
}

impl Default for LadderConfig {
    fn default() -> Self {
        Self {
            band_height: 250.0,
            band_margin: 30.0,
            lane_spacing: 64.0,
            min_spacing: 20.0,
            rungs_per_lane: 4,
            speed_min: 2.0,
            speed_max: 3.0,
            snap_threshold: 3.0,
            exit_nudge: 3.0,
            visual_lane_limit: 8,
        }
    }
}

impl LadderConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("band_height", self.band_height),
            ("lane_spacing", self.lane_spacing),
            ("min_spacing", self.min_spacing),
            ("speed_min", self.speed_min),
            ("snap_threshold", self.snap_threshold),
            ("exit_nudge", self.exit_nudge),
        ] {
            if !(value > 0.0) {
                return Err(ConfigError::NotPositive { field });
            }
        }
        if self.band_margin < 0.0 {
            return Err(ConfigError::NotPositive {
                field: "band_margin",
            });
        }
        if self.speed_min > self.speed_max {
            return Err(ConfigError::InvertedSpeedRange {
                min: self.speed_min,
                max: self.speed_max,
            });
        }
        if self.band_height <= self.band_margin * 2.0 {
            return Err(ConfigError::BandTooShort {
                height: self.band_height,
                margin: self.band_margin,
            });
        }
        let reach = self.speed_max + self.exit_nudge;
        if self.min_spacing <= reach {
            return Err(ConfigError::SpacingTooTight {
                spacing: self.min_spacing,
                reach,
            });
        }
        Ok(())
    }

    pub fn is_visual(&self, lane_count: usize) -> bool {
        lane_count <= self.visual_lane_limit
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DrawSettings {
    pub pick_count: usize,
    pub timer_seconds: u32,
}

impl Default for DrawSettings {
    fn default() -> Self {
        Self {
            pick_count: 1,
            timer_seconds: 5,
        }
    }
}

impl DrawSettings {
    /// Countdown length before a timed reveal; never shorter than a second.
    pub fn countdown(&self) -> Duration {
        Duration::from_secs(u64::from(self.timer_seconds.max(1)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert_eq!(LadderConfig::default().validate(), Ok(()));
    }

    #[test]
    fn rejects_spacing_within_one_step() {
        let config = LadderConfig {
            min_spacing: 5.0,
            ..LadderConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::SpacingTooTight { .. })
        ));
    }

    #[test]
    fn rejects_inverted_speed_range() {
        let config = LadderConfig {
            speed_min: 4.0,
            ..LadderConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvertedSpeedRange { .. })
        ));
    }

    #[test]
    fn rejects_margin_covering_band() {
        let config = LadderConfig {
            band_margin: 125.0,
            ..LadderConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::BandTooShort { .. })
        ));
    }

    #[test]
    fn rejects_nan_sizes() {
        let config = LadderConfig {
            lane_spacing: f64::NAN,
            ..LadderConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::NotPositive {
                field: "lane_spacing"
            })
        );
    }

    #[test]
    fn countdown_has_one_second_floor() {
        let settings = DrawSettings {
            pick_count: 1,
            timer_seconds: 0,
        };
        assert_eq!(settings.countdown(), Duration::from_secs(1));
        assert_eq!(DrawSettings::default().countdown(), Duration::from_secs(5));
    }

    #[test]
    fn partial_config_fills_defaults() {
        let config: LadderConfig =
            serde_json::from_str(r#"{ "lane_spacing": 80.0 }"#).expect("parse");
        assert_eq!(config.lane_spacing, 80.0);
        assert_eq!(config.visual_lane_limit, 8);
    }
}
