use crate::{ConfigError, DrawRng};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FortuneCategory {
    pub label: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LuckyColor {
    pub name: String,
    pub hex: String,
}

/// The three tables a fortune is drawn from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FortuneTable {
    pub fortunes: Vec<FortuneCategory>,
    pub colors: Vec<LuckyColor>,
    pub items: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fortune {
    pub fortune: String,
    pub description: String,
    pub lucky_color: String,
    pub lucky_color_name: String,
    pub lucky_item: String,
}

const FORTUNES: &[(&str, &str)] = &[
    (
        "Great Blessing",
        "Luck arcs like a rainbow and wishes come true. A good day to start something new.",
    ),
    (
        "Middle Blessing",
        "Steady and rising. Effort pays back, so keep your spirits up.",
    ),
    (
        "Small Blessing",
        "Small joys are close at hand. Enjoy the moment.",
    ),
    (
        "Blessing",
        "Smooth sailing and peace of mind. A fine day to meet friends.",
    ),
    (
        "Late Blessing",
        "Gather strength and wait for your moment. Spend the day learning.",
    ),
];

const COLORS: &[(&str, &str)] = &[
    ("Fog Grey", "#9EA8BC"),
    ("Dusty Rose", "#D4C4C4"),
    ("Sage Green", "#8C9E9A"),
    ("Oatmeal", "#D9CDB8"),
    ("Cocoa", "#5E5045"),
    ("Mustard", "#D4AF37"),
    ("Slate Blue", "#778899"),
    ("Terracotta", "#E07A5F"),
];

const ITEMS: &[&str] = &[
    "Hot americano",
    "Succulent",
    "Plaid notebook",
    "Canvas tote",
    "Scented candle",
    "Retro sunglasses",
    "Wooden coaster",
    "Silver ring",
    "Poetry book",
    "Chocolate",
    "Reusable straw",
    "Hand cream",
    "Instant camera",
    "Over-ear headphones",
    "Vitamin C",
];

impl Default for FortuneTable {
    fn default() -> Self {
        Self {
            fortunes: FORTUNES
                .iter()
                .map(|(label, description)| FortuneCategory {
                    label: label.to_string(),
                    description: description.to_string(),
                })
                .collect(),
            colors: COLORS
                .iter()
                .map(|(name, hex)| LuckyColor {
                    name: name.to_string(),
                    hex: hex.to_string(),
                })
                .collect(),
            items: ITEMS.iter().map(|item| item.to_string()).collect(),
        }
    }
}

impl FortuneTable {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.fortunes.is_empty() {
            return Err(ConfigError::EmptyFortuneTable("fortunes"));
        }
        if self.colors.is_empty() {
            return Err(ConfigError::EmptyFortuneTable("colors"));
        }
        if self.items.is_empty() {
            return Err(ConfigError::EmptyFortuneTable("items"));
        }
        Ok(())
    }

    /// Picks one entry from each table independently. `None` when any table
    /// is empty.
    pub fn draw<R: DrawRng + ?Sized>(&self, rng: &mut R) -> Option<Fortune> {
        let category = self.fortunes.get(rng.below(self.fortunes.len()))?;
        let color = self.colors.get(rng.below(self.colors.len()))?;
        let item = self.items.get(rng.below(self.items.len()))?;
        Some(Fortune {
            fortune: category.label.clone(),
            description: category.description.clone(),
            lucky_color: color.hex.clone(),
            lucky_color_name: color.name.clone(),
            lucky_item: item.clone(),
        })
    }
}

/// Draw from the built-in tables.
pub fn fortune_draw<R: DrawRng + ?Sized>(rng: &mut R) -> Fortune {
    let category = &FORTUNES[rng.below(FORTUNES.len())];
    let color = &COLORS[rng.below(COLORS.len())];
    let item = ITEMS[rng.below(ITEMS.len())];
    Fortune {
        fortune: category.0.to_string(),
        description: category.1.to_string(),
        lucky_color: color.1.to_string(),
        lucky_color_name: color.0.to_string(),
        lucky_item: item.to_string(),
    }
}
