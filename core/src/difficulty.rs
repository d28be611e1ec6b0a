use core::fmt;
use core::ops::RangeInclusive;
use serde::{Deserialize, Serialize};

use crate::*;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Level {
    Beginner,
    Intermediate,
    Expert,
    Custom,
}

impl Level {
    pub const fn name(self) -> &'static str {
        use Level::*;
        match self {
            Beginner => "Beginner",
            Intermediate => "Intermediate",
            Expert => "Expert",
            Custom => "Custom",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A named board configuration, best times are tracked per difficulty.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Difficulty {
    pub level: Level,
    pub config: GameConfig,
}

impl Difficulty {
    pub const CUSTOM_WIDTH: RangeInclusive<Coord> = 9..=60;
    pub const CUSTOM_HEIGHT: RangeInclusive<Coord> = 9..=32;
    pub const CUSTOM_MIN_MINES: CellCount = 10;

    pub const PRESETS: [Self; 3] = [Self::beginner(), Self::intermediate(), Self::expert()];

    pub const fn beginner() -> Self {
        Self::preset(Level::Beginner, (9, 9), 10)
    }

    pub const fn intermediate() -> Self {
        Self::preset(Level::Intermediate, (16, 16), 40)
    }

    pub const fn expert() -> Self {
        Self::preset(Level::Expert, (30, 16), 99)
    }

    const fn preset(level: Level, size: Coord2, mines: CellCount) -> Self {
        Self {
            level,
            config: GameConfig::new_unchecked(size, mines),
        }
    }

    /// Custom board, clamped to the supported dimensions and mine range.
    pub fn custom(width: Coord, height: Coord, mines: CellCount) -> Self {
        let width = width.clamp(*Self::CUSTOM_WIDTH.start(), *Self::CUSTOM_WIDTH.end());
        let height = height.clamp(*Self::CUSTOM_HEIGHT.start(), *Self::CUSTOM_HEIGHT.end());
        let max_mines = mult(width, height) - 1;
        let clamped = mines.clamp(Self::CUSTOM_MIN_MINES, max_mines);
        if clamped != mines {
            log::warn!("Custom mine count {mines} clamped to {clamped}");
        }
        Self {
            level: Level::Custom,
            config: GameConfig::new_unchecked((width, height), clamped),
        }
    }

    /// The preset with this exact configuration, or a custom difficulty that is taken as is.
    pub fn for_config(config: GameConfig) -> Self {
        Self::PRESETS
            .into_iter()
            .find(|preset| preset.config == config)
            .unwrap_or(Self {
                level: Level::Custom,
                config,
            })
    }

    /// Case-insensitive lookup of a preset by name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::PRESETS
            .into_iter()
            .find(|preset| preset.name().eq_ignore_ascii_case(name))
    }

    pub const fn name(&self) -> &'static str {
        self.level.name()
    }

    pub fn score_key(&self) -> String {
        let (width, height) = self.config.size;
        format!("{}_{}x{}_{}", self.name(), width, height, self.config.mines)
    }
}

impl Default for Difficulty {
    fn default() -> Self {
        Self::beginner()
    }
}
