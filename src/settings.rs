//! Game settings and grid configuration
//!
//! `Settings` is what the player (or the page URL) chooses; `GridConfig` is
//! the validated, fully-derived form the simulation runs on.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;
use crate::sim::BlockColor;

/// Errors raised while parsing or validating settings
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("invalid value {value:?} for setting `{key}`")]
    InvalidValue { key: String, value: String },
    #[error("setting `{key}` = {value} is outside {min}..={max}")]
    OutOfRange {
        key: &'static str,
        value: usize,
        min: usize,
        max: usize,
    },
    #[error("malformed settings JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Difficulty presets (controls palette size)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Hard,
}

impl Difficulty {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "easy" => Some(Difficulty::Easy),
            "normal" | "norm" => Some(Difficulty::Normal),
            "hard" => Some(Difficulty::Hard),
            _ => None,
        }
    }

    /// Number of distinct colors dealt onto the grid
    pub fn color_count(&self) -> usize {
        match self {
            Difficulty::Easy => 3,
            Difficulty::Normal => 4,
            Difficulty::Hard => 5,
        }
    }
}

/// Player-facing settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub difficulty: Difficulty,
    /// Number of rows (height levels) on the cylinder
    pub rows: usize,
    /// Number of column slots around the cylinder
    pub cols: usize,
    /// Fixed run seed; a time-based seed is used when absent
    pub seed: Option<u64>,
    /// Jump blocks straight to their target instead of easing
    pub reduced_motion: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            difficulty: Difficulty::Normal,
            rows: DEFAULT_ROWS,
            cols: DEFAULT_COLS,
            seed: None,
            reduced_motion: false,
        }
    }
}

impl Settings {
    /// Parse settings from JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Parse settings from a URL query string (`?rows=5&difficulty=hard`)
    pub fn from_query(query: &str) -> Result<Self, SettingsError> {
        let mut settings = Self::default();
        let query = query.trim_start_matches('?');

        for pair in query.split('&').filter(|p| !p.is_empty()) {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            let invalid = || SettingsError::InvalidValue {
                key: key.to_string(),
                value: value.to_string(),
            };
            match key {
                "rows" => settings.rows = value.parse().map_err(|_| invalid())?,
                "cols" => settings.cols = value.parse().map_err(|_| invalid())?,
                "seed" => settings.seed = Some(value.parse().map_err(|_| invalid())?),
                "difficulty" => {
                    settings.difficulty = Difficulty::parse(value).ok_or_else(invalid)?
                }
                "reduced_motion" => {
                    settings.reduced_motion = match value {
                        "" | "1" | "true" | "on" => true,
                        "0" | "false" | "off" => false,
                        _ => return Err(invalid()),
                    }
                }
                _ => log::debug!("Ignoring unknown setting `{}`", key),
            }
        }

        settings.validate()?;
        Ok(settings)
    }

    /// Check grid dimensions are playable
    pub fn validate(&self) -> Result<(), SettingsError> {
        if !(1..=MAX_ROWS).contains(&self.rows) {
            return Err(SettingsError::OutOfRange {
                key: "rows",
                value: self.rows,
                min: 1,
                max: MAX_ROWS,
            });
        }
        if !(MIN_COLS..=MAX_COLS).contains(&self.cols) {
            return Err(SettingsError::OutOfRange {
                key: "cols",
                value: self.cols,
                min: MIN_COLS,
                max: MAX_COLS,
            });
        }
        Ok(())
    }

    /// Build the simulation config these settings describe
    pub fn grid_config(&self) -> Result<GridConfig, SettingsError> {
        self.validate()?;
        Ok(GridConfig {
            rows: self.rows,
            cols: self.cols,
            radius: CYLINDER_RADIUS,
            row_spacing: ROW_SPACING,
            palette: BlockColor::ALL[..self.difficulty.color_count()].to_vec(),
            smoothing: if self.reduced_motion { 1.0 } else { ANGLE_SMOOTHING },
            refill_delay_ticks: REFILL_DELAY_TICKS,
            score_per_match: SCORE_PER_MATCH,
        })
    }
}

/// Validated simulation parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridConfig {
    pub rows: usize,
    pub cols: usize,
    /// Cylinder radius blocks sit on
    pub radius: f32,
    /// Vertical distance between rows
    pub row_spacing: f32,
    /// Colors dealt onto the grid
    pub palette: Vec<BlockColor>,
    /// Fraction of remaining angle eased per tick (1.0 = snap)
    pub smoothing: f32,
    pub refill_delay_ticks: u32,
    pub score_per_match: u64,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            rows: DEFAULT_ROWS,
            cols: DEFAULT_COLS,
            radius: CYLINDER_RADIUS,
            row_spacing: ROW_SPACING,
            palette: BlockColor::ALL[..Difficulty::Normal.color_count()].to_vec(),
            smoothing: ANGLE_SMOOTHING,
            refill_delay_ticks: REFILL_DELAY_TICKS,
            score_per_match: SCORE_PER_MATCH,
        }
    }
}

impl GridConfig {
    /// Angle between adjacent column slots
    #[inline]
    pub fn step(&self) -> f32 {
        std::f32::consts::TAU / self.cols as f32
    }

    /// Height of a row's centerline
    #[inline]
    pub fn row_height(&self, row: usize) -> f32 {
        row as f32 * self.row_spacing
    }
}
