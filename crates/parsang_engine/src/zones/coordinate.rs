use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Each parsang is subdivided into a 3x3 block of zones.
pub const ZONES_PER_PARSANG: u32 = 3;
pub const DEFAULT_PARSANGS_X: u32 = 80;
pub const DEFAULT_PARSANGS_Y: u32 = 25;

const FIELD_COUNT: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoordinateParseError {
    #[error("expected 5 dot-separated fields, found {found}")]
    FieldCount { found: usize },
    #[error("coordinate field {index} is empty")]
    EmptyField { index: usize },
    #[error("coordinate field {index} ('{value}') is not a non-negative integer")]
    InvalidField { index: usize, value: String },
}

/// A world cell: `parsang_x.parsang_y.zone_x.zone_y.level`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ZoneCoordinate {
    parsang_x: u32,
    parsang_y: u32,
    zone_x: u32,
    zone_y: u32,
    level: u32,
}

/// The level-less part of a coordinate, used as the key inside one stratum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellKey {
    pub parsang_x: u32,
    pub parsang_y: u32,
    pub zone_x: u32,
    pub zone_y: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct WorldGrid {
    pub parsangs_x: u32,
    pub parsangs_y: u32,
}

impl Default for WorldGrid {
    fn default() -> Self {
        Self {
            parsangs_x: DEFAULT_PARSANGS_X,
            parsangs_y: DEFAULT_PARSANGS_Y,
        }
    }
}

impl WorldGrid {
    pub fn cells_x(&self) -> u32 {
        self.parsangs_x.saturating_mul(ZONES_PER_PARSANG)
    }

    pub fn cells_y(&self) -> u32 {
        self.parsangs_y.saturating_mul(ZONES_PER_PARSANG)
    }
}

impl ZoneCoordinate {
    pub const fn new(parsang_x: u32, parsang_y: u32, zone_x: u32, zone_y: u32, level: u32) -> Self {
        Self {
            parsang_x,
            parsang_y,
            zone_x,
            zone_y,
            level,
        }
    }

    pub fn parse(text: &str) -> Result<Self, CoordinateParseError> {
        let fields = text.split('.').collect::<Vec<_>>();
        if fields.len() != FIELD_COUNT {
            return Err(CoordinateParseError::FieldCount {
                found: fields.len(),
            });
        }

        let mut values = [0u32; FIELD_COUNT];
        for (index, (slot, field)) in values.iter_mut().zip(fields).enumerate() {
            *slot = parse_field(index, field)?;
        }
        let [parsang_x, parsang_y, zone_x, zone_y, level] = values;
        Ok(Self::new(parsang_x, parsang_y, zone_x, zone_y, level))
    }

    /// Maps a flat grid index (`parsang * 3 + zone` on each axis) back to a coordinate.
    pub fn from_grid(grid_x: u32, grid_y: u32, level: u32) -> Self {
        Self::new(
            grid_x / ZONES_PER_PARSANG,
            grid_y / ZONES_PER_PARSANG,
            grid_x % ZONES_PER_PARSANG,
            grid_y % ZONES_PER_PARSANG,
            level,
        )
    }

    pub fn grid_position(&self) -> (u32, u32) {
        (
            self.parsang_x
                .saturating_mul(ZONES_PER_PARSANG)
                .saturating_add(self.zone_x),
            self.parsang_y
                .saturating_mul(ZONES_PER_PARSANG)
                .saturating_add(self.zone_y),
        )
    }

    pub fn split(&self) -> (u32, CellKey) {
        (
            self.level,
            CellKey {
                parsang_x: self.parsang_x,
                parsang_y: self.parsang_y,
                zone_x: self.zone_x,
                zone_y: self.zone_y,
            },
        )
    }

    pub fn join(level: u32, key: CellKey) -> Self {
        Self::new(key.parsang_x, key.parsang_y, key.zone_x, key.zone_y, level)
    }

    pub fn is_within_world(&self, grid: &WorldGrid) -> bool {
        self.parsang_x < grid.parsangs_x
            && self.parsang_y < grid.parsangs_y
            && self.zone_x < ZONES_PER_PARSANG
            && self.zone_y < ZONES_PER_PARSANG
    }

    pub fn parsang_x(&self) -> u32 {
        self.parsang_x
    }

    pub fn parsang_y(&self) -> u32 {
        self.parsang_y
    }

    pub fn zone_x(&self) -> u32 {
        self.zone_x
    }

    pub fn zone_y(&self) -> u32 {
        self.zone_y
    }

    pub fn level(&self) -> u32 {
        self.level
    }
}

fn parse_field(index: usize, field: &str) -> Result<u32, CoordinateParseError> {
    if field.is_empty() {
        return Err(CoordinateParseError::EmptyField { index });
    }
    let invalid = || CoordinateParseError::InvalidField {
        index,
        value: field.to_string(),
    };
    if !field.bytes().all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    field.parse::<u32>().map_err(|_| invalid())
}

impl FromStr for ZoneCoordinate {
    type Err = CoordinateParseError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        Self::parse(text)
    }
}

impl fmt::Display for ZoneCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}.{}.{}.{}",
            self.parsang_x, self.parsang_y, self.zone_x, self.zone_y, self.level
        )
    }
}

impl fmt::Display for CellKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}.{}.{}",
            self.parsang_x, self.parsang_y, self.zone_x, self.zone_y
        )
    }
}
