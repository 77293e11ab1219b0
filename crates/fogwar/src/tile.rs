use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FloorId(pub u32);

impl fmt::Display for FloorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileCoord {
    pub x: i32,
    pub y: i32,
}

impl TileCoord {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x.saturating_add(dx),
            y: self.y.saturating_add(dy),
        }
    }

    pub fn key(self) -> TileKey {
        TileKey(self)
    }

    pub fn distance_to(self, other: TileCoord) -> f32 {
        let dx = (i64::from(other.x) - i64::from(self.x)) as f64;
        let dy = (i64::from(other.y) - i64::from(self.y)) as f64;
        (dx * dx + dy * dy).sqrt() as f32
    }
}

/// Map key for a tile. Persisted as `"x,y"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileKey(TileCoord);

impl TileKey {
    pub const fn new(x: i32, y: i32) -> Self {
        Self(TileCoord::new(x, y))
    }

    pub fn coord(self) -> TileCoord {
        self.0
    }
}

impl From<TileCoord> for TileKey {
    fn from(coord: TileCoord) -> Self {
        Self(coord)
    }
}

impl fmt::Display for TileKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.0.x, self.0.y)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TileKeyParseError {
    #[error("tile key '{raw}' is missing the ',' separator")]
    MissingSeparator { raw: String },
    #[error("tile key '{raw}' has an invalid {axis} component")]
    InvalidComponent { raw: String, axis: &'static str },
}

impl FromStr for TileKey {
    type Err = TileKeyParseError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let (x_raw, y_raw) =
            raw.split_once(',')
                .ok_or_else(|| TileKeyParseError::MissingSeparator {
                    raw: raw.to_string(),
                })?;
        let x = x_raw
            .parse::<i32>()
            .map_err(|_| TileKeyParseError::InvalidComponent {
                raw: raw.to_string(),
                axis: "x",
            })?;
        let y = y_raw
            .parse::<i32>()
            .map_err(|_| TileKeyParseError::InvalidComponent {
                raw: raw.to_string(),
                axis: "y",
            })?;
        Ok(Self::new(x, y))
    }
}

pub fn world_to_tile(x: f32, y: f32, tile_size: f32) -> TileCoord {
    TileCoord {
        x: (x / tile_size).floor() as i32,
        y: (y / tile_size).floor() as i32,
    }
}

pub fn tile_to_world_center(tile: TileCoord, tile_size: f32) -> (f32, f32) {
    let (x, y) = tile_to_world_origin(tile, tile_size);
    (x + tile_size * 0.5, y + tile_size * 0.5)
}

pub fn tile_to_world_origin(tile: TileCoord, tile_size: f32) -> (f32, f32) {
    (tile.x as f32 * tile_size, tile.y as f32 * tile_size)
}
