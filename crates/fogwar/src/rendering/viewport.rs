use serde::{Deserialize, Serialize};

use crate::tile::TileCoord;

/// Camera rectangle in world pixels; `top` is the smaller y.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewportBounds {
    pub left: f32,
    pub right: f32,
    pub top: f32,
    pub bottom: f32,
}

impl ViewportBounds {
    pub fn new(left: f32, right: f32, top: f32, bottom: f32) -> Self {
        Self {
            left,
            right,
            top,
            bottom,
        }
    }

    pub fn centered(center_x: f32, center_y: f32, width: f32, height: f32) -> Self {
        let half_w = width.max(0.0) * 0.5;
        let half_h = height.max(0.0) * 0.5;
        Self {
            left: center_x - half_w,
            right: center_x + half_w,
            top: center_y - half_h,
            bottom: center_y + half_h,
        }
    }

    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    pub fn height(&self) -> f32 {
        self.bottom - self.top
    }

    pub fn is_valid(&self) -> bool {
        [self.left, self.right, self.top, self.bottom]
            .iter()
            .all(|edge| edge.is_finite())
            && self.left <= self.right
            && self.top <= self.bottom
    }

    pub fn moved_less_than(&self, previous: &ViewportBounds, threshold: f32) -> bool {
        (self.left - previous.left).abs() < threshold
            && (self.right - previous.right).abs() < threshold
            && (self.top - previous.top).abs() < threshold
            && (self.bottom - previous.bottom).abs() < threshold
    }
}

/// Inclusive tile index range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileRange {
    pub x_min: i32,
    pub x_max: i32,
    pub y_min: i32,
    pub y_max: i32,
}

impl TileRange {
    pub fn covering(bounds: &ViewportBounds, tile_size: f32) -> Option<Self> {
        if !bounds.is_valid() || !tile_size.is_finite() || tile_size <= 0.0 {
            return None;
        }
        Some(Self {
            x_min: (bounds.left / tile_size).floor() as i32,
            x_max: (bounds.right / tile_size).ceil() as i32,
            y_min: (bounds.top / tile_size).floor() as i32,
            y_max: (bounds.bottom / tile_size).ceil() as i32,
        })
    }

    pub fn width(&self) -> u64 {
        (i64::from(self.x_max) - i64::from(self.x_min) + 1).max(0) as u64
    }

    pub fn height(&self) -> u64 {
        (i64::from(self.y_max) - i64::from(self.y_min) + 1).max(0) as u64
    }

    pub fn tile_count(&self) -> u64 {
        self.width().saturating_mul(self.height())
    }

    pub fn contains(&self, tile: TileCoord) -> bool {
        tile.x >= self.x_min && tile.x <= self.x_max && tile.y >= self.y_min && tile.y <= self.y_max
    }

    /// Row-major, top row first.
    pub fn tiles(&self) -> impl Iterator<Item = TileCoord> {
        let Self {
            x_min,
            x_max,
            y_min,
            y_max,
        } = *self;
        (y_min..=y_max).flat_map(move |y| (x_min..=x_max).map(move |x| TileCoord::new(x, y)))
    }
}
