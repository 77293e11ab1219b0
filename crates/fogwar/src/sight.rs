use crate::tile::TileCoord;

/// Tile occlusion supplied by the room/door layer.
pub trait ObstacleChecker {
    fn is_obstacle(&self, x: i32, y: i32) -> bool;

    /// `false` lets line-of-sight skip walking the line entirely.
    fn occludes(&self) -> bool {
        true
    }
}

impl<F> ObstacleChecker for F
where
    F: Fn(i32, i32) -> bool,
{
    fn is_obstacle(&self, x: i32, y: i32) -> bool {
        self(x, y)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoObstacles;

impl ObstacleChecker for NoObstacles {
    fn is_obstacle(&self, _x: i32, _y: i32) -> bool {
        false
    }

    fn occludes(&self) -> bool {
        false
    }
}

/// Bresenham tiles between `a` and `b`, both included.
///
/// The walk always starts from the smaller endpoint so `line_tiles(a, b)` and
/// `line_tiles(b, a)` cover the same tiles.
pub fn line_tiles(a: TileCoord, b: TileCoord) -> Vec<TileCoord> {
    let (start, end) = if a <= b { (a, b) } else { (b, a) };
    let mut tiles = Vec::new();
    walk_line(start, end, |tile| {
        tiles.push(tile);
        true
    });
    if a > b {
        tiles.reverse();
    }
    tiles
}

pub fn has_line_of_sight(
    from: TileCoord,
    to: TileCoord,
    use_line_of_sight: bool,
    checker: &dyn ObstacleChecker,
) -> bool {
    if !use_line_of_sight || !checker.occludes() || from == to {
        return true;
    }

    let (start, end) = if from <= to { (from, to) } else { (to, from) };
    walk_line(start, end, |tile| {
        tile == from || !checker.is_obstacle(tile.x, tile.y)
    })
}

/// Visits each tile until `visit` returns `false`; returns whether the walk completed.
fn walk_line<F>(start: TileCoord, end: TileCoord, mut visit: F) -> bool
where
    F: FnMut(TileCoord) -> bool,
{
    let dx = (i64::from(end.x) - i64::from(start.x)).abs();
    let dy = (i64::from(end.y) - i64::from(start.y)).abs();
    let sx: i64 = if start.x < end.x { 1 } else { -1 };
    let sy: i64 = if start.y < end.y { 1 } else { -1 };

    let mut x = i64::from(start.x);
    let mut y = i64::from(start.y);
    let end_x = i64::from(end.x);
    let end_y = i64::from(end.y);
    let mut err = dx - dy;

    loop {
        if !visit(TileCoord::new(x as i32, y as i32)) {
            return false;
        }
        if x == end_x && y == end_y {
            return true;
        }

        let e2 = 2 * err;
        if e2 > -dy {
            err -= dy;
            x += sx;
        }
        if e2 < dx {
            err += dx;
            y += sy;
        }
    }
}
