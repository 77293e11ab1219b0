use std::collections::HashSet;

use fogwar::{FloorId, ObstacleChecker, TileCoord};

/// Wall tiles of one floor; stands in for the room and door layer.
#[derive(Debug, Clone, Default)]
pub(crate) struct FloorLayout {
    walls: HashSet<TileCoord>,
}

impl FloorLayout {
    pub(crate) fn for_floor(floor: FloorId) -> Self {
        match floor.0 {
            0 => ground_floor(),
            1 => pillar_hall(),
            _ => Self::default(),
        }
    }

    pub(crate) fn is_wall(&self, tile: TileCoord) -> bool {
        self.walls.contains(&tile)
    }

    pub(crate) fn wall_count(&self) -> usize {
        self.walls.len()
    }

    fn add_wall_run(&mut self, from: TileCoord, to: TileCoord) {
        for y in from.y.min(to.y)..=from.y.max(to.y) {
            for x in from.x.min(to.x)..=from.x.max(to.x) {
                self.walls.insert(TileCoord::new(x, y));
            }
        }
    }
}

impl ObstacleChecker for FloorLayout {
    fn is_obstacle(&self, x: i32, y: i32) -> bool {
        self.is_wall(TileCoord::new(x, y))
    }

    fn occludes(&self) -> bool {
        !self.walls.is_empty()
    }
}

// Two rooms split by a wall at x = 8 with a doorway on row 0.
fn ground_floor() -> FloorLayout {
    let mut layout = FloorLayout::default();
    layout.add_wall_run(TileCoord::new(8, -6), TileCoord::new(8, -1));
    layout.add_wall_run(TileCoord::new(8, 1), TileCoord::new(8, 6));
    layout.add_wall_run(TileCoord::new(-4, -6), TileCoord::new(20, -6));
    layout.add_wall_run(TileCoord::new(-4, 6), TileCoord::new(20, 6));
    layout
}

fn pillar_hall() -> FloorLayout {
    let mut layout = FloorLayout::default();
    for x in (2..=20).step_by(4) {
        layout.walls.insert(TileCoord::new(x, -2));
        layout.walls.insert(TileCoord::new(x, 2));
    }
    layout
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ground_floor_has_a_doorway() {
        let layout = FloorLayout::for_floor(FloorId(0));
        assert!(layout.is_wall(TileCoord::new(8, -1)));
        assert!(!layout.is_wall(TileCoord::new(8, 0)));
        assert!(layout.is_wall(TileCoord::new(8, 1)));
    }

    #[test]
    fn unknown_floors_are_open() {
        let layout = FloorLayout::for_floor(FloorId(9));
        assert_eq!(layout.wall_count(), 0);
        assert!(!layout.occludes());
    }

    #[test]
    fn layout_acts_as_obstacle_checker() {
        let layout = FloorLayout::for_floor(FloorId(1));
        let checker: &dyn ObstacleChecker = &layout;
        assert!(checker.occludes());
        assert!(checker.is_obstacle(6, 2));
        assert!(!checker.is_obstacle(6, 0));
    }
}
