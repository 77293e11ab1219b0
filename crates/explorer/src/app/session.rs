use std::cell::Cell;
use std::rc::Rc;

use fogwar::{
    clear_frame, FloorId, FogOfWar, FogRenderer, FrameBackend, PlayerPosition, RenderOutcome,
    RenderStats, TileCoord, ViewportBounds,
};
use tracing::{debug, info};

use super::bootstrap::ExplorerConfig;
use super::layout::FloorLayout;
use super::save::FogSaveFile;
use super::AppError;

const UPPER_FLOOR: FloorId = FloorId(1);
const FRAME_CLEAR_COLOR: [u8; 4] = [96, 128, 88, 255];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct SessionPlan {
    pub(crate) steps: usize,
    pub(crate) floor_switch_at: Option<usize>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub(crate) struct SessionReport {
    pub(crate) steps: usize,
    pub(crate) moves_with_discovery: usize,
    pub(crate) tiles_reported: usize,
    pub(crate) render: RenderStats,
}

pub(crate) struct Session {
    fog: FogOfWar,
    renderer: FogRenderer<FrameBackend>,
    viewport_width: f32,
    viewport_height: f32,
    last_view: Option<ViewportBounds>,
    discoveries: Rc<Cell<usize>>,
}

impl Session {
    pub(crate) fn new(config: &ExplorerConfig) -> Result<Self, AppError> {
        let mut fog = FogOfWar::new(config.fog)?;
        fog.set_obstacle_checker(FloorLayout::for_floor(fog.current_floor()));

        let discoveries = Rc::new(Cell::new(0usize));
        let counter = Rc::clone(&discoveries);
        fog.set_discovery_listener(move |_floor: FloorId, _tile: TileCoord| {
            counter.set(counter.get() + 1);
        });

        Ok(Self {
            fog,
            renderer: FogRenderer::new(FrameBackend::default()),
            viewport_width: config.viewport_width,
            viewport_height: config.viewport_height,
            last_view: None,
            discoveries,
        })
    }

    pub(crate) fn fog(&self) -> &FogOfWar {
        &self.fog
    }

    pub(crate) fn restore(&mut self, save: &FogSaveFile) -> Result<(), AppError> {
        self.fog.set_config(save.config)?;
        self.fog.set_all_fog_data(save.fog.clone());
        self.switch_floor(save.floor);
        let position = save.player.clone().unwrap_or_default();
        let data = self.fog.fog_data();
        self.fog.initialize(data, position);
        Ok(())
    }

    pub(crate) fn play(&mut self, plan: &SessionPlan) -> SessionReport {
        let start = self
            .fog
            .player_position()
            .cloned()
            .unwrap_or_else(|| spawn_point(self.fog.tile_size()));
        let stride = self.fog.tile_size() * 0.5;

        let mut moves_with_discovery = 0usize;
        for step in 0..plan.steps {
            if plan.floor_switch_at == Some(step) {
                self.switch_floor(UPPER_FLOOR);
            }
            let position = PlayerPosition {
                x: start.x + stride * step as f32,
                ..start.clone()
            };
            if self.fog.update_player_position(position.clone(), false) {
                moves_with_discovery += 1;
            }

            let view = ViewportBounds::centered(
                position.x,
                position.y,
                self.viewport_width,
                self.viewport_height,
            );
            let outcome = self.renderer.render(&self.fog, view);
            if let RenderOutcome::Rendered { fog_tiles } = outcome {
                self.last_view = Some(view);
                debug!(step, fog_tiles, "session_frame_rendered");
            }
        }

        SessionReport {
            steps: plan.steps,
            moves_with_discovery,
            tiles_reported: self.discoveries.get(),
            render: self.renderer.stats(),
        }
    }

    /// RGBA pixels of the last rendered viewport.
    pub(crate) fn rasterize(&self, width: u32, height: u32) -> Vec<u8> {
        let mut frame = vec![0u8; width as usize * height as usize * 4];
        clear_frame(&mut frame, FRAME_CLEAR_COLOR);
        if let Some(view) = self.last_view {
            self.renderer
                .backend()
                .rasterize(&mut frame, width, height, view);
        }
        frame
    }

    fn switch_floor(&mut self, floor: FloorId) {
        if floor == self.fog.current_floor() {
            return;
        }
        self.fog.set_floor(floor);
        let layout = FloorLayout::for_floor(floor);
        info!(floor = floor.0, walls = layout.wall_count(), "session_floor_entered");
        self.fog.set_obstacle_checker(layout);
    }
}

fn spawn_point(tile_size: f32) -> PlayerPosition {
    PlayerPosition::new(tile_size * 0.5, tile_size * 0.5).in_room("entry")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> Session {
        Session::new(&ExplorerConfig::default()).expect("session")
    }

    #[test]
    fn walking_discovers_and_renders() {
        let mut session = session();
        let report = session.play(&SessionPlan {
            steps: 10,
            floor_switch_at: None,
        });

        assert_eq!(report.steps, 10);
        assert!(report.moves_with_discovery >= 5, "{report:?}");
        assert_eq!(report.tiles_reported, session.fog().discovered_count());
        assert!(report.render.renders >= 1);
        assert!(report.render.renders + report.render.skips == 10);
    }

    #[test]
    fn half_tile_steps_hit_the_short_circuit() {
        let mut session = session();
        let report = session.play(&SessionPlan {
            steps: 4,
            floor_switch_at: None,
        });
        assert_eq!(report.moves_with_discovery, 3);
    }

    #[test]
    fn wall_blocks_sight_into_next_room() {
        let mut session = session();
        session.play(&SessionPlan {
            steps: 14,
            floor_switch_at: None,
        });
        let fog = session.fog();
        assert_eq!(fog.player_tile(), Some(TileCoord::new(7, 0)));
        assert!(fog.is_active_tile_discovered(TileCoord::new(9, 0)), "doorway");
        assert!(!fog.is_active_tile_discovered(TileCoord::new(9, 2)));
        assert!(!fog.is_active_tile_discovered(TileCoord::new(9, -2)));
        assert!(!fog.is_active_tile_discovered(TileCoord::new(8, 1)));
    }

    #[test]
    fn floor_switch_starts_a_fresh_map() {
        let mut session = session();
        session.play(&SessionPlan {
            steps: 6,
            floor_switch_at: Some(3),
        });
        let fog = session.fog();
        assert_eq!(fog.current_floor(), UPPER_FLOOR);
        assert!(!fog.discovered_tiles(FloorId(0)).is_empty());
        assert!(!fog.discovered_tiles(UPPER_FLOOR).is_empty());
        assert!(!fog
            .discovered_tiles(UPPER_FLOOR)
            .contains(&TileCoord::new(-3, 0)));
    }

    #[test]
    fn restore_resumes_at_saved_floor_and_position() {
        let mut first = session();
        first.play(&SessionPlan {
            steps: 8,
            floor_switch_at: Some(2),
        });
        let save = FogSaveFile::capture(first.fog()).expect("capture");

        let mut second = session();
        second.restore(&save).expect("restore");
        assert_eq!(second.fog().current_floor(), UPPER_FLOOR);
        assert_eq!(second.fog().player_position(), save.player.as_ref());
        assert_eq!(
            second.fog().discovered_tiles(FloorId(0)),
            first.fog().discovered_tiles(FloorId(0))
        );
        assert_eq!(second.fog().player_tile(), first.fog().player_tile());
    }

    #[test]
    fn rasterized_frame_has_fog_and_clear_pixels() {
        let mut session = session();
        session.play(&SessionPlan {
            steps: 1,
            floor_switch_at: None,
        });
        let frame = session.rasterize(64, 48);
        assert_eq!(frame.len(), 64 * 48 * 4);
        let pixels: Vec<&[u8]> = frame.chunks_exact(4).collect();
        assert!(pixels.iter().any(|p| *p == FRAME_CLEAR_COLOR));
        assert!(pixels.iter().any(|p| *p == fogwar::DEFAULT_FOG_COLOR));
    }
}
