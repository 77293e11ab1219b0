use tracing::{debug, warn};

use crate::manager::FogOfWar;
use crate::tile::tile_to_world_origin;

use super::pool::{FogTileBackend, TilePool};
use super::viewport::{TileRange, ViewportBounds};

pub const MAX_RENDER_TILES: u64 = 65_536;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    RendererDestroyed,
    FogDestroyed,
    InvalidViewport,
    ViewportUnchanged,
    TooManyTiles,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderOutcome {
    Skipped(SkipReason),
    Rendered { fog_tiles: usize },
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RenderStats {
    pub pool_size: usize,
    pub active_tiles: usize,
    pub created_total: u64,
    pub renders: u64,
    pub skips: u64,
    pub memory_efficiency: f32,
}

pub struct FogRenderer<B: FogTileBackend> {
    backend: B,
    pool: TilePool<B::Handle>,
    tile_size: Option<f32>,
    last_bounds: Option<ViewportBounds>,
    last_generation: Option<u64>,
    renders: u64,
    skips: u64,
    destroyed: bool,
}

impl<B: FogTileBackend> FogRenderer<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            pool: TilePool::default(),
            tile_size: None,
            last_bounds: None,
            last_generation: None,
            renders: 0,
            skips: 0,
            destroyed: false,
        }
    }

    pub fn render(&mut self, fog: &FogOfWar, bounds: ViewportBounds) -> RenderOutcome {
        match self.try_render(fog, bounds) {
            Ok(fog_tiles) => {
                self.renders = self.renders.saturating_add(1);
                RenderOutcome::Rendered { fog_tiles }
            }
            Err(reason) => {
                self.skips = self.skips.saturating_add(1);
                RenderOutcome::Skipped(reason)
            }
        }
    }

    fn try_render(&mut self, fog: &FogOfWar, bounds: ViewportBounds) -> Result<usize, SkipReason> {
        if self.destroyed {
            return Err(SkipReason::RendererDestroyed);
        }
        if fog.is_destroyed() {
            self.hide_overlay();
            return Err(SkipReason::FogDestroyed);
        }

        let tile_size = fog.tile_size();
        let generation = fog.discovery_generation();
        if self.last_generation != Some(generation) {
            self.last_bounds = None;
        }
        if let Some(previous) = self.last_bounds {
            if bounds.moved_less_than(&previous, tile_size) {
                return Err(SkipReason::ViewportUnchanged);
            }
        }

        let Some(range) = TileRange::covering(&bounds, tile_size) else {
            self.hide_overlay();
            return Err(SkipReason::InvalidViewport);
        };
        let tile_count = range.tile_count();
        if tile_count > MAX_RENDER_TILES {
            warn!(
                tile_count,
                max = MAX_RENDER_TILES,
                "fog_render_viewport_too_large"
            );
            self.hide_overlay();
            return Err(SkipReason::TooManyTiles);
        }

        if self.tile_size.is_some_and(|size| size.to_bits() != tile_size.to_bits()) {
            self.pool.drain_all(&mut self.backend);
            debug!(tile_size, "fog_render_pool_rebuilt");
        }
        self.tile_size = Some(tile_size);

        self.pool.release_all(&mut self.backend);
        let floor = fog.current_floor();
        for tile in range.tiles() {
            if fog.is_discovered(floor, tile) {
                continue;
            }
            let (x, y) = tile_to_world_origin(tile, tile_size);
            self.pool.activate(&mut self.backend, tile_size, x, y);
        }

        self.last_bounds = Some(bounds);
        self.last_generation = Some(generation);
        Ok(self.pool.active_len())
    }

    // Stale tiles would sit at the previous viewport's positions.
    fn hide_overlay(&mut self) {
        self.pool.release_all(&mut self.backend);
        self.last_bounds = None;
    }

    /// Forces the next `render` to rebuild regardless of viewport movement.
    pub fn invalidate(&mut self) {
        self.last_bounds = None;
    }

    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.pool.drain_all(&mut self.backend);
        self.last_bounds = None;
        self.last_generation = None;
        self.destroyed = true;
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn pool_size(&self) -> usize {
        self.pool.free_len()
    }

    pub fn active_tile_count(&self) -> usize {
        self.pool.active_len()
    }

    pub fn memory_efficiency(&self) -> f32 {
        let pool = self.pool_size();
        let total = pool + self.active_tile_count();
        if total == 0 {
            return 0.0;
        }
        pool as f32 / total as f32
    }

    pub fn stats(&self) -> RenderStats {
        RenderStats {
            pool_size: self.pool_size(),
            active_tiles: self.active_tile_count(),
            created_total: self.pool.created_total(),
            renders: self.renders,
            skips: self.skips,
            memory_efficiency: self.memory_efficiency(),
        }
    }
}

impl<B: FogTileBackend> Drop for FogRenderer<B> {
    fn drop(&mut self) {
        self.destroy();
    }
}
