use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::{
    validate_tile_size, validate_visibility_range, ConfigError, VisibilityConfig,
    MAX_VISIBILITY_RANGE,
};
use crate::listener::{DiscoveryListener, IgnoreDiscoveries};
use crate::pattern::{is_within_range, PatternCache};
use crate::sight::{has_line_of_sight, NoObstacles, ObstacleChecker};
use crate::snapshot::{DecodeReport, FogDataError, FogMap, FogSnapshot};
use crate::store::FloorFogStore;
use crate::tile::{world_to_tile, FloorId, TileCoord};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerPosition {
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub room_id: Option<String>,
}

impl PlayerPosition {
    pub fn new(x: f32, y: f32) -> Self {
        Self {
            x,
            y,
            room_id: None,
        }
    }

    pub fn in_room(mut self, room_id: impl Into<String>) -> Self {
        self.room_id = Some(room_id.into());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FogLifecycle {
    Uninitialized,
    Active,
    Destroyed,
}

pub struct FogOfWar {
    config: VisibilityConfig,
    store: FloorFogStore,
    patterns: PatternCache,
    obstacles: Box<dyn ObstacleChecker>,
    listener: Box<dyn DiscoveryListener>,
    player: Option<PlayerPosition>,
    last_tile: Option<TileCoord>,
    lifecycle: FogLifecycle,
    generation: u64,
}

impl Default for FogOfWar {
    fn default() -> Self {
        Self::with_valid_config(VisibilityConfig::default())
    }
}

impl std::fmt::Debug for FogOfWar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FogOfWar")
            .field("config", &self.config)
            .field("active_floor", &self.store.active_floor())
            .field("player", &self.player)
            .field("last_tile", &self.last_tile)
            .field("lifecycle", &self.lifecycle)
            .field("generation", &self.generation)
            .finish_non_exhaustive()
    }
}

impl FogOfWar {
    pub fn new(config: VisibilityConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::with_valid_config(config))
    }

    fn with_valid_config(config: VisibilityConfig) -> Self {
        Self {
            config,
            store: FloorFogStore::default(),
            patterns: PatternCache::default(),
            obstacles: Box::new(NoObstacles),
            listener: Box::new(IgnoreDiscoveries),
            player: None,
            last_tile: None,
            lifecycle: FogLifecycle::Uninitialized,
            generation: 0,
        }
    }

    /// Load path: the supplied map replaces the active floor, then the player's
    /// surroundings get one regular (unforced) discovery pass.
    pub fn initialize(&mut self, fog_data: FogMap, position: PlayerPosition) {
        if self.is_destroyed() {
            warn!("fog_initialize_after_destroy_ignored");
            return;
        }
        let floor = self.store.active_floor();
        let tiles = fog_data.len();
        self.store.set_floor_data(floor, fog_data);
        self.last_tile = None;
        self.player = Some(position.clone());
        self.lifecycle = FogLifecycle::Active;
        self.bump_generation();
        let revealed = self.update_player_position(position, false);
        info!(floor = floor.0, tiles, revealed, "fog_initialized");
    }

    /// Returns `true` when this call discovered at least one new tile.
    pub fn update_player_position(&mut self, position: PlayerPosition, force: bool) -> bool {
        if self.is_destroyed() {
            return false;
        }
        let Some(tile) = self.tile_for(&position) else {
            warn!(x = position.x, y = position.y, "fog_player_position_not_finite");
            return false;
        };
        self.player = Some(position);
        self.lifecycle = FogLifecycle::Active;

        if !force && self.last_tile == Some(tile) {
            return false;
        }
        self.last_tile = Some(tile);

        let floor = self.store.active_floor();
        let use_line_of_sight = self.config.use_line_of_sight;
        let mut discovered = 0usize;
        if discover(&mut self.store, self.listener.as_mut(), floor, tile) {
            discovered += 1;
        }

        let pattern = self.patterns.get(self.config.visibility_range);
        for &(dx, dy) in pattern.offsets() {
            if dx == 0 && dy == 0 {
                continue;
            }
            let target = tile.offset(dx, dy);
            if !has_line_of_sight(tile, target, use_line_of_sight, self.obstacles.as_ref()) {
                continue;
            }
            if discover(&mut self.store, self.listener.as_mut(), floor, target) {
                discovered += 1;
            }
        }

        if discovered > 0 {
            self.bump_generation();
            debug!(
                floor = floor.0,
                tile_x = tile.x,
                tile_y = tile.y,
                discovered,
                "fog_tiles_discovered"
            );
        }
        discovered > 0
    }

    pub fn force_discover_tile(&mut self, x: f32, y: f32) -> bool {
        if self.is_destroyed() {
            return false;
        }
        let Some(tile) = self.world_tile(x, y) else {
            return false;
        };
        let floor = self.store.active_floor();
        let is_new = discover(&mut self.store, self.listener.as_mut(), floor, tile);
        if is_new {
            self.bump_generation();
        }
        is_new
    }

    /// Reveals the disk of tiles around the world point; returns how many were new.
    pub fn force_discover_area(&mut self, center_x: f32, center_y: f32, radius: f32) -> usize {
        if self.is_destroyed() {
            return 0;
        }
        let Some(center) = self.world_tile(center_x, center_y) else {
            return 0;
        };
        let floor = self.store.active_floor();
        let mut tile_radius = radius / self.config.tile_size;
        if tile_radius > MAX_VISIBILITY_RANGE {
            warn!(
                tile_radius,
                max = MAX_VISIBILITY_RANGE,
                "fog_area_radius_clamped"
            );
            tile_radius = MAX_VISIBILITY_RANGE;
        }

        let mut discovered = 0usize;
        if discover(&mut self.store, self.listener.as_mut(), floor, center) {
            discovered += 1;
        }
        if tile_radius.is_finite() && tile_radius > 0.0 {
            let extent = tile_radius.ceil() as i32;
            for dy in -extent..=extent {
                for dx in -extent..=extent {
                    if (dx == 0 && dy == 0) || !is_within_range(dx, dy, tile_radius) {
                        continue;
                    }
                    let target = center.offset(dx, dy);
                    if discover(&mut self.store, self.listener.as_mut(), floor, target) {
                        discovered += 1;
                    }
                }
            }
        }

        if discovered > 0 {
            self.bump_generation();
        }
        info!(
            floor = floor.0,
            center_x = center.x,
            center_y = center.y,
            tile_radius,
            discovered,
            "fog_area_revealed"
        );
        discovered
    }

    pub fn clear_fog(&mut self) {
        if self.is_destroyed() {
            return;
        }
        let floor = self.store.active_floor();
        self.store.clear_floor(floor);
        self.last_tile = None;
        self.bump_generation();
        info!(floor = floor.0, "fog_cleared");
    }

    pub fn clear_all_fog(&mut self) {
        if self.is_destroyed() {
            return;
        }
        self.store.clear_all();
        self.last_tile = None;
        self.bump_generation();
        info!("fog_cleared_all_floors");
    }

    pub fn set_floor(&mut self, floor: FloorId) {
        if self.is_destroyed() {
            return;
        }
        let previous = self.store.active_floor();
        if self.store.set_floor(floor) {
            self.last_tile = None;
            self.bump_generation();
            info!(from = previous.0, to = floor.0, "fog_floor_switched");
        }
    }

    pub fn set_obstacle_checker(&mut self, checker: impl ObstacleChecker + 'static) {
        if self.is_destroyed() {
            return;
        }
        self.obstacles = Box::new(checker);
    }

    pub fn clear_obstacle_checker(&mut self) {
        self.obstacles = Box::new(NoObstacles);
    }

    pub fn set_discovery_listener(&mut self, listener: impl DiscoveryListener + 'static) {
        if self.is_destroyed() {
            return;
        }
        self.listener = Box::new(listener);
    }

    pub fn set_config(&mut self, config: VisibilityConfig) -> Result<(), ConfigError> {
        config.validate()?;
        if self.is_destroyed() {
            return Ok(());
        }
        let previous = self.config;
        self.config = config;
        if previous.visibility_range.to_bits() != config.visibility_range.to_bits() {
            self.patterns.invalidate();
        }
        if previous.tile_size.to_bits() != config.tile_size.to_bits() {
            self.last_tile = None;
            self.bump_generation();
        }
        if previous != config {
            info!(
                tile_size = config.tile_size,
                visibility_range = config.visibility_range,
                use_line_of_sight = config.use_line_of_sight,
                "fog_config_updated"
            );
        }
        Ok(())
    }

    pub fn set_visibility_range(&mut self, range: f32) -> Result<(), ConfigError> {
        validate_visibility_range(range)?;
        self.set_config(VisibilityConfig {
            visibility_range: range,
            ..self.config
        })
    }

    pub fn set_tile_size(&mut self, tile_size: f32) -> Result<(), ConfigError> {
        validate_tile_size(tile_size)?;
        self.set_config(VisibilityConfig {
            tile_size,
            ..self.config
        })
    }

    pub fn set_use_line_of_sight(&mut self, enabled: bool) {
        if self.is_destroyed() {
            return;
        }
        self.config.use_line_of_sight = enabled;
    }

    pub fn is_tile_discovered(&self, x: f32, y: f32) -> bool {
        match self.world_tile(x, y) {
            Some(tile) => self.is_discovered(self.store.active_floor(), tile),
            None => false,
        }
    }

    pub fn is_discovered(&self, floor: FloorId, tile: TileCoord) -> bool {
        !self.is_destroyed() && self.store.is_discovered(floor, tile)
    }

    pub fn is_active_tile_discovered(&self, tile: TileCoord) -> bool {
        self.is_discovered(self.store.active_floor(), tile)
    }

    pub fn fog_data(&self) -> FogMap {
        if self.is_destroyed() {
            return FogMap::new();
        }
        self.store.floor_data(self.store.active_floor())
    }

    pub fn set_fog_data(&mut self, data: FogMap) {
        if self.is_destroyed() {
            return;
        }
        self.store.set_floor_data(self.store.active_floor(), data);
        self.last_tile = None;
        self.bump_generation();
    }

    pub fn floor_fog_data(&self, floor: FloorId) -> FogMap {
        if self.is_destroyed() {
            return FogMap::new();
        }
        self.store.floor_data(floor)
    }

    pub fn set_floor_fog_data(&mut self, floor: FloorId, data: FogMap) {
        if self.is_destroyed() {
            return;
        }
        self.store.set_floor_data(floor, data);
        if floor == self.store.active_floor() {
            self.last_tile = None;
            self.bump_generation();
        }
    }

    pub fn all_fog_data(&self) -> FogSnapshot {
        if self.is_destroyed() {
            return FogSnapshot::new();
        }
        self.store.all_data()
    }

    pub fn set_all_fog_data(&mut self, data: FogSnapshot) {
        if self.is_destroyed() {
            return;
        }
        let floors = data.floor_count();
        self.store.set_all_data(data);
        self.last_tile = None;
        self.bump_generation();
        info!(floors, "fog_data_imported");
    }

    pub fn export_json(&self) -> Result<String, FogDataError> {
        self.all_fog_data().to_json_string()
    }

    /// Leaves current state untouched when the input is not a JSON object.
    pub fn import_json(&mut self, raw: &str) -> Result<DecodeReport, FogDataError> {
        let (snapshot, report) = FogSnapshot::from_json_str(raw)?;
        self.set_all_fog_data(snapshot);
        Ok(report)
    }

    pub fn destroy(&mut self) {
        if self.is_destroyed() {
            return;
        }
        self.store = FloorFogStore::default();
        self.patterns.invalidate();
        self.obstacles = Box::new(NoObstacles);
        self.listener = Box::new(IgnoreDiscoveries);
        self.player = None;
        self.last_tile = None;
        self.lifecycle = FogLifecycle::Destroyed;
        self.bump_generation();
        info!("fog_destroyed");
    }

    pub fn lifecycle(&self) -> FogLifecycle {
        self.lifecycle
    }

    pub fn is_destroyed(&self) -> bool {
        self.lifecycle == FogLifecycle::Destroyed
    }

    pub fn config(&self) -> VisibilityConfig {
        self.config
    }

    pub fn tile_size(&self) -> f32 {
        self.config.tile_size
    }

    pub fn current_floor(&self) -> FloorId {
        self.store.active_floor()
    }

    pub fn player_position(&self) -> Option<&PlayerPosition> {
        self.player.as_ref()
    }

    pub fn player_tile(&self) -> Option<TileCoord> {
        self.last_tile
    }

    pub fn discovered_count(&self) -> usize {
        if self.is_destroyed() {
            return 0;
        }
        self.store.discovered_count(self.store.active_floor())
    }

    pub fn discovered_tiles(&self, floor: FloorId) -> Vec<TileCoord> {
        if self.is_destroyed() {
            return Vec::new();
        }
        self.store.discovered_tiles(floor)
    }

    pub fn floors(&self) -> Vec<FloorId> {
        if self.is_destroyed() {
            return Vec::new();
        }
        self.store.floors()
    }

    /// Changes whenever the undiscovered set on the active floor may have changed.
    pub fn discovery_generation(&self) -> u64 {
        self.generation
    }

    fn bump_generation(&mut self) {
        self.generation = self.generation.wrapping_add(1);
    }

    fn world_tile(&self, x: f32, y: f32) -> Option<TileCoord> {
        if !x.is_finite() || !y.is_finite() {
            return None;
        }
        Some(world_to_tile(x, y, self.config.tile_size))
    }

    fn tile_for(&self, position: &PlayerPosition) -> Option<TileCoord> {
        self.world_tile(position.x, position.y)
    }
}

fn discover(
    store: &mut FloorFogStore,
    listener: &mut dyn DiscoveryListener,
    floor: FloorId,
    tile: TileCoord,
) -> bool {
    let is_new = store.discover_tile(floor, tile);
    if is_new {
        listener.on_tile_discovered(floor, tile);
    }
    is_new
}
