pub mod config;
pub mod listener;
pub mod manager;
pub mod pattern;
pub mod rendering;
pub mod sight;
pub mod snapshot;
pub mod store;
pub mod tile;

pub use config::{
    ConfigError, VisibilityConfig, DEFAULT_TILE_SIZE, DEFAULT_VISIBILITY_RANGE,
    MAX_VISIBILITY_RANGE,
};
pub use listener::{DiscoveryListener, IgnoreDiscoveries};
pub use manager::{FogLifecycle, FogOfWar, PlayerPosition};
pub use pattern::{is_within_range, PatternCache, VisibilityPattern};
pub use rendering::{
    clear_frame, FogRenderer, FogTileBackend, FrameBackend, FrameTile, FrameTileId,
    RenderOutcome, RenderStats, SkipReason, TilePool, TileRange, ViewportBounds,
    DEFAULT_FOG_COLOR, MAX_RENDER_TILES,
};
pub use sight::{has_line_of_sight, line_tiles, NoObstacles, ObstacleChecker};
pub use snapshot::{decode_fog_map, DecodeReport, FogDataError, FogMap, FogSnapshot};
pub use store::FloorFogStore;
pub use tile::{
    tile_to_world_center, tile_to_world_origin, world_to_tile, FloorId, TileCoord, TileKey,
    TileKeyParseError,
};
