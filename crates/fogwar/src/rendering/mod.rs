mod frame;
mod pool;
mod renderer;
mod viewport;

pub use frame::{clear_frame, FrameBackend, FrameTile, FrameTileId, DEFAULT_FOG_COLOR};
pub use pool::{FogTileBackend, TilePool};
pub use renderer::{FogRenderer, RenderOutcome, RenderStats, SkipReason, MAX_RENDER_TILES};
pub use viewport::{TileRange, ViewportBounds};
