use crate::tile::{FloorId, TileCoord};

/// Receives one call per first-time tile discovery.
pub trait DiscoveryListener {
    fn on_tile_discovered(&mut self, floor: FloorId, tile: TileCoord);
}

impl<F> DiscoveryListener for F
where
    F: FnMut(FloorId, TileCoord),
{
    fn on_tile_discovered(&mut self, floor: FloorId, tile: TileCoord) {
        self(floor, tile);
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct IgnoreDiscoveries;

impl DiscoveryListener for IgnoreDiscoveries {
    fn on_tile_discovered(&mut self, _floor: FloorId, _tile: TileCoord) {}
}
