use std::collections::{HashMap, HashSet};

use crate::snapshot::{FogMap, FogSnapshot};
use crate::tile::{FloorId, TileCoord, TileKey};

/// Sparse per-floor discovery maps plus a lookup set mirroring the active floor.
#[derive(Debug, Clone)]
pub struct FloorFogStore {
    floors: HashMap<FloorId, FogMap>,
    active_floor: FloorId,
    discovered: HashSet<TileKey>,
}

impl Default for FloorFogStore {
    fn default() -> Self {
        Self::new(FloorId::default())
    }
}

impl FloorFogStore {
    pub fn new(active_floor: FloorId) -> Self {
        let mut floors = HashMap::new();
        floors.insert(active_floor, FogMap::new());
        Self {
            floors,
            active_floor,
            discovered: HashSet::new(),
        }
    }

    pub fn active_floor(&self) -> FloorId {
        self.active_floor
    }

    /// Returns `true` only when the tile was not already discovered.
    pub fn discover_tile(&mut self, floor: FloorId, tile: TileCoord) -> bool {
        let key = tile.key();
        let map = self.floors.entry(floor).or_default();
        if map.get(&key).copied().unwrap_or(false) {
            return false;
        }
        map.insert(key, true);
        if floor == self.active_floor {
            self.discovered.insert(key);
        }
        true
    }

    pub fn is_discovered(&self, floor: FloorId, tile: TileCoord) -> bool {
        let key = tile.key();
        if floor == self.active_floor {
            return self.discovered.contains(&key);
        }
        self.floors
            .get(&floor)
            .and_then(|map| map.get(&key))
            .copied()
            .unwrap_or(false)
    }

    /// Returns `true` when the active floor changed.
    pub fn set_floor(&mut self, floor: FloorId) -> bool {
        if floor == self.active_floor {
            return false;
        }
        self.active_floor = floor;
        self.floors.entry(floor).or_default();
        self.rebuild_cache();
        true
    }

    pub fn clear_floor(&mut self, floor: FloorId) {
        if let Some(map) = self.floors.get_mut(&floor) {
            map.clear();
        }
        if floor == self.active_floor {
            self.discovered.clear();
        }
    }

    pub fn clear_all(&mut self) {
        self.floors.clear();
        self.floors.insert(self.active_floor, FogMap::new());
        self.discovered.clear();
    }

    pub fn floor_data(&self, floor: FloorId) -> FogMap {
        self.floors.get(&floor).cloned().unwrap_or_default()
    }

    pub fn set_floor_data(&mut self, floor: FloorId, data: FogMap) {
        self.floors.insert(floor, data);
        if floor == self.active_floor {
            self.rebuild_cache();
        }
    }

    pub fn all_data(&self) -> FogSnapshot {
        let mut snapshot = FogSnapshot::new();
        for (floor, map) in &self.floors {
            snapshot.insert_floor(*floor, map.clone());
        }
        snapshot
    }

    pub fn set_all_data(&mut self, data: FogSnapshot) {
        self.floors = data.into_floors().into_iter().collect();
        self.floors.entry(self.active_floor).or_default();
        self.rebuild_cache();
    }

    pub fn discovered_count(&self, floor: FloorId) -> usize {
        if floor == self.active_floor {
            return self.discovered.len();
        }
        self.floors
            .get(&floor)
            .map(|map| map.values().filter(|discovered| **discovered).count())
            .unwrap_or(0)
    }

    pub fn floors(&self) -> Vec<FloorId> {
        let mut floors: Vec<FloorId> = self.floors.keys().copied().collect();
        floors.sort();
        floors
    }

    pub fn discovered_tiles(&self, floor: FloorId) -> Vec<TileCoord> {
        let mut tiles: Vec<TileCoord> = self
            .floors
            .get(&floor)
            .map(|map| {
                map.iter()
                    .filter(|(_, discovered)| **discovered)
                    .map(|(key, _)| key.coord())
                    .collect()
            })
            .unwrap_or_default();
        tiles.sort();
        tiles
    }

    fn rebuild_cache(&mut self) {
        self.discovered.clear();
        if let Some(map) = self.floors.get(&self.active_floor) {
            self.discovered.extend(
                map.iter()
                    .filter(|(_, discovered)| **discovered)
                    .map(|(key, _)| *key),
            );
        }
    }

    #[cfg(test)]
    fn cache_matches_active_floor(&self) -> bool {
        let expected: HashSet<TileKey> = self
            .floors
            .get(&self.active_floor)
            .map(|map| {
                map.iter()
                    .filter(|(_, discovered)| **discovered)
                    .map(|(key, _)| *key)
                    .collect()
            })
            .unwrap_or_default();
        expected == self.discovered
    }
}
