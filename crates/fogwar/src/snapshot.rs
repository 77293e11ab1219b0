//! Persisted fog format: `{"<floor>": {"<x>,<y>": bool}}`.
//!
//! Decoding is tolerant. Entries that do not fit the shape are skipped and
//! counted instead of failing the whole load.

use std::collections::{BTreeMap, HashMap};

use serde::de::Deserializer;
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::warn;

use crate::tile::{FloorId, TileKey};

pub type FogMap = HashMap<TileKey, bool>;

#[derive(Debug, Error)]
pub enum FogDataError {
    #[error("fog data is not valid json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("fog data root must be a json object, got {found}")]
    RootNotObject { found: &'static str },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FogSnapshot {
    floors: BTreeMap<FloorId, FogMap>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecodeReport {
    pub floors: usize,
    pub tiles: usize,
    pub skipped_entries: usize,
}

impl FogSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn floor(&self, floor: FloorId) -> Option<&FogMap> {
        self.floors.get(&floor)
    }

    pub fn insert_floor(&mut self, floor: FloorId, map: FogMap) {
        self.floors.insert(floor, map);
    }

    pub fn floors(&self) -> impl Iterator<Item = (FloorId, &FogMap)> + '_ {
        self.floors.iter().map(|(floor, map)| (*floor, map))
    }

    pub fn floor_count(&self) -> usize {
        self.floors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.floors.is_empty()
    }

    pub fn into_floors(self) -> BTreeMap<FloorId, FogMap> {
        self.floors
    }

    pub fn from_json_str(raw: &str) -> Result<(Self, DecodeReport), FogDataError> {
        let value: Value = serde_json::from_str(raw)?;
        if !value.is_object() {
            return Err(FogDataError::RootNotObject {
                found: json_type_name(&value),
            });
        }
        Ok(Self::from_value(&value))
    }

    pub fn to_json_string(&self) -> Result<String, FogDataError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_value(value: &Value) -> (Self, DecodeReport) {
        let mut snapshot = Self::default();
        let mut report = DecodeReport::default();
        let Some(root) = value.as_object() else {
            report.skipped_entries += 1;
            return (snapshot, report);
        };

        for (floor_key, floor_value) in root {
            let Ok(floor) = floor_key.parse::<u32>().map(FloorId) else {
                report.skipped_entries += 1;
                continue;
            };
            let (map, skipped) = decode_fog_map(floor_value);
            report.floors += 1;
            report.tiles += map.len();
            report.skipped_entries += skipped;
            snapshot.floors.insert(floor, map);
        }

        if report.skipped_entries > 0 {
            warn!(
                skipped = report.skipped_entries,
                floors = report.floors,
                "fog_snapshot_entries_skipped"
            );
        }
        (snapshot, report)
    }
}

/// Decodes one floor's map, returning the number of entries that were skipped.
pub fn decode_fog_map(value: &Value) -> (FogMap, usize) {
    let Some(entries) = value.as_object() else {
        return (FogMap::new(), 1);
    };

    let mut map = FogMap::with_capacity(entries.len());
    let mut skipped = 0;
    for (key, flag) in entries {
        let (Ok(tile), Some(discovered)) = (key.parse::<TileKey>(), flag.as_bool()) else {
            skipped += 1;
            continue;
        };
        map.insert(tile, discovered);
    }
    (map, skipped)
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

struct FogMapRef<'a>(&'a FogMap);

impl Serialize for FogMapRef<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut entries: Vec<(&TileKey, &bool)> = self.0.iter().collect();
        entries.sort_by_key(|(key, _)| **key);
        let mut map = serializer.serialize_map(Some(entries.len()))?;
        for (key, discovered) in entries {
            map.serialize_entry(&key.to_string(), discovered)?;
        }
        map.end()
    }
}

impl Serialize for FogSnapshot {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.floors.len()))?;
        for (floor, fog) in &self.floors {
            map.serialize_entry(&floor.to_string(), &FogMapRef(fog))?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for FogSnapshot {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(Self::from_value(&value).0)
    }
}
