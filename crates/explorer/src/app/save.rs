use std::fmt::Display;
use std::fs;
use std::path::Path;

use fogwar::{FloorId, FogOfWar, FogSnapshot, PlayerPosition, VisibilityConfig};
use serde::{Deserialize, Serialize};

use super::bootstrap::parse_json;
use super::persist::persist_bytes;
use super::AppError;

pub(crate) const SAVE_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct FogSaveFile {
    pub(crate) save_version: u32,
    pub(crate) floor: FloorId,
    pub(crate) player: Option<PlayerPosition>,
    pub(crate) config: VisibilityConfig,
    pub(crate) fog: FogSnapshot,
}

impl FogSaveFile {
    pub(crate) fn capture(fog: &FogOfWar) -> Result<Self, AppError> {
        if fog.is_destroyed() {
            return Err(AppError::Usage(
                "cannot save fog after it was destroyed".to_string(),
            ));
        }
        Ok(Self {
            save_version: SAVE_VERSION,
            floor: fog.current_floor(),
            player: fog.player_position().cloned(),
            config: fog.config(),
            fog: fog.all_fog_data(),
        })
    }
}

pub(crate) fn write_save(path: &Path, save: &FogSaveFile) -> Result<(), AppError> {
    let json = serde_json::to_string_pretty(save).map_err(|error| AppError::Parse {
        what: "save",
        path: path.to_path_buf(),
        message: format!("encode: {error}"),
    })?;
    persist_bytes(path, json.as_bytes())
}

pub(crate) fn read_save(path: &Path) -> Result<FogSaveFile, AppError> {
    let raw = fs::read_to_string(path).map_err(|source| AppError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let save: FogSaveFile = parse_json(&raw, "save", path)?;
    validate_save(&save, path)?;
    Ok(save)
}

fn validate_save(save: &FogSaveFile, path: &Path) -> Result<(), AppError> {
    if save.save_version != SAVE_VERSION {
        return Err(expected_actual(
            path,
            "save_version",
            SAVE_VERSION,
            save.save_version,
        ));
    }
    if let Some(player) = &save.player {
        if !player.x.is_finite() {
            return Err(expected_actual(path, "player.x", "finite number", player.x));
        }
        if !player.y.is_finite() {
            return Err(expected_actual(path, "player.y", "finite number", player.y));
        }
    }
    if let Err(error) = save.config.validate() {
        return Err(AppError::SaveValidation {
            path: path.to_path_buf(),
            field: "config",
            message: error.to_string(),
        });
    }
    Ok(())
}

fn expected_actual(
    path: &Path,
    field: &'static str,
    expected: impl Display,
    actual: impl Display,
) -> AppError {
    AppError::SaveValidation {
        path: path.to_path_buf(),
        field,
        message: format!("expected {expected}, got {actual}"),
    }
}
