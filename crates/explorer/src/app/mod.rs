pub(crate) mod bootstrap;
mod layout;
mod persist;
mod save;
mod session;
mod snapshot_png;

use std::path::PathBuf;

use fogwar::{ConfigError, FogDataError};
use thiserror::Error;
use tracing::info;

use bootstrap::{CliCommand, RunOptions};
use save::FogSaveFile;
use session::{Session, SessionPlan};

#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error("{0}")]
    Usage(String),
    #[error("read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("parse {what} {path}: {message}")]
    Parse {
        what: &'static str,
        path: PathBuf,
        message: String,
    },
    #[error("invalid fog config: {0}")]
    Config(#[from] ConfigError),
    #[error("validation failed in {path} at {field}: {message}")]
    SaveValidation {
        path: PathBuf,
        field: &'static str,
        message: String,
    },
    #[error("fog data: {0}")]
    FogData(#[from] FogDataError),
    #[error("frame buffer does not match {width}x{height}")]
    FrameSize { width: u32, height: u32 },
    #[error("encode png {path}: {source}")]
    Png {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

pub(crate) fn run(args: &[String]) -> Result<(), AppError> {
    let options = match bootstrap::parse_args(args)? {
        CliCommand::Help => {
            println!("{}", bootstrap::usage_text());
            return Ok(());
        }
        CliCommand::Run(options) => options,
    };
    run_session(&options, std::env::var(bootstrap::CONFIG_ENV_VAR).ok())
}

fn run_session(options: &RunOptions, env_config: Option<String>) -> Result<(), AppError> {
    let config = bootstrap::resolve_config(options, env_config)?;
    let mut session = Session::new(&config)?;

    if let Some(path) = &options.load_path {
        let save = save::read_save(path)?;
        session.restore(&save)?;
        info!(path = %path.display(), floor = save.floor.0, "fog_save_loaded");
    }

    let plan = SessionPlan {
        steps: options.steps,
        floor_switch_at: options.floor_switch_at,
    };
    let report = session.play(&plan);
    info!(
        steps = report.steps,
        moves_with_discovery = report.moves_with_discovery,
        tiles_reported = report.tiles_reported,
        renders = report.render.renders,
        skips = report.render.skips,
        pool_size = report.render.pool_size,
        active_tiles = report.render.active_tiles,
        memory_efficiency = report.render.memory_efficiency,
        "session_finished"
    );

    if let Some(path) = &options.save_path {
        let save = FogSaveFile::capture(session.fog())?;
        save::write_save(path, &save)?;
        info!(path = %path.display(), floors = save.fog.floor_count(), "fog_save_written");
    }

    if let Some(path) = &options.png_path {
        let (width, height) = (config.frame_width, config.frame_height);
        let frame = session.rasterize(width, height);
        snapshot_png::write_png(path, width, height, frame)?;
        info!(path = %path.display(), width, height, "fog_png_written");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(dir: &std::path::Path) -> RunOptions {
        RunOptions {
            steps: 12,
            floor_switch_at: Some(6),
            save_path: Some(dir.join("fog.json")),
            png_path: Some(dir.join("fog.png")),
            ..RunOptions::default()
        }
    }

    #[test]
    fn session_writes_save_and_png() {
        let dir = tempfile::tempdir().expect("tempdir");
        run_session(&options(dir.path()), None).expect("run");

        assert!(dir.path().join("fog.json").is_file());
        assert!(dir.path().join("fog.png").is_file());
    }

    #[test]
    fn saved_session_can_be_resumed() {
        let dir = tempfile::tempdir().expect("tempdir");
        run_session(&options(dir.path()), None).expect("first run");

        let resumed = RunOptions {
            steps: 4,
            load_path: Some(dir.path().join("fog.json")),
            save_path: Some(dir.path().join("resumed.json")),
            ..RunOptions::default()
        };
        run_session(&resumed, None).expect("resume");

        let first = save::read_save(&dir.path().join("fog.json")).expect("first save");
        let second = save::read_save(&dir.path().join("resumed.json")).expect("second save");
        for (floor, tiles) in first.fog.floors() {
            let resumed_tiles = second.fog.floor(floor).expect("floor kept");
            for key in tiles.keys() {
                assert!(resumed_tiles.contains_key(key), "lost {key} on floor {floor}");
            }
        }
    }

    #[test]
    fn missing_load_file_is_reported() {
        let dir = tempfile::tempdir().expect("tempdir");
        let options = RunOptions {
            load_path: Some(dir.path().join("absent.json")),
            ..RunOptions::default()
        };
        let err = run_session(&options, None).expect_err("should fail");
        assert!(matches!(err, AppError::Read { .. }), "{err}");
    }
}
