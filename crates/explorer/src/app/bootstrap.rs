use std::fs;
use std::path::{Path, PathBuf};

use fogwar::VisibilityConfig;
use serde::{Deserialize, Serialize};
use tracing::info;
use tracing_subscriber::EnvFilter;

use super::AppError;

pub(crate) const CONFIG_ENV_VAR: &str = "FOGWAR_CONFIG";
const DEFAULT_STEPS: usize = 24;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct ExplorerConfig {
    pub(crate) fog: VisibilityConfig,
    pub(crate) viewport_width: f32,
    pub(crate) viewport_height: f32,
    pub(crate) frame_width: u32,
    pub(crate) frame_height: u32,
}

impl Default for ExplorerConfig {
    fn default() -> Self {
        Self {
            fog: VisibilityConfig::default(),
            viewport_width: 1280.0,
            viewport_height: 768.0,
            frame_width: 320,
            frame_height: 192,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RunOptions {
    pub(crate) config_path: Option<PathBuf>,
    pub(crate) save_path: Option<PathBuf>,
    pub(crate) load_path: Option<PathBuf>,
    pub(crate) png_path: Option<PathBuf>,
    pub(crate) steps: usize,
    pub(crate) floor_switch_at: Option<usize>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            config_path: None,
            save_path: None,
            load_path: None,
            png_path: None,
            steps: DEFAULT_STEPS,
            floor_switch_at: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum CliCommand {
    Help,
    Run(RunOptions),
}

pub(crate) fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .compact()
        .init();
}

pub(crate) fn usage_text() -> String {
    format!(
        "usage: explorer [options]\n\
\n\
options:\n\
  --config <path>          explorer config json (falls back to ${CONFIG_ENV_VAR})\n\
  --load <path>            resume from a fog save file\n\
  --save <path>            write a fog save file when the walk ends\n\
  --png <path>             write the final fog overlay as png\n\
  --steps <n>              number of scripted moves (default {DEFAULT_STEPS})\n\
  --floor-switch-at <n>    move to floor 1 before step n\n\
  -h, --help               show this text"
    )
}

pub(crate) fn parse_args(args: &[String]) -> Result<CliCommand, AppError> {
    let mut options = RunOptions::default();
    let mut index = 0usize;
    while index < args.len() {
        match args[index].as_str() {
            "-h" | "--help" => return Ok(CliCommand::Help),
            "--config" => {
                options.config_path = Some(path_value(args, index)?);
                index += 2;
            }
            "--save" => {
                options.save_path = Some(path_value(args, index)?);
                index += 2;
            }
            "--load" => {
                options.load_path = Some(path_value(args, index)?);
                index += 2;
            }
            "--png" => {
                options.png_path = Some(path_value(args, index)?);
                index += 2;
            }
            "--steps" => {
                options.steps = count_value(args, index)?;
                index += 2;
            }
            "--floor-switch-at" => {
                options.floor_switch_at = Some(count_value(args, index)?);
                index += 2;
            }
            other => {
                return Err(AppError::Usage(format!(
                    "unknown argument '{other}'\n\n{}",
                    usage_text()
                )))
            }
        }
    }
    Ok(CliCommand::Run(options))
}

fn flag_value<'a>(args: &'a [String], index: usize) -> Result<&'a str, AppError> {
    args.get(index + 1)
        .map(String::as_str)
        .ok_or_else(|| AppError::Usage(format!("missing value for {}", args[index])))
}

fn path_value(args: &[String], index: usize) -> Result<PathBuf, AppError> {
    flag_value(args, index).map(PathBuf::from)
}

fn count_value(args: &[String], index: usize) -> Result<usize, AppError> {
    let value = flag_value(args, index)?;
    value.parse::<usize>().map_err(|_| {
        AppError::Usage(format!(
            "invalid {} value '{value}' (expected unsigned integer)",
            args[index]
        ))
    })
}

/// `--config` wins over the environment; with neither, defaults apply.
pub(crate) fn resolve_config(
    options: &RunOptions,
    env_config: Option<String>,
) -> Result<ExplorerConfig, AppError> {
    let path = options.config_path.clone().or_else(|| {
        env_config
            .map(|raw| raw.trim().to_string())
            .filter(|raw| !raw.is_empty())
            .map(PathBuf::from)
    });
    let Some(path) = path else {
        info!("explorer_config_defaults");
        return Ok(ExplorerConfig::default());
    };

    let config = load_config(&path)?;
    info!(
        path = %path.display(),
        tile_size = config.fog.tile_size,
        visibility_range = config.fog.visibility_range,
        use_line_of_sight = config.fog.use_line_of_sight,
        "explorer_config_loaded"
    );
    Ok(config)
}

fn load_config(path: &Path) -> Result<ExplorerConfig, AppError> {
    let raw = fs::read_to_string(path).map_err(|source| AppError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let config: ExplorerConfig = parse_json(&raw, "config", path)?;
    config.fog.validate()?;
    if !(config.viewport_width.is_finite() && config.viewport_width > 0.0)
        || !(config.viewport_height.is_finite() && config.viewport_height > 0.0)
    {
        return Err(AppError::Parse {
            what: "config",
            path: path.to_path_buf(),
            message: "viewport size must be finite and positive".to_string(),
        });
    }
    if config.frame_width == 0 || config.frame_height == 0 {
        return Err(AppError::Parse {
            what: "config",
            path: path.to_path_buf(),
            message: "frame size must be non-zero".to_string(),
        });
    }
    Ok(config)
}

pub(crate) fn parse_json<T>(raw: &str, what: &'static str, path: &Path) -> Result<T, AppError>
where
    T: for<'de> Deserialize<'de>,
{
    let mut deserializer = serde_json::Deserializer::from_str(raw);
    serde_path_to_error::deserialize::<_, T>(&mut deserializer).map_err(|error| {
        let at = error.path().to_string();
        let source = error.into_inner();
        let message = if at.is_empty() || at == "." {
            source.to_string()
        } else {
            format!("at {at}: {source}")
        };
        AppError::Parse {
            what,
            path: path.to_path_buf(),
            message,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|arg| arg.to_string()).collect()
    }

    #[test]
    fn parses_every_flag() {
        let parsed = parse_args(&args(&[
            "--config",
            "cfg.json",
            "--save",
            "out.json",
            "--load",
            "in.json",
            "--png",
            "fog.png",
            "--steps",
            "7",
            "--floor-switch-at",
            "3",
        ]))
        .expect("parse");
        assert_eq!(
            parsed,
            CliCommand::Run(RunOptions {
                config_path: Some(PathBuf::from("cfg.json")),
                save_path: Some(PathBuf::from("out.json")),
                load_path: Some(PathBuf::from("in.json")),
                png_path: Some(PathBuf::from("fog.png")),
                steps: 7,
                floor_switch_at: Some(3),
            })
        );
    }

    #[test]
    fn empty_args_use_defaults() {
        assert_eq!(
            parse_args(&[]).expect("parse"),
            CliCommand::Run(RunOptions::default())
        );
        assert_eq!(parse_args(&args(&["-h"])).expect("parse"), CliCommand::Help);
    }

    #[test]
    fn rejects_bad_values() {
        let err = parse_args(&args(&["--steps", "many"])).expect_err("bad count");
        assert!(err.to_string().contains("--steps"), "{err}");
        let err = parse_args(&args(&["--save"])).expect_err("missing value");
        assert!(err.to_string().contains("missing value for --save"), "{err}");
        assert!(parse_args(&args(&["--fly"])).is_err());
    }

    #[test]
    fn cli_config_beats_environment() {
        let dir = tempfile::tempdir().expect("tempdir");
        let cli_path = dir.path().join("cli.json");
        let env_path = dir.path().join("env.json");
        fs::write(&cli_path, r#"{"fog": {"visibility_range": 5.0}}"#).expect("write cli");
        fs::write(&env_path, r#"{"fog": {"visibility_range": 2.0}}"#).expect("write env");

        let options = RunOptions {
            config_path: Some(cli_path),
            ..RunOptions::default()
        };
        let env = Some(env_path.display().to_string());
        let config = resolve_config(&options, env.clone()).expect("cli config");
        assert_eq!(config.fog.visibility_range, 5.0);
        assert_eq!(config.fog.tile_size, 64.0);

        let config = resolve_config(&RunOptions::default(), env).expect("env config");
        assert_eq!(config.fog.visibility_range, 2.0);

        let config = resolve_config(&RunOptions::default(), None).expect("defaults");
        assert_eq!(config, ExplorerConfig::default());
    }

    #[test]
    fn parse_errors_name_the_json_path() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("bad.json");
        fs::write(&path, r#"{"fog": {"tile_size": "big"}}"#).expect("write");
        let options = RunOptions {
            config_path: Some(path),
            ..RunOptions::default()
        };
        let err = resolve_config(&options, None).expect_err("should fail");
        assert!(err.to_string().contains("fog.tile_size"), "{err}");
    }

    #[test]
    fn invalid_fog_values_are_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("range.json");
        fs::write(&path, r#"{"fog": {"visibility_range": -2.0}}"#).expect("write");
        let options = RunOptions {
            config_path: Some(path),
            ..RunOptions::default()
        };
        let err = resolve_config(&options, None).expect_err("should fail");
        assert!(matches!(err, AppError::Config(_)), "{err}");
    }
}
