use std::fs;
use std::num::ParseIntError;
use std::path::{Path, PathBuf};
use std::time::Duration;

use engine::LoopConfig;
use serde::Deserialize;
use thiserror::Error;
use tracing::info;

use super::gameplay::{
    SessionSettings, DEFAULT_BOT_COUNT, DEFAULT_HOUSE_COUNT, DEFAULT_TREE_COUNT,
};

pub(crate) const CONFIG_PATH_ENV_VAR: &str = "DROPZONE_CONFIG";
pub(crate) const SEED_ENV_VAR: &str = "DROPZONE_SEED";

const DEFAULT_TICKS_PER_SECOND: u32 = 60;
const DEFAULT_MAX_TICKS_PER_FRAME: u32 = 5;
const DEFAULT_SESSION_TIME_LIMIT_SECONDS: f64 = 180.0;

#[derive(Debug, Error)]
pub(crate) enum ConfigError {
    #[error("read config '{}': {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("parse config at {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("DROPZONE_SEED='{value}' is not a u64 seed: {source}")]
    Seed {
        value: String,
        #[source]
        source: ParseIntError,
    },
    #[error("invalid config: {field} {reason}")]
    Invalid {
        field: &'static str,
        reason: &'static str,
    },
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct GameConfig {
    pub(crate) bot_count: usize,
    pub(crate) house_count: usize,
    pub(crate) tree_count: usize,
    pub(crate) seed: Option<u64>,
    pub(crate) ticks_per_second: u32,
    pub(crate) max_ticks_per_frame: u32,
    /// `None` runs until the session finishes on its own.
    pub(crate) session_time_limit_seconds: Option<f64>,
    pub(crate) realtime: bool,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            bot_count: DEFAULT_BOT_COUNT,
            house_count: DEFAULT_HOUSE_COUNT,
            tree_count: DEFAULT_TREE_COUNT,
            seed: None,
            ticks_per_second: DEFAULT_TICKS_PER_SECOND,
            max_ticks_per_frame: DEFAULT_MAX_TICKS_PER_FRAME,
            session_time_limit_seconds: Some(DEFAULT_SESSION_TIME_LIMIT_SECONDS),
            realtime: false,
        }
    }
}

impl GameConfig {
    pub(crate) fn load_from_env() -> Result<Self, ConfigError> {
        let path = std::env::var_os(CONFIG_PATH_ENV_VAR).map(PathBuf::from);
        let seed = std::env::var(SEED_ENV_VAR).ok();
        Self::load(path.as_deref(), seed.as_deref())
    }

    pub(crate) fn load(
        path: Option<&Path>,
        seed_override: Option<&str>,
    ) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => {
                let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })?;
                let config = Self::from_json_str(&raw)?;
                info!(path = %path.display(), "config_loaded");
                config
            }
            None => Self::default(),
        };

        if let Some(raw_seed) = seed_override.map(str::trim).filter(|raw| !raw.is_empty()) {
            let seed = raw_seed.parse::<u64>().map_err(|source| ConfigError::Seed {
                value: raw_seed.to_string(),
                source,
            })?;
            config.seed = Some(seed);
        }

        config.validate()?;
        Ok(config)
    }

    pub(crate) fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let mut deserializer = serde_json::Deserializer::from_str(raw);
        serde_path_to_error::deserialize(&mut deserializer).map_err(|error| {
            let path = error.path().to_string();
            ConfigError::Parse {
                path: if path.is_empty() { ".".to_string() } else { path },
                source: error.into_inner(),
            }
        })
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.ticks_per_second == 0 {
            return Err(ConfigError::Invalid {
                field: "ticks_per_second",
                reason: "must be greater than zero",
            });
        }
        if self.max_ticks_per_frame == 0 {
            return Err(ConfigError::Invalid {
                field: "max_ticks_per_frame",
                reason: "must be greater than zero",
            });
        }
        if self.bot_count == 0 {
            return Err(ConfigError::Invalid {
                field: "bot_count",
                reason: "must be at least one",
            });
        }
        if let Some(limit) = self.session_time_limit_seconds {
            if !limit.is_finite() || limit <= 0.0 {
                return Err(ConfigError::Invalid {
                    field: "session_time_limit_seconds",
                    reason: "must be a positive finite number",
                });
            }
        }
        Ok(())
    }

    pub(crate) fn session_settings(&self) -> SessionSettings {
        SessionSettings {
            bot_count: self.bot_count,
            house_count: self.house_count,
            tree_count: self.tree_count,
            seed: self.seed,
        }
    }

    pub(crate) fn loop_config(&self) -> LoopConfig {
        LoopConfig {
            target_tps: self.ticks_per_second,
            max_ticks_per_frame: self.max_ticks_per_frame,
            session_time_limit: self
                .session_time_limit_seconds
                .map(Duration::from_secs_f64),
            realtime: self.realtime,
            ..LoopConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn empty_object_yields_defaults() {
        let config = GameConfig::from_json_str("{}").expect("parse");
        assert_eq!(config, GameConfig::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_config_keeps_other_defaults() {
        let config =
            GameConfig::from_json_str(r#"{ "bot_count": 2, "seed": 42, "realtime": true }"#)
                .expect("parse");

        assert_eq!(config.bot_count, 2);
        assert_eq!(config.seed, Some(42));
        assert!(config.realtime);
        assert_eq!(config.house_count, DEFAULT_HOUSE_COUNT);
        assert_eq!(config.session_settings().seed, Some(42));
    }

    #[test]
    fn parse_error_names_the_offending_field() {
        let error = GameConfig::from_json_str(r#"{ "tree_count": "many" }"#)
            .expect_err("string count must fail");
        match error {
            ConfigError::Parse { path, .. } => assert_eq!(path, "tree_count"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn unknown_fields_are_rejected() {
        assert!(matches!(
            GameConfig::from_json_str(r#"{ "bots": 3 }"#),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn validate_rejects_degenerate_values() {
        let cases = [
            (
                GameConfig {
                    ticks_per_second: 0,
                    ..GameConfig::default()
                },
                "ticks_per_second",
            ),
            (
                GameConfig {
                    bot_count: 0,
                    ..GameConfig::default()
                },
                "bot_count",
            ),
            (
                GameConfig {
                    session_time_limit_seconds: Some(f64::NAN),
                    ..GameConfig::default()
                },
                "session_time_limit_seconds",
            ),
            (
                GameConfig {
                    session_time_limit_seconds: Some(-1.0),
                    ..GameConfig::default()
                },
                "session_time_limit_seconds",
            ),
        ];

        for (config, expected_field) in cases {
            match config.validate() {
                Err(ConfigError::Invalid { field, .. }) => assert_eq!(field, expected_field),
                other => panic!("expected invalid {expected_field}, got {other:?}"),
            }
        }
    }

    #[test]
    fn seed_override_replaces_file_seed() {
        let config = GameConfig::load(None, Some(" 1234 ")).expect("load");
        assert_eq!(config.seed, Some(1234));

        assert!(matches!(
            GameConfig::load(None, Some("abc")),
            Err(ConfigError::Seed { .. })
        ));
        assert_eq!(GameConfig::load(None, Some("")).expect("load").seed, None);
    }

    #[test]
    fn load_reads_json_file() {
        let temp = TempDir::new().expect("tempdir");
        let path = temp.path().join("dropzone.json");
        fs::write(
            &path,
            r#"{ "bot_count": 3, "session_time_limit_seconds": null }"#,
        )
        .expect("write config");

        let config = GameConfig::load(Some(&path), None).expect("load");

        assert_eq!(config.bot_count, 3);
        assert_eq!(config.loop_config().session_time_limit, None);
    }

    #[test]
    fn malformed_file_reports_field_path() {
        let temp = TempDir::new().expect("tempdir");
        let path = temp.path().join("dropzone.json");
        fs::write(&path, r#"{ "house_count": -4 }"#).expect("write config");

        match GameConfig::load(Some(&path), Some("7")) {
            Err(ConfigError::Parse { path, .. }) => assert_eq!(path, "house_count"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn missing_file_reports_path() {
        let error = GameConfig::load(Some(Path::new("/nonexistent/dropzone.json")), None)
            .expect_err("missing file");
        assert!(error.to_string().contains("/nonexistent/dropzone.json"));
    }

    #[test]
    fn loop_config_carries_timing_fields() {
        let config = GameConfig {
            ticks_per_second: 30,
            session_time_limit_seconds: Some(2.5),
            ..GameConfig::default()
        };
        let loop_config = config.loop_config();

        assert_eq!(loop_config.target_tps, 30);
        assert_eq!(
            loop_config.session_time_limit,
            Some(Duration::from_millis(2500))
        );
        assert!(loop_config.validate().is_ok());
    }
}
