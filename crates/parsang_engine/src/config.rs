use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::app::{LoopConfig, ZoomLimits};
use crate::zones::{
    LogScanMode, SourcePaths, WorldGrid, DEFAULT_CACHE_FILE_SUFFIX, DEFAULT_WORLD_PREFIX,
};

pub const CONFIG_ENV_VAR: &str = "PARSANG_CONFIG";
pub const SAVE_DIR_ENV_VAR: &str = "PARSANG_SAVE_DIR";
pub const SAVE_UID_ENV_VAR: &str = "PARSANG_SAVE_UID";
pub const LEVEL_ENV_VAR: &str = "PARSANG_LEVEL";
pub const SCAN_MODE_ENV_VAR: &str = "PARSANG_SCAN_MODE";

pub const DEFAULT_LOG_FILE_NAME: &str = "Player.log";
pub const DEFAULT_CATALOG_FILE: &str = "cities.csv";
pub const SURFACE_LEVEL: u32 = 10;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse config at {field_path}: {source}")]
    Parse {
        field_path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid config at {field}: {message}")]
    Invalid {
        field: &'static str,
        message: String,
    },
}

/// Where the save data lives. The activity log and the zone cache are both
/// found relative to `save_dir`; the catalog path is taken as given.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct SourceConfig {
    pub save_dir: PathBuf,
    pub save_uid: Option<String>,
    pub log_file_name: String,
    pub catalog_file: PathBuf,
    pub cache_world_prefix: String,
    pub cache_file_suffix: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            save_dir: PathBuf::from("."),
            save_uid: None,
            log_file_name: DEFAULT_LOG_FILE_NAME.to_string(),
            catalog_file: PathBuf::from(DEFAULT_CATALOG_FILE),
            cache_world_prefix: DEFAULT_WORLD_PREFIX.to_string(),
            cache_file_suffix: DEFAULT_CACHE_FILE_SUFFIX.to_string(),
        }
    }
}

impl SourceConfig {
    pub fn cache_dir(&self) -> Option<PathBuf> {
        self.save_uid
            .as_ref()
            .map(|uid| self.save_dir.join("Saves").join(uid).join("ZoneCache"))
    }

    pub fn resolve(&self) -> SourcePaths {
        SourcePaths {
            log_file: self.save_dir.join(&self.log_file_name),
            catalog_file: self.catalog_file.clone(),
            cache_dir: self.cache_dir(),
            cache_world_prefix: self.cache_world_prefix.clone(),
            cache_file_suffix: self.cache_file_suffix.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct MapConfig {
    pub grid: WorldGrid,
    pub cell_size_px: f64,
    pub zoom: ZoomLimits,
    /// When false the map shows `surface_level` only and ignores level stepping.
    pub level_aware: bool,
    pub surface_level: u32,
    pub scan_mode: LogScanMode,
    pub poll_interval_ms: u64,
    pub pan_step_px: f64,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            grid: WorldGrid::default(),
            cell_size_px: 8.0,
            zoom: ZoomLimits::default(),
            level_aware: true,
            surface_level: SURFACE_LEVEL,
            scan_mode: LogScanMode::default(),
            poll_interval_ms: 5_000,
            pan_step_px: 64.0,
        }
    }
}

impl MapConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub sources: SourceConfig,
    pub map: MapConfig,
    pub window: LoopConfig,
}

impl ViewerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let zoom = &self.map.zoom;
        if !(zoom.min.is_finite() && zoom.min > 0.0) {
            return Err(invalid("map.zoom.min", "positive number", zoom.min));
        }
        if !(zoom.max.is_finite() && zoom.max >= zoom.min) {
            return Err(invalid("map.zoom.max", format!(">= {}", zoom.min), zoom.max));
        }
        if !(zoom.min..=zoom.max).contains(&zoom.initial) {
            return Err(invalid(
                "map.zoom.initial",
                format!("within [{}, {}]", zoom.min, zoom.max),
                zoom.initial,
            ));
        }
        if !(zoom.speed.is_finite() && zoom.speed > 0.0) {
            return Err(invalid("map.zoom.speed", "positive number", zoom.speed));
        }
        if !(self.map.cell_size_px.is_finite() && self.map.cell_size_px > 0.0) {
            return Err(invalid(
                "map.cell_size_px",
                "positive number",
                self.map.cell_size_px,
            ));
        }
        if self.map.poll_interval_ms == 0 {
            return Err(invalid("map.poll_interval_ms", "non-zero", 0));
        }
        if !self.map.pan_step_px.is_finite() {
            return Err(invalid(
                "map.pan_step_px",
                "finite number",
                self.map.pan_step_px,
            ));
        }
        Ok(())
    }

    /// Applies `PARSANG_*` overrides. Values that do not parse are logged and ignored.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup(SAVE_DIR_ENV_VAR).filter(|value| !value.trim().is_empty()) {
            self.sources.save_dir = PathBuf::from(dir);
        }
        if let Some(uid) = lookup(SAVE_UID_ENV_VAR).filter(|value| !value.trim().is_empty()) {
            self.sources.save_uid = Some(uid.trim().to_string());
        }
        if let Some(value) = lookup(LEVEL_ENV_VAR) {
            match value.trim().parse::<u32>() {
                Ok(level) => {
                    self.map.surface_level = level;
                    self.map.level_aware = false;
                }
                Err(error) => warn!(
                    env_var = LEVEL_ENV_VAR,
                    value = value.as_str(),
                    error = %error,
                    "env_override_ignored"
                ),
            }
        }
        if let Some(value) = lookup(SCAN_MODE_ENV_VAR) {
            match LogScanMode::from_name(&value) {
                Some(mode) => self.map.scan_mode = mode,
                None => warn!(
                    env_var = SCAN_MODE_ENV_VAR,
                    value = value.as_str(),
                    "env_override_ignored"
                ),
            }
        }
    }
}

fn invalid(field: &'static str, expected: impl std::fmt::Display, actual: impl std::fmt::Display) -> ConfigError {
    ConfigError::Invalid {
        field,
        message: format!("expected {expected}, got {actual}"),
    }
}

pub fn parse_viewer_config(raw: &str) -> Result<ViewerConfig, ConfigError> {
    let mut deserializer = serde_json::Deserializer::from_str(raw);
    serde_path_to_error::deserialize::<_, ViewerConfig>(&mut deserializer).map_err(|error| {
        let field_path = error.path().to_string();
        ConfigError::Parse {
            field_path,
            source: error.into_inner(),
        }
    })
}

pub fn read_viewer_config(path: &Path) -> Result<ViewerConfig, ConfigError> {
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_viewer_config(&raw)
}

/// Defaults, then the optional JSON file named by `PARSANG_CONFIG`, then env overrides.
pub fn load_viewer_config<F>(lookup: F) -> Result<ViewerConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = match lookup(CONFIG_ENV_VAR).filter(|value| !value.trim().is_empty()) {
        Some(path) => {
            let path = PathBuf::from(path);
            let config = read_viewer_config(&path)?;
            info!(path = %path.display(), "config_loaded");
            config
        }
        None => ViewerConfig::default(),
    };
    config.apply_env_overrides(&lookup);
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use tempfile::TempDir;

    use super::*;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect::<HashMap<_, _>>();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults_match_the_classic_viewer() {
        let config = load_viewer_config(env(&[])).expect("defaults");
        assert_eq!(config.window.window_width, 1280);
        assert_eq!(config.window.window_height, 800);
        assert_eq!(config.map.cell_size_px, 8.0);
        assert_eq!(config.map.grid, WorldGrid::default());
        assert_eq!(config.map.poll_interval_ms, 5_000);
        assert_eq!(config.map.surface_level, 10);
        assert_eq!(config.map.scan_mode, LogScanMode::FullRescan);

        let paths = config.sources.resolve();
        assert_eq!(paths.log_file, PathBuf::from("./Player.log"));
        assert_eq!(paths.catalog_file, PathBuf::from("cities.csv"));
        assert_eq!(paths.cache_dir, None);
    }

    #[test]
    fn partial_json_keeps_defaults_for_missing_fields() {
        let config = parse_viewer_config(
            r#"{ "map": { "zoom": { "max": 4.0 }, "scan_mode": "incremental" },
                 "sources": { "save_uid": "abc" } }"#,
        )
        .expect("config");

        assert_eq!(config.map.zoom.max, 4.0);
        assert_eq!(config.map.zoom.min, 0.2);
        assert_eq!(config.map.scan_mode, LogScanMode::Incremental);
        assert_eq!(
            config.sources.cache_dir(),
            Some(PathBuf::from("./Saves/abc/ZoneCache"))
        );
    }

    #[test]
    fn parse_error_names_the_field_path() {
        let error = parse_viewer_config(r#"{ "map": { "zoom": { "speed": "fast" } } }"#)
            .expect_err("type error");
        match error {
            ConfigError::Parse { field_path, .. } => assert_eq!(field_path, "map.zoom.speed"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn env_overrides_apply_and_bad_values_are_ignored() {
        let config = load_viewer_config(env(&[
            (SAVE_DIR_ENV_VAR, "/games/qud"),
            (SAVE_UID_ENV_VAR, " 1234 "),
            (LEVEL_ENV_VAR, "12"),
            (SCAN_MODE_ENV_VAR, "sideways"),
        ]))
        .expect("config");

        assert_eq!(config.sources.save_dir, PathBuf::from("/games/qud"));
        assert_eq!(config.sources.save_uid.as_deref(), Some("1234"));
        assert_eq!(config.map.surface_level, 12);
        assert!(!config.map.level_aware);
        assert_eq!(config.map.scan_mode, LogScanMode::FullRescan);

        let bad_level = load_viewer_config(env(&[(LEVEL_ENV_VAR, "-3")])).expect("config");
        assert!(bad_level.map.level_aware);
        assert_eq!(bad_level.map.surface_level, 10);
    }

    #[test]
    fn config_file_is_read_from_env_path() {
        let temp = TempDir::new().expect("tempdir");
        let path = temp.path().join("viewer.json");
        fs::write(&path, r#"{ "map": { "poll_interval_ms": 250 } }"#).expect("write");
        let path_text = path.display().to_string();

        let config =
            load_viewer_config(env(&[(CONFIG_ENV_VAR, path_text.as_str())])).expect("config");
        assert_eq!(config.map.poll_interval_ms, 250);

        let missing = temp.path().join("absent.json").display().to_string();
        let error = load_viewer_config(env(&[(CONFIG_ENV_VAR, missing.as_str())]))
            .expect_err("missing file");
        assert!(matches!(error, ConfigError::Read { .. }));
    }

    #[test]
    fn validation_rejects_unusable_zoom_and_intervals() {
        let cases = [
            (r#"{ "map": { "zoom": { "min": 0.0 } } }"#, "map.zoom.min"),
            (r#"{ "map": { "zoom": { "min": 2.0, "max": 1.0 } } }"#, "map.zoom.max"),
            (r#"{ "map": { "zoom": { "initial": 20.0 } } }"#, "map.zoom.initial"),
            (r#"{ "map": { "zoom": { "speed": 0.0 } } }"#, "map.zoom.speed"),
            (r#"{ "map": { "cell_size_px": -1.0 } }"#, "map.cell_size_px"),
            (r#"{ "map": { "poll_interval_ms": 0 } }"#, "map.poll_interval_ms"),
        ];
        for (raw, expected_field) in cases {
            let config = parse_viewer_config(raw).expect("parse");
            match config.validate() {
                Err(ConfigError::Invalid { field, .. }) => assert_eq!(field, expected_field),
                other => panic!("{raw}: unexpected {other:?}"),
            }
        }
    }
}
