pub mod app;
pub mod config;
pub mod zones;

pub use app::{
    run_viewer, AppError, FrameModel, HudData, LoopConfig, LoopMetricsSnapshot, Renderer,
    ViewState, Viewport, ViewportTransform, ZoomLimits,
};
pub use config::{
    load_viewer_config, parse_viewer_config, read_viewer_config, ConfigError, MapConfig,
    SourceConfig, ViewerConfig, CONFIG_ENV_VAR,
};
pub use zones::{
    CurrentLocation, LogScanMode, PollOutcome, SourcePaths, StartupReport, WorldGrid,
    ZoneCoordinate, ZoneSession, ZoneStateStore,
};
