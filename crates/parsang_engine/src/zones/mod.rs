pub mod activity_log;
pub mod cache;
pub mod catalog;
pub mod coordinate;
pub mod record;
pub mod session;
pub mod sources;
pub mod store;

pub use activity_log::{
    match_activity_line, rescan, CurrentLocation, LogFollower, LogScanMode, ScanOutcome,
};
pub use cache::{apply_cache, strip_world_prefix, DEFAULT_WORLD_PREFIX};
pub use catalog::{apply_catalog, parse_catalog_line, CatalogEntry, CatalogLineError};
pub use coordinate::{
    CellKey, CoordinateParseError, WorldGrid, ZoneCoordinate, DEFAULT_PARSANGS_X,
    DEFAULT_PARSANGS_Y, ZONES_PER_PARSANG,
};
pub use record::{PaletteToken, Rgb, ZoneColor, ZoneRecord, BACKGROUND_RGB};
pub use session::{PollOutcome, SourcePaths, StartupReport, ZoneSession};
pub use sources::{
    file_stamp, read_from_offset, read_optional_text, FileStamp, SourceError, VisitedZoneSource,
    ZoneCacheDir, DEFAULT_CACHE_FILE_SUFFIX,
};
pub use store::{StoreView, ZoneStateStore};

/// Counts from one batch load; skipped entries were logged and ignored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub applied: usize,
    pub skipped: usize,
}
