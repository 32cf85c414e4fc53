use std::path::PathBuf;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use super::activity_log::{rescan, CurrentLocation, LogFollower, LogScanMode, ScanOutcome};
use super::cache::apply_cache;
use super::catalog::apply_catalog;
use super::sources::{
    file_stamp, read_from_offset, read_optional_text, FileStamp, VisitedZoneSource, ZoneCacheDir,
};
use super::store::ZoneStateStore;
use super::LoadReport;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourcePaths {
    pub log_file: PathBuf,
    pub catalog_file: PathBuf,
    pub cache_dir: Option<PathBuf>,
    pub cache_world_prefix: String,
    pub cache_file_suffix: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    NotDue,
    Unchanged,
    Missing,
    Failed,
    Scanned(ScanOutcome),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StartupReport {
    pub cache: Option<LoadReport>,
    pub catalog: Option<LoadReport>,
    pub log: PollOutcome,
}

/// Owns the zone store and keeps it in sync with the on-disk sources.
///
/// Startup order is cache, then catalog, then activity log; afterwards only
/// the activity log is re-read, at most once per poll interval.
pub struct ZoneSession {
    store: ZoneStateStore,
    log_path: PathBuf,
    catalog_path: PathBuf,
    cache_source: Option<Box<dyn VisitedZoneSource>>,
    cache_world_prefix: String,
    scan_mode: LogScanMode,
    follower: LogFollower,
    last_stamp: Option<FileStamp>,
    location: CurrentLocation,
    log_missing: bool,
    poll_interval: Duration,
    last_poll: Option<Instant>,
    scan_count: u64,
}

impl ZoneSession {
    pub fn new(paths: SourcePaths, scan_mode: LogScanMode, poll_interval: Duration) -> Self {
        let cache_source = paths.cache_dir.map(|dir| {
            Box::new(ZoneCacheDir::new(dir, paths.cache_file_suffix)) as Box<dyn VisitedZoneSource>
        });
        Self {
            store: ZoneStateStore::new(),
            log_path: paths.log_file,
            catalog_path: paths.catalog_file,
            cache_source,
            cache_world_prefix: paths.cache_world_prefix,
            scan_mode,
            follower: LogFollower::new(),
            last_stamp: None,
            location: CurrentLocation::None,
            log_missing: false,
            poll_interval,
            last_poll: None,
            scan_count: 0,
        }
    }

    pub fn with_cache_source(mut self, source: Box<dyn VisitedZoneSource>) -> Self {
        self.cache_source = Some(source);
        self
    }

    pub fn startup(&mut self, now: Instant) -> StartupReport {
        let cache = self.load_cache();
        let catalog = self.load_catalog();
        let log = self.scan_log();
        self.last_poll = Some(now);
        info!(
            records = self.store.len(),
            location = %self.location,
            "zone_state_ready"
        );
        StartupReport {
            cache,
            catalog,
            log,
        }
    }

    pub fn load_cache(&mut self) -> Option<LoadReport> {
        let source = self.cache_source.as_ref()?;
        let identifiers = match source.visited_identifiers() {
            Ok(Some(identifiers)) => identifiers,
            Ok(None) => {
                warn!(source = %source.describe(), "zone_cache_missing");
                return None;
            }
            Err(error) => {
                warn!(error = %error, "zone_cache_read_failed");
                return None;
            }
        };
        let report = apply_cache(&mut self.store, &identifiers, &self.cache_world_prefix);
        info!(
            source = %source.describe(),
            applied = report.applied,
            skipped = report.skipped,
            "zone_cache_loaded"
        );
        Some(report)
    }

    pub fn load_catalog(&mut self) -> Option<LoadReport> {
        let text = match read_optional_text(&self.catalog_path) {
            Ok(Some(text)) => text,
            Ok(None) => {
                warn!(path = %self.catalog_path.display(), "catalog_missing");
                return None;
            }
            Err(error) => {
                warn!(error = %error, "catalog_read_failed");
                return None;
            }
        };
        let report = apply_catalog(&mut self.store, text.lines());
        info!(
            path = %self.catalog_path.display(),
            applied = report.applied,
            skipped = report.skipped,
            "catalog_loaded"
        );
        Some(report)
    }

    pub fn poll_due(&self, now: Instant) -> bool {
        match self.last_poll {
            Some(last) => now.saturating_duration_since(last) >= self.poll_interval,
            None => true,
        }
    }

    pub fn poll(&mut self, now: Instant) -> PollOutcome {
        if !self.poll_due(now) {
            return PollOutcome::NotDue;
        }
        self.last_poll = Some(now);
        self.scan_log()
    }

    /// Re-reads the activity log unless its size and mtime are unchanged.
    pub fn scan_log(&mut self) -> PollOutcome {
        let stamp = match file_stamp(&self.log_path) {
            Ok(Some(stamp)) => stamp,
            Ok(None) => return self.note_log_missing(),
            Err(error) => {
                warn!(error = %error, "activity_log_read_failed");
                return PollOutcome::Failed;
            }
        };
        if self.last_stamp == Some(stamp) {
            debug!(path = %self.log_path.display(), "activity_log_unchanged");
            return PollOutcome::Unchanged;
        }
        if self.log_missing {
            info!(path = %self.log_path.display(), "activity_log_found");
            self.log_missing = false;
        }

        let scanned = match self.scan_mode {
            LogScanMode::FullRescan => self.full_rescan(),
            LogScanMode::Incremental => self.incremental_scan(stamp),
        };
        let outcome = match scanned {
            Ok(Some(outcome)) => outcome,
            Ok(None) => return self.note_log_missing(),
            Err(error) => {
                warn!(error = %error, "activity_log_read_failed");
                return PollOutcome::Failed;
            }
        };

        self.last_stamp = Some(stamp);
        self.scan_count = self.scan_count.saturating_add(1);
        if outcome.current != self.location {
            info!(
                from = %self.location,
                to = %outcome.current,
                "current_location_changed"
            );
        }
        self.location = outcome.current;
        PollOutcome::Scanned(outcome)
    }

    fn full_rescan(&mut self) -> Result<Option<ScanOutcome>, super::sources::SourceError> {
        Ok(read_optional_text(&self.log_path)?.map(|text| rescan(&mut self.store, &text)))
    }

    fn incremental_scan(
        &mut self,
        stamp: FileStamp,
    ) -> Result<Option<ScanOutcome>, super::sources::SourceError> {
        if self.follower.needs_restart(stamp.len) {
            info!(
                path = %self.log_path.display(),
                consumed = self.follower.consumed_bytes(),
                len = stamp.len,
                "activity_log_truncated"
            );
            self.follower.restart();
        }
        let appended = read_from_offset(&self.log_path, self.follower.consumed_bytes())?;
        Ok(appended.map(|bytes| self.follower.apply(&mut self.store, &bytes)))
    }

    fn note_log_missing(&mut self) -> PollOutcome {
        if !self.log_missing {
            warn!(path = %self.log_path.display(), "activity_log_missing");
            self.log_missing = true;
        }
        self.last_stamp = None;
        self.follower.restart();
        self.location = CurrentLocation::None;
        PollOutcome::Missing
    }

    pub fn store(&self) -> &ZoneStateStore {
        &self.store
    }

    pub fn current_location(&self) -> CurrentLocation {
        self.location
    }

    pub fn scan_count(&self) -> u64 {
        self.scan_count
    }

    pub fn scan_mode(&self) -> LogScanMode {
        self.scan_mode
    }
}
