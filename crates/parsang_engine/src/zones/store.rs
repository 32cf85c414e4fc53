use std::collections::{BTreeMap, HashMap};

use super::coordinate::{CellKey, ZoneCoordinate};
use super::record::{ZoneColor, ZoneRecord, EMPTY_RECORD};

type LevelRecords = HashMap<CellKey, ZoneRecord>;

/// Per-cell visual state, partitioned by level.
///
/// Merge precedence is cache < catalog < activity log. At most one record is
/// current at any time; `current` always names that record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ZoneStateStore {
    levels: BTreeMap<u32, LevelRecords>,
    current: Option<ZoneCoordinate>,
}

impl ZoneStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a low-confidence `cached` marker. Returns false when a record already exists.
    pub fn upsert_cache(&mut self, coord: ZoneCoordinate) -> bool {
        let (level, key) = coord.split();
        let records = self.levels.entry(level).or_default();
        if records.contains_key(&key) {
            return false;
        }
        records.insert(
            key,
            ZoneRecord {
                name: None,
                color: Some(ZoneColor::CACHED),
                is_current: false,
            },
        );
        true
    }

    /// Replaces whatever was stored for `coord` with exactly `{name, color}`.
    pub fn upsert_catalog(&mut self, coord: ZoneCoordinate, name: String, color: ZoneColor) {
        if self.current == Some(coord) {
            self.current = None;
        }
        *self.record_mut(coord) = ZoneRecord {
            name: Some(name),
            color: Some(color),
            is_current: false,
        };
    }

    pub fn clear_all_current(&mut self) {
        let Some(coord) = self.current.take() else {
            return;
        };
        let (level, key) = coord.split();
        if let Some(record) = self
            .levels
            .get_mut(&level)
            .and_then(|records| records.get_mut(&key))
        {
            record.is_current = false;
        }
    }

    pub fn mark_visited(&mut self, coord: ZoneCoordinate) {
        self.record_mut(coord).color = Some(ZoneColor::VISITED);
    }

    pub fn mark_current(&mut self, coord: ZoneCoordinate) {
        self.clear_all_current();
        let record = self.record_mut(coord);
        record.color = Some(ZoneColor::CURRENT);
        record.is_current = true;
        self.current = Some(coord);
    }

    pub fn query(&self, level: Option<u32>) -> StoreView<'_> {
        StoreView {
            levels: &self.levels,
            level,
        }
    }

    pub fn get(&self, coord: &ZoneCoordinate) -> &ZoneRecord {
        self.query(None).get(coord)
    }

    pub fn current(&self) -> Option<ZoneCoordinate> {
        self.current
    }

    pub fn levels(&self) -> Vec<u32> {
        self.levels
            .iter()
            .filter(|(_, records)| !records.is_empty())
            .map(|(level, _)| *level)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.levels.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn record_mut(&mut self, coord: ZoneCoordinate) -> &mut ZoneRecord {
        let (level, key) = coord.split();
        self.levels
            .entry(level)
            .or_default()
            .entry(key)
            .or_default()
    }
}

/// Read-only view over one level, or over every level when unfiltered.
#[derive(Debug, Clone, Copy)]
pub struct StoreView<'a> {
    levels: &'a BTreeMap<u32, LevelRecords>,
    level: Option<u32>,
}

impl<'a> StoreView<'a> {
    pub fn get(&self, coord: &ZoneCoordinate) -> &'a ZoneRecord {
        let (level, key) = coord.split();
        if self.level.is_some_and(|filter| filter != level) {
            return &EMPTY_RECORD;
        }
        self.levels
            .get(&level)
            .and_then(|records| records.get(&key))
            .unwrap_or(&EMPTY_RECORD)
    }

    pub fn iter(&self) -> impl Iterator<Item = (ZoneCoordinate, &'a ZoneRecord)> + 'a {
        let filter = self.level;
        self.levels
            .iter()
            .filter(move |(level, _)| filter.map_or(true, |wanted| wanted == **level))
            .flat_map(|(level, records)| {
                let level = *level;
                records
                    .iter()
                    .map(move |(key, record)| (ZoneCoordinate::join(level, *key), record))
            })
    }

    pub fn len(&self) -> usize {
        match self.level {
            Some(level) => self.levels.get(&level).map_or(0, HashMap::len),
            None => self.levels.values().map(HashMap::len).sum(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
