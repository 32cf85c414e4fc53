use std::fmt;

use serde::{Deserialize, Serialize};

use super::coordinate::ZoneCoordinate;
use super::store::ZoneStateStore;

const FINISHED_MARKER: &str = "INFO - Finished '";
/// Zone loads are logged either as a fresh build or as a thaw from the save cache.
const LOAD_VERBS: [&str; 2] = ["Thawing", "Building"];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LogScanMode {
    #[default]
    FullRescan,
    Incremental,
}

impl LogScanMode {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "full" | "full_rescan" => Some(LogScanMode::FullRescan),
            "incremental" | "tail" => Some(LogScanMode::Incremental),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CurrentLocation {
    #[default]
    None,
    At(ZoneCoordinate),
}

impl CurrentLocation {
    pub fn coordinate(&self) -> Option<ZoneCoordinate> {
        match self {
            CurrentLocation::None => None,
            CurrentLocation::At(coord) => Some(*coord),
        }
    }
}

impl From<Option<ZoneCoordinate>> for CurrentLocation {
    fn from(coord: Option<ZoneCoordinate>) -> Self {
        coord.map_or(CurrentLocation::None, CurrentLocation::At)
    }
}

impl fmt::Display for CurrentLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CurrentLocation::None => f.write_str("None"),
            CurrentLocation::At(coord) => write!(f, "{coord}"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanOutcome {
    pub matched_lines: usize,
    pub current: CurrentLocation,
}

/// Extracts the zone from a `Finished '<Verb> <prefix>.<coord>'` log line.
pub fn match_activity_line(line: &str) -> Option<ZoneCoordinate> {
    line.match_indices(FINISHED_MARKER)
        .find_map(|(start, marker)| match_finished_body(&line[start + marker.len()..]))
}

fn match_finished_body(body: &str) -> Option<ZoneCoordinate> {
    let rest = LOAD_VERBS
        .iter()
        .find_map(|verb| body.strip_prefix(verb))?
        .strip_prefix(' ')?;

    // The coordinate is the dotted suffix right before a closing quote; prefer the last quote.
    rest.rmatch_indices('\'')
        .find_map(|(quote, _)| coordinate_suffix(&rest[..quote]))
}

fn coordinate_suffix(candidate: &str) -> Option<ZoneCoordinate> {
    let mut parts = candidate.rsplitn(6, '.');
    let mut fields = [""; 5];
    for slot in fields.iter_mut().rev() {
        *slot = parts.next()?;
    }
    let prefix = parts.next()?;
    if prefix.is_empty() {
        return None;
    }
    ZoneCoordinate::parse(&fields.join(".")).ok()
}

/// Full rescan: clears the current flag, marks every matched zone visited in
/// file order, then makes the last match current.
pub fn rescan(store: &mut ZoneStateStore, text: &str) -> ScanOutcome {
    store.clear_all_current();
    let mut outcome = ScanOutcome::default();
    let mut last_match = None;
    for coord in text.lines().filter_map(match_activity_line) {
        store.mark_visited(coord);
        last_match = Some(coord);
        outcome.matched_lines += 1;
    }
    if let Some(coord) = last_match {
        store.mark_current(coord);
    }
    outcome.current = last_match.into();
    outcome
}

/// Incremental alternative to [`rescan`] that only parses bytes appended since
/// the previous call. The resulting store state matches a full rescan of the
/// same file contents.
#[derive(Debug, Clone, Default)]
pub struct LogFollower {
    consumed: u64,
    last_match: Option<ZoneCoordinate>,
}

impl LogFollower {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn consumed_bytes(&self) -> u64 {
        self.consumed
    }

    /// True when the file shrank below what was already consumed.
    pub fn needs_restart(&self, file_len: u64) -> bool {
        file_len < self.consumed
    }

    pub fn restart(&mut self) {
        self.consumed = 0;
        self.last_match = None;
    }

    /// Applies `appended`, which must start at byte offset [`Self::consumed_bytes`].
    pub fn apply(&mut self, store: &mut ZoneStateStore, appended: &[u8]) -> ScanOutcome {
        let complete_len = appended
            .iter()
            .rposition(|byte| *byte == b'\n')
            .map_or(0, |newline| newline + 1);
        let (complete, fragment) = appended.split_at(complete_len);

        let complete_text = String::from_utf8_lossy(complete);
        let new_matches = complete_text
            .lines()
            .filter_map(match_activity_line)
            .collect::<Vec<_>>();
        // An unterminated last line still counts, as it would in a full rescan,
        // but it is re-read next time instead of being consumed.
        let fragment_match = match_activity_line(&String::from_utf8_lossy(fragment));

        // A fresh or restarted follower re-reads the whole file, so like a full
        // rescan it only drops the flag. Otherwise the previous current zone came
        // from consumed lines and a full rescan would mark it visited again.
        let previous = store.current();
        store.clear_all_current();
        if let Some(previous) = previous.filter(|_| self.consumed > 0) {
            store.mark_visited(previous);
        }
        for coord in new_matches.iter().chain(fragment_match.iter()) {
            store.mark_visited(*coord);
        }
        if let Some(coord) = new_matches.last() {
            self.last_match = Some(*coord);
        }
        self.consumed += complete_len as u64;

        let current = fragment_match.or(self.last_match);
        if let Some(coord) = current {
            store.mark_current(coord);
        }
        ScanOutcome {
            matched_lines: new_matches.len() + usize::from(fragment_match.is_some()),
            current: current.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::zones::record::ZoneColor;

    const A: ZoneCoordinate = ZoneCoordinate::new(11, 22, 1, 1, 10);
    const B: ZoneCoordinate = ZoneCoordinate::new(12, 22, 0, 2, 10);

    fn load_line(verb: &str, coord: ZoneCoordinate) -> String {
        format!("[2024-01-01] INFO - Finished '{verb} JoppaWorld.{coord}' in 0.2s\n")
    }

    #[test]
    fn matches_both_verbs_and_extracts_suffix() {
        assert_eq!(match_activity_line(&load_line("Thawing", A)), Some(A));
        assert_eq!(match_activity_line(&load_line("Building", B)), Some(B));
        assert_eq!(
            match_activity_line("INFO - Finished 'Thawing Zone.a.b.1.1.1.1.10'"),
            Some(ZoneCoordinate::new(1, 1, 1, 1, 10))
        );
    }

    #[test]
    fn ignores_non_matching_lines() {
        for line in [
            "INFO - Finished 'Saving JoppaWorld.11.22.1.1.10'",
            "INFO - Finished 'Thawing 11.22.1.1.10'",
            "INFO - Finished 'Thawing JoppaWorld.11.22.1.1'",
            "INFO - Finished 'Thawing JoppaWorld.11.22.1.1.10",
            "WARN - Finished 'Thawing JoppaWorld.11.22.1.1.10'",
            "INFO - Finished 'ThawingJoppaWorld.11.22.1.1.10'",
        ] {
            assert_eq!(match_activity_line(line), None, "{line}");
        }
    }

    #[test]
    fn two_matches_mark_last_as_current() {
        let mut store = ZoneStateStore::new();
        let log = format!("{}noise\n{}", load_line("Building", A), load_line("Thawing", B));
        let outcome = rescan(&mut store, &log);

        assert_eq!(outcome.matched_lines, 2);
        assert_eq!(outcome.current, CurrentLocation::At(B));
        assert_eq!(store.get(&A).color, Some(ZoneColor::VISITED));
        assert!(!store.get(&A).is_current);
        assert_eq!(store.get(&B).color, Some(ZoneColor::CURRENT));
        assert!(store.get(&B).is_current);
    }

    #[test]
    fn empty_log_reports_none_and_clears_stale_current() {
        let mut store = ZoneStateStore::new();
        store.mark_current(A);
        let outcome = rescan(&mut store, "nothing interesting\n");

        assert_eq!(outcome.current, CurrentLocation::None);
        assert_eq!(outcome.current.to_string(), "None");
        assert_eq!(store.current(), None);
        assert!(!store.get(&A).is_current);
    }

    #[test]
    fn rescan_is_idempotent_and_keeps_names() {
        let mut store = ZoneStateStore::new();
        store.upsert_catalog(A, "Joppa".to_string(), ZoneColor::parse("#554f97"));
        let log = format!("{}{}{}", load_line("Building", A), load_line("Thawing", B), load_line("Thawing", A));

        rescan(&mut store, &log);
        let first = store.clone();
        rescan(&mut store, &log);

        assert_eq!(store, first);
        assert_eq!(store.current(), Some(A));
        assert_eq!(store.get(&A).name.as_deref(), Some("Joppa"));
        assert_eq!(store.get(&B).color, Some(ZoneColor::VISITED));
    }

    #[test]
    fn follower_matches_full_rescan_across_appends() {
        let c = ZoneCoordinate::new(40, 3, 2, 2, 11);
        let chunks = [
            load_line("Building", A),
            "unrelated\n".to_string(),
            format!("{}{}", load_line("Thawing", B), load_line("Building", c)),
            load_line("Thawing", A),
        ];

        let mut full = ZoneStateStore::new();
        let mut incremental = ZoneStateStore::new();
        let mut follower = LogFollower::new();
        let mut contents = String::new();
        for chunk in &chunks {
            contents.push_str(chunk);
            let expected = rescan(&mut full, &contents);
            let appended = &contents.as_bytes()[follower.consumed_bytes() as usize..];
            let actual = follower.apply(&mut incremental, appended);

            assert_eq!(actual.current, expected.current);
            assert_eq!(incremental, full);
        }
    }

    #[test]
    fn follower_counts_unterminated_line_without_consuming_it() {
        let mut store = ZoneStateStore::new();
        let mut follower = LogFollower::new();
        let first = load_line("Building", A);
        let partial = load_line("Thawing", B);
        let partial = partial.trim_end_matches('\n');
        let contents = format!("{first}{partial}");

        let outcome = follower.apply(&mut store, contents.as_bytes());
        assert_eq!(outcome.current, CurrentLocation::At(B));
        assert_eq!(follower.consumed_bytes(), first.len() as u64);

        let mut full = ZoneStateStore::new();
        rescan(&mut full, &contents);
        assert_eq!(store, full);

        // Nothing new arrives: the fragment is re-read and the state holds.
        let again = follower.apply(&mut store, &contents.as_bytes()[first.len()..]);
        assert_eq!(again.current, CurrentLocation::At(B));
        assert_eq!(store, full);
    }

    #[test]
    fn follower_restart_after_truncation() {
        let mut follower = LogFollower::new();
        let mut store = ZoneStateStore::new();
        let log = load_line("Building", A);
        follower.apply(&mut store, log.as_bytes());
        assert!(follower.needs_restart(3));
        follower.restart();
        assert_eq!(follower.consumed_bytes(), 0);

        let outcome = follower.apply(&mut store, b"fresh log without loads\n");
        assert_eq!(outcome.current, CurrentLocation::None);
        assert_eq!(store.current(), None);
    }

    #[test]
    fn follower_matches_full_rescan_after_truncation() {
        let before = load_line("Building", A);
        for after in [load_line("Thawing", B), "fresh log without loads\n".to_string()] {
            let mut full = ZoneStateStore::new();
            let mut incremental = ZoneStateStore::new();
            let mut follower = LogFollower::new();
            rescan(&mut full, &before);
            follower.apply(&mut incremental, before.as_bytes());
            assert_eq!(incremental, full);

            let expected = rescan(&mut full, &after);
            follower.restart();
            let actual = follower.apply(&mut incremental, after.as_bytes());

            assert_eq!(actual.current, expected.current);
            assert_eq!(incremental, full, "{after:?}");
            assert_eq!(incremental.get(&A).color, Some(ZoneColor::CURRENT));
            assert!(!incremental.get(&A).is_current);
        }
    }

    #[test]
    fn scan_mode_names() {
        assert_eq!(LogScanMode::from_name("full"), Some(LogScanMode::FullRescan));
        assert_eq!(LogScanMode::from_name(" Incremental "), Some(LogScanMode::Incremental));
        assert_eq!(LogScanMode::from_name("sometimes"), None);
    }
}
