use tracing::warn;

use super::coordinate::ZoneCoordinate;
use super::store::ZoneStateStore;
use super::LoadReport;

pub const DEFAULT_WORLD_PREFIX: &str = "JoppaWorld";

/// Strips `<world_prefix>.` from a persisted zone identifier.
pub fn strip_world_prefix<'a>(identifier: &'a str, world_prefix: &str) -> Option<&'a str> {
    identifier
        .trim()
        .strip_prefix(world_prefix)
        .and_then(|rest| rest.strip_prefix('.'))
}

/// Seeds `cached` markers for previously visited zones.
///
/// Must run before the catalog and the activity log so that it never shadows them.
pub fn apply_cache<I, S>(store: &mut ZoneStateStore, identifiers: I, world_prefix: &str) -> LoadReport
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut report = LoadReport::default();
    for identifier in identifiers {
        let identifier = identifier.as_ref();
        let Some(coord_text) = strip_world_prefix(identifier, world_prefix) else {
            warn!(identifier, world_prefix, "cache_identifier_foreign_world");
            report.skipped += 1;
            continue;
        };
        match ZoneCoordinate::parse(coord_text) {
            Ok(coord) => {
                store.upsert_cache(coord);
                report.applied += 1;
            }
            Err(error) => {
                warn!(identifier, error = %error, "cache_identifier_skipped");
                report.skipped += 1;
            }
        }
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::zones::record::ZoneColor;

    #[test]
    fn prefix_is_stripped_before_parsing() {
        assert_eq!(
            strip_world_prefix("JoppaWorld.11.22.1.1.10", DEFAULT_WORLD_PREFIX),
            Some("11.22.1.1.10")
        );
        assert_eq!(strip_world_prefix("11.22.1.1.10", DEFAULT_WORLD_PREFIX), None);
        assert_eq!(strip_world_prefix("JoppaWorld11.22.1.1.10", DEFAULT_WORLD_PREFIX), None);
    }

    #[test]
    fn seeds_cached_records_and_skips_garbage() {
        let mut store = ZoneStateStore::new();
        let report = apply_cache(
            &mut store,
            [
                "JoppaWorld.11.22.1.1.10",
                "JoppaWorld.not.a.zone",
                "OtherWorld.1.1.1.1.10",
                "JoppaWorld.3.4.0.2.12",
            ],
            DEFAULT_WORLD_PREFIX,
        );

        assert_eq!(report, LoadReport { applied: 2, skipped: 2 });
        assert_eq!(
            store.get(&ZoneCoordinate::new(3, 4, 0, 2, 12)).color,
            Some(ZoneColor::CACHED)
        );
    }

    #[test]
    fn cache_load_is_idempotent_and_never_overwrites() {
        let ids = vec![
            "JoppaWorld.11.22.1.1.10".to_string(),
            "JoppaWorld.5.5.1.1.10".to_string(),
        ];
        let mut store = ZoneStateStore::new();
        store.upsert_catalog(
            ZoneCoordinate::new(11, 22, 1, 1, 10),
            "Joppa".to_string(),
            ZoneColor::parse("#554f97"),
        );
        apply_cache(&mut store, &ids, DEFAULT_WORLD_PREFIX);
        let once = store.clone();
        apply_cache(&mut store, &ids, DEFAULT_WORLD_PREFIX);

        assert_eq!(store, once);
        assert_eq!(
            store.get(&ZoneCoordinate::new(11, 22, 1, 1, 10)).name.as_deref(),
            Some("Joppa")
        );
    }
}
