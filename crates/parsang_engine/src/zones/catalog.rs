use thiserror::Error;
use tracing::{debug, warn};

use super::coordinate::{CoordinateParseError, ZoneCoordinate};
use super::record::ZoneColor;
use super::store::ZoneStateStore;
use super::LoadReport;

/// Allowed digit counts per coordinate field in catalog files.
const CATALOG_FIELD_DIGITS: [(usize, usize); 5] = [(1, 2), (1, 2), (1, 1), (1, 1), (1, 2)];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogEntry {
    pub coord: ZoneCoordinate,
    pub color: ZoneColor,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogLineError {
    #[error("expected '<coord>,<color>,<name>'")]
    MissingFields,
    #[error("coordinate '{0}' does not match the catalog digit layout")]
    CoordinateLayout(String),
    #[error(transparent)]
    Coordinate(#[from] CoordinateParseError),
    #[error("color is empty")]
    EmptyColor,
    #[error("name is empty")]
    EmptyName,
}

/// Parses `<coord>,<color>,<name>`. The name is everything after the last comma.
/// Only the line, color and name are trimmed; the coordinate must sit flush against its comma.
pub fn parse_catalog_line(line: &str) -> Result<CatalogEntry, CatalogLineError> {
    let line = line.trim();
    let (coord_text, rest) = line.split_once(',').ok_or(CatalogLineError::MissingFields)?;
    let (color_text, name_text) = rest.rsplit_once(',').ok_or(CatalogLineError::MissingFields)?;

    if !matches_catalog_layout(coord_text) {
        return Err(CatalogLineError::CoordinateLayout(coord_text.to_string()));
    }
    let coord = ZoneCoordinate::parse(coord_text)?;

    let color_text = color_text.trim();
    if color_text.is_empty() {
        return Err(CatalogLineError::EmptyColor);
    }
    let name = name_text.trim();
    if name.is_empty() {
        return Err(CatalogLineError::EmptyName);
    }

    Ok(CatalogEntry {
        coord,
        color: ZoneColor::parse(color_text),
        name: name.to_string(),
    })
}

fn matches_catalog_layout(coord_text: &str) -> bool {
    let fields = coord_text.split('.').collect::<Vec<_>>();
    fields.len() == CATALOG_FIELD_DIGITS.len()
        && fields
            .iter()
            .zip(CATALOG_FIELD_DIGITS)
            .all(|(field, (min, max))| {
                (min..=max).contains(&field.len()) && field.bytes().all(|b| b.is_ascii_digit())
            })
}

/// Applies every well-formed catalog line in order; later duplicates win.
pub fn apply_catalog<'a, I>(store: &mut ZoneStateStore, lines: I) -> LoadReport
where
    I: IntoIterator<Item = &'a str>,
{
    let mut report = LoadReport::default();
    for (index, line) in lines.into_iter().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        match parse_catalog_line(line) {
            Ok(entry) => {
                debug!(coord = %entry.coord, name = entry.name.as_str(), "catalog_entry");
                store.upsert_catalog(entry.coord, entry.name, entry.color);
                report.applied += 1;
            }
            Err(error) => {
                warn!(line = index + 1, error = %error, "catalog_line_skipped");
                report.skipped += 1;
            }
        }
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn joppa_line_creates_named_record() {
        let mut store = ZoneStateStore::new();
        let report = apply_catalog(&mut store, ["11.22.1.1.10,#554f97,Joppa"]);

        assert_eq!(report, LoadReport { applied: 1, skipped: 0 });
        assert_eq!(store.len(), 1);
        let record = store.get(&ZoneCoordinate::new(11, 22, 1, 1, 10));
        assert_eq!(record.name.as_deref(), Some("Joppa"));
        assert_eq!(record.color.as_ref().map(ToString::to_string).as_deref(), Some("#554f97"));
    }

    #[test]
    fn malformed_lines_are_skipped_without_aborting() {
        let mut store = ZoneStateStore::new();
        let lines = [
            "Location,Color,Name",
            "11.22.1.1.10,#554f97,Joppa",
            "111.22.1.1.10,red,TooWide",
            "1.2.1.1.10,,NoColor",
            "1.2.1.1.10,red,   ",
            "",
            "  5.6.2.0.10,magenta , Kyakukya  ",
        ];
        let report = apply_catalog(&mut store, lines);

        assert_eq!(report, LoadReport { applied: 2, skipped: 4 });
        let kyakukya = store.get(&ZoneCoordinate::new(5, 6, 2, 0, 10));
        assert_eq!(kyakukya.name.as_deref(), Some("Kyakukya"));
        assert_eq!(kyakukya.color, Some(ZoneColor::parse("magenta")));
    }

    #[test]
    fn name_is_taken_after_last_comma() {
        let entry = parse_catalog_line("1.1.1.1.10,red,green,Bethesda Susa").expect("entry");
        assert_eq!(entry.color, ZoneColor::Unrecognized("red,green".to_string()));
        assert_eq!(entry.name, "Bethesda Susa");
    }

    #[test]
    fn reports_specific_errors() {
        assert_eq!(
            parse_catalog_line("just text"),
            Err(CatalogLineError::MissingFields)
        );
        assert_eq!(
            parse_catalog_line("1.1.11.1.10,red,X"),
            Err(CatalogLineError::CoordinateLayout("1.1.11.1.10".to_string()))
        );
        assert_eq!(
            parse_catalog_line("5.6.2.0.10 , magenta , Kyakukya"),
            Err(CatalogLineError::CoordinateLayout("5.6.2.0.10 ".to_string()))
        );
        assert_eq!(
            parse_catalog_line("1.1.1.1.10, ,X"),
            Err(CatalogLineError::EmptyColor)
        );
    }

    #[test]
    fn duplicates_are_last_write_wins() {
        let mut store = ZoneStateStore::new();
        apply_catalog(&mut store, ["1.1.1.1.10,red,First", "1.1.1.1.10,white,Second"]);
        let record = store.get(&ZoneCoordinate::new(1, 1, 1, 1, 10));
        assert_eq!(record.name.as_deref(), Some("Second"));
        assert_eq!(record.color, Some(ZoneColor::parse("white")));
    }

    #[test]
    fn applying_catalog_twice_matches_applying_once() {
        let lines = ["11.22.1.1.10,#554f97,Joppa", "5.6.2.0.10,magenta,Kyakukya"];
        let mut once = ZoneStateStore::new();
        apply_catalog(&mut once, lines);
        let mut twice = once.clone();
        apply_catalog(&mut twice, lines);
        assert_eq!(once, twice);
    }
}
