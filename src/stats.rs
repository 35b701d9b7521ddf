use crate::parks::{ParkRecord, coerce_number};
use serde::{Deserialize, Serialize};

/// Row counts of a pipeline run.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ParkSummary {
    pub rows: usize,
    pub projected: usize,
    pub unprojected: usize,
}

pub fn summarize(parks: &[ParkRecord]) -> ParkSummary {
    let projected = parks.iter().filter(|p| p.position.is_some()).count();
    ParkSummary {
        rows: parks.len(),
        projected,
        unprojected: parks.len() - projected,
    }
}

/// `[min, max]` of a numeric column, e.g. as a color scale domain.
///
/// Missing, empty and unparseable cells are skipped; `None` when no cell is numeric.
pub fn column_extent(parks: &[ParkRecord], column: &str) -> Option<[f64; 2]> {
    parks
        .iter()
        .filter_map(|p| p.get(column))
        .filter(|cell| !cell.trim().is_empty())
        .map(|cell| coerce_number(Some(cell)))
        .filter(|v| v.is_finite())
        .fold(None, |acc, v| match acc {
            None => Some([v, v]),
            Some([lo, hi]) => Some([lo.min(v), hi.max(v)]),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parks::parse_parks;
    use crate::projection::AlbersUsa;

    #[test]
    fn extent_skips_non_numeric_cells() {
        let csv = "Name,Longitude,Latitude,Visitors\n\
                   A,-110.5,44.6,4500000\n\
                   B,-98,39,\n\
                   C,0,0,n/a\n\
                   D,-120,37,120\n";
        let parks = parse_parks(csv.as_bytes(), &AlbersUsa::shared()).unwrap();
        assert_eq!(column_extent(&parks, "Visitors"), Some([120.0, 4_500_000.0]));
        assert_eq!(column_extent(&parks, "Nope"), None);
        let s = summarize(&parks);
        assert_eq!(s.rows, 4);
        assert_eq!(s.projected + s.unprojected, 4);
        assert_eq!(s.unprojected, 1);
    }
}
