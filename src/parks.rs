//! Park location rows augmented with a projected screen position.

use crate::projection::AlbersUsa;
use anyhow::{Context, Result};
use csv::ReaderBuilder;
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::io::Read;

/// Column holding the longitude in degrees (case-sensitive).
pub const LONGITUDE: &str = "Longitude";
/// Column holding the latitude in degrees (case-sensitive).
pub const LATITUDE: &str = "Latitude";
/// Name of the computed field in exported rows.
pub const POSITION: &str = "position";

/// One CSV row: every source field in column order, plus the projected position
/// (`None` when the coordinates fall outside the projection).
#[derive(Debug, Clone, PartialEq)]
pub struct ParkRecord {
    fields: Vec<(String, String)>,
    pub position: Option<[f64; 2]>,
}

impl ParkRecord {
    /// Build a record and project its coordinates.
    ///
    /// A repeated column name keeps the slot of its first occurrence and the
    /// value of its last.
    pub fn new(fields: Vec<(String, String)>, projection: &AlbersUsa) -> Self {
        let mut unique: Vec<(String, String)> = Vec::with_capacity(fields.len());
        for (name, value) in fields {
            match unique.iter_mut().find(|(k, _)| *k == name) {
                Some(slot) => slot.1 = value,
                None => unique.push((name, value)),
            }
        }
        let mut rec = Self {
            fields: unique,
            position: None,
        };
        rec.position = projection.project([rec.longitude(), rec.latitude()]);
        rec
    }

    pub fn fields(&self) -> &[(String, String)] {
        &self.fields
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Longitude as a number; see [`coerce_number`].
    pub fn longitude(&self) -> f64 {
        coerce_number(self.get(LONGITUDE))
    }

    /// Latitude as a number; see [`coerce_number`].
    pub fn latitude(&self) -> f64 {
        coerce_number(self.get(LATITUDE))
    }
}

/// Loose numeric reading of a CSV cell: surrounding whitespace is ignored, an
/// empty cell reads as 0, a missing or unparseable cell reads as NaN.
pub fn coerce_number(cell: Option<&str>) -> f64 {
    match cell.map(str::trim) {
        None => f64::NAN,
        Some("") => 0.0,
        Some(s) => s.parse().unwrap_or(f64::NAN),
    }
}

// Source fields first, then `position`; a source column of that name is
// shadowed by the computed one.
impl Serialize for ParkRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        for (k, v) in self.fields.iter().filter(|(k, _)| k != POSITION) {
            map.serialize_entry(k, v)?;
        }
        map.serialize_entry(POSITION, &self.position)?;
        map.end()
    }
}

/// Parse park rows from CSV with a header line and project each one.
///
/// Row order is preserved and nothing is dropped. Short rows get empty strings
/// for the missing trailing columns; cells past the header width are ignored.
pub fn parse_parks<R: Read>(reader: R, projection: &AlbersUsa) -> Result<Vec<ParkRecord>> {
    let mut rdr = ReaderBuilder::new().flexible(true).from_reader(reader);
    let headers = rdr.headers().context("read CSV header")?.clone();
    let mut out = Vec::new();
    for (row, record) in rdr.records().enumerate() {
        let record = record.with_context(|| format!("parse CSV row {}", row + 1))?;
        let fields = headers
            .iter()
            .enumerate()
            .map(|(i, name)| (name.to_string(), record.get(i).unwrap_or("").to_string()))
            .collect();
        out.push(ParkRecord::new(fields, projection));
    }
    log::debug!("parsed {} park rows", out.len());
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coercion_follows_loose_numeric_rules() {
        assert_eq!(coerce_number(Some(" -110.5 ")), -110.5);
        assert_eq!(coerce_number(Some("")), 0.0);
        assert!(coerce_number(Some("n/a")).is_nan());
        assert!(coerce_number(None).is_nan());
    }

    #[test]
    fn rows_keep_fields_and_order() {
        let csv = "Name,Longitude,Latitude,Visitors\n\
                   Yellowstone,-110.5,44.6,4500000\n\
                   Nowhere,0,0,12\n\
                   Short,-98\n";
        let p = AlbersUsa::shared();
        let rows = parse_parks(csv.as_bytes(), &p).unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].get("Name"), Some("Yellowstone"));
        assert_eq!(rows[0].position, p.project([-110.5, 44.6]));
        assert!(rows[0].position.is_some());
        assert_eq!(rows[1].position, None);
        assert_eq!(rows[2].get("Latitude"), Some(""));
        assert_eq!(rows[2].fields().len(), 4);
    }

    #[test]
    fn serializes_fields_then_position() {
        let rec = ParkRecord::new(
            vec![
                ("Name".into(), "X".into()),
                ("Longitude".into(), "abc".into()),
            ],
            &AlbersUsa::shared(),
        );
        let s = serde_json::to_string(&rec).unwrap();
        assert_eq!(s, r#"{"Name":"X","Longitude":"abc","position":null}"#);
    }

    #[test]
    fn repeated_columns_take_the_last_value() {
        let csv = "Name,Longitude,Name,Latitude,Longitude\n\
                   a,0,b,44.6,-110.5\n";
        let p = AlbersUsa::shared();
        let rows = parse_parks(csv.as_bytes(), &p).unwrap();
        assert_eq!(rows[0].fields().len(), 3);
        assert_eq!(rows[0].get("Name"), Some("b"));
        assert_eq!(rows[0].position, p.project([-110.5, 44.6]));
        let s = serde_json::to_string(&rows[0]).unwrap();
        assert!(s.starts_with(r#"{"Name":"b","Longitude":"-110.5","Latitude":"44.6","position":["#));
        assert_eq!(s.matches("\"Name\"").count(), 1);
    }
}
