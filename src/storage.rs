use crate::color::ColorScale;
use crate::models::ParkData;
use crate::parks::{ParkRecord, coerce_number};
use crate::path::PathGenerator;
use anyhow::{Context, Result};
use csv::WriterBuilder;
use std::fmt::Write as _;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Viewport of the pre-projected states topology.
pub const MAP_WIDTH: u32 = 975;
pub const MAP_HEIGHT: u32 = 610;

/// Save park rows as CSV: original columns, then `position_x`, `position_y`
/// (both empty when the park has no position).
pub fn save_parks_csv<P: AsRef<Path>>(parks: &[ParkRecord], path: P) -> Result<()> {
    let path = path.as_ref();
    let mut wtr = WriterBuilder::new()
        .from_path(path)
        .with_context(|| format!("create {}", path.display()))?;
    let mut header: Vec<&str> = parks
        .first()
        .map(|p| p.fields().iter().map(|(k, _)| k.as_str()).collect())
        .unwrap_or_default();
    header.extend(["position_x", "position_y"]);
    wtr.write_record(&header)?;
    for p in parks {
        let (x, y) = match p.position {
            Some([x, y]) => (x.to_string(), y.to_string()),
            None => (String::new(), String::new()),
        };
        let row = p
            .fields()
            .iter()
            .map(|(_, v)| v.as_str())
            .chain([x.as_str(), y.as_str()]);
        wtr.write_record(row)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Save the whole aggregate as pretty JSON (`states`, `mesh`, `parksData`).
pub fn save_json<P: AsRef<Path>>(data: &ParkData, path: P) -> Result<()> {
    let path = path.as_ref();
    let mut f = File::create(path).with_context(|| format!("create {}", path.display()))?;
    let s = serde_json::to_string_pretty(data)?;
    f.write_all(s.as_bytes())?;
    Ok(())
}

/// Options for [`save_svg`].
#[derive(Debug, Clone)]
pub struct SvgOptions {
    pub width: u32,
    pub height: u32,
    pub park_radius: f64,
    /// Numeric column used to color parks through `scale`; uniform color when `None`.
    pub color_column: Option<String>,
    pub scale: ColorScale,
}

impl Default for SvgOptions {
    fn default() -> Self {
        Self {
            width: MAP_WIDTH,
            height: MAP_HEIGHT,
            park_radius: 3.0,
            color_column: None,
            scale: ColorScale::default(),
        }
    }
}

/// Write a static SVG snapshot: state shapes, border mesh, one dot per projected park.
///
/// The states topology is pre-projected, so shapes go through a planar path
/// generator; park dots use the positions computed by the pipeline.
pub fn save_svg<P: AsRef<Path>>(data: &ParkData, path: P, opts: &SvgOptions) -> Result<()> {
    let path = path.as_ref();
    let paths = PathGenerator::new();
    let mut svg = String::new();
    writeln!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {MAP_WIDTH} {MAP_HEIGHT}" width="{}" height="{}">"#,
        opts.width, opts.height
    )?;
    writeln!(svg, r##"<g fill="#dddddd">"##)?;
    for state in &data.states {
        if let Some(d) = state.geometry.as_ref().and_then(|g| paths.path(g)) {
            writeln!(svg, r#"<path d="{d}"/>"#)?;
        }
    }
    writeln!(svg, "</g>")?;
    if let Some(d) = paths.path(&data.mesh.clone().into()) {
        writeln!(
            svg,
            r##"<path d="{d}" fill="none" stroke="#ffffff" stroke-linejoin="round"/>"##
        )?;
    }
    let default_fill = opts.scale.range()[1].hex();
    writeln!(svg, r#"<g fill="{default_fill}">"#)?;
    for park in &data.parks_data {
        let Some([x, y]) = park.position else { continue };
        let fill = opts
            .color_column
            .as_deref()
            .and_then(|c| opts.scale.color(coerce_number(park.get(c))))
            .map(|c| format!(r#" fill="{}""#, c.hex()))
            .unwrap_or_default();
        writeln!(
            svg,
            r#"<circle cx="{x:.3}" cy="{y:.3}" r="{}"{fill}/>"#,
            opts.park_radius
        )?;
    }
    writeln!(svg, "</g>\n</svg>")?;
    std::fs::write(path, svg).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::StatesLayer;
    use crate::parks::parse_parks;
    use crate::projection::AlbersUsa;
    use geo_types::MultiLineString;
    use tempfile::tempdir;

    fn sample() -> ParkData {
        let csv = "Name,Longitude,Latitude\nA,-110.5,44.6\nB,0,0\n";
        let parks = parse_parks(csv.as_bytes(), &AlbersUsa::shared()).unwrap();
        ParkData::new(
            StatesLayer {
                states: Vec::new(),
                mesh: MultiLineString::new(Vec::new()),
            },
            parks,
        )
    }

    #[test]
    fn write_csv_json_and_svg() {
        let dir = tempdir().unwrap();
        let csvp = dir.path().join("x.csv");
        let jsonp = dir.path().join("x.json");
        let svgp = dir.path().join("x.svg");
        let data = sample();
        save_parks_csv(&data.parks_data, &csvp).unwrap();
        save_json(&data, &jsonp).unwrap();
        save_svg(&data, &svgp, &SvgOptions::default()).unwrap();

        let csv_txt = std::fs::read_to_string(&csvp).unwrap();
        assert!(csv_txt.starts_with("Name,Longitude,Latitude,position_x,position_y"));
        assert!(csv_txt.lines().nth(2).unwrap().ends_with("B,0,0,,"));

        let svg_txt = std::fs::read_to_string(&svgp).unwrap();
        assert_eq!(svg_txt.matches("<circle").count(), 1);
    }
}
