//! SVG path data for geometries, optionally through a projection.
//!
//! Output follows the usual web-map conventions: `M`/`L` per vertex, rings
//! closed with `Z` (the repeated closing vertex is not emitted), and points
//! drawn as small circles. Coordinates are rounded to a fixed number of digits.

use crate::projection::AlbersUsa;
use geo_types::{Coord, Geometry, LineString, Polygon};
use std::fmt::Write;

pub const DEFAULT_POINT_RADIUS: f64 = 4.5;
pub const DEFAULT_DIGITS: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PathGenerator {
    projection: Option<AlbersUsa>,
    point_radius: f64,
    digits: u32,
}

impl Default for PathGenerator {
    fn default() -> Self {
        Self {
            projection: None,
            point_radius: DEFAULT_POINT_RADIUS,
            digits: DEFAULT_DIGITS,
        }
    }
}

impl PathGenerator {
    /// Planar generator: coordinates are already in screen space.
    pub fn new() -> Self {
        Self::default()
    }

    /// Project every vertex; vertices outside the projection are skipped.
    pub fn with_projection(mut self, projection: AlbersUsa) -> Self {
        self.projection = Some(projection);
        self
    }

    pub fn with_point_radius(mut self, radius: f64) -> Self {
        self.point_radius = radius;
        self
    }

    pub fn with_digits(mut self, digits: u32) -> Self {
        self.digits = digits;
        self
    }

    /// Path data for `geometry`, or `None` if nothing would be drawn.
    pub fn path(&self, geometry: &Geometry<f64>) -> Option<String> {
        let mut out = PathString {
            generator: self,
            buf: String::new(),
        };
        out.geometry(geometry);
        (!out.buf.is_empty()).then_some(out.buf)
    }

    fn point(&self, c: Coord<f64>) -> Option<[f64; 2]> {
        match &self.projection {
            Some(p) => p.project([c.x, c.y]),
            None => Some([c.x, c.y]),
        }
    }

    fn num(&self, v: f64) -> String {
        let k = 10f64.powi(self.digits as i32);
        let r = (v * k + 0.5).floor() / k;
        // no "-0"
        if r == 0.0 { "0".into() } else { r.to_string() }
    }
}

struct PathString<'a> {
    generator: &'a PathGenerator,
    buf: String,
}

impl PathString<'_> {
    fn geometry(&mut self, g: &Geometry<f64>) {
        match g {
            Geometry::Point(p) => self.circle(p.0),
            Geometry::MultiPoint(mp) => mp.0.iter().for_each(|p| self.circle(p.0)),
            Geometry::Line(l) => self.line(&[l.start, l.end], false),
            Geometry::LineString(ls) => self.line(&ls.0, false),
            Geometry::MultiLineString(mls) => mls.0.iter().for_each(|ls| self.line(&ls.0, false)),
            Geometry::Polygon(p) => self.polygon(p),
            Geometry::MultiPolygon(mp) => mp.0.iter().for_each(|p| self.polygon(p)),
            Geometry::GeometryCollection(gc) => gc.0.iter().for_each(|g| self.geometry(g)),
            Geometry::Rect(r) => self.polygon(&r.to_polygon()),
            Geometry::Triangle(t) => self.polygon(&t.to_polygon()),
        }
    }

    fn polygon(&mut self, p: &Polygon<f64>) {
        self.ring(p.exterior());
        p.interiors().iter().for_each(|r| self.ring(r));
    }

    fn ring(&mut self, ring: &LineString<f64>) {
        let n = ring.0.len().saturating_sub(1);
        self.line(&ring.0[..n], true);
    }

    fn line(&mut self, coords: &[Coord<f64>], closed: bool) {
        let mut first = true;
        for &c in coords {
            let Some([x, y]) = self.generator.point(c) else { continue };
            let cmd = if first { 'M' } else { 'L' };
            let _ = write!(self.buf, "{cmd}{},{}", self.generator.num(x), self.generator.num(y));
            first = false;
        }
        if closed && !first {
            self.buf.push('Z');
        }
    }

    fn circle(&mut self, c: Coord<f64>) {
        let Some([x, y]) = self.generator.point(c) else { return };
        let r = self.generator.num(self.generator.point_radius);
        let d = self.generator.num(2.0 * self.generator.point_radius);
        let _ = write!(
            self.buf,
            "M{},{}m0,{r}a{r},{r} 0 1,1 0,-{d}a{r},{r} 0 1,1 0,{d}z",
            self.generator.num(x),
            self.generator.num(y),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo_types::{LineString, Point, polygon};

    #[test]
    fn polygon_rings_close_without_repeating_first_vertex() {
        let p: Geometry<f64> = polygon![(x: 0.0, y: 0.0), (x: 10.0, y: 0.0), (x: 10.0, y: 5.5)].into();
        assert_eq!(
            PathGenerator::new().path(&p).as_deref(),
            Some("M0,0L10,0L10,5.5Z")
        );
    }

    #[test]
    fn lines_are_open_and_rounded() {
        let l: Geometry<f64> = LineString::from(vec![(1.23456, -0.0001), (2.0, 3.0)]).into();
        assert_eq!(
            PathGenerator::new().path(&l).as_deref(),
            Some("M1.235,0L2,3")
        );
    }

    #[test]
    fn points_are_circles() {
        let p: Geometry<f64> = Point::new(5.0, 6.0).into();
        assert_eq!(
            PathGenerator::new().path(&p).as_deref(),
            Some("M5,6m0,4.5a4.5,4.5 0 1,1 0,-9a4.5,4.5 0 1,1 0,9z")
        );
    }

    #[test]
    fn unprojectable_geometry_draws_nothing() {
        let projected = PathGenerator::new().with_projection(AlbersUsa::shared());
        let p: Geometry<f64> = Point::new(0.0, 0.0).into();
        assert_eq!(projected.path(&p), None);
        let yellowstone: Geometry<f64> = Point::new(-110.5, 44.6).into();
        assert!(projected.path(&yellowstone).unwrap().starts_with('M'));
    }
}
