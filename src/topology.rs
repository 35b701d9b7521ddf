//! TopoJSON decoding: features and boundary meshes.
//!
//! A topology stores each shared boundary once as an *arc*; geometries refer to
//! arcs by index (`~i` meaning arc `i` reversed). Quantized topologies carry a
//! `transform` and delta-encode their arcs.
//!
//! - [`Topology::features`] rebuilds polygons/lines for every geometry of a
//!   named object.
//! - [`Topology::mesh_with`] keeps the arcs accepted by a predicate over the
//!   first and last geometry sharing each arc, and stitches them into long
//!   lines. [`Topology::mesh_interior`] is the common case: borders between
//!   two distinct geometries only.

use geo_types::{
    Coord, Geometry, GeometryCollection, LineString, MultiLineString, MultiPoint, MultiPolygon,
    Point, Polygon,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap, VecDeque};
use thiserror::Error;

/// Errors raised while turning a topology into geometry.
#[derive(Debug, Error)]
pub enum TopologyError {
    #[error("topology has no object named `{0}`")]
    UnknownObject(String),
    #[error("arc index {index} out of range (topology has {len} arcs)")]
    ArcOutOfRange { index: i64, len: usize },
    #[error("position needs at least two coordinates, got {0}")]
    ShortPosition(usize),
    #[error("malformed `{kind}` geometry: {source}")]
    Malformed {
        kind: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Quantization transform: `decoded = quantized * scale + translate`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub scale: [f64; 2],
    pub translate: [f64; 2],
}

impl Transform {
    fn apply(&self, x: f64, y: f64) -> Coord<f64> {
        Coord {
            x: x * self.scale[0] + self.translate[0],
            y: y * self.scale[1] + self.translate[1],
        }
    }
}

/// A topology document (`"type": "Topology"`).
#[derive(Debug, Clone, Deserialize)]
pub struct Topology {
    #[serde(default)]
    pub bbox: Option<Vec<f64>>,
    #[serde(default)]
    pub transform: Option<Transform>,
    pub arcs: Vec<Vec<Vec<f64>>>,
    pub objects: BTreeMap<String, TopoGeometry>,
}

/// One geometry of a topology object.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "RawGeometry")]
pub struct TopoGeometry {
    pub id: Option<Value>,
    pub properties: Map<String, Value>,
    pub kind: GeometryKind,
}

/// Geometry payload: arc references, inline positions, or children.
#[derive(Debug, Clone, PartialEq)]
pub enum GeometryKind {
    Null,
    Point(Vec<f64>),
    MultiPoint(Vec<Vec<f64>>),
    LineString(Vec<i64>),
    MultiLineString(Vec<Vec<i64>>),
    Polygon(Vec<Vec<i64>>),
    MultiPolygon(Vec<Vec<Vec<i64>>>),
    GeometryCollection(Vec<TopoGeometry>),
}

#[derive(Deserialize)]
struct RawGeometry {
    #[serde(rename = "type")]
    kind: Option<String>,
    #[serde(default)]
    id: Option<Value>,
    #[serde(default)]
    properties: Option<Map<String, Value>>,
    #[serde(default)]
    arcs: Option<Value>,
    #[serde(default)]
    coordinates: Option<Value>,
    #[serde(default)]
    geometries: Option<Vec<TopoGeometry>>,
}

fn field<T: serde::de::DeserializeOwned>(kind: &str, v: Option<Value>) -> Result<T, TopologyError> {
    serde_json::from_value(v.unwrap_or(Value::Null)).map_err(|source| TopologyError::Malformed {
        kind: kind.to_string(),
        source,
    })
}

impl TryFrom<RawGeometry> for TopoGeometry {
    type Error = TopologyError;

    fn try_from(raw: RawGeometry) -> Result<Self, Self::Error> {
        let kind = match raw.kind.as_deref() {
            None => GeometryKind::Null,
            Some(k @ "Point") => GeometryKind::Point(field(k, raw.coordinates)?),
            Some(k @ "MultiPoint") => GeometryKind::MultiPoint(field(k, raw.coordinates)?),
            Some(k @ "LineString") => GeometryKind::LineString(field(k, raw.arcs)?),
            Some(k @ "MultiLineString") => GeometryKind::MultiLineString(field(k, raw.arcs)?),
            Some(k @ "Polygon") => GeometryKind::Polygon(field(k, raw.arcs)?),
            Some(k @ "MultiPolygon") => GeometryKind::MultiPolygon(field(k, raw.arcs)?),
            Some("GeometryCollection") => {
                GeometryKind::GeometryCollection(raw.geometries.unwrap_or_default())
            }
            // unrecognized types decode as null geometries
            Some(_) => GeometryKind::Null,
        };
        Ok(Self {
            id: raw.id,
            properties: raw.properties.unwrap_or_default(),
            kind,
        })
    }
}

/// A decoded feature: identifier, properties and geometry (absent for null geometries).
#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    pub id: Option<Value>,
    pub properties: Map<String, Value>,
    pub geometry: Option<Geometry<f64>>,
}

impl Feature {
    /// Convert to a GeoJSON feature for export.
    pub fn to_geojson(&self) -> geojson::Feature {
        let id = match &self.id {
            Some(Value::String(s)) => Some(geojson::feature::Id::String(s.clone())),
            Some(Value::Number(n)) => Some(geojson::feature::Id::Number(n.clone())),
            _ => None,
        };
        geojson::Feature {
            bbox: None,
            geometry: self
                .geometry
                .as_ref()
                .map(|g| geojson::Geometry::new(geojson::Value::from(g))),
            id,
            properties: Some(self.properties.clone()),
            foreign_members: None,
        }
    }
}

impl Serialize for Feature {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_geojson().serialize(serializer)
    }
}

fn arc_index(i: i64) -> usize {
    (if i < 0 { !i } else { i }) as usize
}

type PointKey = (u64, u64);

fn point_key(x: f64, y: f64) -> PointKey {
    // -0.0 and 0.0 must hash alike
    ((x + 0.0).to_bits(), (y + 0.0).to_bits())
}

struct Decoder<'a> {
    topology: &'a Topology,
    arcs: Vec<Vec<Coord<f64>>>,
}

impl<'a> Decoder<'a> {
    fn new(topology: &'a Topology) -> Result<Self, TopologyError> {
        Ok(Self {
            arcs: topology.decode_arcs()?,
            topology,
        })
    }

    fn arc(&self, i: i64, points: &mut Vec<Coord<f64>>) -> Result<(), TopologyError> {
        let arc = self
            .arcs
            .get(arc_index(i))
            .ok_or(TopologyError::ArcOutOfRange {
                index: i,
                len: self.arcs.len(),
            })?;
        points.pop();
        if i < 0 {
            points.extend(arc.iter().rev());
        } else {
            points.extend(arc.iter());
        }
        Ok(())
    }

    fn line(&self, arcs: &[i64]) -> Result<Vec<Coord<f64>>, TopologyError> {
        let mut points = Vec::new();
        for &i in arcs {
            self.arc(i, &mut points)?;
        }
        if let Some(&first) = points.first()
            && points.len() < 2
        {
            points.push(first);
        }
        Ok(points)
    }

    fn ring(&self, arcs: &[i64]) -> Result<LineString<f64>, TopologyError> {
        let mut points = self.line(arcs)?;
        if let Some(&first) = points.first() {
            while points.len() < 4 {
                points.push(first);
            }
        }
        Ok(LineString::new(points))
    }

    fn polygon(&self, rings: &[Vec<i64>]) -> Result<Polygon<f64>, TopologyError> {
        let mut rings = rings
            .iter()
            .map(|r| self.ring(r))
            .collect::<Result<Vec<_>, _>>()?;
        let exterior = if rings.is_empty() {
            LineString::new(Vec::new())
        } else {
            rings.remove(0)
        };
        Ok(Polygon::new(exterior, rings))
    }

    fn position(&self, p: &[f64]) -> Result<Coord<f64>, TopologyError> {
        match p {
            [x, y, ..] => Ok(match &self.topology.transform {
                Some(t) => t.apply(*x, *y),
                None => Coord { x: *x, y: *y },
            }),
            _ => Err(TopologyError::ShortPosition(p.len())),
        }
    }

    fn geometry(&self, g: &TopoGeometry) -> Result<Option<Geometry<f64>>, TopologyError> {
        let geometry: Geometry<f64> = match &g.kind {
            GeometryKind::Null => return Ok(None),
            GeometryKind::Point(p) => Point(self.position(p)?).into(),
            GeometryKind::MultiPoint(ps) => MultiPoint(
                ps.iter()
                    .map(|p| self.position(p).map(Point))
                    .collect::<Result<_, _>>()?,
            )
            .into(),
            GeometryKind::LineString(arcs) => LineString::new(self.line(arcs)?).into(),
            GeometryKind::MultiLineString(lines) => MultiLineString::new(
                lines
                    .iter()
                    .map(|l| self.line(l).map(LineString::new))
                    .collect::<Result<_, _>>()?,
            )
            .into(),
            GeometryKind::Polygon(rings) => self.polygon(rings)?.into(),
            GeometryKind::MultiPolygon(polys) => MultiPolygon::new(
                polys
                    .iter()
                    .map(|p| self.polygon(p))
                    .collect::<Result<_, _>>()?,
            )
            .into(),
            GeometryKind::GeometryCollection(children) => {
                let mut out = Vec::with_capacity(children.len());
                for child in children {
                    if let Some(c) = self.geometry(child)? {
                        out.push(c);
                    }
                }
                Geometry::GeometryCollection(GeometryCollection(out))
            }
        };
        Ok(Some(geometry))
    }

    fn feature(&self, g: &TopoGeometry) -> Result<Feature, TopologyError> {
        Ok(Feature {
            id: g.id.clone(),
            properties: g.properties.clone(),
            geometry: self.geometry(g)?,
        })
    }
}

impl Topology {
    /// Parse a topology from JSON bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }

    /// Look up a named object (e.g. `"states"`).
    pub fn object(&self, name: &str) -> Result<&TopoGeometry, TopologyError> {
        self.objects
            .get(name)
            .ok_or_else(|| TopologyError::UnknownObject(name.to_string()))
    }

    /// Absolute coordinates of every arc, with delta decoding and the
    /// quantization transform applied.
    pub fn decode_arcs(&self) -> Result<Vec<Vec<Coord<f64>>>, TopologyError> {
        self.arcs
            .iter()
            .map(|arc| {
                let (mut x, mut y) = (0.0, 0.0);
                arc.iter()
                    .map(|p| match (p.as_slice(), &self.transform) {
                        ([dx, dy, ..], Some(t)) => {
                            x += dx;
                            y += dy;
                            Ok(t.apply(x, y))
                        }
                        ([px, py, ..], None) => Ok(Coord { x: *px, y: *py }),
                        _ => Err(TopologyError::ShortPosition(p.len())),
                    })
                    .collect()
            })
            .collect()
    }

    /// Features for the named object: one per member of a geometry
    /// collection (in order), or a single feature otherwise.
    pub fn features(&self, object: &str) -> Result<Vec<Feature>, TopologyError> {
        let o = self.object(object)?;
        let decoder = Decoder::new(self)?;
        match &o.kind {
            GeometryKind::GeometryCollection(children) => {
                children.iter().map(|g| decoder.feature(g)).collect()
            }
            _ => Ok(vec![decoder.feature(o)?]),
        }
    }

    /// Every arc referenced by the named object, stitched into lines.
    pub fn mesh(&self, object: &str) -> Result<MultiLineString<f64>, TopologyError> {
        self.mesh_with(object, |_, _| true)
    }

    /// Only arcs shared by two different geometries (interior borders).
    pub fn mesh_interior(&self, object: &str) -> Result<MultiLineString<f64>, TopologyError> {
        self.mesh_with(object, |a, b| !std::ptr::eq(a, b))
    }

    /// Arcs for which `filter(first, last)` holds, where `first` and `last`
    /// are the first and last leaf geometries referencing the arc (the same
    /// geometry when only one does).
    pub fn mesh_with<F>(&self, object: &str, filter: F) -> Result<MultiLineString<f64>, TopologyError>
    where
        F: Fn(&TopoGeometry, &TopoGeometry) -> bool,
    {
        let o = self.object(object)?;
        let mut geoms_by_arc: Vec<Vec<(i64, &TopoGeometry)>> = vec![Vec::new(); self.arcs.len()];
        self.collect_arcs(o, &mut geoms_by_arc)?;

        let selected: Vec<i64> = geoms_by_arc
            .iter()
            .filter_map(|geoms| match (geoms.first(), geoms.last()) {
                (Some(&(i, first)), Some(&(_, last))) if filter(first, last) => Some(i),
                _ => None,
            })
            .collect();

        let decoder = Decoder::new(self)?;
        let lines = self
            .stitch(selected, &decoder.arcs)
            .iter()
            .map(|fragment| decoder.line(fragment).map(LineString::new))
            .collect::<Result<_, _>>()?;
        Ok(MultiLineString::new(lines))
    }

    fn collect_arcs<'a>(
        &self,
        g: &'a TopoGeometry,
        out: &mut Vec<Vec<(i64, &'a TopoGeometry)>>,
    ) -> Result<(), TopologyError> {
        if let GeometryKind::GeometryCollection(children) = &g.kind {
            for child in children {
                self.collect_arcs(child, out)?;
            }
            return Ok(());
        }
        let len = out.len();
        let mut push = |i: i64| -> Result<(), TopologyError> {
            out.get_mut(arc_index(i))
                .ok_or(TopologyError::ArcOutOfRange { index: i, len })?
                .push((i, g));
            Ok(())
        };
        match &g.kind {
            GeometryKind::LineString(arcs) => arcs.iter().try_for_each(|&i| push(i))?,
            GeometryKind::MultiLineString(rings) | GeometryKind::Polygon(rings) => rings
                .iter()
                .flatten()
                .try_for_each(|&i| push(i))?,
            GeometryKind::MultiPolygon(polys) => polys
                .iter()
                .flatten()
                .flatten()
                .try_for_each(|&i| push(i))?,
            _ => {}
        }
        Ok(())
    }

    /// Endpoints of a (possibly reversed) arc, keyed on the stored coordinates
    /// so quantized topologies join on exact integers.
    fn ends(&self, i: i64, decoded: &[Vec<Coord<f64>>]) -> (PointKey, PointKey) {
        let raw = &self.arcs[arc_index(i)];
        let (p0, p1) = match &self.transform {
            Some(_) => {
                let first = (raw[0][0], raw[0][1]);
                let last = raw.iter().fold((0.0, 0.0), |(x, y), p| (x + p[0], y + p[1]));
                (first, last)
            }
            None => {
                let arc = &decoded[arc_index(i)];
                let (a, b) = (arc[0], arc[arc.len() - 1]);
                ((a.x, a.y), (b.x, b.y))
            }
        };
        let (k0, k1) = (point_key(p0.0, p0.1), point_key(p1.0, p1.1));
        if i < 0 { (k1, k0) } else { (k0, k1) }
    }

    /// Join arcs end-to-start into maximal fragments.
    fn stitch(&self, mut arcs: Vec<i64>, decoded: &[Vec<Coord<f64>>]) -> Vec<Vec<i64>> {
        struct Fragment {
            arcs: VecDeque<i64>,
            start: PointKey,
            end: PointKey,
        }

        // degenerate arcs go first so longer arcs can absorb them
        let mut empty = 0;
        for j in 0..arcs.len() {
            let raw = &self.arcs[arc_index(arcs[j])];
            if raw.len() == 2 && raw[1][0] == 0.0 && raw[1][1] == 0.0 {
                arcs.swap(empty, j);
                empty += 1;
            }
        }

        let mut fragments: Vec<Option<Fragment>> = Vec::new();
        let mut by_start: HashMap<PointKey, usize> = HashMap::new();
        let mut by_end: HashMap<PointKey, usize> = HashMap::new();

        for &i in &arcs {
            if self.arcs[arc_index(i)].is_empty() {
                continue;
            }
            let (start, end) = self.ends(i, decoded);
            if let Some(fi) = by_end.remove(&start) {
                let Some(mut f) = fragments[fi].take() else { continue };
                f.arcs.push_back(i);
                f.end = end;
                match by_start.remove(&end) {
                    Some(gi) if gi != fi => {
                        if let Some(g) = fragments[gi].take() {
                            f.arcs.extend(g.arcs);
                            f.end = g.end;
                        }
                    }
                    _ => {}
                }
                by_start.insert(f.start, fi);
                by_end.insert(f.end, fi);
                fragments[fi] = Some(f);
            } else if let Some(fi) = by_start.remove(&end) {
                let Some(mut f) = fragments[fi].take() else { continue };
                f.arcs.push_front(i);
                f.start = start;
                match by_end.remove(&start) {
                    Some(gi) if gi != fi => {
                        if let Some(mut g) = fragments[gi].take() {
                            g.arcs.extend(f.arcs);
                            g.end = f.end;
                            by_start.insert(g.start, gi);
                            by_end.insert(g.end, gi);
                            fragments[gi] = Some(g);
                            continue;
                        }
                    }
                    _ => {}
                }
                by_start.insert(f.start, fi);
                by_end.insert(f.end, fi);
                fragments[fi] = Some(f);
            } else {
                by_start.insert(start, fragments.len());
                by_end.insert(end, fragments.len());
                fragments.push(Some(Fragment {
                    arcs: VecDeque::from([i]),
                    start,
                    end,
                }));
            }
        }

        fragments
            .into_iter()
            .flatten()
            .map(|f| f.arcs.into_iter().collect())
            .collect()
    }
}
