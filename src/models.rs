use crate::parks::ParkRecord;
use crate::topology::Feature;
use geo_types::MultiLineString;
use serde::ser::{Serialize, SerializeStruct, Serializer};

/// One state shape decoded from the `states` topology object.
pub type StateFeature = Feature;

/// Output of the first pipeline stage: state shapes and their shared borders.
#[derive(Debug, Clone, PartialEq)]
pub struct StatesLayer {
    pub states: Vec<StateFeature>,
    /// Borders between two distinct states only (no coastline/exterior edges).
    pub mesh: MultiLineString<f64>,
}

/// Everything the map needs, produced fresh by each pipeline run.
#[derive(Debug, Clone, PartialEq)]
pub struct ParkData {
    pub states: Vec<StateFeature>,
    pub mesh: MultiLineString<f64>,
    pub parks_data: Vec<ParkRecord>,
}

impl ParkData {
    pub fn new(layer: StatesLayer, parks_data: Vec<ParkRecord>) -> Self {
        Self {
            states: layer.states,
            mesh: layer.mesh,
            parks_data,
        }
    }

    /// The mesh as a GeoJSON geometry.
    pub fn mesh_geojson(&self) -> geojson::Geometry {
        geojson::Geometry::new(geojson::Value::from(&self.mesh))
    }
}

// Exactly `states`, `mesh`, `parksData`, as consumed by the map front end.
impl Serialize for ParkData {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("ParkData", 3)?;
        s.serialize_field("states", &self.states)?;
        s.serialize_field("mesh", &self.mesh_geojson())?;
        s.serialize_field("parksData", &self.parks_data)?;
        s.end()
    }
}
