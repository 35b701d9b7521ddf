//! Albers USA composite projection.
//!
//! Three conic equal-area projections (lower 48, Alaska, Hawaii) share one
//! scale and translation. A geographic point is handed to each part in turn;
//! the first part whose projected point falls inside its clip extent wins.
//! Points no part accepts have no screen position.
//!
//! ### Example
//! ```
//! use npsmap::projection::AlbersUsa;
//!
//! let projection = AlbersUsa::shared();
//! let [x, y] = projection.project([-96.6, 38.7]).unwrap();
//! assert!((x - 487.5).abs() < 1e-9 && (y - 305.0).abs() < 1e-9);
//! assert_eq!(projection.project([0.0, 0.0]), None);
//! ```

use serde::{Deserialize, Serialize};
use std::f64::consts::{PI, TAU};

/// Scale shared by the park positions and the pre-projected state shapes.
pub const SHARED_SCALE: f64 = 1300.0;
/// Translation shared by the park positions and the pre-projected state shapes.
pub const SHARED_TRANSLATE: [f64; 2] = [487.5, 305.0];

/// Default scale of a freshly built Albers USA projection.
pub const DEFAULT_SCALE: f64 = 1070.0;
/// Default translation of a freshly built Albers USA projection.
pub const DEFAULT_TRANSLATE: [f64; 2] = [480.0, 250.0];

const EPSILON: f64 = 1e-6;

/// Axis-aligned clip rectangle in screen space: `[[x0, y0], [x1, y1]]`.
pub type Extent = [[f64; 2]; 2];

/// A rotated, scaled and translated conic equal-area projection with a clip extent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConicEqualArea {
    n: f64,
    c: f64,
    r0: f64,
    rotate: f64,
    k: f64,
    dx: f64,
    dy: f64,
    extent: Extent,
}

impl ConicEqualArea {
    /// Build a projection from standard parallels, a longitude rotation, a
    /// center (in the rotated frame), scale, translation and clip extent.
    /// Angles are in degrees.
    pub fn new(
        parallels: [f64; 2],
        rotate: f64,
        center: [f64; 2],
        scale: f64,
        translate: [f64; 2],
        extent: Extent,
    ) -> Self {
        let sy0 = parallels[0].to_radians().sin();
        let n = (sy0 + parallels[1].to_radians().sin()) / 2.0;
        let c = 1.0 + sy0 * (2.0 * n - sy0);
        let r0 = c.sqrt() / n;
        let mut p = Self {
            n,
            c,
            r0,
            rotate: (rotate % 360.0).to_radians(),
            k: scale,
            dx: 0.0,
            dy: 0.0,
            extent,
        };
        let [cx, cy] = p.raw(center[0].to_radians(), center[1].to_radians());
        p.dx = translate[0] - scale * cx;
        p.dy = translate[1] + scale * cy;
        p
    }

    fn raw(&self, lambda: f64, phi: f64) -> [f64; 2] {
        let r = (self.c - 2.0 * self.n * phi.sin()).sqrt() / self.n;
        let x = lambda * self.n;
        [r * x.sin(), self.r0 - r * x.cos()]
    }

    /// Project without clipping. The result may be NaN for points the
    /// conic cannot represent.
    pub fn forward(&self, lon: f64, lat: f64) -> [f64; 2] {
        let mut lambda = lon.to_radians() + self.rotate;
        if lambda > PI {
            lambda -= TAU;
        } else if lambda < -PI {
            lambda += TAU;
        }
        let [x, y] = self.raw(lambda, lat.to_radians());
        [self.dx + self.k * x, self.dy - self.k * y]
    }

    /// Project and keep the point only if it lands inside the clip extent.
    pub fn project_clipped(&self, lon: f64, lat: f64) -> Option<[f64; 2]> {
        let [x, y] = self.forward(lon, lat);
        let [[x0, y0], [x1, y1]] = self.extent;
        (x0 <= x && x <= x1 && y0 <= y && y <= y1).then_some([x, y])
    }

    pub fn extent(&self) -> Extent {
        self.extent
    }
}

/// Composite projection for the United States (lower 48, Alaska, Hawaii).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlbersUsa {
    scale: f64,
    translate: [f64; 2],
    lower48: ConicEqualArea,
    alaska: ConicEqualArea,
    hawaii: ConicEqualArea,
}

impl Default for AlbersUsa {
    fn default() -> Self {
        Self::new(DEFAULT_SCALE, DEFAULT_TRANSLATE)
    }
}

impl AlbersUsa {
    pub fn new(scale: f64, translate: [f64; 2]) -> Self {
        let k = scale;
        let [x, y] = translate;
        let lower48 = ConicEqualArea::new(
            [29.5, 45.5],
            96.0,
            [-0.6, 38.7],
            k,
            [x, y],
            [[x - 0.455 * k, y - 0.238 * k], [x + 0.455 * k, y + 0.238 * k]],
        );
        let alaska = ConicEqualArea::new(
            [55.0, 65.0],
            154.0,
            [-2.0, 58.5],
            0.35 * k,
            [x - 0.307 * k, y + 0.201 * k],
            [
                [x - 0.425 * k + EPSILON, y + 0.120 * k + EPSILON],
                [x - 0.214 * k - EPSILON, y + 0.234 * k - EPSILON],
            ],
        );
        let hawaii = ConicEqualArea::new(
            [8.0, 18.0],
            157.0,
            [-3.0, 19.9],
            k,
            [x - 0.205 * k, y + 0.212 * k],
            [
                [x - 0.214 * k + EPSILON, y + 0.166 * k + EPSILON],
                [x - 0.115 * k - EPSILON, y + 0.234 * k - EPSILON],
            ],
        );
        Self {
            scale,
            translate,
            lower48,
            alaska,
            hawaii,
        }
    }

    /// The fixed configuration used for both state shapes and park positions
    /// (scale 1300, translate `[487.5, 305]`, i.e. a 975×610 viewport).
    pub fn shared() -> Self {
        Self::new(SHARED_SCALE, SHARED_TRANSLATE)
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn translate(&self) -> [f64; 2] {
        self.translate
    }

    /// Map `[longitude, latitude]` (degrees) to a screen point, or `None` when
    /// no part of the composite accepts the coordinates.
    pub fn project(&self, coordinates: [f64; 2]) -> Option<[f64; 2]> {
        let [lon, lat] = coordinates;
        if !lon.is_finite() || !lat.is_finite() {
            return None;
        }
        self.lower48
            .project_clipped(lon, lat)
            .or_else(|| self.alaska.project_clipped(lon, lat))
            .or_else(|| self.hawaii.project_clipped(lon, lat))
    }
}

/// Serializable description of a projection, as exported alongside data.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProjectionConfig {
    pub scale: f64,
    pub translate: [f64; 2],
}

impl From<&AlbersUsa> for ProjectionConfig {
    fn from(p: &AlbersUsa) -> Self {
        Self {
            scale: p.scale,
            translate: p.translate,
        }
    }
}

impl From<ProjectionConfig> for AlbersUsa {
    fn from(c: ProjectionConfig) -> Self {
        AlbersUsa::new(c.scale, c.translate)
    }
}
