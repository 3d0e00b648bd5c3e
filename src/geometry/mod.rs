//! Detector geometry services consumed by every stage.
//!
//! The tracker never computes wire geometry itself. It asks a
//! [`WireGeometry`] two questions: which wire on plane `p` sees a 3D point,
//! and where (if anywhere) a set of per-plane wires cross. Drift-time
//! conversions live in [`DriftModel`].
pub mod drift;
pub mod planar;
pub mod volume;

#[cfg(test)]
mod tests;

pub use self::drift::DriftModel;
pub use self::planar::{PlanarWireGeometry, WirePlane};
pub use self::volume::DetectorVolume;

use crate::error::{Result, TrackerError};
use crate::image::{ImageView, PlaneImage};
use crate::types::BoundaryEndPoint;
use serde::Serialize;

/// Result of crossing one wire per plane.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WireIntersection {
    pub z: f32,
    pub y: f32,
    /// Area spanned by the pairwise crossings (0 for two planes).
    pub triangle_area: f32,
    /// 1 when the crossing lies inside the active volume, 0 otherwise.
    pub crossings: u8,
}

impl WireIntersection {
    /// Single crossing with a residual below `max_area`.
    pub fn is_valid(&self, max_area: f32) -> bool {
        self.crossings == 1 && self.triangle_area < max_area
    }
}

pub trait WireGeometry: Send + Sync {
    fn num_planes(&self) -> usize;

    fn num_wires(&self, plane: usize) -> usize;

    /// Wire spacing in cm.
    fn pitch(&self, plane: usize) -> f32;

    fn volume(&self) -> &DetectorVolume;

    /// Continuous wire coordinate of the point `(y, z)` on `plane`.
    fn wire_coordinate(&self, y: f32, z: f32, plane: usize) -> f32;

    /// Position (cm) of `wire` along the plane's measuring axis.
    fn wire_position(&self, plane: usize, wire: f32) -> f32;

    /// Cross one wire per plane; `None` entries are planes left out.
    fn intersect(&self, wires: &[Option<f32>]) -> Option<WireIntersection>;

    /// Nearest existing wire to `pos = [x, y, z]`, or `None` off the plane.
    fn project(&self, pos: [f32; 3], plane: usize) -> Option<usize> {
        let w = self.wire_coordinate(pos[1], pos[2], plane).round();
        if !w.is_finite() || w < 0.0 || w >= self.num_wires(plane) as f32 {
            return None;
        }
        Some(w as usize)
    }
}

/// `[x, y, z]` of an endpoint given as one row plus one column per plane of
/// `images`, through the wire crossing of the column centers.
pub fn resolve_endpoint<G: WireGeometry + ?Sized>(
    geometry: &G,
    drift: &DriftModel,
    images: &[PlaneImage],
    endpoint: &BoundaryEndPoint,
) -> Result<[f32; 3]> {
    if endpoint.num_planes() != images.len() || images.is_empty() {
        return Err(TrackerError::BadInputShape {
            what: "endpoint columns",
            expected: images.len(),
            found: endpoint.num_planes(),
        });
    }
    let wires: Vec<Option<f32>> = images
        .iter()
        .zip(&endpoint.cols)
        .map(|(img, &c)| Some(img.meta().wire_center(c)))
        .collect();
    let crossing = geometry
        .intersect(&wires)
        .filter(|c| c.crossings == 1)
        .ok_or_else(|| {
            TrackerError::geometry(format!(
                "{:?} endpoint at row {} cols {:?} has no wire crossing",
                endpoint.boundary, endpoint.row, endpoint.cols
            ))
        })?;
    let tick = images[0].meta().tick_center(endpoint.row);
    Ok([drift.tick_to_x(tick), crossing.y, crossing.z])
}
