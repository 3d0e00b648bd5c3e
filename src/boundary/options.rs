use crate::error::{Result, TrackerError};
use serde::Deserialize;

/// Parameters of the boundary pixel search and endpoint clustering.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct BoundaryOptions {
    /// Per-plane charge threshold (ADC) for a column to count as hit.
    pub thresholds: Vec<f32>,
    /// Per-plane dilation (wires) applied around every hit, rounded up to
    /// whole columns on images with several wires per column.
    pub neighborhoods: Vec<usize>,
    /// Treat bad-channel columns as hits during the combination search.
    pub hitsearch_uses_badchs: bool,
    /// Scales the plane neighborhoods when collecting image-space pixels,
    /// indexed top, bottom, upstream, downstream.
    pub type_modifier: [f32; 4],
    /// Minimum points in a detector-space cluster (also DBSCAN `minPts`).
    pub cluster_min_points: usize,
    /// DBSCAN radius in detector-space units (cm along the face, rows in time).
    pub cluster_radius: f32,
    /// Largest accepted residual area of a three-wire intersection (cm²).
    pub max_triangle_area: f32,
    /// Depth of the loose boundary match band (cm).
    pub loose_tolerance_cm: f32,
    /// Seed of the tie-breaking jitter.
    pub jitter_seed: u64,
    /// Amplitude of the jitter added to the row coordinate, in `[0, 1)` so
    /// a candidate never leaves its row.
    pub jitter_scale: f32,
}

impl Default for BoundaryOptions {
    fn default() -> Self {
        Self {
            thresholds: vec![50.0, 50.0, 100.0],
            neighborhoods: vec![2, 2, 2],
            hitsearch_uses_badchs: false,
            type_modifier: [1.0; 4],
            cluster_min_points: 3,
            cluster_radius: 5.0,
            max_triangle_area: 1.0,
            loose_tolerance_cm: 3.0,
            jitter_seed: 0x7468_726d,
            jitter_scale: 0.1,
        }
    }
}

impl BoundaryOptions {
    /// Error unless every per-plane list covers `nplanes` planes.
    pub fn check_planes(&self, nplanes: usize) -> Result<()> {
        for (name, len) in [
            ("thresholds", self.thresholds.len()),
            ("neighborhoods", self.neighborhoods.len()),
        ] {
            if len < nplanes {
                return Err(TrackerError::configuration(format!(
                    "boundary {name} needs {nplanes} entries, got {len}"
                )));
            }
        }
        Ok(())
    }

    /// Columns covered by the `plane` neighborhood scaled by `modifier` on
    /// images whose columns are `pixel_width` wires wide.
    pub fn column_reach(&self, plane: usize, pixel_width: f32, modifier: f32) -> usize {
        let wires = self.neighborhoods.get(plane).copied().unwrap_or(0) as f32 * modifier;
        if pixel_width <= 0.0 || wires <= 0.0 {
            return 0;
        }
        (wires / pixel_width).ceil() as usize
    }
}
