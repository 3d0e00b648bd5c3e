use crate::types::BoundaryType;
use serde::{Deserialize, Serialize};

/// Axis-aligned active volume in cm.
///
/// `x` runs along the drift direction from the anode, `y` is vertical and
/// `z` follows the beam.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectorVolume {
    pub x_min: f32,
    pub x_max: f32,
    pub y_min: f32,
    pub y_max: f32,
    pub z_min: f32,
    pub z_max: f32,
}

impl Default for DetectorVolume {
    fn default() -> Self {
        Self {
            x_min: 0.0,
            x_max: 256.35,
            y_min: -116.5,
            y_max: 116.5,
            z_min: 0.0,
            z_max: 1036.8,
        }
    }
}

impl DetectorVolume {
    /// True if `(y, z)` lies inside the volume grown by `margin` cm.
    pub fn contains_yz(&self, y: f32, z: f32, margin: f32) -> bool {
        y >= self.y_min - margin
            && y <= self.y_max + margin
            && z >= self.z_min - margin
            && z <= self.z_max + margin
    }

    /// Distance from `pos = [x, y, z]` to the wall a boundary type crosses.
    pub fn distance_to_wall(&self, boundary: BoundaryType, pos: [f32; 3]) -> f32 {
        match boundary {
            BoundaryType::Top => self.y_max - pos[1],
            BoundaryType::Bottom => pos[1] - self.y_min,
            BoundaryType::Upstream => pos[2] - self.z_min,
            BoundaryType::Downstream => self.z_max - pos[2],
            BoundaryType::Anode => pos[0] - self.x_min,
            BoundaryType::Cathode => self.x_max - pos[0],
        }
    }

    /// Lateral coordinate along a crossing face: `z` on top/bottom, `y`
    /// shifted to start at zero on upstream/downstream.
    pub fn face_coordinate(&self, boundary: BoundaryType, y: f32, z: f32) -> f32 {
        match boundary {
            BoundaryType::Top | BoundaryType::Bottom => z,
            _ => y - self.y_min,
        }
    }
}
