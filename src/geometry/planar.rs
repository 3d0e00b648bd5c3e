//! Parallel-wire readout planes in the `(z, y)` plane.
//!
//! Each plane measures the coordinate `s = z·cos(θ) + y·sin(θ)` along its
//! own axis; wire `n` sits at `s = offset + n·pitch`. Two wires from
//! different planes therefore define a 2×2 linear system, solved here with
//! `nalgebra`.
use super::{DetectorVolume, WireGeometry, WireIntersection};
use nalgebra::{Matrix2, Vector2};

#[derive(Clone, Debug, PartialEq)]
pub struct WirePlane {
    /// Direction of the measuring axis from +z toward +y (degrees).
    pub angle_deg: f32,
    pub pitch: f32,
    /// Axis position (cm) of wire 0.
    pub offset: f32,
    pub num_wires: usize,
}

impl WirePlane {
    fn axis(&self) -> Vector2<f32> {
        let a = self.angle_deg.to_radians();
        Vector2::new(a.cos(), a.sin())
    }

    /// Plane whose wires cover every point of `volume`.
    pub fn covering(volume: &DetectorVolume, angle_deg: f32, pitch: f32) -> Self {
        let a = angle_deg.to_radians();
        let (c, s) = (a.cos(), a.sin());
        let corners = [
            (volume.z_min, volume.y_min),
            (volume.z_min, volume.y_max),
            (volume.z_max, volume.y_min),
            (volume.z_max, volume.y_max),
        ];
        let (lo, hi) = corners
            .iter()
            .map(|&(z, y)| z * c + y * s)
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
        Self {
            angle_deg,
            pitch,
            offset: lo,
            num_wires: ((hi - lo) / pitch).ceil() as usize + 1,
        }
    }
}

#[derive(Clone, Debug)]
pub struct PlanarWireGeometry {
    volume: DetectorVolume,
    planes: Vec<WirePlane>,
}

impl PlanarWireGeometry {
    pub fn new(volume: DetectorVolume, planes: Vec<WirePlane>) -> Self {
        Self { volume, planes }
    }

    /// One covering plane per angle, all sharing `pitch`.
    pub fn with_angles(volume: DetectorVolume, angles_deg: &[f32], pitch: f32) -> Self {
        let planes = angles_deg
            .iter()
            .map(|&a| WirePlane::covering(&volume, a, pitch))
            .collect();
        Self::new(volume, planes)
    }

    /// Three planes at +60°, -60° and 0° with 0.3 cm pitch.
    pub fn microboone_like() -> Self {
        Self::with_angles(DetectorVolume::default(), &[60.0, -60.0, 0.0], 0.3)
    }

    pub fn planes(&self) -> &[WirePlane] {
        &self.planes
    }

    fn cross_pair(&self, a: (usize, f32), b: (usize, f32)) -> Option<Vector2<f32>> {
        let (pa, pb) = (&self.planes[a.0], &self.planes[b.0]);
        let (na, nb) = (pa.axis(), pb.axis());
        let m = Matrix2::new(na.x, na.y, nb.x, nb.y);
        if m.determinant().abs() < 1e-6 {
            return None;
        }
        let rhs = Vector2::new(self.wire_position(a.0, a.1), self.wire_position(b.0, b.1));
        // solution is (z, y)
        m.try_inverse().map(|inv| inv * rhs)
    }
}

impl WireGeometry for PlanarWireGeometry {
    fn num_planes(&self) -> usize {
        self.planes.len()
    }

    fn num_wires(&self, plane: usize) -> usize {
        self.planes[plane].num_wires
    }

    fn pitch(&self, plane: usize) -> f32 {
        self.planes[plane].pitch
    }

    fn volume(&self) -> &DetectorVolume {
        &self.volume
    }

    fn wire_coordinate(&self, y: f32, z: f32, plane: usize) -> f32 {
        let p = &self.planes[plane];
        let s = p.axis().dot(&Vector2::new(z, y));
        (s - p.offset) / p.pitch
    }

    fn wire_position(&self, plane: usize, wire: f32) -> f32 {
        let p = &self.planes[plane];
        p.offset + wire * p.pitch
    }

    fn intersect(&self, wires: &[Option<f32>]) -> Option<WireIntersection> {
        let present: Vec<(usize, f32)> = wires
            .iter()
            .enumerate()
            .take(self.planes.len())
            .filter_map(|(p, w)| w.map(|w| (p, w)))
            .collect();
        if present.len() < 2 {
            return None;
        }

        let mut crossings = Vec::with_capacity(3);
        for i in 0..present.len() {
            for j in (i + 1)..present.len() {
                if let Some(pt) = self.cross_pair(present[i], present[j]) {
                    crossings.push(pt);
                }
            }
        }
        if crossings.is_empty() {
            return None;
        }

        let centroid = crossings.iter().fold(Vector2::zeros(), |acc, p| acc + p) / crossings.len() as f32;
        let triangle_area = if crossings.len() >= 3 {
            let (e1, e2) = (crossings[1] - crossings[0], crossings[2] - crossings[0]);
            0.5 * (e1.x * e2.y - e1.y * e2.x).abs()
        } else {
            0.0
        };
        let (z, y) = (centroid.x, centroid.y);
        // wires on the edge of the volume cross up to half a pitch outside it
        let margin = 0.5 * self.planes.iter().map(|p| p.pitch).fold(0.0, f32::max);
        Some(WireIntersection {
            z,
            y,
            triangle_area,
            crossings: u8::from(self.volume.contains_yz(y, z, margin)),
        })
    }
}
