//! Regular 3D grid in detector coordinates.
use nalgebra::Vector3;

/// Integer lattice index along `[x, y, z]`.
pub type LatticeCoord = [i32; 3];

/// Axis-aligned box of nodes `origin + coord * spacing`, `0 <= coord < widths`.
#[derive(Clone, Debug, PartialEq)]
pub struct Lattice {
    pub origin: [f32; 3],
    pub spacing: [f32; 3],
    pub widths: [i32; 3],
}

impl Lattice {
    /// Smallest lattice containing `a` and `b` with `padding` extra nodes on
    /// every side.
    pub fn spanning(a: [f32; 3], b: [f32; 3], spacing: [f32; 3], padding: usize) -> Self {
        let mut origin = [0.0; 3];
        let mut widths = [1; 3];
        for i in 0..3 {
            let lo = a[i].min(b[i]);
            let hi = a[i].max(b[i]);
            origin[i] = lo - padding as f32 * spacing[i];
            widths[i] = ((hi - lo) / spacing[i]).round() as i32 + 1 + 2 * padding as i32;
        }
        Self {
            origin,
            spacing,
            widths,
        }
    }

    pub fn contains(&self, c: LatticeCoord) -> bool {
        (0..3).all(|i| c[i] >= 0 && c[i] < self.widths[i])
    }

    pub fn position(&self, c: LatticeCoord) -> [f32; 3] {
        [
            self.origin[0] + c[0] as f32 * self.spacing[0],
            self.origin[1] + c[1] as f32 * self.spacing[1],
            self.origin[2] + c[2] as f32 * self.spacing[2],
        ]
    }

    /// Nearest node to `pos`, or `None` outside the lattice.
    pub fn coord_of(&self, pos: [f32; 3]) -> Option<LatticeCoord> {
        let mut c = [0; 3];
        for i in 0..3 {
            c[i] = ((pos[i] - self.origin[i]) / self.spacing[i]).round() as i32;
        }
        self.contains(c).then_some(c)
    }

    /// Physical distance (cm) between two nodes.
    pub fn distance(&self, a: LatticeCoord, b: LatticeCoord) -> f32 {
        Vector3::new(
            (a[0] - b[0]) as f32 * self.spacing[0],
            (a[1] - b[1]) as f32 * self.spacing[1],
            (a[2] - b[2]) as f32 * self.spacing[2],
        )
        .norm()
    }

    pub fn num_nodes(&self) -> usize {
        self.widths.iter().map(|&w| w.max(0) as usize).product()
    }
}

/// Chebyshev distance in lattice steps.
pub fn chebyshev(a: LatticeCoord, b: LatticeCoord) -> i32 {
    (0..3).map(|i| (a[i] - b[i]).abs()).max().unwrap_or(0)
}
