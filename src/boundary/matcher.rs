//! Wire triples consistent with a track crossing one of the detector faces.
//!
//! A [`BoundaryMatchTable`] is built once per geometry by sampling each face
//! of the active volume, optionally through a band of depth `tolerance`
//! inside it, and projecting every sample onto the three planes. At run time
//! a row's per-plane hit arrays are checked against every stored triple.
use crate::geometry::{DetectorVolume, WireGeometry};
use crate::types::BoundaryType;
use log::debug;
use std::collections::HashSet;

/// One wire per plane plus the face position that produced it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundaryCombo {
    pub wires: [usize; 3],
    pub y: f32,
    pub z: f32,
}

/// Combination search run for every image row.
pub trait BoundaryMatcher: Send + Sync {
    /// Append to `out[t]` every triple of crossing type `t` whose three wires
    /// are all hit. `hits[p]` is indexed by wire number.
    fn find_combos(&self, hits: &[Vec<bool>], out: &mut [Vec<BoundaryCombo>; 4]);
}

#[derive(Clone, Debug, Default)]
pub struct BoundaryMatchTable {
    combos: [Vec<BoundaryCombo>; 4],
    tolerance_cm: f32,
}

impl BoundaryMatchTable {
    /// Sample the four crossing faces of `geometry`'s volume.
    ///
    /// `tolerance_cm = 0` keeps only the face itself (the tight table).
    pub fn build<G: WireGeometry + ?Sized>(geometry: &G, tolerance_cm: f32) -> Self {
        let vol = geometry.volume();
        let step = 0.5
            * (0..geometry.num_planes())
                .map(|p| geometry.pitch(p))
                .fold(f32::INFINITY, f32::min);
        let depths = sample_range(0.0, tolerance_cm.max(0.0), step);

        let mut combos: [Vec<BoundaryCombo>; 4] = Default::default();
        for boundary in BoundaryType::CROSSINGS {
            let mut seen = HashSet::new();
            let out = &mut combos[boundary_slot(boundary)];
            let along = match boundary {
                BoundaryType::Top | BoundaryType::Bottom => sample_range(vol.z_min, vol.z_max, step),
                _ => sample_range(vol.y_min, vol.y_max, step),
            };
            for &d in &depths {
                for &s in &along {
                    let (y, z) = face_point(vol, boundary, s, d);
                    let pos = [0.0, y, z];
                    let (Some(u), Some(v), Some(w)) = (
                        geometry.project(pos, 0),
                        geometry.project(pos, 1),
                        geometry.project(pos, 2),
                    ) else {
                        continue;
                    };
                    if seen.insert([u, v, w]) {
                        out.push(BoundaryCombo {
                            wires: [u, v, w],
                            y,
                            z,
                        });
                    }
                }
            }
        }
        debug!(
            "BoundaryMatchTable::build tolerance={:.2}cm combos top={} bottom={} upstream={} downstream={}",
            tolerance_cm,
            combos[0].len(),
            combos[1].len(),
            combos[2].len(),
            combos[3].len()
        );
        Self {
            combos,
            tolerance_cm,
        }
    }

    pub fn tolerance_cm(&self) -> f32 {
        self.tolerance_cm
    }

    pub fn combos(&self, boundary: BoundaryType) -> &[BoundaryCombo] {
        boundary
            .crossing_index()
            .map(|i| self.combos[i].as_slice())
            .unwrap_or(&[])
    }
}

impl BoundaryMatcher for BoundaryMatchTable {
    fn find_combos(&self, hits: &[Vec<bool>], out: &mut [Vec<BoundaryCombo>; 4]) {
        let is_hit = |p: usize, w: usize| hits.get(p).and_then(|h| h.get(w)).copied().unwrap_or(false);
        for (slot, table) in self.combos.iter().enumerate() {
            out[slot].extend(table.iter().filter(|c| {
                is_hit(2, c.wires[2]) && is_hit(0, c.wires[0]) && is_hit(1, c.wires[1])
            }));
        }
    }
}

/// `(y, z)` at lateral position `s` and depth `d` inside a face.
fn face_point(vol: &DetectorVolume, boundary: BoundaryType, s: f32, d: f32) -> (f32, f32) {
    match boundary {
        BoundaryType::Top => (vol.y_max - d, s),
        BoundaryType::Bottom => (vol.y_min + d, s),
        BoundaryType::Upstream => (s, vol.z_min + d),
        _ => (s, vol.z_max - d),
    }
}

fn boundary_slot(boundary: BoundaryType) -> usize {
    boundary.crossing_index().unwrap_or(0)
}

/// `lo, lo+step, ...` up to and including `hi`.
fn sample_range(lo: f32, hi: f32, step: f32) -> Vec<f32> {
    if step <= 0.0 || hi < lo {
        return vec![lo];
    }
    let n = ((hi - lo) / step + 1e-4).floor() as usize;
    let mut out: Vec<f32> = (0..=n).map(|i| lo + i as f32 * step).collect();
    if out.last().is_some_and(|&last| hi - last > 1e-4) {
        out.push(hi);
    }
    out
}
