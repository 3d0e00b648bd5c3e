//! Lattice search driven by (compressed) plane images.
//!
//! A node is admitted when enough planes see charge at its projection, or
//! when bad channels make up for the missing planes. Nodes near the start
//! and goal are admitted unconditionally so that endpoints sitting just off
//! the charge still connect. Nodes whose projection is already tagged by an
//! earlier track cost more to enter: `1 + penalty * k / n` for `k` of `n`
//! planes tagged.
use super::lattice::{chebyshev, Lattice, LatticeCoord};
use super::node::{NodeKind, NodeVisit};
use super::options::AStarOptions;
use super::search::{search, SearchLimits, SearchOutcome};
use crate::error::{Result, TrackerError};
use crate::geometry::{resolve_endpoint, DriftModel, WireGeometry};
use crate::image::{ImageView, PlaneImage};
use crate::types::BoundaryEndPoint;
use log::debug;

pub struct AStarLattice<'g, G: WireGeometry + ?Sized> {
    geometry: &'g G,
    drift: &'g DriftModel,
    options: &'g AStarOptions,
}

impl<'g, G: WireGeometry + ?Sized> AStarLattice<'g, G> {
    pub fn new(geometry: &'g G, drift: &'g DriftModel, options: &'g AStarOptions) -> Self {
        Self {
            geometry,
            drift,
            options,
        }
    }

    /// Node spacing: one row along x, one column of the finest plane in y/z.
    pub fn spacing(&self, images: &[PlaneImage]) -> [f32; 3] {
        let dx = images
            .first()
            .map(|img| img.meta().pixel_height * self.drift.cm_per_tick.abs())
            .unwrap_or(1.0);
        let dyz = images
            .iter()
            .enumerate()
            .map(|(p, img)| self.geometry.pitch(p) * img.meta().pixel_width)
            .fold(f32::INFINITY, f32::min);
        [dx, dyz, dyz]
    }

    /// Search between two endpoints given in the coordinates of `images`.
    ///
    /// `tagged` holds pixels already claimed by accepted tracks, on the same
    /// grid as `images`.
    pub fn find_path(
        &self,
        images: &[PlaneImage],
        badch: &[PlaneImage],
        tagged: Option<&[PlaneImage]>,
        start: &BoundaryEndPoint,
        goal: &BoundaryEndPoint,
    ) -> Result<SearchOutcome> {
        self.check_inputs(images, badch, tagged)?;
        let a = resolve_endpoint(self.geometry, self.drift, images, start)?;
        let b = resolve_endpoint(self.geometry, self.drift, images, goal)?;
        self.find_path_between(images, badch, tagged, a, b)
    }

    /// Search between two detector positions `[x, y, z]`.
    ///
    /// The lattice is anchored on the positions themselves, so endpoints
    /// resolved on a finer grid than `images` keep their exact location.
    pub fn find_path_between(
        &self,
        images: &[PlaneImage],
        badch: &[PlaneImage],
        tagged: Option<&[PlaneImage]>,
        a: [f32; 3],
        b: [f32; 3],
    ) -> Result<SearchOutcome> {
        self.check_inputs(images, badch, tagged)?;
        let lattice = Lattice::spanning(a, b, self.spacing(images), self.options.lattice_padding);
        let (Some(start_c), Some(goal_c)) = (lattice.coord_of(a), lattice.coord_of(b)) else {
            return Err(TrackerError::geometry("start or goal outside its own lattice"));
        };
        debug!(
            "AStarLattice::find_path_between start={:?} goal={:?} widths={:?} spacing={:?}",
            a, b, lattice.widths, lattice.spacing
        );

        let limits = SearchLimits {
            neighborhood: self.options.neighborhood.iter().copied().max().unwrap_or(1),
            max_expansions: self.options.max_expansions,
            max_badch_fraction: self.options.max_badch_fraction,
            restrict_radius: self
                .options
                .restrict_path
                .then_some(self.options.path_restriction_radius),
        };
        let classify = |coord: LatticeCoord, pos: [f32; 3]| {
            self.classify(images, badch, tagged, coord, pos, start_c, goal_c)
        };
        Ok(search(&lattice, start_c, goal_c, &limits, classify))
    }

    fn check_inputs(
        &self,
        images: &[PlaneImage],
        badch: &[PlaneImage],
        tagged: Option<&[PlaneImage]>,
    ) -> Result<()> {
        let nplanes = self.geometry.num_planes();
        if images.len() != nplanes || badch.len() != nplanes {
            return Err(TrackerError::BadInputShape {
                what: "lattice search image planes",
                expected: nplanes,
                found: images.len().min(badch.len()),
            });
        }
        if let Some(t) = tagged.filter(|t| t.len() != nplanes) {
            return Err(TrackerError::BadInputShape {
                what: "tagged image planes",
                expected: nplanes,
                found: t.len(),
            });
        }
        if self.options.threshold.len() < nplanes {
            return Err(TrackerError::configuration(format!(
                "astar threshold needs {nplanes} entries, got {}",
                self.options.threshold.len()
            )));
        }
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn classify(
        &self,
        images: &[PlaneImage],
        badch: &[PlaneImage],
        tagged: Option<&[PlaneImage]>,
        coord: LatticeCoord,
        pos: [f32; 3],
        start: LatticeCoord,
        goal: LatticeCoord,
    ) -> Option<NodeVisit> {
        let nplanes = images.len();
        let row = images[0].meta().row(self.drift.x_to_tick(pos[0]))?;
        let mut cols = Vec::with_capacity(nplanes);
        for (p, img) in images.iter().enumerate() {
            let wire = self.geometry.project(pos, p)?;
            cols.push(img.meta().col(wire as f32)?);
        }

        let mut ncharge = 0;
        let mut nbad = 0;
        for p in 0..nplanes {
            if images[p].pixel(row, cols[p]) > self.options.threshold[p] {
                ncharge += 1;
            } else if badch[p].pixel(row, cols[p]) > 0.0 {
                nbad += 1;
            }
        }
        let min_planes = self.options.min_nplanes_w_hitpixel.min(nplanes);
        let kind = if ncharge >= min_planes {
            NodeKind::Charge
        } else if self.options.accept_badch_nodes && nbad > 0 && ncharge + nbad >= min_planes {
            NodeKind::BadChannel
        } else if chebyshev(coord, start) <= self.options.start_padding as i32
            || chebyshev(coord, goal) <= self.options.end_padding as i32
        {
            NodeKind::Endpoint
        } else {
            return None;
        };

        let ntagged = tagged.map_or(0, |t| {
            (0..nplanes)
                .filter(|&p| t[p].pixel(row, cols[p]) > 0.0)
                .count()
        });
        let scale = 1.0 + self.options.tagged_cost_penalty * ntagged as f32 / nplanes as f32;
        Some(NodeVisit::new(kind).with_cost_scale(scale))
    }
}
