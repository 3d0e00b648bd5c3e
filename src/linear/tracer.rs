use super::options::LinearTracerOptions;
use super::point::{PointInfo, PointInfoList};
use crate::error::{Result, TrackerError};
use crate::geometry::{resolve_endpoint, DriftModel, WireGeometry};
use crate::image::{ImageView, PlaneImage};
use crate::types::BoundaryEndPoint;
use log::debug;
use nalgebra::Vector3;

/// Samples a straight 3D segment and records, per sample, which planes see
/// charge or a bad channel nearby.
pub struct LinearTracer<'g, G: WireGeometry + ?Sized> {
    geometry: &'g G,
    drift: &'g DriftModel,
    options: &'g LinearTracerOptions,
}

impl<'g, G: WireGeometry + ?Sized> LinearTracer<'g, G> {
    pub fn new(geometry: &'g G, drift: &'g DriftModel, options: &'g LinearTracerOptions) -> Self {
        Self {
            geometry,
            drift,
            options,
        }
    }

    pub fn options(&self) -> &LinearTracerOptions {
        self.options
    }

    /// Walk from `start` to `end` (`[x, y, z]`, cm) in `ceil(L / step)` equal
    /// steps, both ends included.
    ///
    /// Samples that fall outside the images are skipped, as are samples
    /// landing on the same pixels as the previous one.
    pub fn trace(
        &self,
        images: &[PlaneImage],
        badch: &[PlaneImage],
        start: [f32; 3],
        end: [f32; 3],
    ) -> Result<PointInfoList> {
        let nplanes = self.geometry.num_planes();
        if images.len() != nplanes || badch.len() != nplanes {
            return Err(TrackerError::BadInputShape {
                what: "traced image planes",
                expected: nplanes,
                found: images.len().min(badch.len()),
            });
        }
        if self.options.step_size <= 0.0 {
            return Err(TrackerError::configuration("linear tracer step size must be positive"));
        }
        self.check_endpoint(start, "start")?;
        self.check_endpoint(end, "end")?;

        let a = Vector3::from(start);
        let b = Vector3::from(end);
        let length = (b - a).norm();
        let nsteps = (length / self.options.step_size).ceil() as usize;
        let delta = if nsteps > 0 {
            (b - a) / nsteps as f32
        } else {
            Vector3::zeros()
        };

        let mut out = PointInfoList::default();
        let mut skipped = 0usize;
        for i in 0..=nsteps {
            let pos = a + delta * i as f32;
            let xyz = [pos.x, pos.y, pos.z];
            let Some(pt) = self.sample(images, badch, xyz) else {
                skipped += 1;
                continue;
            };
            if out.last().is_some_and(|last| last.same_pixel(pt.row, &pt.cols)) {
                continue;
            }
            out.push(pt);
        }

        debug!(
            "LinearTracer::trace length={:.2}cm steps={} points={} unmapped={} good={:.2} allcharge={:.2}",
            length,
            nsteps,
            out.len(),
            skipped,
            out.fraction_good(),
            out.fraction_has_charge_with_all_planes()
        );
        Ok(out)
    }

    /// Resolve two image-space endpoints through the wire intersection and
    /// trace the segment between them.
    pub fn trace_between(
        &self,
        images: &[PlaneImage],
        badch: &[PlaneImage],
        start: &BoundaryEndPoint,
        end: &BoundaryEndPoint,
    ) -> Result<PointInfoList> {
        let a = self.resolve(images, start)?;
        let b = self.resolve(images, end)?;
        self.trace(images, badch, a, b)
    }

    /// `[x, y, z]` of an endpoint given as one row plus a column per plane.
    pub fn resolve(&self, images: &[PlaneImage], endpoint: &BoundaryEndPoint) -> Result<[f32; 3]> {
        resolve_endpoint(self.geometry, self.drift, images, endpoint)
    }

    fn check_endpoint(&self, pos: [f32; 3], which: &str) -> Result<()> {
        let margin = 0.5
            * (0..self.geometry.num_planes())
                .map(|p| self.geometry.pitch(p))
                .fold(0.0, f32::max);
        if !self.geometry.volume().contains_yz(pos[1], pos[2], margin) {
            return Err(TrackerError::geometry(format!(
                "{which} point {pos:?} lies outside the detector"
            )));
        }
        if let Some(p) = (0..self.geometry.num_planes()).find(|&p| self.geometry.project(pos, p).is_none()) {
            return Err(TrackerError::geometry(format!(
                "{which} point {pos:?} misses every wire of plane {p}"
            )));
        }
        Ok(())
    }

    fn sample(&self, images: &[PlaneImage], badch: &[PlaneImage], xyz: [f32; 3]) -> Option<PointInfo> {
        let tick = self.drift.x_to_tick(xyz[0]);
        let row = images[0].meta().row(tick)?;
        let nplanes = images.len();
        let mut cols = Vec::with_capacity(nplanes);
        for (p, img) in images.iter().enumerate() {
            let wire = self.geometry.project(xyz, p)?;
            cols.push(img.meta().col(wire as f32)?);
        }

        let nb = self.options.neighborhood;
        let threshold = self.options.min_adc_value;
        let plane_has_charge: Vec<bool> = (0..nplanes)
            .map(|p| images[p].any_in_window(row, cols[p], nb, |v| v > threshold))
            .collect();
        let plane_has_badch: Vec<bool> = (0..nplanes)
            .map(|p| badch[p].any_in_window(row, cols[p], nb, |v| v > 0.0))
            .collect();
        let planes_with_charge = plane_has_charge.iter().filter(|&&q| q).count();
        let good = plane_has_charge
            .iter()
            .zip(&plane_has_badch)
            .all(|(&q, &b)| q || b);

        Some(PointInfo {
            xyz,
            tick,
            row,
            cols,
            plane_has_charge,
            plane_has_badch,
            planes_with_charge,
            good,
        })
    }
}
