//! Multi-pass connection of boundary endpoints into through-going tracks.
//!
//! Every pass looks at all unordered pairs of endpoints that cross
//! different boundaries. A pair is first tried with the straight-line
//! tracer, which either accepts it outright or leaves a [`ComboInfo`]
//! behind. The lattice search then runs on pairs whose straight trace was
//! promising but not good enough, using compressed images and the tags of
//! earlier passes.
//!
//! Pairs of a pass are evaluated independently (on the rayon pool when
//! [`TrackerOptions::parallel`] is set). Accepted tracks are committed
//! afterwards in pair order: the tracks are tagged into the pass canvas,
//! their endpoints consumed and the canvas merged into the running tags.
//! The result therefore does not depend on the evaluation schedule.
pub mod combo;
pub mod options;
pub mod tagging;
pub mod track;

#[cfg(test)]
mod tests;

pub use self::combo::{AStarGate, ComboInfo, ComboTable, PairKey};
pub use self::options::{PassOptions, TrackerOptions};
pub use self::tagging::TaggedPixels;
pub use self::track::{mark_tracks, Track3D, TrackAlgorithm};

use crate::astar::{AStarLattice, AStarOptions, SearchStatus};
use crate::diagnostics::{elapsed_ms, PassSummary, TimingBreakdown, TrackingReport};
use crate::error::{Result, TrackerError};
use crate::geometry::{resolve_endpoint, DriftModel, WireGeometry};
use crate::image::{validate_plane_set, ImageView, PlaneImage};
use crate::linear::{LinearTracer, LinearTracerOptions};
use crate::types::BoundarySpacePoint;
use log::{debug, warn};
use rayon::prelude::*;
use std::time::Instant;

/// Everything [`TrackBuilder::build`] produces.
#[derive(Clone, Debug)]
pub struct TrackBuildResult {
    pub tracks: Vec<Track3D>,
    /// Full-resolution 0/255 images of pixels claimed by the tracks.
    pub tagged: Vec<PlaneImage>,
    /// One flag per endpoint: starts or ends an accepted track.
    pub used_endpoints: Vec<bool>,
    pub combos: ComboTable,
    pub report: TrackingReport,
}

pub struct TrackBuilder<'a, G: WireGeometry + ?Sized> {
    geometry: &'a G,
    drift: &'a DriftModel,
    linear: &'a LinearTracerOptions,
    astar: &'a AStarOptions,
    options: &'a TrackerOptions,
}

/// Read-only inputs shared by all pairs of a pass.
struct PassInputs<'i> {
    images: &'i [PlaneImage],
    badch: &'i [PlaneImage],
    images_c: &'i [PlaneImage],
    badch_c: &'i [PlaneImage],
    tagged_c: Vec<PlaneImage>,
    spacepoints: &'i [BoundarySpacePoint],
}

enum PairOutcome {
    Accepted(Box<Track3D>),
    /// Straight trace below threshold and no lattice search configured.
    Rejected,
    Gated(AStarGate),
    NotFound(SearchStatus),
    Failed(TrackerError),
}

struct PairResult {
    key: PairKey,
    combo: Option<ComboInfo>,
    ran_linear: bool,
    ran_astar: bool,
    outcome: PairOutcome,
}

impl<'a, G: WireGeometry + ?Sized> TrackBuilder<'a, G> {
    pub fn new(
        geometry: &'a G,
        drift: &'a DriftModel,
        linear: &'a LinearTracerOptions,
        astar: &'a AStarOptions,
        options: &'a TrackerOptions,
    ) -> Self {
        Self {
            geometry,
            drift,
            linear,
            astar,
            options,
        }
    }

    /// Run every configured pass over the endpoint pairs.
    pub fn build(
        &self,
        images: &[PlaneImage],
        badch: &[PlaneImage],
        spacepoints: &[BoundarySpacePoint],
    ) -> Result<TrackBuildResult> {
        let total = Instant::now();
        let nplanes = self.geometry.num_planes();
        if nplanes == 0 {
            return Err(TrackerError::configuration("geometry has no wire planes"));
        }
        validate_plane_set(images, badch, nplanes)?;
        if self.options.tag_thresholds.len() < nplanes {
            return Err(TrackerError::configuration(format!(
                "tag_thresholds needs {nplanes} entries, got {}",
                self.options.tag_thresholds.len()
            )));
        }
        if let Some(sp) = spacepoints.iter().find(|sp| sp.cols().len() != nplanes) {
            return Err(TrackerError::BadInputShape {
                what: "space point columns",
                expected: nplanes,
                found: sp.cols().len(),
            });
        }
        debug!(
            "TrackBuilder::build endpoints={} passes={} parallel={}",
            spacepoints.len(),
            self.options.passes.len(),
            self.options.parallel
        );

        let mut timing = TimingBreakdown::default();
        let compress_start = Instant::now();
        let factor = self.options.downsampling_factor.max(1);
        let mode = self.options.compression;
        let images_c: Vec<PlaneImage> = images.iter().map(|img| img.compress(factor, mode)).collect();
        let badch_c: Vec<PlaneImage> = badch.iter().map(|img| img.compress(factor, mode)).collect();
        timing.lap("compress", compress_start);

        let mut tagged = TaggedPixels::new(images);
        let mut combos = ComboTable::default();
        let mut consumed = vec![false; spacepoints.len()];
        let mut tracks: Vec<Track3D> = Vec::new();
        let mut summaries = Vec::with_capacity(self.options.passes.len());

        for (pass_idx, pass) in self.options.passes.iter().enumerate() {
            let pass_start = Instant::now();
            let mut summary = PassSummary::new(pass_idx);
            summary.tagged_pixels_visible = tagged.count();
            let inputs = PassInputs {
                images,
                badch,
                images_c: &images_c,
                badch_c: &badch_c,
                tagged_c: tagged.compressed(factor, mode),
                spacepoints,
            };

            let candidates = self.candidate_pairs(spacepoints, images, &consumed, &combos, &mut summary);
            let results: Vec<PairResult> = if self.options.parallel {
                candidates
                    .par_iter()
                    .map(|&key| self.evaluate_pair(&inputs, pass, pass_idx, key, &combos))
                    .collect::<Result<Vec<_>>>()?
            } else {
                candidates
                    .iter()
                    .map(|&key| self.evaluate_pair(&inputs, pass, pass_idx, key, &combos))
                    .collect::<Result<Vec<_>>>()?
            };

            let mut canvas = tagged.pass_canvas();
            let mut newly_used = Vec::new();
            for res in results {
                summary.searched_linear += usize::from(res.ran_linear);
                summary.searched_astar += usize::from(res.ran_astar);
                if let Some(info) = res.combo {
                    combos.record(res.key, info);
                }
                match res.outcome {
                    PairOutcome::Accepted(track) => {
                        match track.algorithm {
                            TrackAlgorithm::Linear => summary.accepted_linear += 1,
                            TrackAlgorithm::AStar => summary.accepted_astar += 1,
                        }
                        combos.mark_connected(res.key, pass_idx);
                        track.mark_image(
                            images,
                            badch,
                            &self.options.tag_thresholds,
                            self.options.tag_neighborhood,
                            &mut canvas,
                        );
                        newly_used.push(res.key);
                        tracks.push(*track);
                    }
                    PairOutcome::Gated(AStarGate::AlreadyConnected) => summary.already_connected += 1,
                    PairOutcome::Gated(gate) => {
                        debug!("pair ({}, {}) not searched: {:?}", res.key.first, res.key.second, gate);
                        summary.skipped_by_heuristic += 1;
                    }
                    PairOutcome::NotFound(status) => {
                        debug!("pair ({}, {}) lattice search: {:?}", res.key.first, res.key.second, status);
                    }
                    PairOutcome::Rejected => {}
                    PairOutcome::Failed(err) => {
                        warn!("pair ({}, {}) skipped: {}", res.key.first, res.key.second, err);
                        summary.failed += 1;
                    }
                }
            }
            for key in newly_used {
                consumed[key.first] = true;
                consumed[key.second] = true;
            }
            tagged.merge_pass(&canvas)?;

            summary.elapsed_ms = elapsed_ms(pass_start);
            timing.push(format!("pass{pass_idx}"), summary.elapsed_ms);
            debug!(
                "TrackBuilder pass {} pairs={} searched linear={} astar={} accepted linear={} astar={} failed={} elapsed={:.3}ms",
                pass_idx,
                summary.pairs_considered,
                summary.searched_linear,
                summary.searched_astar,
                summary.accepted_linear,
                summary.accepted_astar,
                summary.failed,
                summary.elapsed_ms
            );
            summaries.push(summary);
        }

        let mut used_endpoints = vec![false; spacepoints.len()];
        for track in &tracks {
            used_endpoints[track.start_index] = true;
            used_endpoints[track.end_index] = true;
        }
        timing.finish(total);
        let report = TrackingReport {
            endpoints: spacepoints.len(),
            tracks: tracks.len(),
            used_endpoints: used_endpoints.iter().filter(|&&u| u).count(),
            passes: summaries,
            timing,
        };
        debug!(
            "TrackBuilder::build tracks={} used_endpoints={} elapsed={:.3}ms",
            report.tracks, report.used_endpoints, report.timing.total_ms
        );
        Ok(TrackBuildResult {
            tracks,
            tagged: tagged.into_images(),
            used_endpoints,
            combos,
            report,
        })
    }

    /// Pairs worth evaluating this pass, in `(i, j)` order.
    fn candidate_pairs(
        &self,
        spacepoints: &[BoundarySpacePoint],
        images: &[PlaneImage],
        consumed: &[bool],
        combos: &ComboTable,
        summary: &mut PassSummary,
    ) -> Vec<PairKey> {
        let meta = images[0].meta();
        let mut out = Vec::new();
        for (i, a) in spacepoints.iter().enumerate() {
            for (j, b) in spacepoints.iter().enumerate().skip(i + 1) {
                if a.boundary() == b.boundary() {
                    continue;
                }
                summary.pairs_considered += 1;
                let key = PairKey::new(i, j);
                if self.options.skip_consumed_endpoints && (consumed[i] || consumed[j]) {
                    summary.skipped_consumed += 1;
                    continue;
                }
                if (a.tick(meta) - b.tick(meta)).abs() > self.options.ticks_per_full_drift {
                    summary.drift_rejected += 1;
                    continue;
                }
                if combos.is_connected(key) {
                    summary.already_connected += 1;
                    continue;
                }
                out.push(key);
            }
        }
        out
    }

    /// Straight trace, then (if configured and gated open) the lattice
    /// search. Recoverable failures end up in the outcome; only
    /// configuration and shape errors are returned.
    fn evaluate_pair(
        &self,
        inputs: &PassInputs<'_>,
        pass: &PassOptions,
        pass_idx: usize,
        key: PairKey,
        combos: &ComboTable,
    ) -> Result<PairResult> {
        let a = &inputs.spacepoints[key.first];
        let b = &inputs.spacepoints[key.second];
        let mut res = PairResult {
            key,
            combo: None,
            ran_linear: false,
            ran_astar: false,
            outcome: PairOutcome::Rejected,
        };

        if pass.run_linear {
            res.ran_linear = true;
            let tracer = LinearTracer::new(self.geometry, self.drift, self.linear);
            let trace = match tracer.trace_between(inputs.images, inputs.badch, &a.endpoint, &b.endpoint) {
                Ok(trace) => trace,
                Err(err) if err.is_recoverable() => {
                    res.outcome = PairOutcome::Failed(err);
                    return Ok(res);
                }
                Err(err) => return Err(err),
            };
            let mut info = ComboInfo::from_trace(&trace, pass.end_window_fraction, pass_idx);
            if trace.len() >= pass.linear3d_min_tracksize
                && info.frac_good >= pass.linear3d_min_goodfraction
                && info.frac_majcharge >= pass.linear3d_min_majoritychargefraction
            {
                info.track_made = true;
                let track = Track3D::from_linear(key, a, b, inputs.images[0].meta(), &trace, pass_idx);
                res.combo = Some(info);
                res.outcome = PairOutcome::Accepted(Box::new(track));
                return Ok(res);
            }
            res.combo = Some(info);
        }

        if !pass.run_astar {
            return Ok(res);
        }
        let gate = AStarGate::evaluate(res.combo.as_ref().or_else(|| combos.get(key)), pass);
        if gate != AStarGate::Run {
            res.outcome = PairOutcome::Gated(gate);
            return Ok(res);
        }

        res.ran_astar = true;
        let finder = AStarLattice::new(self.geometry, self.drift, self.astar);
        // endpoints resolve on the full-resolution wires; rounding them onto
        // compressed columns can push wall crossings out of the volume
        let resolve = |sp: &BoundarySpacePoint| {
            resolve_endpoint(self.geometry, self.drift, inputs.images, &sp.endpoint)
        };
        let found = resolve(a).and_then(|start| {
            let goal = resolve(b)?;
            finder.find_path_between(
                inputs.images_c,
                inputs.badch_c,
                Some(inputs.tagged_c.as_slice()),
                start,
                goal,
            )
        });
        res.outcome = match found {
            Ok(outcome) if outcome.goal_reached() => match Track3D::from_lattice_path(
                key,
                a,
                b,
                inputs.images,
                &outcome.path,
                self.geometry,
                self.drift,
                pass_idx,
            ) {
                Ok(track) => PairOutcome::Accepted(Box::new(track)),
                Err(err) if err.is_recoverable() => PairOutcome::Failed(err),
                Err(err) => return Err(err),
            },
            Ok(outcome) => PairOutcome::NotFound(outcome.status),
            Err(err) if err.is_recoverable() => PairOutcome::Failed(err),
            Err(err) => return Err(err),
        };
        Ok(res)
    }
}
