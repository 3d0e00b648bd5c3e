//! End-to-end ThruMu run: boundary endpoints, then through-going tracks.
//!
//! ```no_run
//! use thrumu_tracker::geometry::PlanarWireGeometry;
//! use thrumu_tracker::image::PlaneImage;
//! use thrumu_tracker::{ThruMuConfig, ThruMuTracker};
//!
//! # fn example(images: Vec<PlaneImage>, badch: Vec<PlaneImage>) -> thrumu_tracker::error::Result<()> {
//! let tracker = ThruMuTracker::new(ThruMuConfig::default(), PlanarWireGeometry::microboone_like())?;
//! let out = tracker.process(&images, &badch)?;
//! println!("{} endpoints, {} tracks", out.spacepoints.len(), out.tracks.len());
//! # Ok(())
//! # }
//! ```
use crate::boundary::{cluster_endpoints, collect_candidates, BoundaryMatchTable, BoundaryMatcher};
use crate::config::ThruMuConfig;
use crate::diagnostics::{elapsed_ms, TimingBreakdown, TrackingReport};
use crate::error::Result;
use crate::geometry::WireGeometry;
use crate::image::{validate_plane_set, PlaneImage};
use crate::tracker::{ComboTable, Track3D, TrackBuilder};
use crate::types::BoundarySpacePoint;
use log::debug;
use serde::Serialize;
use std::time::Instant;


#[derive(Clone, Debug, Default)]
pub struct EndpointSearchOutput {
    pub spacepoints: Vec<BoundarySpacePoint>,
    /// Boundary combinations found before clustering.
    pub candidates: usize,
    /// Detector-space clusters per crossing type.
    pub clusters_per_type: [usize; 4],
    pub timing: TimingBreakdown,
}

#[derive(Clone, Debug)]
pub struct TrackClusterOutput {
    pub tracks: Vec<Track3D>,
    /// Full-resolution 0/255 images of pixels claimed by the tracks.
    pub tagged: Vec<PlaneImage>,
    pub used_endpoints: Vec<bool>,
    pub combos: ComboTable,
    pub report: TrackingReport,
}

#[derive(Clone, Debug)]
pub struct ThruMuOutput {
    pub spacepoints: Vec<BoundarySpacePoint>,
    pub tracks: Vec<Track3D>,
    pub tagged: Vec<PlaneImage>,
    pub used_endpoints: Vec<bool>,
    pub report: TrackingReport,
    pub timing: TimingBreakdown,
}

/// Serializable view of a [`ThruMuOutput`] (images left out).
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunReport<'a> {
    pub endpoints: &'a [BoundarySpacePoint],
    pub used_endpoints: &'a [bool],
    pub tracks: &'a [Track3D],
    pub tracking: &'a TrackingReport,
    pub timing: &'a TimingBreakdown,
}

impl ThruMuOutput {
    pub fn report(&self) -> RunReport<'_> {
        RunReport {
            endpoints: &self.spacepoints,
            used_endpoints: &self.used_endpoints,
            tracks: &self.tracks,
            tracking: &self.report,
            timing: &self.timing,
        }
    }
}

/// Validated configuration plus the per-geometry boundary tables.
pub struct ThruMuTracker<G: WireGeometry> {
    config: ThruMuConfig,
    geometry: G,
    tight: BoundaryMatchTable,
    loose: BoundaryMatchTable,
}

impl<G: WireGeometry> ThruMuTracker<G> {
    pub fn new(config: ThruMuConfig, geometry: G) -> Result<Self> {
        config.validate(geometry.num_planes())?;
        let start = Instant::now();
        let tight = BoundaryMatchTable::build(&geometry, 0.0);
        let loose = BoundaryMatchTable::build(&geometry, config.boundary.loose_tolerance_cm);
        debug!(
            "ThruMuTracker::new match tables built in {:.3}ms",
            elapsed_ms(start)
        );
        Ok(Self {
            config,
            geometry,
            tight,
            loose,
        })
    }

    pub fn config(&self) -> &ThruMuConfig {
        &self.config
    }

    pub fn geometry(&self) -> &G {
        &self.geometry
    }

    /// Find the space points where tracks cross the detector boundary.
    pub fn find_boundary_endpoints(
        &self,
        images: &[PlaneImage],
        badch: &[PlaneImage],
    ) -> Result<EndpointSearchOutput> {
        let total = Instant::now();
        self.check_inputs(images, badch)?;
        let matchers: [&dyn BoundaryMatcher; 2] = [&self.tight, &self.loose];
        let collected = collect_candidates(images, badch, &matchers, &self.geometry, &self.config.boundary)?;
        let clustered = cluster_endpoints(
            &collected.hits,
            images,
            badch,
            &self.geometry,
            &self.config.boundary,
        )?;

        let mut timing = TimingBreakdown::default();
        timing.push("collect_candidates", collected.elapsed_ms);
        timing.push("cluster_endpoints", clustered.elapsed_ms);
        timing.finish(total);
        debug!(
            "ThruMuTracker::find_boundary_endpoints combos={} spacepoints={} elapsed={:.3}ms",
            collected.total_combos,
            clustered.spacepoints.len(),
            timing.total_ms
        );
        Ok(EndpointSearchOutput {
            spacepoints: clustered.spacepoints,
            candidates: collected.total_combos,
            clusters_per_type: clustered.clusters_per_type,
            timing,
        })
    }

    /// Connect pairs of boundary space points into tracks.
    pub fn build_track_clusters(
        &self,
        images: &[PlaneImage],
        badch: &[PlaneImage],
        spacepoints: &[BoundarySpacePoint],
    ) -> Result<TrackClusterOutput> {
        self.check_inputs(images, badch)?;
        let builder = TrackBuilder::new(
            &self.geometry,
            &self.config.drift,
            &self.config.linear,
            &self.config.astar,
            &self.config.tracker,
        );
        let built = builder.build(images, badch, spacepoints)?;
        Ok(TrackClusterOutput {
            tracks: built.tracks,
            tagged: built.tagged,
            used_endpoints: built.used_endpoints,
            combos: built.combos,
            report: built.report,
        })
    }

    /// [`Self::find_boundary_endpoints`] followed by [`Self::build_track_clusters`].
    pub fn process(&self, images: &[PlaneImage], badch: &[PlaneImage]) -> Result<ThruMuOutput> {
        let total = Instant::now();
        let endpoints = self.find_boundary_endpoints(images, badch)?;
        let clusters = self.build_track_clusters(images, badch, &endpoints.spacepoints)?;

        let mut timing = endpoints.timing;
        timing.push("build_track_clusters", clusters.report.timing.total_ms);
        timing.finish(total);
        debug!(
            "ThruMuTracker::process endpoints={} tracks={} elapsed={:.3}ms",
            endpoints.spacepoints.len(),
            clusters.tracks.len(),
            timing.total_ms
        );
        Ok(ThruMuOutput {
            spacepoints: endpoints.spacepoints,
            tracks: clusters.tracks,
            tagged: clusters.tagged,
            used_endpoints: clusters.used_endpoints,
            report: clusters.report,
            timing,
        })
    }

    fn check_inputs(&self, images: &[PlaneImage], badch: &[PlaneImage]) -> Result<()> {
        validate_plane_set(images, badch, self.geometry.num_planes())
    }
}
