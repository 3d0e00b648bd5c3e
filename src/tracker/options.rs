use crate::image::CompressionMode;
use serde::Deserialize;

/// Algorithms and acceptance thresholds of one orchestrator pass.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct PassOptions {
    pub run_linear: bool,
    pub run_astar: bool,
    /// Fewest samples a straight trace needs to be accepted.
    pub linear3d_min_tracksize: usize,
    pub linear3d_min_goodfraction: f32,
    pub linear3d_min_majoritychargefraction: f32,
    /// A* only runs on pairs whose straight trace reached these fractions.
    pub astar3d_min_goodfrac: f32,
    pub astar3d_min_majfrac: f32,
    /// A* only runs when both trace ends reach this charged fraction.
    pub min_end_goodness: f32,
    /// Share of the trace, at each end, used for the end goodness.
    pub end_window_fraction: f32,
}

impl Default for PassOptions {
    fn default() -> Self {
        Self {
            run_linear: true,
            run_astar: true,
            linear3d_min_tracksize: 15,
            linear3d_min_goodfraction: 0.9,
            linear3d_min_majoritychargefraction: 0.8,
            astar3d_min_goodfrac: 0.2,
            astar3d_min_majfrac: 0.2,
            min_end_goodness: 0.10,
            end_window_fraction: 0.25,
        }
    }
}

impl PassOptions {
    pub fn linear_only() -> Self {
        Self {
            run_astar: false,
            ..Self::default()
        }
    }

    pub fn astar_only() -> Self {
        Self {
            run_linear: false,
            ..Self::default()
        }
    }
}

/// Pair selection, tagging and scheduling of the multi-pass search.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct TrackerOptions {
    /// Run in order; the default is a straight-line pass then an A* pass.
    pub passes: Vec<PassOptions>,
    /// Pairs further apart in time are never connected.
    pub ticks_per_full_drift: f32,
    /// Per-plane charge threshold for tagging track pixels.
    pub tag_thresholds: Vec<f32>,
    /// Half-size (pixels) of the window tagged around each track pixel.
    pub tag_neighborhood: usize,
    /// Block size of the images handed to the lattice search.
    pub downsampling_factor: usize,
    pub compression: CompressionMode,
    /// Evaluate the pairs of a pass on the rayon pool.
    pub parallel: bool,
    /// Leave pairs touching an endpoint consumed by an earlier pass.
    pub skip_consumed_endpoints: bool,
}

impl Default for TrackerOptions {
    fn default() -> Self {
        Self {
            passes: vec![PassOptions::linear_only(), PassOptions::astar_only()],
            ticks_per_full_drift: 4800.0,
            tag_thresholds: vec![10.0, 10.0, 10.0],
            tag_neighborhood: 5,
            downsampling_factor: 4,
            compression: CompressionMode::Max,
            parallel: true,
            skip_consumed_endpoints: true,
        }
    }
}
