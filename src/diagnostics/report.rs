use super::timing::TimingBreakdown;
use serde::Serialize;

/// Counters of one orchestrator pass.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PassSummary {
    pub pass: usize,
    /// Pairs of endpoints with different boundary types.
    pub pairs_considered: usize,
    pub skipped_consumed: usize,
    pub drift_rejected: usize,
    pub already_connected: usize,
    /// Pairs the A* gate turned away.
    pub skipped_by_heuristic: usize,
    pub searched_linear: usize,
    pub searched_astar: usize,
    pub accepted_linear: usize,
    pub accepted_astar: usize,
    /// Pairs dropped on a recoverable error.
    pub failed: usize,
    /// Full-resolution pixels tagged by earlier passes when this one started.
    pub tagged_pixels_visible: usize,
    pub elapsed_ms: f64,
}

impl PassSummary {
    pub fn new(pass: usize) -> Self {
        Self {
            pass,
            ..Self::default()
        }
    }

    pub fn accepted(&self) -> usize {
        self.accepted_linear + self.accepted_astar
    }
}

/// Summary of a [`crate::tracker::TrackBuilder`] run.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackingReport {
    pub endpoints: usize,
    pub tracks: usize,
    pub used_endpoints: usize,
    pub passes: Vec<PassSummary>,
    pub timing: TimingBreakdown,
}
