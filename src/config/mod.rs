//! Aggregated run configuration and its JSON loader.
//!
//! Every section falls back to its documented default, so a config file only
//! needs the fields it changes:
//!
//! ```json
//! { "astar": { "max_expansions": 50000 }, "tracker": { "parallel": false } }
//! ```
use crate::astar::AStarOptions;
use crate::boundary::BoundaryOptions;
use crate::error::{Result, TrackerError};
use crate::geometry::DriftModel;
use crate::linear::LinearTracerOptions;
use crate::tracker::TrackerOptions;
use serde::Deserialize;
use std::fs;
use std::path::Path;


#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct ThruMuConfig {
    pub boundary: BoundaryOptions,
    pub linear: LinearTracerOptions,
    pub astar: AStarOptions,
    pub tracker: TrackerOptions,
    pub drift: DriftModel,
}

impl ThruMuConfig {
    /// Reject settings no detector with `nplanes` planes can run with.
    pub fn validate(&self, nplanes: usize) -> Result<()> {
        if nplanes == 0 {
            return Err(TrackerError::configuration("geometry has no wire planes"));
        }
        per_plane("boundary.thresholds", self.boundary.thresholds.len(), nplanes)?;
        per_plane("boundary.neighborhoods", self.boundary.neighborhoods.len(), nplanes)?;
        per_plane("astar.threshold", self.astar.threshold.len(), nplanes)?;
        per_plane("astar.neighborhood", self.astar.neighborhood.len(), nplanes)?;
        per_plane("tracker.tag_thresholds", self.tracker.tag_thresholds.len(), nplanes)?;

        positive("linear.step_size", self.linear.step_size)?;
        positive("drift.cm_per_tick", self.drift.cm_per_tick)?;
        positive("boundary.cluster_radius", self.boundary.cluster_radius)?;
        positive("tracker.ticks_per_full_drift", self.tracker.ticks_per_full_drift)?;
        if !(0.0..1.0).contains(&self.boundary.jitter_scale) {
            return Err(TrackerError::configuration(format!(
                "boundary.jitter_scale must lie in [0, 1), got {}",
                self.boundary.jitter_scale
            )));
        }
        if self.tracker.downsampling_factor == 0 {
            return Err(TrackerError::configuration(
                "tracker.downsampling_factor must be at least 1",
            ));
        }
        if self.astar.min_nplanes_w_hitpixel > nplanes {
            return Err(TrackerError::configuration(format!(
                "astar.min_nplanes_w_hitpixel={} exceeds the {nplanes} planes",
                self.astar.min_nplanes_w_hitpixel
            )));
        }
        fraction("astar.max_badch_fraction", self.astar.max_badch_fraction)?;
        if self.astar.tagged_cost_penalty < 0.0 {
            return Err(TrackerError::configuration(
                "astar.tagged_cost_penalty must not be negative",
            ));
        }

        if self.tracker.passes.is_empty() {
            return Err(TrackerError::configuration("tracker.passes is empty"));
        }
        for (i, pass) in self.tracker.passes.iter().enumerate() {
            if !pass.run_linear && !pass.run_astar {
                return Err(TrackerError::configuration(format!(
                    "tracker.passes[{i}] runs neither algorithm"
                )));
            }
            let checks = [
                ("linear3d_min_goodfraction", pass.linear3d_min_goodfraction),
                (
                    "linear3d_min_majoritychargefraction",
                    pass.linear3d_min_majoritychargefraction,
                ),
                ("astar3d_min_goodfrac", pass.astar3d_min_goodfrac),
                ("astar3d_min_majfrac", pass.astar3d_min_majfrac),
                ("min_end_goodness", pass.min_end_goodness),
                ("end_window_fraction", pass.end_window_fraction),
            ];
            for (name, value) in checks {
                fraction(&format!("tracker.passes[{i}].{name}"), value)?;
            }
        }
        Ok(())
    }
}

fn per_plane(name: &str, len: usize, nplanes: usize) -> Result<()> {
    if len == nplanes {
        Ok(())
    } else {
        Err(TrackerError::configuration(format!(
            "{name} needs one entry per plane ({nplanes}), got {len}"
        )))
    }
}

fn positive(name: &str, value: f32) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(TrackerError::configuration(format!(
            "{name} must be positive, got {value}"
        )))
    }
}

fn fraction(name: &str, value: f32) -> Result<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(TrackerError::configuration(format!(
            "{name} must lie in [0, 1], got {value}"
        )))
    }
}

pub fn load_config(path: &Path) -> Result<ThruMuConfig> {
    let contents = fs::read_to_string(path).map_err(|e| {
        TrackerError::configuration(format!("failed to read config {}: {e}", path.display()))
    })?;
    serde_json::from_str(&contents).map_err(|e| {
        TrackerError::configuration(format!("failed to parse config {}: {e}", path.display()))
    })
}

/// Parse a JSON document into a [`ThruMuConfig`].
pub fn parse_config(json: &str) -> Result<ThruMuConfig> {
    serde_json::from_str(json)
        .map_err(|e| TrackerError::configuration(format!("failed to parse config: {e}")))
}
