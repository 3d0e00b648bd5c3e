#![doc = include_str!("../README.md")]

// Public modules (stable-ish surface)
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod geometry;
pub mod image;
pub mod pipeline;
pub mod types;

// Stage-level building blocks, used by the pipeline and by tools that run
// a single stage on their own inputs.
pub mod astar;
pub mod boundary;
pub mod linear;
pub mod tracker;

#[cfg(test)]
pub(crate) mod test_support;

// --- High-level re-exports -------------------------------------------------

pub use crate::config::{load_config, ThruMuConfig};
pub use crate::error::{Result, TrackerError};
pub use crate::pipeline::{EndpointSearchOutput, ThruMuOutput, ThruMuTracker, TrackClusterOutput};
pub use crate::tracker::{Track3D, TrackAlgorithm};
pub use crate::types::{BoundaryEndPoint, BoundarySpacePoint, BoundaryType};

// High-level diagnostics returned by the pipeline.
pub use crate::diagnostics::{PassSummary, TrackingReport};

// --- Prelude ---------------------------------------------------------------

/// Small prelude for quick experiments.
///
/// ```no_run
/// use thrumu_tracker::prelude::*;
///
/// # fn main() -> thrumu_tracker::Result<()> {
/// let geometry = PlanarWireGeometry::microboone_like();
/// let images: Vec<PlaneImage> = (0..geometry.num_planes())
///     .map(|p| PlaneImage::new(ImageMeta::new(p, 1008, geometry.num_wires(p), 2400.0)))
///     .collect();
/// let badch = images.iter().map(PlaneImage::blank_like).collect::<Vec<_>>();
///
/// let tracker = ThruMuTracker::new(ThruMuConfig::default(), geometry)?;
/// let out = tracker.process(&images, &badch)?;
/// println!("endpoints={} tracks={}", out.spacepoints.len(), out.tracks.len());
/// # Ok(())
/// # }
/// ```
pub mod prelude {
    pub use crate::geometry::{DriftModel, PlanarWireGeometry, WireGeometry};
    pub use crate::image::{ImageMeta, ImageView, PlaneImage};
    pub use crate::{BoundarySpacePoint, BoundaryType, ThruMuConfig, ThruMuTracker, Track3D};
}
