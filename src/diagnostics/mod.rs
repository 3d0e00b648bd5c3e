//! Serializable run summaries.
//!
//! Every stage reports its wall time into a [`TimingBreakdown`]; the track
//! builder adds one [`PassSummary`] per pass. The demo dumps the lot as JSON.

pub mod report;
pub mod timing;

pub use report::{PassSummary, TrackingReport};
pub use timing::{elapsed_ms, StageTiming, TimingBreakdown};
