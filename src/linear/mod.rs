//! Straight-line 3D charge tracer.
//!
//! [`LinearTracer::trace`] steps along the segment between two 3D points,
//! projects each sample onto every plane and checks the images around it.
//! The resulting [`PointInfoList`] carries the quality fractions the
//! orchestrator uses to accept a pair without running the lattice search.
pub mod options;
pub mod point;
pub mod tracer;


pub use self::options::LinearTracerOptions;
pub use self::point::{PointInfo, PointInfoList};
pub use self::tracer::LinearTracer;
