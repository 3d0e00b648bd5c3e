//! Boundary-crossing endpoint search.
//!
//! Two stages:
//! - [`collect_candidates`] scans each image row for per-plane column
//!   combinations matching a crossing of the top, bottom, upstream or
//!   downstream face ([`BoundaryMatcher`]);
//! - [`cluster_endpoints`] clusters those candidates with [`dbscan::scan`]
//!   and resolves each cluster to a single [`crate::types::BoundarySpacePoint`].
pub mod collector;
pub mod dbscan;
pub mod endpoint;
pub mod matcher;
pub mod options;


pub use self::collector::{collect_candidates, BoundaryHits, CollectResult};
pub use self::endpoint::{cluster_endpoints, ClusterResult};
pub use self::matcher::{BoundaryCombo, BoundaryMatchTable, BoundaryMatcher};
pub use self::options::BoundaryOptions;
