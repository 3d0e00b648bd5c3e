//! 3D A* search on a regular lattice.
//!
//! [`search`] is the generic algorithm over a [`Lattice`] with a
//! caller-supplied [`NodeClassifier`]. [`AStarLattice`] wires it to plane
//! images: nodes are projected onto every plane and admitted on charge, bad
//! channels or proximity to the endpoints.
pub mod finder;
pub mod lattice;
pub mod node;
pub mod options;
pub mod search;

#[cfg(test)]
mod tests;

pub use self::finder::AStarLattice;
pub use self::lattice::{Lattice, LatticeCoord};
pub use self::node::{LatticeNode, NodeKind, NodePool, NodeVisit};
pub use self::options::AStarOptions;
pub use self::search::{search, NodeClassifier, PathNode, SearchLimits, SearchOutcome, SearchStatus};
