//! Node arena for a single search.
//!
//! Nodes live in a `Vec` and refer to their parent by index. A coordinate
//! map remembers, for every node ever classified, either its arena id or
//! that it was rejected, so the classifier runs at most once per node.
use super::lattice::LatticeCoord;
use serde::Serialize;
use std::collections::HashMap;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum NodeKind {
    /// Enough planes see charge.
    Charge,
    /// Admitted only because bad channels cover the missing planes.
    BadChannel,
    /// Admitted for being close to the start or goal.
    Endpoint,
}

/// Classifier verdict for an admitted node.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NodeVisit {
    pub kind: NodeKind,
    /// Multiplies the cost of every edge entering the node, `>= 1`.
    pub cost_scale: f32,
}

impl NodeVisit {
    pub fn new(kind: NodeKind) -> Self {
        Self { kind, cost_scale: 1.0 }
    }

    pub fn with_cost_scale(mut self, scale: f32) -> Self {
        self.cost_scale = scale.max(1.0);
        self
    }
}

#[derive(Clone, Debug)]
pub struct LatticeNode {
    pub coord: LatticeCoord,
    pub kind: NodeKind,
    pub cost_scale: f32,
    pub gscore: f32,
    pub fscore: f32,
    pub parent: Option<usize>,
    pub closed: bool,
}

#[derive(Clone, Copy, Debug)]
enum Slot {
    Rejected,
    Node(usize),
}

/// What the pool knows about a coordinate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Lookup {
    Unseen,
    Rejected,
    Node(usize),
}

#[derive(Debug, Default)]
pub struct NodePool {
    nodes: Vec<LatticeNode>,
    index: HashMap<LatticeCoord, Slot>,
}

impl NodePool {
    pub fn lookup(&self, coord: LatticeCoord) -> Lookup {
        match self.index.get(&coord) {
            None => Lookup::Unseen,
            Some(Slot::Rejected) => Lookup::Rejected,
            Some(Slot::Node(id)) => Lookup::Node(*id),
        }
    }

    pub fn reject(&mut self, coord: LatticeCoord) {
        self.index.insert(coord, Slot::Rejected);
    }

    /// Add an unreached node and return its id.
    pub fn insert(&mut self, coord: LatticeCoord, visit: NodeVisit) -> usize {
        let id = self.nodes.len();
        self.nodes.push(LatticeNode {
            coord,
            kind: visit.kind,
            cost_scale: visit.cost_scale,
            gscore: f32::INFINITY,
            fscore: f32::INFINITY,
            parent: None,
            closed: false,
        });
        self.index.insert(coord, Slot::Node(id));
        id
    }

    pub fn get(&self, id: usize) -> &LatticeNode {
        &self.nodes[id]
    }

    pub fn get_mut(&mut self, id: usize) -> &mut LatticeNode {
        &mut self.nodes[id]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Ids from the root to `id`, following parents.
    pub fn trace_back(&self, id: usize) -> Vec<usize> {
        let mut path = vec![id];
        let mut cur = id;
        while let Some(parent) = self.nodes[cur].parent {
            path.push(parent);
            cur = parent;
        }
        path.reverse();
        path
    }
}
