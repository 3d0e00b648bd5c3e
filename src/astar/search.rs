//! Best-first search over a [`Lattice`].
//!
//! The open set is a binary heap keyed on `fscore` with lazy deletion:
//! improving a node pushes a fresh entry and stale ones are skipped on pop.
//! Closed nodes are never reopened. The heuristic is the straight-line
//! distance to the goal, which never overestimates since every edge costs
//! at least its length.
use super::lattice::{Lattice, LatticeCoord};
use super::node::{Lookup, NodeKind, NodePool, NodeVisit};
use log::debug;
use nalgebra::Vector3;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::time::Instant;

/// Decides whether a lattice node may be part of a path.
pub trait NodeClassifier {
    fn classify(&mut self, coord: LatticeCoord, position: [f32; 3]) -> Option<NodeVisit>;
}

impl<F> NodeClassifier for F
where
    F: FnMut(LatticeCoord, [f32; 3]) -> Option<NodeVisit>,
{
    fn classify(&mut self, coord: LatticeCoord, position: [f32; 3]) -> Option<NodeVisit> {
        self(coord, position)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SearchLimits {
    /// Neighbor cube radius in lattice steps.
    pub neighborhood: usize,
    pub max_expansions: usize,
    pub max_badch_fraction: f32,
    /// Prune nodes farther than this (cm) from the start→goal line.
    pub restrict_radius: Option<f32>,
}

impl Default for SearchLimits {
    fn default() -> Self {
        Self {
            neighborhood: 1,
            max_expansions: 200_000,
            max_badch_fraction: 0.5,
            restrict_radius: None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SearchStatus {
    GoalReached,
    /// Open set emptied before the goal was reached.
    Exhausted,
    ExpansionLimit,
    /// Goal reached, but mostly through bad channels.
    MostlyBadChannel,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PathNode {
    pub coord: LatticeCoord,
    pub position: [f32; 3],
    pub kind: NodeKind,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchOutcome {
    pub status: SearchStatus,
    /// Start to goal. Empty unless the goal was reached.
    pub path: Vec<PathNode>,
    pub expansions: usize,
    pub badch_fraction: f32,
    pub path_cost: f32,
    pub elapsed_ms: f64,
}

impl SearchOutcome {
    pub fn goal_reached(&self) -> bool {
        self.status == SearchStatus::GoalReached
    }

    fn failed(status: SearchStatus, expansions: usize, start: Instant) -> Self {
        Self {
            status,
            path: Vec::new(),
            expansions,
            badch_fraction: 0.0,
            path_cost: 0.0,
            elapsed_ms: start.elapsed().as_secs_f64() * 1000.0,
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct OpenEntry {
    fscore: f32,
    seq: u64,
    id: usize,
}

impl PartialEq for OpenEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for OpenEntry {}

impl PartialOrd for OpenEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OpenEntry {
    // reversed: the heap pops the lowest fscore, oldest first on ties
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .fscore
            .partial_cmp(&self.fscore)
            .unwrap_or(Ordering::Equal)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Find the cheapest path from `start` to `goal`.
///
/// The start and goal nodes are always admitted (as [`NodeKind::Endpoint`]
/// when the classifier would reject them); every other node goes through
/// `classifier` once.
pub fn search<C: NodeClassifier>(
    lattice: &Lattice,
    start: LatticeCoord,
    goal: LatticeCoord,
    limits: &SearchLimits,
    mut classifier: C,
) -> SearchOutcome {
    let timer = Instant::now();
    if !lattice.contains(start) || !lattice.contains(goal) {
        return SearchOutcome::failed(SearchStatus::Exhausted, 0, timer);
    }

    let goal_pos = Vector3::from(lattice.position(goal));
    let line = LineRestriction::new(lattice.position(start), lattice.position(goal), limits.restrict_radius);
    let heuristic = |c: LatticeCoord| (Vector3::from(lattice.position(c)) - goal_pos).norm();

    let mut pool = NodePool::default();
    let admit = |pool: &mut NodePool, classifier: &mut C, c: LatticeCoord| {
        let visit = classifier
            .classify(c, lattice.position(c))
            .unwrap_or_else(|| NodeVisit::new(NodeKind::Endpoint));
        pool.insert(c, visit)
    };
    let start_id = admit(&mut pool, &mut classifier, start);
    if goal != start {
        admit(&mut pool, &mut classifier, goal);
    }

    let mut open = BinaryHeap::new();
    let mut seq = 0u64;
    {
        let node = pool.get_mut(start_id);
        node.gscore = 0.0;
        node.fscore = heuristic(start);
    }
    open.push(OpenEntry {
        fscore: heuristic(start),
        seq,
        id: start_id,
    });

    let radius = limits.neighborhood.max(1) as i32;
    let mut expansions = 0usize;

    while let Some(entry) = open.pop() {
        let (coord, gscore, closed, fscore) = {
            let n = pool.get(entry.id);
            (n.coord, n.gscore, n.closed, n.fscore)
        };
        if closed || entry.fscore > fscore {
            continue;
        }
        if coord == goal {
            return finish(lattice, &pool, entry.id, expansions, limits, timer);
        }
        if expansions >= limits.max_expansions {
            debug!(
                "astar::search expansion limit {} reached, open={} nodes={}",
                limits.max_expansions,
                open.len(),
                pool.len()
            );
            return SearchOutcome::failed(SearchStatus::ExpansionLimit, expansions, timer);
        }
        pool.get_mut(entry.id).closed = true;
        expansions += 1;

        for dx in -radius..=radius {
            for dy in -radius..=radius {
                for dz in -radius..=radius {
                    if dx == 0 && dy == 0 && dz == 0 {
                        continue;
                    }
                    let next = [coord[0] + dx, coord[1] + dy, coord[2] + dz];
                    if !lattice.contains(next) {
                        continue;
                    }
                    let id = match pool.lookup(next) {
                        Lookup::Rejected => continue,
                        Lookup::Node(id) => {
                            if pool.get(id).closed {
                                continue;
                            }
                            id
                        }
                        Lookup::Unseen => {
                            let pos = lattice.position(next);
                            if !line.admits(pos) {
                                pool.reject(next);
                                continue;
                            }
                            match classifier.classify(next, pos) {
                                Some(visit) => pool.insert(next, visit),
                                None => {
                                    pool.reject(next);
                                    continue;
                                }
                            }
                        }
                    };
                    let node = pool.get_mut(id);
                    let tentative = gscore + lattice.distance(coord, next) * node.cost_scale;
                    if tentative < node.gscore {
                        node.gscore = tentative;
                        node.fscore = tentative + heuristic(next);
                        node.parent = Some(entry.id);
                        seq += 1;
                        open.push(OpenEntry {
                            fscore: node.fscore,
                            seq,
                            id,
                        });
                    }
                }
            }
        }
    }

    debug!(
        "astar::search exhausted after {} expansions, nodes={}",
        expansions,
        pool.len()
    );
    SearchOutcome::failed(SearchStatus::Exhausted, expansions, timer)
}

fn finish(
    lattice: &Lattice,
    pool: &NodePool,
    goal_id: usize,
    expansions: usize,
    limits: &SearchLimits,
    timer: Instant,
) -> SearchOutcome {
    let path: Vec<PathNode> = pool
        .trace_back(goal_id)
        .into_iter()
        .map(|id| {
            let n = pool.get(id);
            PathNode {
                coord: n.coord,
                position: lattice.position(n.coord),
                kind: n.kind,
            }
        })
        .collect();
    let nbad = path.iter().filter(|n| n.kind == NodeKind::BadChannel).count();
    let badch_fraction = nbad as f32 / path.len() as f32;
    let status = if badch_fraction > limits.max_badch_fraction {
        SearchStatus::MostlyBadChannel
    } else {
        SearchStatus::GoalReached
    };
    let out = SearchOutcome {
        status,
        path,
        expansions,
        badch_fraction,
        path_cost: pool.get(goal_id).gscore,
        elapsed_ms: timer.elapsed().as_secs_f64() * 1000.0,
    };
    debug!(
        "astar::search {:?} nodes={} expansions={} badch={:.2} cost={:.2} elapsed={:.3}ms",
        out.status,
        out.path.len(),
        out.expansions,
        out.badch_fraction,
        out.path_cost,
        out.elapsed_ms
    );
    out
}

struct LineRestriction {
    origin: Vector3<f32>,
    dir: Option<Vector3<f32>>,
    radius: Option<f32>,
}

impl LineRestriction {
    fn new(a: [f32; 3], b: [f32; 3], radius: Option<f32>) -> Self {
        let origin = Vector3::from(a);
        let d = Vector3::from(b) - origin;
        let norm = d.norm();
        Self {
            origin,
            dir: (norm > 0.0).then(|| d / norm),
            radius,
        }
    }

    fn admits(&self, pos: [f32; 3]) -> bool {
        let Some(radius) = self.radius else {
            return true;
        };
        let v = Vector3::from(pos) - self.origin;
        let dist = match self.dir {
            Some(dir) => v.cross(&dir).norm(),
            None => v.norm(),
        };
        dist <= radius
    }
}
