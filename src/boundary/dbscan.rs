//! Density-based clustering of 2D points.
//!
//! Standard DBSCAN: a point is a core point when at least `min_pts` points
//! (itself included) lie within `eps`. Neighbor queries go through a uniform
//! grid of cell size `eps`, so each query touches at most nine cells.
use std::collections::HashMap;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct DbscanOutput {
    /// Member indices per cluster, ascending.
    pub clusters: Vec<Vec<usize>>,
    /// Cluster id per input point, `None` for noise.
    pub labels: Vec<Option<usize>>,
}

#[derive(Clone, Copy, PartialEq)]
enum Label {
    Unvisited,
    Noise,
    Cluster(usize),
}

struct GridIndex<'a> {
    points: &'a [[f32; 2]],
    eps: f32,
    cells: HashMap<(i64, i64), Vec<usize>>,
}

impl<'a> GridIndex<'a> {
    fn new(points: &'a [[f32; 2]], eps: f32) -> Self {
        let mut cells: HashMap<(i64, i64), Vec<usize>> = HashMap::new();
        for (i, p) in points.iter().enumerate() {
            cells.entry(Self::cell(p, eps)).or_default().push(i);
        }
        Self { points, eps, cells }
    }

    fn cell(p: &[f32; 2], eps: f32) -> (i64, i64) {
        ((p[0] / eps).floor() as i64, (p[1] / eps).floor() as i64)
    }

    fn neighbors(&self, i: usize) -> Vec<usize> {
        let p = self.points[i];
        let (cx, cy) = Self::cell(&p, self.eps);
        let eps2 = self.eps * self.eps;
        let mut out = Vec::new();
        for dx in -1..=1 {
            for dy in -1..=1 {
                let Some(members) = self.cells.get(&(cx + dx, cy + dy)) else {
                    continue;
                };
                out.extend(members.iter().copied().filter(|&j| {
                    let q = self.points[j];
                    (q[0] - p[0]).powi(2) + (q[1] - p[1]).powi(2) <= eps2
                }));
            }
        }
        out
    }
}

pub fn scan(points: &[[f32; 2]], min_pts: usize, eps: f32) -> DbscanOutput {
    if points.is_empty() || eps <= 0.0 {
        return DbscanOutput {
            clusters: Vec::new(),
            labels: vec![None; points.len()],
        };
    }

    let index = GridIndex::new(points, eps);
    let mut labels = vec![Label::Unvisited; points.len()];
    let mut clusters: Vec<Vec<usize>> = Vec::new();

    for i in 0..points.len() {
        if labels[i] != Label::Unvisited {
            continue;
        }
        let seeds = index.neighbors(i);
        if seeds.len() < min_pts {
            labels[i] = Label::Noise;
            continue;
        }
        let id = clusters.len();
        clusters.push(vec![i]);
        labels[i] = Label::Cluster(id);

        let mut queue = seeds;
        while let Some(j) = queue.pop() {
            match labels[j] {
                Label::Noise => {
                    // border point
                    labels[j] = Label::Cluster(id);
                    clusters[id].push(j);
                }
                Label::Unvisited => {
                    labels[j] = Label::Cluster(id);
                    clusters[id].push(j);
                    let more = index.neighbors(j);
                    if more.len() >= min_pts {
                        queue.extend(more);
                    }
                }
                Label::Cluster(_) => {}
            }
        }
        clusters[id].sort_unstable();
    }

    let labels = labels
        .into_iter()
        .map(|l| match l {
            Label::Cluster(id) => Some(id),
            _ => None,
        })
        .collect();
    DbscanOutput { clusters, labels }
}
