use super::*;
use crate::image::{ImageView, ImageViewMut, PlaneImage};
use crate::test_support::{blank_planes, lerp, mark_dead_columns, polyline_event, spacepoint_at, toy_drift, toy_geometry};
use crate::types::{BoundaryEndPoint, BoundaryType};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn unit_lattice(widths: [i32; 3]) -> Lattice {
    Lattice {
        origin: [0.0; 3],
        spacing: [1.0; 3],
        widths,
    }
}

fn limits() -> SearchLimits {
    SearchLimits {
        neighborhood: 1,
        max_expansions: 10_000,
        max_badch_fraction: 0.5,
        restrict_radius: None,
    }
}

/// Exhaustive single-source shortest path over every admitted node.
fn dijkstra(lattice: &Lattice, start: LatticeCoord, goal: LatticeCoord, scale: &dyn Fn(LatticeCoord) -> Option<f32>) -> Option<f32> {
    let mut nodes = Vec::new();
    for x in 0..lattice.widths[0] {
        for y in 0..lattice.widths[1] {
            for z in 0..lattice.widths[2] {
                nodes.push([x, y, z]);
            }
        }
    }
    let idx = |c: LatticeCoord| nodes.iter().position(|&n| n == c);
    let mut dist = vec![f32::INFINITY; nodes.len()];
    let mut done = vec![false; nodes.len()];
    dist[idx(start)?] = 0.0;
    loop {
        let cur = (0..nodes.len())
            .filter(|&i| !done[i] && dist[i].is_finite())
            .min_by(|&a, &b| dist[a].partial_cmp(&dist[b]).unwrap())?;
        if nodes[cur] == goal {
            return Some(dist[cur]);
        }
        done[cur] = true;
        for (j, &n) in nodes.iter().enumerate() {
            let c = nodes[cur];
            let step = (0..3).map(|i| (n[i] - c[i]).abs()).max().unwrap();
            if step != 1 || done[j] {
                continue;
            }
            let Some(s) = scale(n) else {
                continue;
            };
            let d = dist[cur] + lattice.distance(c, n) * s;
            if d < dist[j] {
                dist[j] = d;
            }
        }
    }
}

#[test]
fn detour_around_a_wall_has_the_hand_computed_cost() {
    let lattice = unit_lattice([5, 5, 3]);
    let blocked = |c: LatticeCoord| c[0] == 2 && c[1] <= 1;
    let out = search(&lattice, [0, 0, 1], [4, 0, 1], &limits(), |c: LatticeCoord, _: [f32; 3]| {
        (!blocked(c)).then(|| NodeVisit::new(NodeKind::Charge))
    });
    assert!(out.goal_reached());
    assert!((out.path_cost - 4.0 * 2f32.sqrt()).abs() < 1e-4, "cost {}", out.path_cost);
    assert_eq!(out.path.first().map(|n| n.coord), Some([0, 0, 1]));
    assert_eq!(out.path.last().map(|n| n.coord), Some([4, 0, 1]));
    assert!(out.path.iter().any(|n| n.coord[0] == 2 && n.coord[1] == 2));
    assert!(out.path.iter().all(|n| !blocked(n.coord)));
}

#[test]
fn matches_exhaustive_search_on_random_lattices() {
    let lattice = unit_lattice([5, 5, 3]);
    let (start, goal) = ([0, 0, 0], [4, 4, 2]);
    for seed in 0..20u64 {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut cells = std::collections::HashMap::new();
        for x in 0..5 {
            for y in 0..5 {
                for z in 0..3 {
                    let c = [x, y, z];
                    let open = c == start || c == goal || rng.random::<f32>() > 0.3;
                    let scale = if c == start || c == goal { 1.0 } else { 1.0 + rng.random::<f32>() };
                    cells.insert(c, open.then_some(scale));
                }
            }
        }
        let scale = |c: LatticeCoord| cells.get(&c).copied().flatten();
        let out = search(&lattice, start, goal, &limits(), |c: LatticeCoord, _: [f32; 3]| {
            scale(c).map(|s| NodeVisit::new(NodeKind::Charge).with_cost_scale(s))
        });
        match dijkstra(&lattice, start, goal, &scale) {
            Some(best) => {
                assert!(out.goal_reached(), "seed {seed}: {:?}", out.status);
                assert!((out.path_cost - best).abs() < 1e-3, "seed {seed}: {} vs {}", out.path_cost, best);
            }
            None => assert_eq!(out.status, SearchStatus::Exhausted, "seed {seed}"),
        }
    }
}

#[test]
fn path_through_mostly_bad_channels_is_rejected() {
    let lattice = unit_lattice([7, 1, 1]);
    let classify = |c: LatticeCoord, _: [f32; 3]| {
        let kind = if c[0] == 0 || c[0] == 6 {
            NodeKind::Charge
        } else {
            NodeKind::BadChannel
        };
        Some(NodeVisit::new(kind))
    };
    let out = search(&lattice, [0, 0, 0], [6, 0, 0], &limits(), classify);
    assert_eq!(out.status, SearchStatus::MostlyBadChannel);
    assert!(!out.goal_reached());
    assert_eq!(out.path.len(), 7);
    assert!((out.badch_fraction - 5.0 / 7.0).abs() < 1e-6);

    let relaxed = SearchLimits {
        max_badch_fraction: 0.8,
        ..limits()
    };
    let out = search(&lattice, [0, 0, 0], [6, 0, 0], &relaxed, classify);
    assert!(out.goal_reached());
}

#[test]
fn expansion_cap_stops_the_search() {
    let lattice = unit_lattice([20, 1, 1]);
    let capped = SearchLimits {
        max_expansions: 5,
        ..limits()
    };
    let out = search(&lattice, [0, 0, 0], [19, 0, 0], &capped, |_: LatticeCoord, _: [f32; 3]| {
        Some(NodeVisit::new(NodeKind::Charge))
    });
    assert_eq!(out.status, SearchStatus::ExpansionLimit);
    assert_eq!(out.expansions, 5);
    assert!(out.path.is_empty());
}

#[test]
fn full_wall_exhausts_the_open_set() {
    let lattice = unit_lattice([5, 5, 3]);
    let out = search(&lattice, [0, 2, 1], [4, 2, 1], &limits(), |c: LatticeCoord, _: [f32; 3]| {
        (c[0] != 2).then(|| NodeVisit::new(NodeKind::Charge))
    });
    assert_eq!(out.status, SearchStatus::Exhausted);
    assert!(out.expansions > 0);
}

#[test]
fn path_restriction_prunes_wide_detours() {
    let lattice = unit_lattice([5, 5, 1]);
    let classify = |c: LatticeCoord, _: [f32; 3]| (!(c[0] == 2 && c[1] == 2)).then(|| NodeVisit::new(NodeKind::Charge));
    let tight = SearchLimits {
        restrict_radius: Some(0.5),
        ..limits()
    };
    let out = search(&lattice, [0, 2, 0], [4, 2, 0], &tight, classify);
    assert_eq!(out.status, SearchStatus::Exhausted);

    let loose = SearchLimits {
        restrict_radius: Some(1.5),
        ..limits()
    };
    let out = search(&lattice, [0, 2, 0], [4, 2, 0], &loose, classify);
    assert!(out.goal_reached());
}

// image-backed search on the toy detector

const ENTRY: [f32; 3] = [10.0, 10.0, 20.0];
const EXIT: [f32; 3] = [30.0, 2.0, 40.0];

fn track_images() -> Vec<PlaneImage> {
    polyline_event(&[ENTRY, EXIT])
}

fn endpoint_at(t: f32, boundary: BoundaryType) -> BoundaryEndPoint {
    spacepoint_at(lerp(ENTRY, EXIT, t), boundary).endpoint
}

fn finder_options() -> AStarOptions {
    AStarOptions {
        threshold: vec![50.0, 50.0, 50.0],
        neighborhood: vec![1, 1, 1],
        start_padding: 1,
        end_padding: 1,
        lattice_padding: 2,
        restrict_path: true,
        path_restriction_radius: 5.0,
        ..Default::default()
    }
}

#[test]
fn finds_a_charge_path_between_image_endpoints() {
    let geo = toy_geometry();
    let drift = toy_drift();
    let images = track_images();
    let badch = blank_planes(&geo);
    let options = finder_options();
    let finder = AStarLattice::new(&geo, &drift, &options);
    let start = endpoint_at(0.05, BoundaryType::Top);
    let goal = endpoint_at(0.95, BoundaryType::Downstream);

    let out = finder.find_path(&images, &badch, None, &start, &goal).expect("search");
    assert!(out.goal_reached(), "{:?} after {} expansions", out.status, out.expansions);
    assert_eq!(out.badch_fraction, 0.0);
    let first = out.path.first().unwrap().position;
    let last = out.path.last().unwrap().position;
    assert!((first[0] - 11.5).abs() < 1.0 && (last[0] - 29.5).abs() < 1.0);
    assert!(out.path.iter().filter(|n| n.kind == NodeKind::Charge).count() > out.path.len() / 2);
}

#[test]
fn dead_wires_are_crossed_as_bad_channel_nodes() {
    let geo = toy_geometry();
    let drift = toy_drift();
    let mut images = track_images();
    let mut badch = blank_planes(&geo);
    // Y wires 28..=31 dead over the whole drift
    for r in 0..images[2].meta().rows {
        for c in 28..=31 {
            images[2].set_pixel(r, c, 0.0);
        }
    }
    mark_dead_columns(&mut badch, 2, 28, 31);
    let options = finder_options();
    let finder = AStarLattice::new(&geo, &drift, &options);
    let start = endpoint_at(0.05, BoundaryType::Top);
    let goal = endpoint_at(0.95, BoundaryType::Downstream);

    let out = finder.find_path(&images, &badch, None, &start, &goal).expect("search");
    assert!(out.goal_reached(), "{:?}", out.status);
    assert!(out.path.iter().any(|n| n.kind == NodeKind::BadChannel));
    assert!(out.badch_fraction < 0.5);

    let strict = AStarOptions {
        accept_badch_nodes: false,
        ..finder_options()
    };
    let out = AStarLattice::new(&geo, &drift, &strict)
        .find_path(&images, &badch, None, &start, &goal)
        .expect("search");
    assert!(!out.goal_reached());
}

#[test]
fn tagged_pixels_make_the_same_path_costlier() {
    let geo = toy_geometry();
    let drift = toy_drift();
    let images = track_images();
    let badch = blank_planes(&geo);
    let options = finder_options();
    let finder = AStarLattice::new(&geo, &drift, &options);
    let start = endpoint_at(0.05, BoundaryType::Top);
    let goal = endpoint_at(0.95, BoundaryType::Downstream);

    let plain = finder.find_path(&images, &badch, None, &start, &goal).expect("search");
    let tagged = finder
        .find_path(&images, &badch, Some(images.as_slice()), &start, &goal)
        .expect("search");
    assert!(plain.goal_reached() && tagged.goal_reached());
    assert!(tagged.path_cost > 1.5 * plain.path_cost);
}

#[test]
fn unresolvable_endpoint_is_a_geometry_error() {
    let geo = toy_geometry();
    let drift = toy_drift();
    let images = track_images();
    let badch = blank_planes(&geo);
    let options = finder_options();
    let finder = AStarLattice::new(&geo, &drift, &options);
    let bogus = BoundaryEndPoint::new(BoundaryType::Top, 11, vec![0, 0, 40]);
    let goal = endpoint_at(0.95, BoundaryType::Downstream);
    let err = finder.find_path(&images, &badch, None, &bogus, &goal).unwrap_err();
    assert!(err.is_recoverable());
}
