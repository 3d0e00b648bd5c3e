use super::*;
use crate::astar::{NodeKind, PathNode};
use crate::image::{ImageView, ImageViewMut};
use crate::test_support::{blank_planes, lerp, polyline_event, spacepoint_at, toy_drift, toy_geometry};
use crate::types::{BoundaryType, PixelPos};

const ENTRY: [f32; 3] = [10.0, 10.0, 20.0];
const EXIT: [f32; 3] = [30.0, 2.0, 40.0];

struct Setup {
    linear: LinearTracerOptions,
    astar: AStarOptions,
    tracker: TrackerOptions,
}

fn toy_pass(run_linear: bool, run_astar: bool) -> PassOptions {
    PassOptions {
        run_linear,
        run_astar,
        linear3d_min_tracksize: 5,
        ..PassOptions::default()
    }
}

fn setup(passes: Vec<PassOptions>) -> Setup {
    Setup {
        linear: LinearTracerOptions {
            step_size: 1.0,
            min_adc_value: 50.0,
            neighborhood: 1,
        },
        astar: AStarOptions {
            threshold: vec![50.0; 3],
            neighborhood: vec![1; 3],
            start_padding: 1,
            end_padding: 1,
            lattice_padding: 6,
            restrict_path: false,
            ..AStarOptions::default()
        },
        tracker: TrackerOptions {
            passes,
            tag_thresholds: vec![50.0; 3],
            tag_neighborhood: 1,
            downsampling_factor: 1,
            ..TrackerOptions::default()
        },
    }
}

fn run(setup: &Setup, images: &[PlaneImage], spacepoints: &[BoundarySpacePoint]) -> TrackBuildResult {
    let geo = toy_geometry();
    let drift = toy_drift();
    let badch = blank_planes(&geo);
    TrackBuilder::new(&geo, &drift, &setup.linear, &setup.astar, &setup.tracker)
        .build(images, &badch, spacepoints)
        .expect("build")
}

fn straight_endpoints() -> Vec<BoundarySpacePoint> {
    vec![
        spacepoint_at(lerp(ENTRY, EXIT, 0.05), BoundaryType::Top),
        spacepoint_at(lerp(ENTRY, EXIT, 0.95), BoundaryType::Downstream),
    ]
}

#[test]
fn pair_keys_are_unordered() {
    assert_eq!(PairKey::new(4, 1), PairKey::new(1, 4));
    assert_eq!(PairKey::new(4, 1).first, 1);
}

#[test]
fn astar_gate_follows_the_trace_record() {
    let pass = PassOptions::default();
    assert_eq!(AStarGate::evaluate(None, &pass), AStarGate::Run);

    let mut info = ComboInfo {
        goodstart: 0.5,
        goodend: 0.5,
        frac_good: 0.5,
        frac_majcharge: 0.5,
        track_made: false,
        pass: 0,
    };
    assert_eq!(AStarGate::evaluate(Some(&info), &pass), AStarGate::Run);
    info.goodend = 0.05;
    assert_eq!(AStarGate::evaluate(Some(&info), &pass), AStarGate::WeakEnds);
    info.goodend = 0.5;
    info.frac_majcharge = 0.1;
    assert_eq!(AStarGate::evaluate(Some(&info), &pass), AStarGate::WeakTrace);
    info.track_made = true;
    assert_eq!(AStarGate::evaluate(Some(&info), &pass), AStarGate::AlreadyConnected);

    let mut table = ComboTable::default();
    let key = PairKey::new(0, 1);
    table.record(key, info.clone());
    assert!(table.is_connected(key));
    table.mark_connected(PairKey::new(2, 3), 1);
    assert!(table.is_connected(PairKey::new(3, 2)));
    assert_eq!(table.len(), 2);
}

#[test]
fn tagged_merge_leaves_binary_images() {
    let geo = toy_geometry();
    let images = blank_planes(&geo);
    let mut tagged = TaggedPixels::new(&images);
    let mut canvas = tagged.pass_canvas();
    canvas[0].set_pixel(3, 4, 255.0);
    canvas[1].set_pixel(3, 4, 0.5);
    tagged.merge_pass(&canvas).expect("merge");
    tagged.merge_pass(&canvas).expect("merge");
    assert_eq!(tagged.images()[0].pixel(3, 4), 255.0);
    assert_eq!(tagged.images()[1].pixel(3, 4), 0.0);
    assert_eq!(tagged.count(), 1);
    let c = tagged.compressed(4, crate::image::CompressionMode::Max);
    assert_eq!(c[0].pixel(0, 1), 255.0);
}

fn two_pixel_track() -> Track3D {
    Track3D {
        start_index: 0,
        end_index: 1,
        start_type: BoundaryType::Top,
        end_type: BoundaryType::Bottom,
        row_start: 10,
        row_end: 10,
        tick_start: 10.5,
        tick_end: 10.5,
        start3d: [0.0; 3],
        end3d: [0.0; 3],
        path3d: Vec::new(),
        plane_paths: vec![vec![PixelPos { row: 10, col: 10 }]; 3],
        algorithm: TrackAlgorithm::Linear,
        pass: 0,
    }
}

#[test]
fn marking_tags_only_charged_or_dead_pixels() {
    let geo = toy_geometry();
    let mut images = blank_planes(&geo);
    let mut badch = blank_planes(&geo);
    images[0].set_pixel(10, 11, 80.0);
    images[0].set_pixel(10, 12, 80.0);
    images[0].set_pixel(11, 9, 20.0);
    badch[0].set_pixel(9, 9, 1.0);
    let mut tagged = blank_planes(&geo);

    two_pixel_track().mark_image(&images, &badch, &[50.0; 3], 1, &mut tagged);
    assert_eq!(tagged[0].pixel(10, 11), 255.0);
    assert_eq!(tagged[0].pixel(9, 9), 255.0);
    // outside the window
    assert_eq!(tagged[0].pixel(10, 12), 0.0);
    // below threshold
    assert_eq!(tagged[0].pixel(11, 9), 0.0);
    assert_eq!(tagged[1].count_above(0.0), 0);

    let mut skipped = blank_planes(&geo);
    let tracks = vec![two_pixel_track(), two_pixel_track()];
    let n = mark_tracks(&tracks, Some(&[false, true]), &images, &badch, &[50.0; 3], 1, &mut skipped);
    assert_eq!(n, 1);
    let n = mark_tracks(&tracks, Some(&[false]), &images, &badch, &[50.0; 3], 1, &mut skipped);
    assert_eq!(n, 0);
}

#[test]
fn lattice_path_pixels_are_clamped_and_deduplicated() {
    let geo = toy_geometry();
    let drift = toy_drift();
    let images = blank_planes(&geo);
    let sps = straight_endpoints();
    let node = |position: [f32; 3]| PathNode {
        coord: [0; 3],
        position,
        kind: NodeKind::Charge,
    };
    let path = vec![
        node([-3.0, 0.0, 20.0]),
        node([-2.5, 0.0, 20.0]),
        node([5.2, 0.0, 20.0]),
        node([500.0, 0.0, 20.0]),
    ];
    let track = Track3D::from_lattice_path(PairKey::new(0, 1), &sps[0], &sps[1], &images, &path, &geo, &drift, 1)
        .expect("track");
    assert_eq!(track.algorithm, TrackAlgorithm::AStar);
    assert_eq!(track.start3d, [-3.0, 0.0, 20.0]);
    let rows: Vec<usize> = track.plane_paths[2].iter().map(|p| p.row).collect();
    assert_eq!(rows, vec![0, 5, images[2].meta().rows - 1]);
    assert!(track.plane_paths[2].iter().all(|p| p.col == 20));
}

#[test]
fn straight_track_is_accepted_by_the_first_pass() {
    let images = polyline_event(&[ENTRY, EXIT]);
    let sps = straight_endpoints();
    let setup = setup(vec![toy_pass(true, false), toy_pass(false, true)]);
    let out = run(&setup, &images, &sps);

    assert_eq!(out.tracks.len(), 1);
    let track = &out.tracks[0];
    assert_eq!(track.algorithm, TrackAlgorithm::Linear);
    assert_eq!((track.start_index, track.end_index), (0, 1));
    assert_eq!(track.pass, 0);
    assert!(track.length() > 20.0);
    assert_eq!(out.used_endpoints, vec![true, true]);
    assert!(out.combos.is_connected(PairKey::new(0, 1)));
    assert!(out.tagged.iter().all(|t| t.count_above(0.0) > 0));

    let report = &out.report;
    assert_eq!(report.passes.len(), 2);
    assert_eq!(report.passes[0].accepted_linear, 1);
    assert_eq!(report.passes[0].tagged_pixels_visible, 0);
    assert!(report.passes[1].tagged_pixels_visible > 0);
    assert_eq!(report.passes[1].skipped_consumed, 1);
    assert_eq!(report.passes[1].searched_astar, 0);
}

#[test]
fn same_boundary_pairs_are_never_connected() {
    let images = polyline_event(&[ENTRY, EXIT]);
    let sps = vec![
        spacepoint_at(lerp(ENTRY, EXIT, 0.05), BoundaryType::Top),
        spacepoint_at(lerp(ENTRY, EXIT, 0.95), BoundaryType::Top),
    ];
    let out = run(&setup(vec![toy_pass(true, true)]), &images, &sps);
    assert!(out.tracks.is_empty());
    assert_eq!(out.report.passes[0].pairs_considered, 0);
    assert_eq!(out.used_endpoints, vec![false, false]);
}

#[test]
fn pairs_beyond_the_drift_window_are_rejected() {
    let images = polyline_event(&[ENTRY, EXIT]);
    let mut setup = setup(vec![toy_pass(true, true)]);
    setup.tracker.ticks_per_full_drift = 5.0;
    let out = run(&setup, &images, &straight_endpoints());
    assert!(out.tracks.is_empty());
    assert_eq!(out.report.passes[0].drift_rejected, 1);
}

const KINK: [f32; 3] = [20.0, 0.0, 24.0];

fn bent_endpoints() -> Vec<BoundarySpacePoint> {
    vec![
        spacepoint_at(lerp(ENTRY, KINK, 0.1), BoundaryType::Top),
        spacepoint_at(lerp(KINK, EXIT, 0.9), BoundaryType::Downstream),
    ]
}

#[test]
fn bent_track_is_left_to_the_lattice_search() {
    let images = polyline_event(&[ENTRY, KINK, EXIT]);
    let sps = bent_endpoints();

    let out = run(&setup(vec![toy_pass(true, false)]), &images, &sps);
    assert!(out.tracks.is_empty());
    let info = out.combos.get(PairKey::new(0, 1)).expect("trace recorded");
    assert!(info.frac_good < 0.9);
    assert!(!info.track_made);

    let out = run(&setup(vec![toy_pass(false, true)]), &images, &sps);
    assert_eq!(out.tracks.len(), 1, "{:?}", out.report.passes);
    let track = &out.tracks[0];
    assert_eq!(track.algorithm, TrackAlgorithm::AStar);
    // the path follows the kink, well below the straight chord
    assert!(track.path3d.iter().any(|p| p[1] < 3.0 && (p[2] - KINK[2]).abs() < 4.0));
    assert_eq!(out.report.passes[0].searched_astar, 1);
}

#[test]
fn weak_trace_blocks_the_lattice_search() {
    let images = polyline_event(&[ENTRY, KINK, EXIT]);
    let mut pass = toy_pass(true, true);
    pass.astar3d_min_goodfrac = 0.95;
    let out = run(&setup(vec![pass]), &images, &bent_endpoints());
    assert!(out.tracks.is_empty());
    assert_eq!(out.report.passes[0].skipped_by_heuristic, 1);
    assert_eq!(out.report.passes[0].searched_astar, 0);
}

#[test]
fn unresolvable_pairs_are_counted_not_fatal() {
    let images = polyline_event(&[ENTRY, EXIT]);
    let mut sps = straight_endpoints();
    sps.push(BoundarySpacePoint::new(
        crate::types::BoundaryEndPoint::new(BoundaryType::Upstream, 12, vec![0, 0, 40]),
        0.0,
        0.0,
    ));
    let out = run(&setup(vec![toy_pass(true, false)]), &images, &sps);
    assert_eq!(out.tracks.len(), 1);
    assert_eq!(out.report.passes[0].failed, 2);
}

#[test]
fn parallel_and_sequential_runs_agree() {
    let images = polyline_event(&[ENTRY, EXIT]);
    let sps = straight_endpoints();
    let mut a = setup(vec![toy_pass(true, false), toy_pass(false, true)]);
    a.tracker.parallel = true;
    let mut b = setup(vec![toy_pass(true, false), toy_pass(false, true)]);
    b.tracker.parallel = false;
    let pa = run(&a, &images, &sps);
    let pb = run(&b, &images, &sps);
    assert_eq!(pa.tracks, pb.tracks);
    assert_eq!(pa.tagged, pb.tagged);
    assert_eq!(pa.used_endpoints, pb.used_endpoints);
}

#[test]
fn wall_endpoints_connect_at_default_downsampling() {
    // each end sits exactly on a wall where the 4-wire column centers
    // cross outside the volume
    let cases = [
        ([12.0, 10.0, 6.0], [36.0, 0.0, 40.0]),
        ([20.0, 10.0, 14.0], [30.0, -4.5, 40.0]),
        ([8.0, 10.0, 22.0], [28.0, 8.5, 40.0]),
    ];
    let mut setup = setup(Vec::new());
    setup.tracker = TrackerOptions {
        passes: vec![PassOptions::astar_only()],
        ..TrackerOptions::default()
    };
    setup.astar.neighborhood = vec![2; 3];
    setup.astar.start_padding = 2;
    setup.astar.end_padding = 2;
    setup.astar.lattice_padding = 4;
    assert_eq!(setup.tracker.downsampling_factor, 4);

    for (entry, exit) in cases {
        let images = polyline_event(&[entry, exit]);
        let sps = vec![
            spacepoint_at(entry, BoundaryType::Top),
            spacepoint_at(exit, BoundaryType::Downstream),
        ];
        let out = run(&setup, &images, &sps);
        let pass = &out.report.passes[0];
        assert_eq!(pass.failed, 0, "{entry:?} -> {exit:?}: {pass:?}");
        assert_eq!(pass.searched_astar, 1);
        assert_eq!(out.tracks.len(), 1, "{entry:?} -> {exit:?}: {pass:?}");

        let track = &out.tracks[0];
        assert_eq!(track.algorithm, TrackAlgorithm::AStar);
        let dist = |p: [f32; 3], q: [f32; 3]| {
            (0..3).map(|i| (p[i] - q[i]).powi(2)).sum::<f32>().sqrt()
        };
        assert!(dist(track.start3d, entry) < 5.0, "start {:?}", track.start3d);
        assert!(dist(track.end3d, exit) < 5.0, "end {:?}", track.end3d);
        assert_eq!(out.used_endpoints, vec![true, true]);
    }
}
