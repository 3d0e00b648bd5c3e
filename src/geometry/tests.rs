use super::*;
use crate::types::BoundaryType;

fn toy() -> PlanarWireGeometry {
    let volume = DetectorVolume {
        x_min: 0.0,
        x_max: 50.0,
        y_min: -10.0,
        y_max: 10.0,
        z_min: 0.0,
        z_max: 40.0,
    };
    PlanarWireGeometry::with_angles(volume, &[60.0, -60.0, 0.0], 1.0)
}

#[test]
fn collection_plane_measures_z() {
    let geo = toy();
    assert!((geo.wire_coordinate(3.0, 17.0, 2) - 17.0).abs() < 1e-4);
    assert_eq!(geo.project([0.0, 3.0, 17.2], 2), Some(17));
    assert_eq!(geo.project([0.0, 3.0, 45.0], 2), None);
}

#[test]
fn induction_planes_cover_the_volume() {
    let geo = toy();
    for p in 0..2 {
        for &(y, z) in &[(-10.0, 0.0), (10.0, 0.0), (-10.0, 40.0), (10.0, 40.0)] {
            let w = geo.wire_coordinate(y, z, p);
            assert!(w >= -1e-3 && w <= geo.num_wires(p) as f32, "plane {p} wire {w}");
        }
    }
}

#[test]
fn three_projected_wires_intersect_back_at_the_point() {
    let geo = toy();
    let (y, z) = (4.0, 22.0);
    let wires: Vec<Option<f32>> = (0..3).map(|p| Some(geo.wire_coordinate(y, z, p))).collect();
    let hit = geo.intersect(&wires).expect("planes cross");
    assert!((hit.y - y).abs() < 1e-3 && (hit.z - z).abs() < 1e-3);
    assert!(hit.triangle_area < 1e-3);
    assert!(hit.is_valid(1.0));
}

#[test]
fn rounded_wires_leave_a_small_residual() {
    let geo = toy();
    let wires: Vec<Option<f32>> = (0..3)
        .map(|p| Some(geo.wire_coordinate(4.3, 22.6, p).round()))
        .collect();
    let hit = geo.intersect(&wires).expect("planes cross");
    assert!(hit.triangle_area < 1.0, "area={}", hit.triangle_area);
    assert!((hit.y - 4.3).abs() < 1.0 && (hit.z - 22.6).abs() < 1.0);
}

#[test]
fn two_plane_crossing_and_outside_points() {
    let geo = toy();
    let w0 = geo.wire_coordinate(-2.0, 30.0, 0);
    let w2 = geo.wire_coordinate(-2.0, 30.0, 2);
    let hit = geo.intersect(&[Some(w0), None, Some(w2)]).expect("two planes cross");
    assert_eq!(hit.triangle_area, 0.0);
    assert!((hit.y + 2.0).abs() < 1e-3);

    let w0 = geo.wire_coordinate(25.0, 30.0, 0);
    let w2 = geo.wire_coordinate(25.0, 30.0, 2);
    let hit = geo.intersect(&[Some(w0), None, Some(w2)]).expect("lines still cross");
    assert_eq!(hit.crossings, 0);
    assert!(geo.intersect(&[Some(w0), None, None]).is_none());
}

#[test]
fn wall_distances_follow_boundary_type() {
    let vol = toy().volume().clone();
    let pos = [5.0, 7.0, 12.0];
    assert_eq!(vol.distance_to_wall(BoundaryType::Top, pos), 3.0);
    assert_eq!(vol.distance_to_wall(BoundaryType::Bottom, pos), 17.0);
    assert_eq!(vol.distance_to_wall(BoundaryType::Upstream, pos), 12.0);
    assert_eq!(vol.distance_to_wall(BoundaryType::Downstream, pos), 28.0);
    assert_eq!(vol.distance_to_wall(BoundaryType::Anode, pos), 5.0);
}

#[test]
fn drift_conversion_round_trips() {
    let drift = DriftModel::default();
    let x = drift.tick_to_x(4000.0);
    assert!((x - 800.0 * 0.055718).abs() < 1e-3);
    assert!((drift.x_to_tick(x) - 4000.0).abs() < 1e-2);
}
