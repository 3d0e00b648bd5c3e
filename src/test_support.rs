//! Toy detector shared by the unit tests.
//!
//! 20 cm tall, 40 cm long, unit wire pitch, one wire per column, one tick
//! per row and 1 cm of drift per tick starting at tick 0.
use crate::geometry::{DetectorVolume, DriftModel, PlanarWireGeometry, WireGeometry};
use crate::image::{ImageMeta, ImageView, ImageViewMut, PlaneImage};
use crate::types::{BoundaryEndPoint, BoundarySpacePoint, BoundaryType};

pub const ROWS: usize = 64;

pub fn toy_geometry() -> PlanarWireGeometry {
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

pub fn toy_drift() -> DriftModel {
    DriftModel {
        trigger_tick: 0.0,
        cm_per_tick: 1.0,
    }
}

pub fn blank_planes(geo: &PlanarWireGeometry) -> Vec<PlaneImage> {
    (0..geo.num_planes())
        .map(|p| PlaneImage::new(ImageMeta::new(p, ROWS, geo.num_wires(p), 0.0)))
        .collect()
}

/// Paint `value` on every pixel the segment `a → b` projects onto.
pub fn paint_segment(
    images: &mut [PlaneImage],
    geo: &PlanarWireGeometry,
    drift: &DriftModel,
    a: [f32; 3],
    b: [f32; 3],
    value: f32,
) {
    let len = ((b[0] - a[0]).powi(2) + (b[1] - a[1]).powi(2) + (b[2] - a[2]).powi(2)).sqrt();
    let n = (len / 0.05).ceil().max(1.0) as usize;
    for i in 0..=n {
        let t = i as f32 / n as f32;
        let pos = [
            a[0] + t * (b[0] - a[0]),
            a[1] + t * (b[1] - a[1]),
            a[2] + t * (b[2] - a[2]),
        ];
        for (p, img) in images.iter_mut().enumerate() {
            let Some(wire) = geo.project(pos, p) else {
                continue;
            };
            let meta = img.meta().clone();
            let (Some(row), Some(col)) = (meta.row(drift.x_to_tick(pos[0])), meta.col(wire as f32))
            else {
                continue;
            };
            img.set_pixel(row, col, value);
        }
    }
}

/// Mark a full column band `[c0, c1]` of `plane` as dead.
pub fn mark_dead_columns(badch: &mut [PlaneImage], plane: usize, c0: usize, c1: usize) {
    let img = &mut badch[plane];
    let rows = img.meta().rows;
    for r in 0..rows {
        for c in c0..=c1 {
            img.set_pixel(r, c, 1.0);
        }
    }
}

/// Spread every charged pixel one column to each side.
pub fn dilate_columns(img: &mut PlaneImage) {
    let src = img.clone();
    let cols = src.meta().cols;
    for r in 0..src.meta().rows {
        for c in 0..cols {
            let v = src.pixel(r, c);
            if v <= 0.0 {
                continue;
            }
            for cc in c.saturating_sub(1)..=(c + 1).min(cols - 1) {
                if img.pixel(r, cc) < v {
                    img.set_pixel(r, cc, v);
                }
            }
        }
    }
}

/// Toy planes with a dilated polyline of charge through `points`.
pub fn polyline_event(points: &[[f32; 3]]) -> Vec<PlaneImage> {
    let geo = toy_geometry();
    let drift = toy_drift();
    let mut images = blank_planes(&geo);
    for seg in points.windows(2) {
        paint_segment(&mut images, &geo, &drift, seg[0], seg[1], 200.0);
    }
    images.iter_mut().for_each(dilate_columns);
    images
}

/// Endpoint on the pixels `pos` projects to.
pub fn spacepoint_at(pos: [f32; 3], boundary: BoundaryType) -> BoundarySpacePoint {
    let geo = toy_geometry();
    let cols = (0..geo.num_planes())
        .map(|p| geo.project(pos, p).expect("point inside the toy detector"))
        .collect();
    let row = toy_drift().x_to_tick(pos[0]).floor() as usize;
    BoundarySpacePoint::new(BoundaryEndPoint::new(boundary, row, cols), pos[1], pos[2])
}

pub fn lerp(a: [f32; 3], b: [f32; 3], t: f32) -> [f32; 3] {
    [
        a[0] + t * (b[0] - a[0]),
        a[1] + t * (b[1] - a[1]),
        a[2] + t * (b[2] - a[2]),
    ]
}
