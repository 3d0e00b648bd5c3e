//! Small three-plane detector and straight-track charge painting.
use thrumu_tracker::geometry::{DetectorVolume, DriftModel, PlanarWireGeometry, WireGeometry};
use thrumu_tracker::image::{ImageMeta, ImageView, ImageViewMut, PlaneImage};
use thrumu_tracker::{BoundaryEndPoint, BoundarySpacePoint, BoundaryType};

pub const ROWS: usize = 64;
pub const CHARGE: f32 = 200.0;

/// 20 cm tall, 40 cm long, unit pitch; one tick per row, 1 cm per tick.
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

/// Charge images with every segment painted and widened by one column.
pub fn event(segments: &[([f32; 3], [f32; 3])]) -> Vec<PlaneImage> {
    let geo = toy_geometry();
    let drift = toy_drift();
    let mut images = blank_planes(&geo);
    for &(a, b) in segments {
        paint_segment(&mut images, &geo, &drift, a, b);
    }
    for img in images.iter_mut() {
        widen(img);
    }
    images
}

fn paint_segment(images: &mut [PlaneImage], geo: &PlanarWireGeometry, drift: &DriftModel, a: [f32; 3], b: [f32; 3]) {
    let len = (0..3).map(|i| (b[i] - a[i]).powi(2)).sum::<f32>().sqrt();
    let n = (len / 0.05).ceil().max(1.0) as usize;
    for i in 0..=n {
        let pos = lerp(a, b, i as f32 / n as f32);
        for (p, img) in images.iter_mut().enumerate() {
            let Some(wire) = geo.project(pos, p) else {
                continue;
            };
            let meta = img.meta().clone();
            if let (Some(row), Some(col)) = (meta.row(drift.x_to_tick(pos[0])), meta.col(wire as f32)) {
                img.set_pixel(row, col, CHARGE);
            }
        }
    }
}

fn widen(img: &mut PlaneImage) {
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

/// Boundary space point on the pixels `pos` projects to.
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
