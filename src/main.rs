use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use std::env;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use thrumu_tracker::geometry::{DetectorVolume, DriftModel, PlanarWireGeometry, WireGeometry};
use thrumu_tracker::image::{ImageMeta, ImageView, ImageViewMut, PlaneImage};
use thrumu_tracker::{load_config, ThruMuConfig, ThruMuOutput, ThruMuTracker};

const ROWS: usize = 1008;
const FIRST_TICK: f32 = 2400.0;
const TICKS_PER_ROW: f32 = 6.0;
const WIRES_PER_COL: f32 = 1.0;
const MUONS: usize = 3;
const SEED: u64 = 17;

fn main() {
    env_logger::init();
    if let Err(err) = run() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let mut args = env::args().skip(1);
    let config = match args.next() {
        Some(path) => load_config(Path::new(&path)).map_err(|e| e.to_string())?,
        None => ThruMuConfig::default(),
    };
    let report_path = args.next();

    let geometry = PlanarWireGeometry::microboone_like();
    let drift = config.drift.clone();
    let (images, badch) = synthetic_event(&geometry, &drift, MUONS, SEED);

    let tracker = ThruMuTracker::new(config, geometry).map_err(|e| e.to_string())?;
    let out = tracker.process(&images, &badch).map_err(|e| e.to_string())?;
    print_text_summary(&out);

    if let Some(path) = report_path {
        write_json(Path::new(&path), &out.report())?;
        println!("\nJSON report written to {path}");
    }
    Ok(())
}

/// Charge and bad-channel images with `muons` straight tracks entering
/// through the top face and leaving through another face.
fn synthetic_event(
    geometry: &PlanarWireGeometry,
    drift: &DriftModel,
    muons: usize,
    seed: u64,
) -> (Vec<PlaneImage>, Vec<PlaneImage>) {
    let mut images: Vec<PlaneImage> = (0..geometry.num_planes())
        .map(|p| {
            let cols = (geometry.num_wires(p) as f32 / WIRES_PER_COL).ceil() as usize;
            PlaneImage::new(
                ImageMeta::new(p, ROWS, cols, FIRST_TICK).with_pixel_size(WIRES_PER_COL, TICKS_PER_ROW),
            )
        })
        .collect();
    let badch: Vec<PlaneImage> = images.iter().map(PlaneImage::blank_like).collect();

    let vol = geometry.volume().clone();
    let mut rng = StdRng::seed_from_u64(seed);
    for _ in 0..muons {
        let entry = [
            rng.random_range(20.0..vol.x_max - 20.0),
            vol.y_max,
            rng.random_range(100.0..vol.z_max - 100.0),
        ];
        let exit = exit_point(&vol, &mut rng, entry);
        paint_track(&mut images, geometry, drift, entry, exit, 150.0);
    }
    (images, badch)
}

fn exit_point(vol: &DetectorVolume, rng: &mut StdRng, entry: [f32; 3]) -> [f32; 3] {
    let x = rng.random_range(20.0..vol.x_max - 20.0);
    match rng.random_range(0..3) {
        0 => [x, vol.y_min, (entry[2] + rng.random_range(-150.0..150.0)).clamp(vol.z_min, vol.z_max)],
        1 => [x, rng.random_range(vol.y_min..vol.y_max - 30.0), vol.z_max],
        _ => [x, rng.random_range(vol.y_min..vol.y_max - 30.0), vol.z_min],
    }
}

fn paint_track(
    images: &mut [PlaneImage],
    geometry: &PlanarWireGeometry,
    drift: &DriftModel,
    a: [f32; 3],
    b: [f32; 3],
    charge: f32,
) {
    let len = (0..3).map(|i| (b[i] - a[i]).powi(2)).sum::<f32>().sqrt();
    let n = (len / 0.05).ceil().max(1.0) as usize;
    for i in 0..=n {
        let t = i as f32 / n as f32;
        let pos = [
            a[0] + t * (b[0] - a[0]),
            a[1] + t * (b[1] - a[1]),
            a[2] + t * (b[2] - a[2]),
        ];
        for (p, img) in images.iter_mut().enumerate() {
            let Some(wire) = geometry.project(pos, p) else {
                continue;
            };
            let meta = img.meta().clone();
            let (Some(row), Some(col)) = (meta.row(drift.x_to_tick(pos[0])), meta.col(wire as f32)) else {
                continue;
            };
            img.set_pixel(row, col, charge);
        }
    }
}

fn print_text_summary(out: &ThruMuOutput) {
    println!("ThruMu summary");
    println!("  endpoints: {}", out.spacepoints.len());
    for (i, sp) in out.spacepoints.iter().enumerate() {
        println!(
            "    [{i}] {:?} row={} y={:.1} z={:.1} used={}",
            sp.boundary(),
            sp.row(),
            sp.y,
            sp.z,
            out.used_endpoints[i]
        );
    }
    println!("  tracks: {}", out.tracks.len());
    for track in &out.tracks {
        println!(
            "    {:?} pass={} {}({:?}) -> {}({:?}) points={} length={:.1}cm",
            track.algorithm,
            track.pass,
            track.start_index,
            track.start_type,
            track.end_index,
            track.end_type,
            track.path3d.len(),
            track.length()
        );
    }
    for pass in &out.report.passes {
        println!(
            "  pass {}: pairs={} searched linear={} astar={} accepted={} failed={} ({:.3} ms)",
            pass.pass,
            pass.pairs_considered,
            pass.searched_linear,
            pass.searched_astar,
            pass.accepted(),
            pass.failed,
            pass.elapsed_ms
        );
    }
    println!("  total_ms: {:.3}", out.timing.total_ms);
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), String> {
    let file = File::create(path).map_err(|e| format!("Failed to create {}: {e}", path.display()))?;
    serde_json::to_writer_pretty(BufWriter::new(file), value)
        .map_err(|e| format!("Failed to write JSON {}: {e}", path.display()))
}
