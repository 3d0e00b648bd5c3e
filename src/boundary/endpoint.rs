//! Reduce clusters of boundary candidates to one space point each.
//!
//! Candidates of one crossing type are clustered in detector space. Each
//! cluster is carried back to image space, where the charged pixels around
//! its members are walked in row order on all planes at once. Every row on
//! which all planes have a pixel is a candidate wire crossing; the valid
//! crossing nearest the boundary wall becomes the endpoint.
use super::collector::BoundaryHits;
use super::dbscan;
use super::options::BoundaryOptions;
use crate::error::Result;
use crate::geometry::WireGeometry;
use crate::image::{ImageView, PlaneImage};
use crate::types::{BoundaryEndPoint, BoundarySpacePoint, BoundaryType};
use log::debug;
use std::cmp::Ordering;
use std::collections::HashSet;
use std::time::Instant;

#[derive(Clone, Copy, Debug, PartialEq)]
struct PixelPt {
    row: usize,
    col: usize,
    q: f32,
}

#[derive(Clone, Debug, Default)]
pub struct ClusterResult {
    pub spacepoints: Vec<BoundarySpacePoint>,
    /// Detector-space clusters found per crossing type.
    pub clusters_per_type: [usize; 4],
    pub elapsed_ms: f64,
}

/// Cluster each crossing type and emit one space point per usable cluster.
pub fn cluster_endpoints<G: WireGeometry + ?Sized>(
    hits: &[BoundaryHits; 4],
    images: &[PlaneImage],
    badch: &[PlaneImage],
    geometry: &G,
    options: &BoundaryOptions,
) -> Result<ClusterResult> {
    let start = Instant::now();
    options.check_planes(images.len())?;
    let mut out = ClusterResult::default();
    let min_pts = options.cluster_min_points.max(1);

    for (slot, type_hits) in hits.iter().enumerate() {
        let boundary = BoundaryType::CROSSINGS[slot];
        if type_hits.len() < min_pts {
            debug!(
                "cluster_endpoints {:?}: {} candidates, below minimum {}",
                boundary,
                type_hits.len(),
                min_pts
            );
            continue;
        }
        let db = dbscan::scan(&type_hits.points, min_pts, options.cluster_radius);
        out.clusters_per_type[slot] = db.clusters.len();
        for members in db.clusters.iter().filter(|m| m.len() >= min_pts) {
            match endpoint_from_cluster(boundary, members, type_hits, images, badch, geometry, options) {
                Some(sp) => out.spacepoints.push(sp),
                None => debug!(
                    "cluster_endpoints {:?}: cluster of {} has no valid crossing",
                    boundary,
                    members.len()
                ),
            }
        }
    }

    out.elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;
    debug!(
        "cluster_endpoints clusters={:?} spacepoints={} elapsed={:.3}ms",
        out.clusters_per_type,
        out.spacepoints.len(),
        out.elapsed_ms
    );
    Ok(out)
}

fn endpoint_from_cluster<G: WireGeometry + ?Sized>(
    boundary: BoundaryType,
    members: &[usize],
    hits: &BoundaryHits,
    images: &[PlaneImage],
    badch: &[PlaneImage],
    geometry: &G,
    options: &BoundaryOptions,
) -> Option<BoundarySpacePoint> {
    let slot = boundary.crossing_index()?;
    let nplanes = images.len();
    let mut used: HashSet<(usize, usize, usize)> = HashSet::new();
    let mut pixels: Vec<Vec<PixelPt>> = vec![Vec::new(); nplanes];

    for &idx in members {
        let row = hits.row(idx);
        for p in 0..nplanes {
            let col = hits.cols[idx][p] as i64;
            let width = images[p].meta().pixel_width;
            let reach = options.column_reach(p, width, options.type_modifier[slot]) as i64;
            let ncols = images[p].meta().cols as i64;
            for n in -reach..=reach {
                let c = col + n;
                if c < 0 || c >= ncols {
                    continue;
                }
                let c = c as usize;
                let q = images[p].pixel(row, c);
                let bad = badch[p].pixel(row, c) > 0.0;
                if (q > options.thresholds[p] || (bad && n == 0)) && used.insert((p, row, c)) {
                    pixels[p].push(PixelPt { row, col: c, q });
                }
            }
        }
    }

    for list in pixels.iter_mut() {
        list.sort_by(|a, b| {
            a.row
                .cmp(&b.row)
                .then(a.q.partial_cmp(&b.q).unwrap_or(Ordering::Equal))
                .then(a.col.cmp(&b.col))
        });
    }

    best_crossing(boundary, &pixels, images, geometry, options)
}

/// Synchronized row walk over the per-plane pixel lists.
fn best_crossing<G: WireGeometry + ?Sized>(
    boundary: BoundaryType,
    pixels: &[Vec<PixelPt>],
    images: &[PlaneImage],
    geometry: &G,
    options: &BoundaryOptions,
) -> Option<BoundarySpacePoint> {
    let active: Vec<usize> = (0..pixels.len()).filter(|&p| !pixels[p].is_empty()).collect();
    // one empty plane is tolerated: its column comes from the crossing
    if active.len() + 1 < pixels.len() || active.len() < 2 {
        return None;
    }

    let mut idx = vec![0usize; pixels.len()];
    let mut current_row = active.iter().map(|&p| pixels[p][0].row).min()?;
    let mut best: Option<(f32, BoundarySpacePoint)> = None;

    loop {
        for &p in &active {
            while idx[p] < pixels[p].len() && pixels[p][idx[p]].row < current_row {
                idx[p] += 1;
            }
        }
        if active.iter().any(|&p| idx[p] >= pixels[p].len()) {
            break;
        }
        let leading_row = active.iter().map(|&p| pixels[p][idx[p]].row).max()?;
        if leading_row > current_row {
            current_row = leading_row;
            continue;
        }

        if let Some((dwall, sp)) = evaluate_row(boundary, current_row, pixels, &idx, &active, images, geometry, options) {
            let closer = match &best {
                Some((d, _)) => dwall < *d,
                None => true,
            };
            if closer {
                best = Some((dwall, sp));
            }
        }

        // advance the plane with the most pixels left on this row
        let remaining = |p: usize| {
            pixels[p][idx[p] + 1..]
                .iter()
                .take_while(|px| px.row == current_row)
                .count()
        };
        let (advance, most) = active
            .iter()
            .map(|&p| (p, remaining(p)))
            .fold((active[0], 0), |acc, (p, n)| if n > acc.1 { (p, n) } else { acc });
        if most == 0 {
            current_row += 1;
        } else {
            idx[advance] += 1;
        }
    }

    best.map(|(_, sp)| sp)
}

#[allow(clippy::too_many_arguments)]
fn evaluate_row<G: WireGeometry + ?Sized>(
    boundary: BoundaryType,
    row: usize,
    pixels: &[Vec<PixelPt>],
    idx: &[usize],
    active: &[usize],
    images: &[PlaneImage],
    geometry: &G,
    options: &BoundaryOptions,
) -> Option<(f32, BoundarySpacePoint)> {
    let nplanes = pixels.len();
    let mut wires: Vec<Option<f32>> = vec![None; nplanes];
    for &p in active {
        wires[p] = Some(images[p].meta().wire_center(pixels[p][idx[p]].col));
    }
    let crossing = geometry.intersect(&wires)?;
    let valid = if active.len() == nplanes {
        crossing.is_valid(options.max_triangle_area)
    } else {
        crossing.crossings == 1
    };
    if !valid {
        return None;
    }

    let mut cols = Vec::with_capacity(nplanes);
    for p in 0..nplanes {
        let col = if active.contains(&p) {
            pixels[p][idx[p]].col
        } else {
            let wire = geometry.wire_coordinate(crossing.y, crossing.z, p).round();
            images[p].meta().col(wire)?
        };
        cols.push(col);
    }
    let dwall = geometry
        .volume()
        .distance_to_wall(boundary, [0.0, crossing.y, crossing.z]);
    let endpoint = BoundaryEndPoint::new(boundary, row, cols);
    Some((dwall, BoundarySpacePoint::new(endpoint, crossing.y, crossing.z)))
}
