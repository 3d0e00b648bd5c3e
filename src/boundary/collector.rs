//! Row-by-row search for pixels consistent with a boundary crossing.
use super::matcher::{BoundaryCombo, BoundaryMatcher};
use super::options::BoundaryOptions;
use crate::error::{Result, TrackerError};
use crate::geometry::WireGeometry;
use crate::image::{ImageView, PlaneImage};
use crate::types::BoundaryType;
use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Instant;

/// Candidates of one crossing type, aligned by index.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BoundaryHits {
    /// `(lateral face coordinate, row + jitter)` per candidate.
    pub points: Vec<[f32; 2]>,
    /// Per-plane columns of the candidate.
    pub cols: Vec<[usize; 3]>,
}

impl BoundaryHits {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Integer row a candidate was found on.
    pub fn row(&self, idx: usize) -> usize {
        self.points[idx][1].floor().max(0.0) as usize
    }
}

#[derive(Clone, Debug, Default)]
pub struct CollectResult {
    /// Indexed top, bottom, upstream, downstream.
    pub hits: [BoundaryHits; 4],
    pub total_combos: usize,
    pub elapsed_ms: f64,
}

/// Scan every row for per-plane column combinations matching a boundary.
///
/// Each matcher is run independently (tight then loose) and their combos
/// are pooled. A combination is kept when fewer than two of its pixels are
/// bad channels and the mean charge of the contributing planes exceeds the
/// plane-0 threshold.
pub fn collect_candidates<G: WireGeometry + ?Sized>(
    images: &[PlaneImage],
    badch: &[PlaneImage],
    matchers: &[&dyn BoundaryMatcher],
    geometry: &G,
    options: &BoundaryOptions,
) -> Result<CollectResult> {
    let start = Instant::now();
    let nplanes = images.len();
    if nplanes != 3 || geometry.num_planes() != 3 {
        return Err(TrackerError::configuration(format!(
            "boundary search needs exactly 3 planes (images={nplanes}, geometry={})",
            geometry.num_planes()
        )));
    }
    if badch.len() != nplanes {
        return Err(TrackerError::BadInputShape {
            what: "bad-channel image planes",
            expected: nplanes,
            found: badch.len(),
        });
    }
    options.check_planes(nplanes)?;

    let reach: Vec<usize> = images
        .iter()
        .enumerate()
        .map(|(p, img)| options.column_reach(p, img.meta().pixel_width, 1.0))
        .collect();
    let mut rng = StdRng::seed_from_u64(options.jitter_seed);
    let mut out = CollectResult::default();
    let mut col_hits: Vec<Vec<bool>> = images.iter().map(|img| vec![false; img.meta().cols]).collect();
    let mut wire_hits: Vec<Vec<bool>> = (0..nplanes).map(|p| vec![false; geometry.num_wires(p)]).collect();
    let mut matched: [Vec<BoundaryCombo>; 4] = Default::default();
    let rows = images[0].meta().rows;

    for r in 0..rows {
        let mut any_plane_empty = false;
        for p in 0..nplanes {
            mark_row_hits(
                &images[p],
                &badch[p],
                r,
                options.thresholds[p],
                reach[p],
                options.hitsearch_uses_badchs,
                &mut col_hits[p],
            );
            columns_to_wires(&images[p], &col_hits[p], &mut wire_hits[p]);
            any_plane_empty |= !col_hits[p].iter().any(|&h| h);
        }
        if any_plane_empty {
            continue;
        }

        matched.iter_mut().for_each(Vec::clear);
        for matcher in matchers {
            matcher.find_combos(&wire_hits, &mut matched);
        }

        for (slot, combos) in matched.iter().enumerate() {
            let boundary = BoundaryType::CROSSINGS[slot];
            for combo in combos {
                let Some(cols) = combo_columns(images, combo) else {
                    continue;
                };
                let nbad = (0..nplanes).filter(|&p| badch[p].pixel(r, cols[p]) > 0.0).count();
                if nbad >= 2 {
                    continue;
                }
                let charge: f32 = (0..nplanes)
                    .filter(|&p| {
                        images[p].pixel(r, cols[p]) > options.thresholds[p] || badch[p].pixel(r, cols[p]) > 0.0
                    })
                    .map(|p| images[p].pixel(r, cols[p]))
                    .sum::<f32>()
                    / (nplanes - nbad) as f32;
                if charge <= options.thresholds[0] {
                    continue;
                }
                let jitter = options.jitter_scale * rng.random::<f32>();
                let lateral = geometry.volume().face_coordinate(boundary, combo.y, combo.z);
                let hits = &mut out.hits[slot];
                hits.points.push([lateral, r as f32 + jitter]);
                hits.cols.push(cols);
                out.total_combos += 1;
            }
        }
    }

    out.elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;
    debug!(
        "collect_candidates rows={} combos={} (top={} bottom={} upstream={} downstream={}) elapsed={:.3}ms",
        rows,
        out.total_combos,
        out.hits[0].len(),
        out.hits[1].len(),
        out.hits[2].len(),
        out.hits[3].len(),
        out.elapsed_ms
    );
    Ok(out)
}

/// Fill `hits` for row `r`: charge columns dilated by `reach` columns, plus
/// bad channels when `use_badch` is set.
pub(super) fn mark_row_hits(
    img: &PlaneImage,
    bad: &PlaneImage,
    r: usize,
    threshold: f32,
    reach: usize,
    use_badch: bool,
    hits: &mut [bool],
) {
    hits.iter_mut().for_each(|h| *h = false);
    let ncols = hits.len();
    let bad_row = bad.row(r);
    for (c, &v) in img.row(r).iter().enumerate() {
        if v > threshold {
            let lo = c.saturating_sub(reach);
            let hi = (c + reach).min(ncols - 1);
            hits[lo..=hi].iter_mut().for_each(|h| *h = true);
        } else if use_badch && bad_row[c] > 0.0 {
            hits[c] = true;
        }
    }
}

/// Expand column hits to the wires each column spans.
fn columns_to_wires(img: &PlaneImage, col_hits: &[bool], wire_hits: &mut [bool]) {
    wire_hits.iter_mut().for_each(|h| *h = false);
    let meta = img.meta();
    let nwires = wire_hits.len();
    for c in (0..col_hits.len()).filter(|&c| col_hits[c]) {
        let w0 = meta.pos_x(c).max(0.0) as usize;
        let w1 = (meta.pos_x(c + 1).ceil() as usize).min(nwires);
        for w in w0..w1 {
            wire_hits[w] = true;
        }
    }
}

fn combo_columns(images: &[PlaneImage], combo: &BoundaryCombo) -> Option<[usize; 3]> {
    let mut cols = [0usize; 3];
    for (p, col) in cols.iter_mut().enumerate() {
        *col = images[p].meta().col(combo.wires[p] as f32)?;
    }
    Some(cols)
}
