//! Accepted through-going track and its image footprint.
use super::combo::PairKey;
use crate::astar::PathNode;
use crate::error::{Result, TrackerError};
use crate::geometry::{DriftModel, WireGeometry};
use crate::image::{ImageMeta, ImageView, ImageViewMut, PlaneImage};
use crate::linear::PointInfoList;
use crate::types::{BoundarySpacePoint, BoundaryType, PixelPos};
use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum TrackAlgorithm {
    Linear,
    AStar,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Track3D {
    /// Indices into the endpoint list.
    pub start_index: usize,
    pub end_index: usize,
    pub start_type: BoundaryType,
    pub end_type: BoundaryType,
    pub row_start: usize,
    pub row_end: usize,
    pub tick_start: f32,
    pub tick_end: f32,
    pub start3d: [f32; 3],
    pub end3d: [f32; 3],
    /// `[x, y, z]` polyline, start to end.
    pub path3d: Vec<[f32; 3]>,
    /// Full-resolution pixel path per plane.
    pub plane_paths: Vec<Vec<PixelPos>>,
    pub algorithm: TrackAlgorithm,
    pub pass: usize,
}

impl Track3D {
    fn skeleton(
        key: PairKey,
        a: &BoundarySpacePoint,
        b: &BoundarySpacePoint,
        meta: &ImageMeta,
        algorithm: TrackAlgorithm,
        pass: usize,
    ) -> Self {
        Self {
            start_index: key.first,
            end_index: key.second,
            start_type: a.boundary(),
            end_type: b.boundary(),
            row_start: a.row(),
            row_end: b.row(),
            tick_start: a.tick(meta),
            tick_end: b.tick(meta),
            start3d: [0.0; 3],
            end3d: [0.0; 3],
            path3d: Vec::new(),
            plane_paths: Vec::new(),
            algorithm,
            pass,
        }
    }

    /// Track made of the samples of an accepted straight trace.
    pub fn from_linear(
        key: PairKey,
        a: &BoundarySpacePoint,
        b: &BoundarySpacePoint,
        meta: &ImageMeta,
        trace: &PointInfoList,
        pass: usize,
    ) -> Self {
        let mut track = Self::skeleton(key, a, b, meta, TrackAlgorithm::Linear, pass);
        let nplanes = a.cols().len();
        track.path3d = trace.points.iter().map(|p| p.xyz).collect();
        track.plane_paths = (0..nplanes)
            .map(|plane| {
                trace
                    .points
                    .iter()
                    .map(|p| PixelPos {
                        row: p.row,
                        col: p.cols[plane],
                    })
                    .collect()
            })
            .collect();
        track.set_ends();
        track
    }

    /// Track from a lattice path, mapped onto the full-resolution images.
    ///
    /// Lattice nodes at the edge of the search box may fall slightly
    /// outside the images; their pixels are clamped to the edges.
    #[allow(clippy::too_many_arguments)]
    pub fn from_lattice_path<G: WireGeometry + ?Sized>(
        key: PairKey,
        a: &BoundarySpacePoint,
        b: &BoundarySpacePoint,
        images: &[PlaneImage],
        path: &[PathNode],
        geometry: &G,
        drift: &DriftModel,
        pass: usize,
    ) -> Result<Self> {
        let meta0 = images
            .first()
            .map(|img| img.meta())
            .ok_or_else(|| TrackerError::configuration("no image planes"))?;
        let mut track = Self::skeleton(key, a, b, meta0, TrackAlgorithm::AStar, pass);
        track.path3d = path.iter().map(|n| n.position).collect();
        track.plane_paths = images
            .iter()
            .enumerate()
            .map(|(p, img)| {
                let meta = img.meta();
                let mut pixels: Vec<PixelPos> = Vec::with_capacity(path.len());
                for node in path {
                    let [x, y, z] = node.position;
                    let px = PixelPos {
                        row: meta.row_clamped(drift.x_to_tick(x)),
                        col: meta.col_clamped(geometry.wire_coordinate(y, z, p).round()),
                    };
                    if pixels.last() != Some(&px) {
                        pixels.push(px);
                    }
                }
                pixels
            })
            .collect();
        track.set_ends();
        Ok(track)
    }

    fn set_ends(&mut self) {
        if let (Some(&first), Some(&last)) = (self.path3d.first(), self.path3d.last()) {
            self.start3d = first;
            self.end3d = last;
        }
    }

    pub fn pair(&self) -> PairKey {
        PairKey::new(self.start_index, self.end_index)
    }

    /// Straight-line distance between the ends (cm).
    pub fn length(&self) -> f32 {
        (0..3)
            .map(|i| (self.end3d[i] - self.start3d[i]).powi(2))
            .sum::<f32>()
            .sqrt()
    }

    /// Set to 255 every charged or bad-channel pixel within `neighborhood`
    /// of the track's pixel path.
    pub fn mark_image(
        &self,
        images: &[PlaneImage],
        badch: &[PlaneImage],
        thresholds: &[f32],
        neighborhood: usize,
        tagged: &mut [PlaneImage],
    ) {
        for (p, path) in self.plane_paths.iter().enumerate() {
            let (Some(img), Some(bad), Some(out)) = (images.get(p), badch.get(p), tagged.get_mut(p)) else {
                continue;
            };
            let threshold = thresholds.get(p).copied().unwrap_or(0.0);
            let meta = img.meta();
            if meta.rows == 0 || meta.cols == 0 {
                continue;
            }
            for px in path {
                let r0 = px.row.saturating_sub(neighborhood);
                let r1 = (px.row + neighborhood).min(meta.rows - 1);
                let c0 = px.col.saturating_sub(neighborhood);
                let c1 = (px.col + neighborhood).min(meta.cols - 1);
                for r in r0..=r1 {
                    for c in c0..=c1 {
                        if img.pixel(r, c) > threshold || bad.pixel(r, c) > 0.0 {
                            out.set_pixel(r, c, 255.0);
                        }
                    }
                }
            }
        }
    }
}

/// Mark the tracks selected by `goodlist` (all when `None`).
pub fn mark_tracks(
    tracks: &[Track3D],
    goodlist: Option<&[bool]>,
    images: &[PlaneImage],
    badch: &[PlaneImage],
    thresholds: &[f32],
    neighborhood: usize,
    tagged: &mut [PlaneImage],
) -> usize {
    let mut marked = 0;
    for (i, track) in tracks.iter().enumerate() {
        if goodlist.is_some_and(|g| !g.get(i).copied().unwrap_or(false)) {
            continue;
        }
        track.mark_image(images, badch, thresholds, neighborhood, tagged);
        marked += 1;
    }
    marked
}
