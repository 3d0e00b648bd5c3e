use crate::geometry::DriftModel;
use crate::image::ImageMeta;
use serde::Serialize;

/// Detector face a muon enters or leaves through.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BoundaryType {
    Top,
    Bottom,
    Upstream,
    Downstream,
    Anode,
    Cathode,
}

impl BoundaryType {
    /// Faces found by the image-space boundary search.
    pub const CROSSINGS: [BoundaryType; 4] = [
        BoundaryType::Top,
        BoundaryType::Bottom,
        BoundaryType::Upstream,
        BoundaryType::Downstream,
    ];

    /// Slot in per-crossing arrays; `None` for anode/cathode.
    pub fn crossing_index(self) -> Option<usize> {
        match self {
            BoundaryType::Top => Some(0),
            BoundaryType::Bottom => Some(1),
            BoundaryType::Upstream => Some(2),
            BoundaryType::Downstream => Some(3),
            BoundaryType::Anode | BoundaryType::Cathode => None,
        }
    }
}

/// Pixel in (row, col) order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct PixelPos {
    pub row: usize,
    pub col: usize,
}

/// One pixel per plane, all on the same row.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoundaryEndPoint {
    pub boundary: BoundaryType,
    pub row: usize,
    pub cols: Vec<usize>,
}

impl BoundaryEndPoint {
    pub fn new(boundary: BoundaryType, row: usize, cols: Vec<usize>) -> Self {
        Self { boundary, row, cols }
    }

    pub fn pixel(&self, plane: usize) -> PixelPos {
        PixelPos {
            row: self.row,
            col: self.cols[plane],
        }
    }

    pub fn num_planes(&self) -> usize {
        self.cols.len()
    }
}

/// Boundary endpoint resolved to a detector `(y, z)` position.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoundarySpacePoint {
    pub endpoint: BoundaryEndPoint,
    pub y: f32,
    pub z: f32,
}

impl BoundarySpacePoint {
    pub fn new(endpoint: BoundaryEndPoint, y: f32, z: f32) -> Self {
        Self { endpoint, y, z }
    }

    pub fn boundary(&self) -> BoundaryType {
        self.endpoint.boundary
    }

    pub fn row(&self) -> usize {
        self.endpoint.row
    }

    pub fn cols(&self) -> &[usize] {
        &self.endpoint.cols
    }

    pub fn tick(&self, meta: &ImageMeta) -> f32 {
        meta.tick_center(self.endpoint.row)
    }

    /// `[x, y, z]`, with `x` taken from the row through the drift model.
    pub fn position(&self, meta: &ImageMeta, drift: &DriftModel) -> [f32; 3] {
        [drift.tick_to_x(self.tick(meta)), self.y, self.z]
    }
}
