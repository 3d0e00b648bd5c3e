//! Coordinate metadata attached to every plane image.
//!
//! Columns map to wire numbers and rows map to readout ticks. Both axes are
//! uniform: column `c` spans wires `[origin_wire + c*pixel_width,
//! origin_wire + (c+1)*pixel_width)` and row `r` spans ticks likewise.
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageMeta {
    /// Readout plane index.
    pub plane: usize,
    pub rows: usize,
    pub cols: usize,
    /// Wire number at the left edge of column 0.
    pub origin_wire: f32,
    /// Tick at the top edge of row 0.
    pub origin_tick: f32,
    /// Wires per column.
    pub pixel_width: f32,
    /// Ticks per row.
    pub pixel_height: f32,
}

impl ImageMeta {
    /// Unit-pitch meta: one wire per column, one tick per row.
    pub fn new(plane: usize, rows: usize, cols: usize, origin_tick: f32) -> Self {
        Self {
            plane,
            rows,
            cols,
            origin_wire: 0.0,
            origin_tick,
            pixel_width: 1.0,
            pixel_height: 1.0,
        }
    }

    pub fn with_pixel_size(mut self, pixel_width: f32, pixel_height: f32) -> Self {
        self.pixel_width = pixel_width;
        self.pixel_height = pixel_height;
        self
    }

    #[inline]
    pub fn pos_x(&self, col: usize) -> f32 {
        self.origin_wire + col as f32 * self.pixel_width
    }

    #[inline]
    pub fn pos_y(&self, row: usize) -> f32 {
        self.origin_tick + row as f32 * self.pixel_height
    }

    /// Central wire of column `col`.
    #[inline]
    pub fn wire_center(&self, col: usize) -> f32 {
        self.pos_x(col) + 0.5 * (self.pixel_width - 1.0)
    }

    /// Tick at the middle of row `row`.
    #[inline]
    pub fn tick_center(&self, row: usize) -> f32 {
        self.pos_y(row) + 0.5 * self.pixel_height
    }

    pub fn max_x(&self) -> f32 {
        self.pos_x(self.cols)
    }

    pub fn max_y(&self) -> f32 {
        self.pos_y(self.rows)
    }

    /// Column holding `wire`, or `None` outside the image.
    pub fn col(&self, wire: f32) -> Option<usize> {
        axis_index(wire, self.origin_wire, self.pixel_width, self.cols)
    }

    /// Row holding `tick`, or `None` outside the image.
    pub fn row(&self, tick: f32) -> Option<usize> {
        axis_index(tick, self.origin_tick, self.pixel_height, self.rows)
    }

    /// Like [`Self::col`] but clamped to the image edges.
    pub fn col_clamped(&self, wire: f32) -> usize {
        clamped_index(wire, self.origin_wire, self.pixel_width, self.cols)
    }

    /// Like [`Self::row`] but clamped to the image edges.
    pub fn row_clamped(&self, tick: f32) -> usize {
        clamped_index(tick, self.origin_tick, self.pixel_height, self.rows)
    }

    /// Meta of the image obtained by merging `factor × factor` pixel blocks.
    pub fn compressed(&self, factor: usize) -> Self {
        let factor = factor.max(1);
        Self {
            plane: self.plane,
            rows: self.rows.div_ceil(factor),
            cols: self.cols.div_ceil(factor),
            origin_wire: self.origin_wire,
            origin_tick: self.origin_tick,
            pixel_width: self.pixel_width * factor as f32,
            pixel_height: self.pixel_height * factor as f32,
        }
    }

    /// Same row axis (count, origin and pitch) as `other`.
    pub fn shares_rows(&self, other: &ImageMeta) -> bool {
        self.rows == other.rows
            && (self.origin_tick - other.origin_tick).abs() < 1e-3
            && (self.pixel_height - other.pixel_height).abs() < 1e-6
    }
}

fn axis_index(value: f32, origin: f32, pitch: f32, len: usize) -> Option<usize> {
    if !value.is_finite() || pitch <= 0.0 {
        return None;
    }
    let idx = ((value - origin) / pitch).floor();
    if idx < 0.0 || idx >= len as f32 {
        return None;
    }
    Some(idx as usize)
}

fn clamped_index(value: f32, origin: f32, pitch: f32, len: usize) -> usize {
    if len == 0 || pitch <= 0.0 || value.is_nan() {
        return 0;
    }
    let idx = ((value - origin) / pitch).floor();
    idx.clamp(0.0, (len - 1) as f32) as usize
}
