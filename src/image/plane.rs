//! Owned per-plane image with coordinate metadata.
//!
//! Charge images, bad-channel images and tagged-pixel images all use this
//! type. Bad-channel and tagged images follow the convention that any value
//! `> 0` marks the pixel.
use super::traits::{ImageView, ImageViewMut};
use super::ImageMeta;
use crate::error::{Result, TrackerError};
use serde::Deserialize;

/// How pixel blocks are merged when downsampling.
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CompressionMode {
    Sum,
    Average,
    /// Keeps per-pixel thresholds meaningful after compression.
    #[default]
    Max,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PlaneImage {
    meta: ImageMeta,
    data: Vec<f32>,
}

impl PlaneImage {
    /// Zero-filled image described by `meta`.
    pub fn new(meta: ImageMeta) -> Self {
        let len = meta.rows * meta.cols;
        Self {
            meta,
            data: vec![0.0; len],
        }
    }

    /// Wrap row-major `data` (length `rows*cols`).
    pub fn from_data(meta: ImageMeta, data: Vec<f32>) -> Result<Self> {
        let expected = meta.rows * meta.cols;
        if data.len() != expected {
            return Err(TrackerError::BadInputShape {
                what: "plane image buffer",
                expected,
                found: data.len(),
            });
        }
        Ok(Self { meta, data })
    }

    /// Blank image with the same geometry as `self`.
    pub fn blank_like(&self) -> Self {
        Self::new(self.meta.clone())
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    pub fn paint(&mut self, v: f32) {
        self.data.iter_mut().for_each(|px| *px = v);
    }

    /// Pixel at signed coordinates, `None` outside the image.
    pub fn get(&self, r: i64, c: i64) -> Option<f32> {
        if r < 0 || c < 0 || r as usize >= self.meta.rows || c as usize >= self.meta.cols {
            return None;
        }
        Some(self.data[r as usize * self.meta.cols + c as usize])
    }

    /// Downsample by merging `factor × factor` blocks.
    ///
    /// Trailing partial blocks are kept; the output has `ceil(rows/factor)`
    /// rows and `ceil(cols/factor)` columns.
    pub fn compress(&self, factor: usize, mode: CompressionMode) -> Self {
        let factor = factor.max(1);
        let meta = self.meta.compressed(factor);
        let mut out = PlaneImage::new(meta);
        let mut counts = vec![0u32; out.data.len()];
        let ocols = out.meta.cols;
        for (r, src_row) in self.rows().enumerate() {
            let orow = r / factor;
            for (c, &v) in src_row.iter().enumerate() {
                let i = orow * ocols + c / factor;
                let dst = &mut out.data[i];
                match mode {
                    CompressionMode::Sum | CompressionMode::Average => *dst += v,
                    CompressionMode::Max => {
                        if counts[i] == 0 || v > *dst {
                            *dst = v;
                        }
                    }
                }
                counts[i] += 1;
            }
        }
        if mode == CompressionMode::Average {
            for (px, &n) in out.data.iter_mut().zip(&counts) {
                if n > 0 {
                    *px /= n as f32;
                }
            }
        }
        out
    }

    /// Pixel-wise `self += other`; both images must share a shape.
    pub fn accumulate(&mut self, other: &PlaneImage) -> Result<()> {
        if self.data.len() != other.data.len() {
            return Err(TrackerError::BadInputShape {
                what: "accumulated image",
                expected: self.data.len(),
                found: other.data.len(),
            });
        }
        for (dst, &src) in self.data.iter_mut().zip(&other.data) {
            *dst += src;
        }
        Ok(())
    }

    /// Replace values `< threshold` with `below` and the rest with `above`.
    pub fn binary_threshold(&mut self, threshold: f32, below: f32, above: f32) {
        for px in self.data.iter_mut() {
            *px = if *px < threshold { below } else { above };
        }
    }

    pub fn count_above(&self, threshold: f32) -> usize {
        self.data.iter().filter(|&&v| v > threshold).count()
    }
}

impl ImageView for PlaneImage {
    #[inline]
    fn meta(&self) -> &ImageMeta {
        &self.meta
    }

    #[inline]
    fn row(&self, r: usize) -> &[f32] {
        let start = r * self.meta.cols;
        &self.data[start..start + self.meta.cols]
    }
}

impl ImageViewMut for PlaneImage {
    #[inline]
    fn row_mut(&mut self, r: usize) -> &mut [f32] {
        let start = r * self.meta.cols;
        &mut self.data[start..start + self.meta.cols]
    }
}

/// Check that charge and bad-channel image sets describe the same planes.
///
/// Every plane must share the row axis of plane 0 and each bad-channel image
/// must match its charge image pixel for pixel.
pub fn validate_plane_set(images: &[PlaneImage], badch: &[PlaneImage], nplanes: usize) -> Result<()> {
    if images.len() != nplanes {
        return Err(TrackerError::BadInputShape {
            what: "charge image planes",
            expected: nplanes,
            found: images.len(),
        });
    }
    if badch.len() != images.len() {
        return Err(TrackerError::BadInputShape {
            what: "bad-channel image planes",
            expected: images.len(),
            found: badch.len(),
        });
    }
    let Some(first) = images.first() else {
        return Ok(());
    };
    let reference = first.meta();
    for (img, bad) in images.iter().zip(badch) {
        if !img.meta().shares_rows(reference) {
            return Err(TrackerError::BadInputShape {
                what: "image rows",
                expected: reference.rows,
                found: img.meta().rows,
            });
        }
        if bad.meta().rows != img.meta().rows || bad.meta().cols != img.meta().cols {
            return Err(TrackerError::BadInputShape {
                what: "bad-channel image pixels",
                expected: img.meta().rows * img.meta().cols,
                found: bad.meta().rows * bad.meta().cols,
            });
        }
    }
    Ok(())
}
