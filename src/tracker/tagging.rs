//! Running record of pixels claimed by accepted tracks.
use crate::error::Result;
use crate::image::{CompressionMode, PlaneImage};

/// Full-resolution tagged images owned by the orchestrator.
///
/// Tracks accepted during a pass are painted onto a blank canvas from
/// [`TaggedPixels::pass_canvas`]; the canvas is merged in once the pass is
/// committed so a pass only ever sees the tags of earlier passes.
#[derive(Clone, Debug)]
pub struct TaggedPixels {
    images: Vec<PlaneImage>,
}

impl TaggedPixels {
    pub fn new(like: &[PlaneImage]) -> Self {
        Self {
            images: like.iter().map(PlaneImage::blank_like).collect(),
        }
    }

    pub fn images(&self) -> &[PlaneImage] {
        &self.images
    }

    pub fn into_images(self) -> Vec<PlaneImage> {
        self.images
    }

    pub fn pass_canvas(&self) -> Vec<PlaneImage> {
        self.images.iter().map(PlaneImage::blank_like).collect()
    }

    /// Tags on the lattice search grid.
    pub fn compressed(&self, factor: usize, mode: CompressionMode) -> Vec<PlaneImage> {
        self.images.iter().map(|img| img.compress(factor, mode)).collect()
    }

    /// OR the pass canvas into the running tags, leaving 0/255 images.
    pub fn merge_pass(&mut self, canvas: &[PlaneImage]) -> Result<()> {
        for (tagged, pass) in self.images.iter_mut().zip(canvas) {
            tagged.accumulate(pass)?;
            tagged.binary_threshold(1.0, 0.0, 255.0);
        }
        Ok(())
    }

    pub fn count(&self) -> usize {
        self.images.iter().map(|img| img.count_above(0.0)).sum()
    }
}
