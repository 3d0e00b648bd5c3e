use super::ImageMeta;

/// Read-only access over a dense plane image.
///
/// Rows follow the readout time axis and columns follow the wire axis.
pub trait ImageView {
    fn meta(&self) -> &ImageMeta;

    fn row(&self, r: usize) -> &[f32];

    #[inline]
    fn pixel(&self, r: usize, c: usize) -> f32 {
        self.row(r)[c]
    }

    fn rows(&self) -> Rows<'_, Self>
    where
        Self: Sized,
    {
        Rows { image: self, r: 0 }
    }

    /// True if any pixel in the square window of half-size `radius` around
    /// `(r, c)` satisfies `pred`. The window is clamped to the image.
    fn any_in_window<F>(&self, r: usize, c: usize, radius: usize, pred: F) -> bool
    where
        F: Fn(f32) -> bool,
    {
        let meta = self.meta();
        if meta.rows == 0 || meta.cols == 0 {
            return false;
        }
        let r0 = r.saturating_sub(radius).min(meta.rows - 1);
        let r1 = (r + radius).min(meta.rows - 1);
        let c0 = c.saturating_sub(radius).min(meta.cols - 1);
        let c1 = (c + radius).min(meta.cols - 1);
        (r0..=r1).any(|rr| self.row(rr)[c0..=c1].iter().any(|&v| pred(v)))
    }
}

pub trait ImageViewMut: ImageView {
    fn row_mut(&mut self, r: usize) -> &mut [f32];

    #[inline]
    fn set_pixel(&mut self, r: usize, c: usize, v: f32) {
        self.row_mut(r)[c] = v;
    }
}

pub struct Rows<'a, I: ?Sized + ImageView> {
    image: &'a I,
    r: usize,
}

impl<'a, I: ImageView> Iterator for Rows<'a, I> {
    type Item = &'a [f32];

    fn next(&mut self) -> Option<Self::Item> {
        if self.r >= self.image.meta().rows {
            return None;
        }
        let r = self.r;
        self.r += 1;
        Some(self.image.row(r))
    }
}
