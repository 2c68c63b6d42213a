//! # Mask index
//!
//! A binary foreground/background grid derived by thresholding an image's intensity. Autoseg assist
//! correlates the brush against this grid, so queries must stay proportional to the brush area.

use crate::raster::RasterBuffer;
use crate::util::{Pixel, PixelRect, Point};

/// Intensities strictly above this are foreground, unless configured otherwise.
pub const DEFAULT_THRESHOLD: u8 = 190;

#[derive(thiserror::Error, Debug)]
pub enum MaskError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Image(#[from] image::ImageError),
    #[error("source image has zero area")]
    Empty,
}

/// Read-only occupancy grid. The default value is unbuilt, and answers every query with nothing.
#[derive(Clone, Default)]
pub struct MaskIndex {
    width: u32,
    height: u32,
    /// Row-major occupancy, one bit per pixel.
    occupancy: bitvec::vec::BitVec,
}
impl std::fmt::Debug for MaskIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MaskIndex")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("foreground", &self.count_foreground())
            .finish()
    }
}
impl MaskIndex {
    /// Classify each pixel of `image` as foreground if its luma exceeds `threshold`.
    #[must_use]
    pub fn build(image: &image::DynamicImage, threshold: u8) -> Self {
        let luma = image.to_luma8();
        let (width, height) = luma.dimensions();
        Self {
            width,
            height,
            occupancy: luma.as_raw().iter().map(|&v| v > threshold).collect(),
        }
    }
    /// Take foreground as any pixel with a nonzero `channel` (0 = red) in an already-binarized
    /// raster, such as a loaded autoseg hint.
    ///
    /// # Panics
    /// if `channel` is not in `0..4`
    #[must_use]
    pub fn from_raster(raster: &RasterBuffer, channel: usize) -> Self {
        assert!(channel < 4, "RGBA has four channels, got {channel}");
        Self {
            width: raster.width(),
            height: raster.height(),
            occupancy: raster.pixels().iter().map(|px| px.0[channel] != 0).collect(),
        }
    }
    #[must_use]
    pub fn size(&self) -> [u32; 2] {
        [self.width, self.height]
    }
    /// True if unbuilt or zero-sized.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.occupancy.is_empty()
    }
    #[must_use]
    pub fn count_foreground(&self) -> usize {
        self.occupancy.count_ones()
    }
    #[must_use]
    pub fn is_foreground(&self, [x, y]: Pixel) -> bool {
        if x >= self.width || y >= self.height {
            return false;
        }
        self.occupancy[y as usize * self.width as usize + x as usize]
    }
    /// Every foreground pixel, row-major.
    pub fn iter_foreground(&self) -> impl Iterator<Item = Pixel> + '_ {
        let width = self.width as usize;
        self.occupancy
            .iter_ones()
            .map(move |idx| [(idx % width) as u32, (idx / width) as u32])
    }
    /// All foreground pixels within reach of a brush of the given diameter centered at `center`.
    ///
    /// The search is restricted to the box `center ± diameter`, clipped to the image, and a pixel
    /// qualifies if its distance to `center` is at most `floor(diameter / 2) + 1`.
    /// Empty if nothing qualifies or the index is unbuilt.
    #[must_use]
    pub fn query_disk(&self, center: Point, diameter: u32) -> Vec<Pixel> {
        if self.is_empty() || !(center[0].is_finite() && center[1].is_finite()) {
            return Vec::new();
        }
        let reach = (diameter / 2 + 1) as f32;
        let reach_sq = reach * reach;
        let d = diameter as f32;
        let last = [self.width - 1, self.height - 1];
        // Box `center ± d`, inclusive, clipped to the image.
        let mut min = [0u32; 2];
        let mut max = [0u32; 2];
        for axis in 0..2 {
            let lo = (center[axis] - d).ceil().max(0.0);
            let hi = (center[axis] + d).floor();
            if hi < 0.0 || lo > last[axis] as f32 {
                return Vec::new();
            }
            min[axis] = lo as u32;
            max[axis] = (hi as u32).min(last[axis]);
        }
        let bounds = PixelRect { min, max };

        let width = self.width as usize;
        let mut hits = Vec::new();
        for y in bounds.min[1]..=bounds.max[1] {
            let row = y as usize * width;
            let span = &self.occupancy[row + bounds.min[0] as usize..=row + bounds.max[0] as usize];
            for offset in span.iter_ones() {
                let x = bounds.min[0] + offset as u32;
                if crate::util::distance_sq([x as f32, y as f32], center) <= reach_sq {
                    hits.push([x, y]);
                }
            }
        }
        hits
    }
}

/// Convert an image to grayscale and binarize it: `255` where luma exceeds `threshold`, else `0`.
#[must_use]
pub fn binarize(image: &image::DynamicImage, threshold: u8) -> image::GrayImage {
    let mut luma = image.to_luma8();
    for value in luma.iter_mut() {
        *value = if *value > threshold { 255 } else { 0 };
    }
    luma
}

/// Produce the binarized autoseg mask for the image at `image_path`, writing it to `output_path`
/// as a grayscale PNG. Returns the index built from it.
/// # Errors
/// If the source can't be read or decoded, has zero area, or the output can't be written.
/// Nothing is written on a read failure.
pub fn generate(
    image_path: &std::path::Path,
    output_path: &std::path::Path,
    threshold: u8,
) -> Result<MaskIndex, MaskError> {
    let image = image::open(image_path)?;
    if image.width() == 0 || image.height() == 0 {
        return Err(MaskError::Empty);
    }
    let mask = binarize(&image, threshold);
    mask.save_with_format(output_path, image::ImageFormat::Png)?;
    log::debug!("generated mask {output_path:?} from {image_path:?} at threshold {threshold}");

    let (width, height) = mask.dimensions();
    Ok(MaskIndex {
        width,
        height,
        occupancy: mask.as_raw().iter().map(|&v| v != 0).collect(),
    })
}
