//! # Raster buffers
//!
//! Fixed-size RGBA8 pixel grids. These back the label layer and the autoseg hint layer, and are
//! the unit of persistence - one lossless PNG per buffer.

use crate::color::Color;
use crate::util::{Pixel, PixelRect, Point};

/// Smallest reach of a capsule, in pixels. Just over half a pixel diagonal, so a single-pixel brush
/// placed anywhere still covers the pixel nearest to it.
pub const MIN_CAPSULE_RADIUS: f32 = 0.71;

#[derive(thiserror::Error, Debug)]
pub enum RasterError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Image(#[from] image::ImageError),
    #[error("expected a {expected:?} image, found {found:?}")]
    SizeMismatch { expected: [u32; 2], found: [u32; 2] },
}

/// Whether a paint operation deposits color or clears it.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default, strum::AsRefStr, strum::EnumIter)]
pub enum PaintMode {
    #[default]
    Paint,
    Erase,
}
impl PaintMode {
    #[must_use]
    pub fn is_erase(self) -> bool {
        matches!(self, Self::Erase)
    }
    /// The value written into covered pixels.
    fn ink(self, color: Color) -> Color {
        match self {
            Self::Paint => color.opaque(),
            // Regardless of color!
            Self::Erase => Color::TRANSPARENT,
        }
    }
}

#[derive(Clone, Default)]
pub struct RasterBuffer {
    width: u32,
    height: u32,
    /// Row-major, `width * height` long.
    pixels: Vec<Color>,
    /// Set on every mutation, cleared by [`RasterBuffer::take_dirty`].
    dirty: bool,
}
impl std::fmt::Debug for RasterBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RasterBuffer")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("dirty", &self.dirty)
            .finish_non_exhaustive()
    }
}
impl RasterBuffer {
    /// A fully transparent buffer of the given size.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Color::TRANSPARENT; width as usize * height as usize],
            dirty: true,
        }
    }
    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }
    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }
    #[must_use]
    pub fn size(&self) -> [u32; 2] {
        [self.width, self.height]
    }
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }
    /// Reallocate to a new size, cleared. Keeps contents if the size is unchanged.
    pub fn resize(&mut self, width: u32, height: u32) {
        if self.size() == [width, height] {
            return;
        }
        *self = Self::new(width, height);
    }
    /// Reset every pixel to transparent, keeping dimensions.
    pub fn clear(&mut self) {
        self.pixels.fill(Color::TRANSPARENT);
        self.dirty = true;
    }
    fn index(&self, [x, y]: Pixel) -> Option<usize> {
        (x < self.width && y < self.height).then(|| y as usize * self.width as usize + x as usize)
    }
    #[must_use]
    pub fn get(&self, pixel: Pixel) -> Option<Color> {
        self.index(pixel).map(|idx| self.pixels[idx])
    }
    pub fn set(&mut self, pixel: Pixel, color: Color) {
        if let Some(idx) = self.index(pixel) {
            self.pixels[idx] = color;
            self.dirty = true;
        }
    }
    #[must_use]
    pub fn pixels(&self) -> &[Color] {
        &self.pixels
    }
    pub fn pixels_mut(&mut self) -> &mut [Color] {
        self.dirty = true;
        &mut self.pixels
    }
    /// Raw RGBA8 bytes, row-major.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }
    /// Returns whether the buffer has changed since the last call, resetting the flag.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }
    /// Number of pixels with nonzero alpha.
    #[must_use]
    pub fn count_opaque(&self) -> usize {
        self.pixels.iter().filter(|px| !px.is_transparent()).count()
    }
    /// Fill a round-capped segment from `from` to `to` of the given diameter.
    ///
    /// Every pixel within `diameter / 2` of the segment is covered. Portions outside the buffer are
    /// clipped.
    pub fn paint_capsule(
        &mut self,
        from: Point,
        to: Point,
        diameter: u32,
        color: Color,
        mode: PaintMode,
    ) {
        let radius = (diameter as f32 / 2.0).max(MIN_CAPSULE_RADIUS);
        let radius_sq = radius * radius;
        let min = [from[0].min(to[0]) - radius, from[1].min(to[1]) - radius];
        let max = [from[0].max(to[0]) + radius, from[1].max(to[1]) + radius];
        let Some(bounds) = PixelRect::clipped(min, max, self.size()) else {
            return;
        };

        let ink = mode.ink(color);
        let width = self.width as usize;
        for [x, y] in bounds.iter() {
            let sample = [x as f32, y as f32];
            if crate::util::segment_distance_sq(sample, from, to) <= radius_sq {
                self.pixels[y as usize * width + x as usize] = ink;
            }
        }
        self.dirty = true;
    }
    /// Set each of the given single pixels. Out-of-bounds pixels are skipped.
    pub fn paint_points(&mut self, points: &[Pixel], color: Color, mode: PaintMode) {
        if points.is_empty() {
            return;
        }
        let ink = mode.ink(color);
        for &point in points {
            if let Some(idx) = self.index(point) {
                self.pixels[idx] = ink;
            }
        }
        self.dirty = true;
    }
    /// Build from decoded image data, converting to RGBA8.
    #[must_use]
    pub fn from_image(image: &image::DynamicImage) -> Self {
        let rgba = image.to_rgba8();
        let (width, height) = rgba.dimensions();
        Self {
            width,
            height,
            pixels: bytemuck::cast_slice(rgba.as_raw()).to_vec(),
            dirty: true,
        }
    }
    /// Read a whole image file into a new buffer.
    /// # Errors
    /// Forwards any I/O or decode error.
    pub fn open(path: &std::path::Path) -> Result<Self, RasterError> {
        Ok(Self::from_image(&image::open(path)?))
    }
    /// Replace the contents with those of an image file of the same dimensions.
    /// On error, `self` is not modified.
    /// # Errors
    /// Forwards I/O and decode errors, or [`RasterError::SizeMismatch`] if the file's dimensions
    /// differ from the buffer's.
    pub fn load_from(&mut self, path: &std::path::Path) -> Result<(), RasterError> {
        let loaded = Self::open(path)?;
        if loaded.size() != self.size() {
            return Err(RasterError::SizeMismatch {
                expected: self.size(),
                found: loaded.size(),
            });
        }
        self.pixels = loaded.pixels;
        self.dirty = true;
        Ok(())
    }
    /// Write the buffer to `path` as an RGBA PNG.
    /// # Errors
    /// Forwards any I/O or encode error.
    pub fn save_to(&self, path: &std::path::Path) -> Result<(), RasterError> {
        image::save_buffer_with_format(
            path,
            self.as_bytes(),
            self.width,
            self.height,
            image::ExtendedColorType::Rgba8,
            image::ImageFormat::Png,
        )?;
        log::debug!("saved {}x{} raster to {path:?}", self.width, self.height);
        Ok(())
    }
}
