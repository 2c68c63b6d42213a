//! # Layers
//!
//! The four layers of the canvas, bottom to top: the source image, the autoseg hint, the label, and
//! the brush cursor. Each owns its own state and knows how to draw itself onto a target buffer.

use crate::blend::{self, Opacity};
use crate::color::Color;
use crate::mask::MaskIndex;
use crate::raster::{PaintMode, RasterBuffer};
use crate::util::{Pixel, PixelRect, Point};

/// Something which can be composited onto a buffer the size of the image.
pub trait Drawable {
    fn render(&self, target: &mut RasterBuffer);
}

/// Blend every pixel of `source` over `target` at the given opacity. Sizes must match, else this
/// draws nothing.
fn blend_onto(source: &RasterBuffer, opacity: Opacity, target: &mut RasterBuffer) {
    if source.size() != target.size() || opacity == Opacity::TRANSPARENT {
        return;
    }
    for (dst, &src) in target.pixels_mut().iter_mut().zip(source.pixels()) {
        blend::over(dst, src, opacity);
    }
}

#[derive(Debug, Default)]
pub struct ImageLayer {
    pub raster: RasterBuffer,
}
impl Drawable for ImageLayer {
    fn render(&self, target: &mut RasterBuffer) {
        blend_onto(&self.raster, Opacity::OPAQUE, target);
    }
}

/// The annotation being produced.
#[derive(Debug)]
pub struct LabelLayer {
    pub raster: RasterBuffer,
    pub opacity: Opacity,
}
impl Default for LabelLayer {
    fn default() -> Self {
        Self {
            raster: RasterBuffer::default(),
            opacity: Opacity::HALF,
        }
    }
}
impl LabelLayer {
    /// Paint pixels found by an autoseg query.
    pub fn apply_hits(&mut self, hits: &[Pixel], color: Color) {
        self.raster.paint_points(hits, color, PaintMode::Paint);
    }
}
impl Drawable for LabelLayer {
    fn render(&self, target: &mut RasterBuffer) {
        blend_onto(&self.raster, self.opacity, target);
    }
}

/// The binarized mask, both as a viewable hint and as the queryable index.
#[derive(Debug)]
pub struct AutosegLayer {
    pub raster: RasterBuffer,
    /// None until a mask has been loaded for the current sample.
    pub mask: Option<MaskIndex>,
    pub opacity: Opacity,
}
impl Default for AutosegLayer {
    fn default() -> Self {
        Self {
            raster: RasterBuffer::default(),
            mask: None,
            opacity: Opacity::TRANSPARENT,
        }
    }
}
impl AutosegLayer {
    /// Replace the hint, rebuilding the index from its red channel.
    pub fn set_hint(&mut self, raster: RasterBuffer) {
        self.mask = Some(MaskIndex::from_raster(&raster, 0));
        self.raster = raster;
    }
    /// Drop the hint and index, leaving a transparent buffer of the given size.
    pub fn reset(&mut self, size: [u32; 2]) {
        self.raster.resize(size[0], size[1]);
        self.raster.clear();
        self.mask = None;
    }
    #[must_use]
    pub fn has_mask(&self) -> bool {
        self.mask.as_ref().is_some_and(|mask| !mask.is_empty())
    }
}
impl Drawable for AutosegLayer {
    fn render(&self, target: &mut RasterBuffer) {
        blend_onto(&self.raster, self.opacity, target);
    }
}

/// Outline of the brush, following the pointer.
#[derive(Debug, Clone, PartialEq)]
pub struct CursorLayer {
    /// None while the pointer is outside the canvas.
    pub position: Option<Point>,
    pub diameter: u32,
    pub border: Color,
}
impl Default for CursorLayer {
    fn default() -> Self {
        Self {
            position: None,
            diameter: crate::brush::Diameter::DEFAULT.get(),
            border: Color::BLACK,
        }
    }
}
impl Drawable for CursorLayer {
    /// A one-pixel ring at the brush radius.
    fn render(&self, target: &mut RasterBuffer) {
        let Some(center) = self.position else {
            return;
        };
        let radius = self.diameter as f32 / 2.0;
        let outer = radius + 0.5;
        let inner = (radius - 0.5).max(0.0);
        let Some(bounds) = PixelRect::clipped(
            [center[0] - outer, center[1] - outer],
            [center[0] + outer, center[1] + outer],
            target.size(),
        ) else {
            return;
        };
        let border = self.border.opaque();
        for pixel in bounds.iter() {
            let dist_sq = crate::util::distance_sq([pixel[0] as f32, pixel[1] as f32], center);
            if dist_sq <= outer * outer && dist_sq >= inner * inner {
                target.set(pixel, border);
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::{CursorLayer, Drawable, LabelLayer};
    use crate::blend::Opacity;
    use crate::color::Color;
    use crate::raster::RasterBuffer;

    #[test]
    fn label_blends_at_opacity() {
        let mut label = LabelLayer {
            raster: RasterBuffer::new(2, 1),
            opacity: Opacity::HALF,
        };
        label.apply_hits(&[[0, 0]], Color::WHITE);

        let mut target = RasterBuffer::new(2, 1);
        target.pixels_mut().fill(Color::BLACK);
        label.render(&mut target);
        assert_eq!(target.get([0, 0]), Some(Color::rgb(128, 128, 128)));
        assert_eq!(target.get([1, 0]), Some(Color::BLACK));
    }

    #[test]
    fn mismatched_layer_draws_nothing() {
        let label = LabelLayer {
            raster: RasterBuffer::new(3, 3),
            opacity: Opacity::OPAQUE,
        };
        let mut target = RasterBuffer::new(2, 2);
        label.render(&mut target);
        assert_eq!(target.count_opaque(), 0);
    }

    #[test]
    fn cursor_ring() {
        let cursor = CursorLayer {
            position: Some([10.0, 10.0]),
            diameter: 10,
            border: Color::rgb(255, 0, 0),
        };
        let mut target = RasterBuffer::new(21, 21);
        cursor.render(&mut target);
        // On the ring, not inside.
        assert_eq!(target.get([15, 10]), Some(Color::rgb(255, 0, 0)));
        assert_eq!(target.get([10, 5]), Some(Color::rgb(255, 0, 0)));
        assert_eq!(target.get([10, 10]), Some(Color::TRANSPARENT));
        assert_eq!(target.get([0, 0]), Some(Color::TRANSPARENT));

        let hidden = CursorLayer {
            position: None,
            ..cursor
        };
        let mut target = RasterBuffer::new(21, 21);
        hidden.render(&mut target);
        assert_eq!(target.count_opaque(), 0);
    }
}
