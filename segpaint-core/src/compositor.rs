//! # Stroke compositor
//!
//! Turns a continuous pointer drag into raster operations. Consecutive pointer samples are joined
//! with capsules, so coarse sampling still yields a gap-free stroke. In assist mode the same samples
//! are instead correlated against the mask, and only the mask hits are painted.

use crate::brush::BrushState;
use crate::mask::MaskIndex;
use crate::raster::RasterBuffer;
use crate::util::{Pixel, Point};

/// One segment of a drag, alive only for the duration of a single composite call.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Stroke {
    pub from: Point,
    pub to: Point,
    pub diameter: u32,
}

/// Tracks the trailing endpoint of the gesture in progress.
#[derive(Clone, Debug, Default)]
pub struct Compositor {
    /// Last sample of the current gesture, or None between gestures.
    previous: Option<Point>,
}
impl Compositor {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
    /// Start a gesture at `at`. Both endpoints of the next stroke begin here.
    pub fn begin(&mut self, at: Point) {
        self.previous = Some(at);
    }
    /// End the gesture. Nothing is buffered, so there is nothing to flush.
    pub fn end(&mut self) {
        self.previous = None;
    }
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.previous.is_some()
    }
    /// Advance the gesture to `to`, returning the segment covered.
    /// A move without a preceding [`Compositor::begin`] starts from `to` itself.
    fn advance(&mut self, to: Point, diameter: u32) -> Stroke {
        let from = self.previous.replace(to).unwrap_or(to);
        Stroke { from, to, diameter }
    }
    /// Paint (or erase, according to `brush`) the capsule from the previous sample to `to`.
    pub fn paint_segment(
        &mut self,
        to: Point,
        brush: &BrushState,
        target: &mut RasterBuffer,
    ) -> Stroke {
        let stroke = self.advance(to, brush.diameter.get());
        target.paint_capsule(stroke.from, stroke.to, stroke.diameter, brush.color, brush.mode);
        stroke
    }
    /// Find mask pixels under the brush at `to`. Nothing is painted - the caller routes the hits.
    /// An unbuilt or missing mask yields no hits.
    pub fn assist_hits(
        &mut self,
        to: Point,
        brush: &BrushState,
        mask: Option<&MaskIndex>,
    ) -> Vec<Pixel> {
        let stroke = self.advance(to, brush.diameter.get());
        mask.map(|mask| mask.query_disk(stroke.to, stroke.diameter))
            .unwrap_or_default()
    }
}
