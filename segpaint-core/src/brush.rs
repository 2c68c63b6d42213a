//! # Brush
//!
//! The user-adjustable brush: its size, color, and whether it paints, erases, or defers to autoseg.

use crate::color::Color;
use crate::raster::PaintMode;

/// Pixels one relative size change moves the diameter by, unless configured otherwise.
pub const DEFAULT_STEP: u32 = 1;

#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrushError {
    #[error("brush diameter {0} outside of [{min}, {max}]", min = Diameter::MIN.0, max = Diameter::MAX.0)]
    DiameterOutOfRange(u32),
    #[error("brush size direction must be 1 or -1, got {0}")]
    InvalidDirection(i32),
    #[error("brush size step must be nonzero")]
    ZeroStep,
}

/// Brush diameter in image pixels, always within [`Diameter::MIN`]..=[`Diameter::MAX`].
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct Diameter(u32);
impl Diameter {
    pub const MIN: Self = Self(1);
    pub const MAX: Self = Self(150);
    pub const DEFAULT: Self = Self(50);
    /// # Errors
    /// [`BrushError::DiameterOutOfRange`] if `px` falls outside the allowed range.
    pub fn new(px: u32) -> Result<Self, BrushError> {
        if (Self::MIN.0..=Self::MAX.0).contains(&px) {
            Ok(Self(px))
        } else {
            Err(BrushError::DiameterOutOfRange(px))
        }
    }
    /// Any value, clamped into range.
    #[must_use]
    pub fn saturating(px: u32) -> Self {
        Self(px.clamp(Self::MIN.0, Self::MAX.0))
    }
    #[must_use]
    pub fn get(self) -> u32 {
        self.0
    }
}
impl Default for Diameter {
    fn default() -> Self {
        Self::DEFAULT
    }
}
impl TryFrom<u32> for Diameter {
    type Error = BrushError;
    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}
impl From<Diameter> for u32 {
    fn from(value: Diameter) -> Self {
        value.get()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BrushState {
    pub diameter: Diameter,
    /// Amount one relative size change moves the diameter by.
    step: u32,
    pub color: Color,
    pub mode: PaintMode,
    /// Route paint strokes through the autoseg mask instead of painting directly.
    pub assist: bool,
}
impl Default for BrushState {
    fn default() -> Self {
        Self {
            diameter: Diameter::DEFAULT,
            step: DEFAULT_STEP,
            color: Color::BLACK,
            mode: PaintMode::Paint,
            assist: false,
        }
    }
}
impl BrushState {
    #[must_use]
    pub fn step(&self) -> u32 {
        self.step
    }
    /// # Errors
    /// [`BrushError::ZeroStep`] for a step of zero.
    pub fn set_step(&mut self, step: u32) -> Result<(), BrushError> {
        if step == 0 {
            return Err(BrushError::ZeroStep);
        }
        self.step = step;
        Ok(())
    }
    /// Set an absolute diameter.
    /// # Errors
    /// [`BrushError::DiameterOutOfRange`], leaving the current diameter as-is.
    pub fn set_diameter(&mut self, px: u32) -> Result<Diameter, BrushError> {
        self.diameter = Diameter::new(px)?;
        Ok(self.diameter)
    }
    /// Grow (`1`) or shrink (`-1`) by one step, saturating at the diameter limits.
    /// # Errors
    /// [`BrushError::InvalidDirection`] for any other direction.
    pub fn change_diameter(&mut self, direction: i32) -> Result<Diameter, BrushError> {
        let current = self.diameter.get();
        let new = match direction {
            1 => current.saturating_add(self.step),
            -1 => current.saturating_sub(self.step),
            other => return Err(BrushError::InvalidDirection(other)),
        };
        self.diameter = Diameter::saturating(new);
        Ok(self.diameter)
    }
    /// Pick a paint color. This also leaves erase mode.
    pub fn set_color(&mut self, color: Color) {
        self.color = color;
        self.mode = PaintMode::Paint;
    }
    pub fn set_eraser(&mut self, erase: bool) {
        self.mode = if erase {
            PaintMode::Erase
        } else {
            PaintMode::Paint
        };
    }
    #[must_use]
    pub fn is_eraser(&self) -> bool {
        self.mode.is_erase()
    }
    /// Whether strokes go through the mask. Erasing always paints the literal path.
    #[must_use]
    pub fn routes_through_mask(&self) -> bool {
        self.assist && !self.is_eraser()
    }
}
