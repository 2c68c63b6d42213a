//! # Blend
//!
//! Layers are stacked with plain source-over compositing, modulated by a per-layer opacity.

use crate::color::Color;

/// Opacity of a layer, as an integer percentage in `[0, 100]`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Opacity(u8);
impl Opacity {
    pub const TRANSPARENT: Self = Self(0);
    pub const HALF: Self = Self(50);
    pub const OPAQUE: Self = Self(100);
    /// Returns None if `percent` exceeds 100.
    #[must_use]
    pub const fn from_percent(percent: u8) -> Option<Self> {
        if percent > 100 {
            None
        } else {
            Some(Self(percent))
        }
    }
    #[must_use]
    pub const fn percent(self) -> u8 {
        self.0
    }
    #[must_use]
    pub fn fraction(self) -> f32 {
        f32::from(self.0) / 100.0
    }
}
impl Default for Opacity {
    fn default() -> Self {
        Self::OPAQUE
    }
}

/// Composite `src` over `dst` in place, with `src` alpha scaled by `opacity`.
/// Both colors are straight-alpha.
pub fn over(dst: &mut Color, src: Color, opacity: Opacity) {
    let src_a = f32::from(src.alpha()) / 255.0 * opacity.fraction();
    if src_a <= 0.0 {
        return;
    }
    let dst_a = f32::from(dst.alpha()) / 255.0;
    let out_a = src_a + dst_a * (1.0 - src_a);

    let mut out = [0u8; 4];
    for (channel, out) in out.iter_mut().take(3).enumerate() {
        let s = f32::from(src.0[channel]) * src_a;
        let d = f32::from(dst.0[channel]) * dst_a * (1.0 - src_a);
        *out = ((s + d) / out_a).round().clamp(0.0, 255.0) as u8;
    }
    out[3] = (out_a * 255.0).round().clamp(0.0, 255.0) as u8;
    *dst = Color(out);
}

#[cfg(test)]
mod test {
    use super::{over, Opacity};
    use crate::color::Color;
    #[test]
    fn opacity_bounds() {
        assert_eq!(Opacity::from_percent(100), Some(Opacity::OPAQUE));
        assert_eq!(Opacity::from_percent(101), None);
    }
    #[test]
    fn over_opaque_replaces() {
        let mut dst = Color::rgb(10, 20, 30);
        over(&mut dst, Color::rgb(200, 100, 50), Opacity::OPAQUE);
        assert_eq!(dst, Color::rgb(200, 100, 50));
    }
    #[test]
    fn over_transparent_keeps() {
        let mut dst = Color::rgb(10, 20, 30);
        over(&mut dst, Color::TRANSPARENT, Opacity::OPAQUE);
        over(&mut dst, Color::WHITE, Opacity::TRANSPARENT);
        assert_eq!(dst, Color::rgb(10, 20, 30));
    }
    #[test]
    fn over_half() {
        let mut dst = Color::BLACK;
        over(&mut dst, Color::WHITE, Opacity::HALF);
        // 255 * 0.5 = 127.5, rounds away from zero.
        assert_eq!(dst, Color::rgb(128, 128, 128));
    }
}
