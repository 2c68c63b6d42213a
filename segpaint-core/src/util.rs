//! Utility types, used throughout the crate.

/// A position in image space, in pixels. Pixel `[x, y]` is sampled at exactly `[x as f32, y as f32]`.
pub type Point = [f32; 2];
/// Integer coordinates of a single pixel.
pub type Pixel = [u32; 2];

/// Inclusive pixel-space bounds, already clipped to some image.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PixelRect {
    pub min: Pixel,
    pub max: Pixel,
}
impl PixelRect {
    /// Clip the float bounds `[min, max]` to an image of the given size.
    /// Returns None if the bounds don't overlap the image at all.
    #[must_use]
    pub fn clipped(min: Point, max: Point, size: [u32; 2]) -> Option<Self> {
        if size[0] == 0 || size[1] == 0 {
            return None;
        }
        // Also rejects NaN, as every comparison fails.
        if !(max[0] >= 0.0 && max[1] >= 0.0) {
            return None;
        }
        let last = [size[0] - 1, size[1] - 1];
        let lo = [min[0].max(0.0).floor(), min[1].max(0.0).floor()];
        if lo[0] > last[0] as f32 || lo[1] > last[1] as f32 {
            return None;
        }
        let hi = [max[0].ceil(), max[1].ceil()];
        Some(Self {
            min: [lo[0] as u32, lo[1] as u32],
            max: [
                (hi[0].min(last[0] as f32)) as u32,
                (hi[1].min(last[1] as f32)) as u32,
            ],
        })
    }
    /// Iterate every pixel within the bounds, row-major.
    pub fn iter(self) -> impl Iterator<Item = Pixel> {
        (self.min[1]..=self.max[1])
            .flat_map(move |y| (self.min[0]..=self.max[0]).map(move |x| [x, y]))
    }
}

/// Squared distance between two points.
#[must_use]
pub fn distance_sq(a: Point, b: Point) -> f32 {
    let delta = [a[0] - b[0], a[1] - b[1]];
    delta[0] * delta[0] + delta[1] * delta[1]
}

/// Squared distance from `p` to the closed segment `[a, b]`.
/// Degenerates to a point distance when `a == b`.
#[must_use]
pub fn segment_distance_sq(p: Point, a: Point, b: Point) -> f32 {
    let ab = [b[0] - a[0], b[1] - a[1]];
    let len_sq = ab[0] * ab[0] + ab[1] * ab[1];
    if len_sq <= f32::EPSILON {
        return distance_sq(p, a);
    }
    let ap = [p[0] - a[0], p[1] - a[1]];
    let t = ((ap[0] * ab[0] + ap[1] * ab[1]) / len_sq).clamp(0.0, 1.0);
    distance_sq(p, [t.mul_add(ab[0], a[0]), t.mul_add(ab[1], a[1])])
}

#[cfg(test)]
mod test {
    use super::*;
    #[test]
    fn clip_outside() {
        assert_eq!(PixelRect::clipped([-10.0, -10.0], [-1.0, 5.0], [10, 10]), None);
        assert_eq!(PixelRect::clipped([12.0, 0.0], [20.0, 5.0], [10, 10]), None);
        assert_eq!(PixelRect::clipped([0.0, 0.0], [5.0, 5.0], [0, 10]), None);
    }
    #[test]
    fn clip_partial() {
        let rect = PixelRect::clipped([-3.5, 2.2], [4.1, 30.0], [10, 10]).unwrap();
        assert_eq!(rect.min, [0, 2]);
        assert_eq!(rect.max, [5, 9]);
        assert_eq!(rect.iter().count(), 6 * 8);
    }
    #[test]
    fn segment_distance() {
        // Perpendicular foot inside the segment
        assert!((segment_distance_sq([5.0, 3.0], [0.0, 0.0], [10.0, 0.0]) - 9.0).abs() < 1e-5);
        // Beyond the end, measured to the endpoint.
        assert!((segment_distance_sq([13.0, 4.0], [0.0, 0.0], [10.0, 0.0]) - 25.0).abs() < 1e-5);
        // Degenerate segment
        assert!((segment_distance_sq([3.0, 4.0], [0.0, 0.0], [0.0, 0.0]) - 25.0).abs() < 1e-5);
    }
}
