//! Layered canvas and stroke compositing for pixel-level segmentation labels.

pub mod blend;
pub mod brush;
pub mod classes;
pub mod color;
pub mod compositor;
pub mod layers;
pub mod mask;
pub mod raster;
pub mod scene;
pub mod util;

pub use color::Color;
pub use raster::{PaintMode, RasterBuffer};
pub use scene::{SamplePaths, Scene};
