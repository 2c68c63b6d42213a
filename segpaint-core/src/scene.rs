//! # Scene
//!
//! Owns the layer stack for one sample and routes pointer input into it.
//!
//! Implemented as a small statemachine. A press starts a gesture in one of two states, depending on
//! the brush at that moment:
//! * [`Gesture::Painting`] - capsules are composited straight into the label. Used for plain
//!   painting, and for erasing regardless of assist.
//! * [`Gesture::AssistPending`] - each sample queries the mask, and the hits are painted into the
//!   label as single pixels.
//!
//! The routing is latched at the press, so toggling assist or the eraser mid-drag only affects the
//! next gesture. Size and color are read live on every sample.

use std::path::{Path, PathBuf};

use crate::blend::Opacity;
use crate::brush::{BrushError, BrushState, Diameter};
use crate::color::Color;
use crate::compositor::{Compositor, Stroke};
use crate::layers::{AutosegLayer, CursorLayer, Drawable, ImageLayer, LabelLayer};
use crate::mask::MaskError;
use crate::raster::{PaintMode, RasterBuffer, RasterError};
use crate::util::Point;

#[derive(thiserror::Error, Debug)]
pub enum SceneError {
    #[error("failed to load image {path:?}: {source}")]
    Image { path: PathBuf, source: RasterError },
    #[error("failed to save label {path:?}: {source}")]
    SaveLabel { path: PathBuf, source: RasterError },
    #[error("failed to build mask for {path:?}: {source}")]
    Mask { path: PathBuf, source: MaskError },
    #[error("no sample loaded")]
    NoSample,
    #[error(transparent)]
    Brush(#[from] BrushError),
}

/// Files making up one sample.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SamplePaths {
    pub image: PathBuf,
    pub label: PathBuf,
    pub autoseg: PathBuf,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Default, strum::AsRefStr)]
pub enum Gesture {
    #[default]
    Idle,
    /// Pointer held, compositing the literal path with the latched mode.
    Painting(PaintMode),
    /// Pointer held, painting mask hits.
    AssistPending,
}

/// What a single pointer sample did to the label.
#[derive(Clone, Debug, PartialEq)]
pub enum Composite {
    /// No gesture in progress, only the cursor moved.
    Hover,
    Capsule(Stroke),
    /// Number of mask pixels painted.
    Hits(usize),
}

#[derive(Debug, Default)]
pub struct Scene {
    image: ImageLayer,
    autoseg: AutosegLayer,
    label: LabelLayer,
    cursor: CursorLayer,

    brush: BrushState,
    compositor: Compositor,
    gesture: Gesture,
    sample: Option<SamplePaths>,
}
impl Scene {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
    /// Load an image, its label (if any), and its autoseg mask (if any).
    ///
    /// A missing or unreadable label starts out empty. A missing or unreadable mask leaves assist
    /// without anything to match, so assisted strokes paint nothing until one is built.
    /// # Errors
    /// Only if the image itself can't be loaded. The previous sample is kept in that case.
    pub fn load_sample(&mut self, paths: SamplePaths) -> Result<(), SceneError> {
        let image = RasterBuffer::open(&paths.image).map_err(|source| SceneError::Image {
            path: paths.image.clone(),
            source,
        })?;
        let [width, height] = image.size();
        self.image.raster = image;

        self.label.raster.resize(width, height);
        self.label.raster.clear();
        if paths.label.exists() {
            if let Err(e) = self.label.raster.load_from(&paths.label) {
                log::warn!("ignoring unreadable label {:?}: {e}", paths.label);
            }
        } else {
            log::debug!("no label yet at {:?}", paths.label);
        }

        self.autoseg.reset([width, height]);
        if paths.autoseg.exists() {
            self.load_hint(&paths.autoseg);
        } else {
            log::debug!("no autoseg mask at {:?}", paths.autoseg);
        }

        self.pointer_cancel();
        self.cursor.position = None;
        log::info!("loaded sample {:?} ({width}x{height})", paths.image);
        self.sample = Some(paths);
        Ok(())
    }
    fn load_hint(&mut self, path: &Path) {
        match RasterBuffer::open(path) {
            Ok(hint) if hint.size() == self.image.raster.size() => self.autoseg.set_hint(hint),
            Ok(hint) => log::warn!(
                "ignoring autoseg mask {path:?}: size {:?} does not match image {:?}",
                hint.size(),
                self.image.raster.size()
            ),
            Err(e) => log::warn!("ignoring unreadable autoseg mask {path:?}: {e}"),
        }
    }
    /// Regenerate the current sample's mask from its image at a new threshold, replacing the
    /// autoseg file on disk.
    /// # Errors
    /// If there is no sample, or generation fails. On failure the old mask is dropped rather than
    /// kept around stale.
    pub fn rebuild_mask(&mut self, threshold: u8) -> Result<(), SceneError> {
        let paths = self.sample.as_ref().ok_or(SceneError::NoSample)?;
        let generated = crate::mask::generate(&paths.image, &paths.autoseg, threshold);
        let autoseg = paths.autoseg.clone();
        self.autoseg.reset(self.image.raster.size());
        match generated {
            Ok(_) => {
                self.load_hint(&autoseg);
                Ok(())
            }
            Err(source) => Err(SceneError::Mask {
                path: autoseg,
                source,
            }),
        }
    }
    /// Write the label to `path`.
    /// # Errors
    /// Any I/O or encode failure - the label must never be lost silently.
    pub fn save_label(&self, path: &Path) -> Result<(), SceneError> {
        self.label
            .raster
            .save_to(path)
            .map_err(|source| SceneError::SaveLabel {
                path: path.to_owned(),
                source,
            })
    }
    /// Write the label back to where the current sample was loaded from.
    /// # Errors
    /// See [`Scene::save_label`]. [`SceneError::NoSample`] if nothing is loaded.
    pub fn save_current_label(&self) -> Result<(), SceneError> {
        let paths = self.sample.as_ref().ok_or(SceneError::NoSample)?;
        self.save_label(&paths.label)
    }
    pub fn clear_label(&mut self) {
        self.label.raster.clear();
    }

    /// Press at `at`, in image pixel coordinates.
    pub fn pointer_down(&mut self, at: Point) -> Option<Composite> {
        self.cursor.position = Some(at);
        if self.gesture != Gesture::Idle {
            // Lost a release somewhere. Start over rather than joining the two gestures.
            self.pointer_cancel();
        }
        self.compositor.begin(at);
        if self.brush.routes_through_mask() {
            self.gesture = Gesture::AssistPending;
            // Assisted clicks label immediately, without waiting for a drag.
            Some(self.relay_hits(at))
        } else {
            self.gesture = Gesture::Painting(self.brush.mode);
            None
        }
    }
    /// Pointer moved to `at`, held or not.
    pub fn pointer_move(&mut self, at: Point) -> Composite {
        self.cursor.position = Some(at);
        match self.gesture {
            Gesture::Idle => Composite::Hover,
            Gesture::Painting(mode) => {
                let mut brush = self.brush.clone();
                brush.mode = mode;
                Composite::Capsule(self.compositor.paint_segment(
                    at,
                    &brush,
                    &mut self.label.raster,
                ))
            }
            Gesture::AssistPending => self.relay_hits(at),
        }
    }
    pub fn pointer_up(&mut self) {
        self.pointer_cancel();
    }
    /// The pointer left the canvas.
    pub fn pointer_leave(&mut self) {
        self.cursor.position = None;
    }
    fn pointer_cancel(&mut self) {
        self.gesture = Gesture::Idle;
        self.compositor.end();
    }
    /// Ask the mask what's under the brush, and hand the answer to the label.
    fn relay_hits(&mut self, at: Point) -> Composite {
        let hits = self
            .compositor
            .assist_hits(at, &self.brush, self.autoseg.mask.as_ref());
        self.label.apply_hits(&hits, self.brush.color);
        Composite::Hits(hits.len())
    }

    pub fn set_assist(&mut self, assist: bool) {
        self.brush.assist = assist;
    }
    pub fn set_eraser(&mut self, erase: bool) {
        self.brush.set_eraser(erase);
        if erase {
            self.cursor.border = Color::WHITE;
        } else {
            self.cursor.border = self.brush.color;
        }
    }
    /// Also leaves erase mode.
    pub fn set_brush_color(&mut self, color: Color) {
        self.brush.set_color(color);
        self.cursor.border = color;
    }
    /// # Errors
    /// If `px` is out of range. Nothing changes in that case.
    pub fn set_brush_size(&mut self, px: u32) -> Result<Diameter, SceneError> {
        let diameter = self.brush.set_diameter(px)?;
        self.cursor.diameter = diameter.get();
        Ok(diameter)
    }
    /// Step the brush size up (`1`) or down (`-1`).
    /// # Errors
    /// If `direction` is anything else.
    pub fn change_brush_size(&mut self, direction: i32) -> Result<Diameter, SceneError> {
        let diameter = self.brush.change_diameter(direction)?;
        self.cursor.diameter = diameter.get();
        Ok(diameter)
    }
    /// # Errors
    /// If `step` is zero.
    pub fn set_brush_step(&mut self, step: u32) -> Result<(), SceneError> {
        Ok(self.brush.set_step(step)?)
    }
    pub fn set_label_opacity(&mut self, opacity: Opacity) {
        self.label.opacity = opacity;
    }
    pub fn set_autoseg_opacity(&mut self, opacity: Opacity) {
        self.autoseg.opacity = opacity;
    }

    #[must_use]
    pub fn brush(&self) -> &BrushState {
        &self.brush
    }
    #[must_use]
    pub fn gesture(&self) -> Gesture {
        self.gesture
    }
    #[must_use]
    pub fn sample(&self) -> Option<&SamplePaths> {
        self.sample.as_ref()
    }
    #[must_use]
    pub fn label(&self) -> &RasterBuffer {
        &self.label.raster
    }
    #[must_use]
    pub fn autoseg(&self) -> &AutosegLayer {
        &self.autoseg
    }
    #[must_use]
    pub fn cursor(&self) -> &CursorLayer {
        &self.cursor
    }
    #[must_use]
    pub fn size(&self) -> [u32; 2] {
        self.image.raster.size()
    }
    /// Whether the label changed since the last call.
    pub fn take_label_dirty(&mut self) -> bool {
        self.label.raster.take_dirty()
    }
    /// Flatten the whole stack into a new buffer the size of the image.
    #[must_use]
    pub fn render(&self) -> RasterBuffer {
        let [width, height] = self.size();
        let mut target = RasterBuffer::new(width, height);
        let layers: [&dyn Drawable; 4] = [&self.image, &self.autoseg, &self.label, &self.cursor];
        for layer in layers {
            layer.render(&mut target);
        }
        target
    }
}

#[cfg(test)]
mod test {
    use super::{Composite, Gesture, SamplePaths, Scene, SceneError};
    use crate::blend::Opacity;
    use crate::brush::BrushError;
    use crate::color::Color;
    use crate::mask::DEFAULT_THRESHOLD;
    use crate::raster::{PaintMode, RasterBuffer};

    const GREEN: Color = Color::rgb(0, 255, 0);

    /// A 100x100 sample: black image with a white radius-10 disk at (50, 50).
    fn write_sample(dir: &std::path::Path, with_mask: bool) -> SamplePaths {
        let image = image::GrayImage::from_fn(100, 100, |x, y| {
            let dx = i64::from(x) - 50;
            let dy = i64::from(y) - 50;
            image::Luma([if dx * dx + dy * dy <= 100 { 230 } else { 20 }])
        });
        let paths = SamplePaths {
            image: dir.join("image.png"),
            label: dir.join("label.png"),
            autoseg: dir.join("autoseg.png"),
        };
        image.save(&paths.image).unwrap();
        if with_mask {
            crate::mask::generate(&paths.image, &paths.autoseg, DEFAULT_THRESHOLD).unwrap();
        }
        paths
    }

    fn loaded(dir: &std::path::Path, with_mask: bool) -> Scene {
        let mut scene = Scene::new();
        scene.load_sample(write_sample(dir, with_mask)).unwrap();
        scene.set_brush_color(GREEN);
        scene
    }

    #[test]
    fn load_sizes_layers() {
        let dir = tempfile::tempdir().unwrap();
        let scene = loaded(dir.path(), true);
        assert_eq!(scene.size(), [100, 100]);
        assert_eq!(scene.label().size(), [100, 100]);
        assert_eq!(scene.label().count_opaque(), 0);
        assert!(scene.autoseg().has_mask());
    }

    #[test]
    fn load_missing_image_keeps_previous() {
        let dir = tempfile::tempdir().unwrap();
        let mut scene = loaded(dir.path(), false);
        let before = scene.sample().cloned();
        let result = scene.load_sample(SamplePaths {
            image: dir.path().join("missing.png"),
            label: dir.path().join("l.png"),
            autoseg: dir.path().join("a.png"),
        });
        assert!(matches!(result, Err(SceneError::Image { .. })));
        assert_eq!(scene.sample().cloned(), before);
    }

    #[test]
    fn corrupt_label_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let paths = write_sample(dir.path(), false);
        std::fs::write(&paths.label, b"definitely not a png").unwrap();
        let mut scene = Scene::new();
        scene.load_sample(paths).unwrap();
        assert_eq!(scene.label().size(), [100, 100]);
        assert_eq!(scene.label().count_opaque(), 0);
    }

    #[test]
    fn paint_drag() {
        let dir = tempfile::tempdir().unwrap();
        let mut scene = loaded(dir.path(), true);
        scene.set_brush_size(5).unwrap();

        assert_eq!(scene.pointer_move([1.0, 1.0]), Composite::Hover);
        assert_eq!(scene.pointer_down([10.0, 10.0]), None);
        assert_eq!(scene.gesture(), Gesture::Painting(PaintMode::Paint));
        assert!(matches!(
            scene.pointer_move([30.0, 10.0]),
            Composite::Capsule(_)
        ));
        scene.pointer_up();
        assert_eq!(scene.gesture(), Gesture::Idle);

        for x in 10..=30 {
            assert_eq!(scene.label().get([x, 10]), Some(GREEN));
        }
        assert_eq!(scene.label().get([10, 20]), Some(Color::TRANSPARENT));
    }

    #[test]
    fn assist_paints_only_mask() {
        let dir = tempfile::tempdir().unwrap();
        let mut scene = loaded(dir.path(), true);
        scene.set_assist(true);
        scene.set_brush_size(30).unwrap();

        let foreground = scene.autoseg().mask.as_ref().unwrap().count_foreground();
        assert_eq!(
            scene.pointer_down([50.0, 50.0]),
            Some(Composite::Hits(foreground))
        );
        assert_eq!(scene.gesture(), Gesture::AssistPending);
        // Off the disk, nothing to hit.
        assert_eq!(scene.pointer_move([90.0, 90.0]), Composite::Hits(0));
        scene.pointer_up();

        assert_eq!(scene.label().count_opaque(), foreground);
        assert_eq!(scene.label().get([50, 50]), Some(GREEN));
        assert_eq!(scene.label().get([90, 90]), Some(Color::TRANSPARENT));
    }

    #[test]
    fn assist_without_mask_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        let mut scene = loaded(dir.path(), false);
        scene.set_assist(true);
        assert_eq!(scene.pointer_down([50.0, 50.0]), Some(Composite::Hits(0)));
        assert_eq!(scene.pointer_move([52.0, 50.0]), Composite::Hits(0));
        assert_eq!(scene.label().count_opaque(), 0);
    }

    #[test]
    fn erase_ignores_assist() {
        let dir = tempfile::tempdir().unwrap();
        let mut scene = loaded(dir.path(), true);
        scene.set_brush_size(9).unwrap();
        scene.pointer_down([0.0, 80.0]);
        scene.pointer_move([99.0, 80.0]);
        scene.pointer_up();
        assert_eq!(scene.label().get([20, 80]), Some(GREEN));

        scene.set_assist(true);
        scene.set_eraser(true);
        assert_eq!(scene.pointer_down([20.0, 80.0]), None);
        assert_eq!(scene.gesture(), Gesture::Painting(PaintMode::Erase));
        scene.pointer_move([20.0, 80.0]);
        scene.pointer_up();
        // Background pixel, yet erased - erasing follows the literal path.
        assert_eq!(scene.label().get([20, 80]), Some(Color::TRANSPARENT));
        assert_eq!(scene.label().get([60, 80]), Some(GREEN));
    }

    #[test]
    fn mode_latched_at_press() {
        let dir = tempfile::tempdir().unwrap();
        let mut scene = loaded(dir.path(), true);
        scene.set_brush_size(3).unwrap();
        scene.pointer_down([5.0, 5.0]);
        scene.set_assist(true);
        scene.set_eraser(true);
        assert!(matches!(
            scene.pointer_move([15.0, 5.0]),
            Composite::Capsule(_)
        ));
        scene.pointer_up();
        // Still painted, with the pre-toggle mode.
        assert_eq!(scene.label().get([10, 5]), Some(GREEN));
    }

    #[test]
    fn brush_size_reaches_cursor() {
        let mut scene = Scene::new();
        assert_eq!(scene.set_brush_size(20).map(|d| d.get()).ok(), Some(20));
        assert_eq!(scene.cursor().diameter, 20);
        assert_eq!(scene.change_brush_size(-1).map(|d| d.get()).ok(), Some(19));
        assert_eq!(scene.cursor().diameter, 19);
        assert!(matches!(
            scene.change_brush_size(3),
            Err(SceneError::Brush(BrushError::InvalidDirection(3)))
        ));
        assert!(scene.set_brush_size(0).is_err());
        assert_eq!(scene.cursor().diameter, 19);
    }

    #[test]
    fn cursor_follows_mode() {
        let mut scene = Scene::new();
        scene.set_brush_color(GREEN);
        assert_eq!(scene.cursor().border, GREEN);
        scene.set_eraser(true);
        assert_eq!(scene.cursor().border, Color::WHITE);
        scene.set_eraser(false);
        assert_eq!(scene.cursor().border, GREEN);
    }

    #[test]
    fn save_and_reload_label() {
        let dir = tempfile::tempdir().unwrap();
        let mut scene = loaded(dir.path(), true);
        scene.pointer_down([40.0, 40.0]);
        scene.pointer_move([60.0, 70.0]);
        scene.pointer_up();
        let painted = scene.label().clone();
        scene.save_current_label().unwrap();

        let mut reloaded = Scene::new();
        reloaded
            .load_sample(scene.sample().cloned().unwrap())
            .unwrap();
        assert_eq!(reloaded.label().pixels(), painted.pixels());
    }

    #[test]
    fn save_to_unwritable_path() {
        let dir = tempfile::tempdir().unwrap();
        let scene = loaded(dir.path(), false);
        let result = scene.save_label(&dir.path().join("no-such-dir").join("label.png"));
        assert!(matches!(result, Err(SceneError::SaveLabel { .. })));
        assert!(matches!(
            Scene::new().save_current_label(),
            Err(SceneError::NoSample)
        ));
    }

    #[test]
    fn rebuild_mask_changes_threshold() {
        let dir = tempfile::tempdir().unwrap();
        let mut scene = loaded(dir.path(), true);
        let disk = scene.autoseg().mask.as_ref().unwrap().count_foreground();
        // Background is 20, so everything is foreground now.
        scene.rebuild_mask(10).unwrap();
        assert_eq!(
            scene.autoseg().mask.as_ref().unwrap().count_foreground(),
            100 * 100
        );
        assert!(disk < 100 * 100);

        std::fs::remove_file(&scene.sample().unwrap().image).unwrap();
        assert!(scene.rebuild_mask(DEFAULT_THRESHOLD).is_err());
        assert!(!scene.autoseg().has_mask());
    }

    #[test]
    fn render_stack() {
        let dir = tempfile::tempdir().unwrap();
        let mut scene = loaded(dir.path(), true);
        scene.set_label_opacity(Opacity::OPAQUE);
        scene.set_brush_size(3).unwrap();
        scene.pointer_down([5.0, 5.0]);
        scene.pointer_move([6.0, 5.0]);
        scene.pointer_up();
        scene.pointer_leave();

        let flat: RasterBuffer = scene.render();
        assert_eq!(flat.size(), [100, 100]);
        assert_eq!(flat.get([5, 5]), Some(GREEN));
        // Image shows through elsewhere, hint is invisible by default.
        assert_eq!(flat.get([50, 50]), Some(Color::rgb(230, 230, 230)));
        assert_eq!(flat.get([90, 90]), Some(Color::rgb(20, 20, 20)));
    }

    #[test]
    fn clear_label_keeps_size() {
        let dir = tempfile::tempdir().unwrap();
        let mut scene = loaded(dir.path(), false);
        scene.pointer_down([5.0, 5.0]);
        scene.pointer_move([9.0, 5.0]);
        scene.pointer_up();
        assert!(scene.take_label_dirty());
        scene.clear_label();
        assert!(scene.take_label_dirty());
        assert_eq!(scene.label().count_opaque(), 0);
        assert_eq!(scene.label().size(), [100, 100]);
    }
}
