//! # Session
//!
//! Walks a working directory of samples, one at a time, keeping each sample's label saved as it
//! goes. The layout is fixed:
//!
//! ```text
//! <workdir>/
//!     classes.json
//!     images/<stem>.<ext>
//!     labels/<stem>.png     (created on save)
//!     autoseg/<stem>.png    (generated when missing)
//! ```

use std::path::{Path, PathBuf};

use segpaint_core::{
    classes::{ClassList, ClassListError},
    mask::MaskError,
    scene::SceneError,
    SamplePaths, Scene,
};

use crate::actions::Action;
use crate::global::preferences::Preferences;

#[derive(thiserror::Error, Debug)]
pub enum SessionError {
    #[error("failed to access {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to load classes from {path:?}: {source}")]
    Classes {
        path: PathBuf,
        source: ClassListError,
    },
    #[error("no images found in {0:?}")]
    NoImages(PathBuf),
    #[error("sample {index} out of range, only {len} available")]
    OutOfRange { index: usize, len: usize },
    #[error("failed to generate autoseg mask {path:?}: {source}")]
    Mask { path: PathBuf, source: MaskError },
    #[error(transparent)]
    Scene(#[from] SceneError),
}

/// Paths of everything in a working directory.
#[derive(Clone, Debug)]
pub struct Workdir {
    pub root: PathBuf,
    pub images: PathBuf,
    pub labels: PathBuf,
    pub autoseg: PathBuf,
    pub classes: PathBuf,
}
impl Workdir {
    #[must_use]
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_owned(),
            images: root.join("images"),
            labels: root.join("labels"),
            autoseg: root.join("autoseg"),
            classes: root.join("classes.json"),
        }
    }
    /// Make the output directories. The image directory must already be there.
    fn create_outputs(&self) -> Result<(), SessionError> {
        for dir in [&self.labels, &self.autoseg] {
            std::fs::create_dir_all(dir).map_err(|source| SessionError::Io {
                path: dir.clone(),
                source,
            })?;
        }
        Ok(())
    }
}

/// Files directly inside `dir`, sorted by name.
fn list_files(dir: &Path) -> Result<Vec<PathBuf>, SessionError> {
    let io_err = |source| SessionError::Io {
        path: dir.to_owned(),
        source,
    };
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(io_err)? {
        let entry = entry.map_err(io_err)?;
        if entry.file_type().map_err(io_err)?.is_file() {
            files.push(entry.path());
        }
    }
    files.sort();
    Ok(files)
}

/// Files in `dir` that look like images we can decode, sorted by name. Hidden files and anything
/// with an unknown extension (`Thumbs.db`, notes) are skipped.
fn list_images(dir: &Path) -> Result<Vec<PathBuf>, SessionError> {
    let mut files = list_files(dir)?;
    files.retain(|path| {
        let hidden = path
            .file_name()
            .is_some_and(|name| name.as_encoded_bytes().starts_with(b"."));
        let decodable = image::ImageFormat::from_path(path)
            .is_ok_and(|format| format.reading_enabled());
        if hidden || !decodable {
            log::debug!("skipping non-image {path:?}");
        }
        !hidden && decodable
    });
    Ok(files)
}

pub struct Session {
    workdir: Workdir,
    /// Every image in the working directory, sorted by file name.
    images: Vec<PathBuf>,
    classes: ClassList,
    /// The class whose color the brush holds, `None` while erasing.
    selected_class: Option<u32>,
    current: usize,
    threshold: u8,
    scene: Scene,
}
impl Session {
    /// Open a working directory. No sample is loaded yet, see [`Session::load_latest_sample`].
    /// # Errors
    /// Unreadable directories or class list, or no images at all.
    pub fn open(root: &Path, preferences: &Preferences) -> Result<Self, SessionError> {
        let workdir = Workdir::new(root);
        workdir.create_outputs()?;

        let classes = ClassList::open(&workdir.classes).map_err(|source| SessionError::Classes {
            path: workdir.classes.clone(),
            source,
        })?;
        let images = list_images(&workdir.images)?;
        if images.is_empty() {
            return Err(SessionError::NoImages(workdir.images));
        }

        let mut scene = Scene::new();
        scene.set_brush_step(preferences.brush_step)?;
        scene.set_brush_size(preferences.brush_diameter)?;
        scene.set_label_opacity(preferences.label_opacity());
        scene.set_autoseg_opacity(preferences.autoseg_opacity());
        // Non-empty, checked when loading.
        let selected_class = classes.first().map(|class| {
            scene.set_brush_color(class.color);
            class.id
        });

        log::info!(
            "opened {:?}: {} images, {} classes",
            workdir.root,
            images.len(),
            classes.len()
        );
        Ok(Self {
            workdir,
            images,
            classes,
            selected_class,
            current: 0,
            threshold: preferences.threshold,
            scene,
        })
    }
    #[must_use]
    pub fn len(&self) -> usize {
        self.images.len()
    }
    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current
    }
    #[must_use]
    pub fn classes(&self) -> &ClassList {
        &self.classes
    }
    #[must_use]
    pub fn selected_class(&self) -> Option<u32> {
        self.selected_class
    }
    #[must_use]
    pub fn scene(&self) -> &Scene {
        &self.scene
    }
    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }
    /// File name shown for sample `index`. Labels and masks are always PNG.
    fn output_name(&self, index: usize) -> Option<std::ffi::OsString> {
        let mut name = self.images.get(index)?.file_stem()?.to_owned();
        name.push(".png");
        Some(name)
    }
    /// # Errors
    /// [`SessionError::OutOfRange`] if there's no such sample.
    pub fn sample_paths(&self, index: usize) -> Result<SamplePaths, SessionError> {
        let out_of_range = SessionError::OutOfRange {
            index,
            len: self.len(),
        };
        let (Some(image), Some(name)) = (self.images.get(index), self.output_name(index)) else {
            return Err(out_of_range);
        };
        Ok(SamplePaths {
            image: image.clone(),
            label: self.workdir.labels.join(&name),
            autoseg: self.workdir.autoseg.join(&name),
        })
    }
    /// Generate the autoseg mask for one sample if it doesn't exist yet.
    /// Returns whether a mask was written.
    fn ensure_mask(paths: &SamplePaths, threshold: u8) -> Result<bool, SessionError> {
        if paths.autoseg.exists() {
            return Ok(false);
        }
        segpaint_core::mask::generate(&paths.image, &paths.autoseg, threshold).map_err(
            |source| SessionError::Mask {
                path: paths.autoseg.clone(),
                source,
            },
        )?;
        Ok(true)
    }
    /// Generate every missing autoseg mask in parallel.
    /// Returns the number generated, and the failures. A failure here is not fatal, the sample just
    /// won't have assistance.
    pub fn generate_missing_masks(&self) -> (usize, Vec<SessionError>) {
        use rayon::iter::{IntoParallelIterator, ParallelIterator};
        let threshold = self.threshold;
        let results: Vec<Result<bool, SessionError>> = (0..self.len())
            .into_par_iter()
            .map(|index| Self::ensure_mask(&self.sample_paths(index)?, threshold))
            .collect();

        let mut generated = 0;
        let mut failures = Vec::new();
        for result in results {
            match result {
                Ok(true) => generated += 1,
                Ok(false) => (),
                Err(e) => failures.push(e),
            }
        }
        (generated, failures)
    }
    /// Load sample `index` into the scene, generating its mask first if needed.
    /// # Errors
    /// Out of range, or the image couldn't be read. The previous sample stays loaded.
    pub fn load_sample(&mut self, index: usize) -> Result<(), SessionError> {
        let paths = self.sample_paths(index)?;
        if let Err(e) = Self::ensure_mask(&paths, self.threshold) {
            log::warn!("sample {index} will have no assistance: {e}");
        }
        self.scene.load_sample(paths)?;
        self.current = index;
        Ok(())
    }
    /// Resume where labelling left off: the first sample past the number of saved labels, or the
    /// first sample if every one has a label.
    /// # Errors
    /// See [`Session::load_sample`].
    pub fn load_latest_sample(&mut self) -> Result<(), SessionError> {
        let labelled = list_files(&self.workdir.labels)?.len();
        let index = if labelled < self.len() { labelled } else { 0 };
        self.load_sample(index)
    }
    /// Save, then move `step` samples forwards or backwards, stopping at either end.
    /// A step of zero does nothing at all.
    /// # Errors
    /// If saving fails the move is abandoned, so no work is lost.
    pub fn switch_by(&mut self, step: isize) -> Result<(), SessionError> {
        if step == 0 {
            return Ok(());
        }
        self.save_current_label()?;
        let last = self.len() - 1;
        let target = self
            .current
            .checked_add_signed(step)
            .filter(|&index| index <= last)
            .unwrap_or(if step < 0 { 0 } else { last });
        self.load_sample(target)
    }
    /// # Errors
    /// No sample loaded, or the label couldn't be written.
    pub fn save_current_label(&self) -> Result<(), SessionError> {
        Ok(self.scene.save_current_label()?)
    }
    /// Pick the brush color of class `id`. Returns false if there is no such class.
    pub fn select_class(&mut self, id: u32) -> bool {
        let Some(class) = self.classes.get(id) else {
            return false;
        };
        self.scene.set_brush_color(class.color);
        self.selected_class = Some(id);
        true
    }
    pub fn set_eraser(&mut self, erase: bool) {
        self.scene.set_eraser(erase);
        if erase {
            self.selected_class = None;
        } else if let Some(class) = self.selected_class.and_then(|id| self.classes.get(id)) {
            self.scene.set_brush_color(class.color);
        }
    }
    /// Grow or shrink the brush by the sign of a scroll `delta`.
    pub fn scroll(&mut self, delta: i32) {
        if delta != 0 {
            if let Err(e) = self.scene.change_brush_size(delta.signum()) {
                log::warn!("brush size unchanged: {e}");
            }
        }
    }
    /// # Errors
    /// Only the actions touching disk can fail, see [`Session::switch_by`].
    pub fn apply(&mut self, action: Action) -> Result<(), SessionError> {
        if let Some(digit) = action.class_shortcut() {
            if let Some(id) = self.classes.for_shortcut(digit).map(|class| class.id) {
                self.select_class(id);
            }
            return Ok(());
        }
        match action {
            Action::ToggleAssist => {
                let assist = !self.scene.brush().assist;
                self.scene.set_assist(assist);
                log::info!("assist {}", if assist { "on" } else { "off" });
            }
            Action::ClearLabel => self.scene.clear_label(),
            Action::Eraser => self.set_eraser(true),
            Action::PreviousSample => self.switch_by(-1)?,
            Action::NextSample => self.switch_by(1)?,
            Action::BrushGrow => self.scroll(1),
            Action::BrushShrink => self.scroll(-1),
            Action::ResetView => log::trace!("no view to reset"),
            // Handled above.
            Action::SelectClass1
            | Action::SelectClass2
            | Action::SelectClass3
            | Action::SelectClass4
            | Action::SelectClass5
            | Action::SelectClass6
            | Action::SelectClass7
            | Action::SelectClass8
            | Action::SelectClass9 => (),
        }
        Ok(())
    }
    /// Save the label for good.
    /// # Errors
    /// See [`Session::save_current_label`].
    pub fn close(self) -> Result<(), SessionError> {
        self.save_current_label()?;
        log::info!("closed {:?}", self.workdir.root);
        Ok(())
    }
}
