//! Tunables that aren't per-sample: mask threshold, brush defaults, and layer opacities.

use segpaint_core::{
    blend::Opacity,
    brush::{Diameter, DEFAULT_STEP},
    mask::DEFAULT_THRESHOLD,
};

const DOCUMENTATION: &str = r#"# Segpaint preferences. You may edit this file, but be aware that formatting and comments will not
# be preserved. Missing fields take their default value.

# threshold:       luminance (0-255) above which an image pixel is foreground for autoseg masks.
# brush_diameter:  starting brush size in pixels, 1 to 150.
# brush_step:      pixels added or removed per brush size change.
# label_opacity:   percent opacity the label is drawn with over the image.
# autoseg_opacity: percent opacity the autoseg mask is drawn with. 0 hides it.

"#;

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum PreferencesError {
    #[error("brush diameter {0} out of range")]
    Diameter(u32),
    #[error("brush step must be nonzero")]
    Step,
    #[error("opacity {0}% out of range")]
    Opacity(u8),
}

#[derive(serde::Serialize, serde::Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(default)]
pub struct Preferences {
    pub threshold: u8,
    pub brush_diameter: u32,
    pub brush_step: u32,
    pub label_opacity: u8,
    pub autoseg_opacity: u8,
}
impl Default for Preferences {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            brush_diameter: Diameter::DEFAULT.get(),
            brush_step: DEFAULT_STEP,
            label_opacity: Opacity::HALF.percent(),
            autoseg_opacity: Opacity::TRANSPARENT.percent(),
        }
    }
}
impl Preferences {
    const FILENAME: &'static str = "preferences.toml";
    /// Shared global preferences, saved and loaded from the user's preferences dir.
    /// (Or defaulted, if unavailable for some reason)
    #[must_use]
    pub fn get() -> &'static Self {
        static GLOBAL_PREFERENCES: std::sync::OnceLock<Preferences> = std::sync::OnceLock::new();

        GLOBAL_PREFERENCES.get_or_init(|| match super::preferences_dir() {
            None => {
                log::warn!("Preferences weren't available, defaulting.");
                Self::default()
            }
            Some(mut dir) => {
                dir.push(Self::FILENAME);
                Self::load_or_default(&dir)
            }
        })
    }
    #[must_use]
    pub fn load_or_default(path: &std::path::Path) -> Self {
        let loaded: anyhow::Result<Self> = try_block::try_block! {
            let string = std::fs::read_to_string(path)?;
            let preferences : Self = toml::from_str(&string)?;
            preferences.validate()?;

            Ok(preferences)
        };
        loaded.unwrap_or_else(|e| {
            log::warn!("Preferences at {path:?} unusable, defaulting: {e:#}");
            Self::default()
        })
    }
    /// # Errors
    /// The first value that is out of range.
    pub fn validate(&self) -> Result<(), PreferencesError> {
        Diameter::new(self.brush_diameter)
            .map_err(|_| PreferencesError::Diameter(self.brush_diameter))?;
        if self.brush_step == 0 {
            return Err(PreferencesError::Step);
        }
        for percent in [self.label_opacity, self.autoseg_opacity] {
            if Opacity::from_percent(percent).is_none() {
                return Err(PreferencesError::Opacity(percent));
            }
        }
        Ok(())
    }
    #[must_use]
    pub fn label_opacity(&self) -> Opacity {
        Opacity::from_percent(self.label_opacity).unwrap_or(Opacity::HALF)
    }
    #[must_use]
    pub fn autoseg_opacity(&self) -> Opacity {
        Opacity::from_percent(self.autoseg_opacity).unwrap_or(Opacity::TRANSPARENT)
    }
    pub fn save(&self) -> anyhow::Result<()> {
        let string = toml::ser::to_string_pretty(self)?;
        super::save_to_preferences(Self::FILENAME, DOCUMENTATION, &string)
    }
}
