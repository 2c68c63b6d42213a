//! # Actions
//!
//! Everything a shortcut can trigger. Bindings from keys to actions live in [`hotkeys`].

pub mod hotkeys;

#[derive(
    serde::Serialize,
    serde::Deserialize,
    Hash,
    PartialEq,
    Eq,
    strum::AsRefStr,
    strum::EnumIter,
    Clone,
    Copy,
    Debug,
)]
pub enum Action {
    /// Flip autoseg assistance on or off.
    ToggleAssist,
    ClearLabel,
    Eraser,

    SelectClass1,
    SelectClass2,
    SelectClass3,
    SelectClass4,
    SelectClass5,
    SelectClass6,
    SelectClass7,
    SelectClass8,
    SelectClass9,

    PreviousSample,
    NextSample,

    BrushGrow,
    BrushShrink,

    /// Fit the image to the view. Only meaningful to a windowed front end.
    ResetView,
}
impl Action {
    /// The class id this action selects, if it is one of the `SelectClass` actions.
    #[must_use]
    pub fn class_shortcut(self) -> Option<u8> {
        Some(match self {
            Self::SelectClass1 => 1,
            Self::SelectClass2 => 2,
            Self::SelectClass3 => 3,
            Self::SelectClass4 => 4,
            Self::SelectClass5 => 5,
            Self::SelectClass6 => 6,
            Self::SelectClass7 => 7,
            Self::SelectClass8 => 8,
            Self::SelectClass9 => 9,
            _ => return None,
        })
    }
}
