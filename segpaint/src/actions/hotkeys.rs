//! Keyboard hotkeys.
//!
//! Actions can have many hotkeys bound to them, and hotkeys can be bound to at most one action.
//! For disk storage the one-to-many relation of actions to keys is easier to edit for the end user,
//! so the reverse many-to-one mapping of keys to actions is built dynamically.

use super::Action;

/// Physical keys, named after the W3C `KeyboardEvent.code` values.
#[derive(
    strum::EnumString,
    strum::AsRefStr,
    strum::EnumIter,
    Hash,
    PartialEq,
    Eq,
    Clone,
    Copy,
    Debug,
)]
pub enum Key {
    KeyA,
    KeyB,
    KeyC,
    KeyD,
    KeyE,
    KeyF,
    KeyG,
    KeyH,
    KeyI,
    KeyJ,
    KeyK,
    KeyL,
    KeyM,
    KeyN,
    KeyO,
    KeyP,
    KeyQ,
    KeyR,
    KeyS,
    KeyT,
    KeyU,
    KeyV,
    KeyW,
    KeyX,
    KeyY,
    KeyZ,
    Digit0,
    Digit1,
    Digit2,
    Digit3,
    Digit4,
    Digit5,
    Digit6,
    Digit7,
    Digit8,
    Digit9,
    Comma,
    Period,
    Minus,
    Equal,
    BracketLeft,
    BracketRight,
    Space,
    Escape,
}

#[derive(Hash, PartialEq, Eq, Clone, Debug, Copy)]
pub struct KeyboardHotkey {
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
    pub key: Key,
}
impl KeyboardHotkey {
    /// A hotkey with no modifiers.
    #[must_use]
    pub const fn bare(key: Key) -> Self {
        Self {
            ctrl: false,
            alt: false,
            shift: false,
            key,
        }
    }
}
impl serde::Serialize for KeyboardHotkey {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        // Human-readable string, same syntax as FromStr.
        serializer.serialize_str(&self.to_string())
    }
}
impl<'de> serde::Deserialize<'de> for KeyboardHotkey {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let str =
            <std::borrow::Cow<'de, str> as serde::Deserialize<'de>>::deserialize(deserializer)?;
        str.parse().map_err(serde::de::Error::custom)
    }
}
/// Formats as `[ctrl+][alt+][shift+]<key name>`.
impl std::fmt::Display for KeyboardHotkey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.ctrl {
            f.write_str("ctrl+")?;
        }
        if self.alt {
            f.write_str("alt+")?;
        }
        if self.shift {
            f.write_str("shift+")?;
        }
        f.write_str(self.key.as_ref())
    }
}
#[derive(Debug, thiserror::Error)]
pub enum KeyboardHotkeyFromStrError {
    #[error("unrecognized key name")]
    InvalidKeyName,
}
/// Parse from syntax `[ctrl+][alt+][shift+]<key name>`, case-sensitive.
impl std::str::FromStr for KeyboardHotkey {
    type Err = KeyboardHotkeyFromStrError;
    fn from_str(mut str: &str) -> Result<Self, Self::Err> {
        let mut take_if_has = |prefix: &str| -> bool {
            if let Some(new_str) = str.strip_prefix(prefix) {
                str = new_str;
                true
            } else {
                false
            }
        };
        let ctrl = take_if_has("ctrl+");
        let alt = take_if_has("alt+");
        let shift = take_if_has("shift+");
        // str now contains only the key name.
        let key = str
            .parse()
            .map_err(|_| KeyboardHotkeyFromStrError::InvalidKeyName)?;

        Ok(Self {
            ctrl,
            alt,
            shift,
            key,
        })
    }
}

#[derive(serde::Serialize, serde::Deserialize, Default, Clone, Debug)]
pub struct HotkeyCollection {
    #[serde(default)]
    pub keyboard: Vec<KeyboardHotkey>,
}

const DEFAULT_KEYBOARD: &[(Action, &[Key])] = &[
    (Action::ToggleAssist, &[Key::KeyA]),
    (Action::ClearLabel, &[Key::KeyC]),
    (Action::Eraser, &[Key::KeyE]),
    (Action::SelectClass1, &[Key::Digit1]),
    (Action::SelectClass2, &[Key::Digit2]),
    (Action::SelectClass3, &[Key::Digit3]),
    (Action::SelectClass4, &[Key::Digit4]),
    (Action::SelectClass5, &[Key::Digit5]),
    (Action::SelectClass6, &[Key::Digit6]),
    (Action::SelectClass7, &[Key::Digit7]),
    (Action::SelectClass8, &[Key::Digit8]),
    (Action::SelectClass9, &[Key::Digit9]),
    (Action::PreviousSample, &[Key::Comma]),
    (Action::NextSample, &[Key::Period]),
    (Action::BrushGrow, &[Key::BracketRight, Key::Equal]),
    (Action::BrushShrink, &[Key::BracketLeft, Key::Minus]),
    (Action::ResetView, &[Key::Space]),
];

/// Maps each action onto potentially many hotkeys.
#[derive(serde::Serialize, serde::Deserialize, Clone, Debug)]
pub struct ActionsToKeys(hashbrown::HashMap<Action, HotkeyCollection>);
impl Default for ActionsToKeys {
    fn default() -> Self {
        let keys_map = DEFAULT_KEYBOARD
            .iter()
            .map(|(action, keys)| {
                let keyboard = keys.iter().copied().map(KeyboardHotkey::bare).collect();
                (*action, HotkeyCollection { keyboard })
            })
            .collect();

        let new = Self(keys_map);
        // Make sure we didn't accidentally bind a single key twice
        debug_assert!(TryInto::<KeysToActions>::try_into(&new).is_ok());
        new
    }
}
impl ActionsToKeys {
    #[must_use]
    pub fn keys_of(&self, action: Action) -> &[KeyboardHotkey] {
        self.0
            .get(&action)
            .map_or(&[], |collection| collection.keyboard.as_slice())
    }
}

/// Derived from [`ActionsToKeys`], maps each hotkey onto at most one action.
#[derive(Clone, Debug)]
pub struct KeysToActions(hashbrown::HashMap<KeyboardHotkey, Action>);
#[derive(thiserror::Error, Debug)]
pub enum KeysToActionsError {
    /// A single key was bound to multiple actions.
    /// Only the first two encountered (in arbitrary order) are reported.
    #[error("hotkey {key} used for more than one action: {actions:?}")]
    DuplicateBinding {
        key: KeyboardHotkey,
        actions: [Action; 2],
    },
}
impl TryFrom<&ActionsToKeys> for KeysToActions {
    type Error = KeysToActionsError;
    fn try_from(value: &ActionsToKeys) -> Result<Self, Self::Error> {
        let mut new = KeysToActions(hashbrown::HashMap::default());

        for (action, keys) in &value.0 {
            for &key in &keys.keyboard {
                // The slot wasn't empty!
                if let Some(old) = new.0.insert(key, *action) {
                    return Err(KeysToActionsError::DuplicateBinding {
                        key,
                        actions: [*action, old],
                    });
                }
            }
        }

        Ok(new)
    }
}
impl KeysToActions {
    #[must_use]
    pub fn action_of(&self, key: &KeyboardHotkey) -> Option<Action> {
        self.0.get(key).copied()
    }
}
