use crate::actions;

const DOCUMENTATION: &str = r#"# Segpaint hotkeys. You may edit this file, but be aware that formatting and comments will not
# be preserved, and all keys and values are case sensitive.

# See `actions::Action` for available actions, specified here in [brackets].
# Keyboard hotkeys, specified by the "keyboard" field of an action, are written `[ctrl+][alt+][shift+]<key code>`,
# where key codes follow the W3C `KeyboardEvent.code` names (KeyA, Digit1, Comma, BracketLeft, ...).
# Each action may have many hotkeys associated with it, but each hotkey should only be used at most once.

# Examples:
# [ClearLabel]
# keyboard = ["KeyC", "ctrl+KeyX"]
# [NextSample]
# keyboard = ["Period", "KeyN"]

"#;

pub struct Hotkeys {
    failed_to_load: bool,
    pub actions_to_keys: actions::hotkeys::ActionsToKeys,
    pub keys_to_actions: actions::hotkeys::KeysToActions,
}
impl Hotkeys {
    const FILENAME: &'static str = "hotkeys.toml";
    /// Shared global hotkeys, saved and loaded from user preferences.
    /// (Or defaulted, if unavailable for some reason)
    #[must_use]
    pub fn get() -> &'static Self {
        static GLOBAL_HOTKEYS: std::sync::OnceLock<Hotkeys> = std::sync::OnceLock::new();

        GLOBAL_HOTKEYS.get_or_init(|| match super::preferences_dir() {
            None => Self::no_path(),
            Some(mut dir) => {
                dir.push(Self::FILENAME);
                Self::load_or_default(&dir)
            }
        })
    }
    #[must_use]
    pub fn no_path() -> Self {
        use actions::hotkeys::ActionsToKeys;
        log::warn!("Hotkeys weren't available, defaulting.");
        let default = ActionsToKeys::default();
        // Default action map is reversable - this is assured by the default impl when debugging.
        let reverse = (&default)
            .try_into()
            .unwrap_or_else(|e| panic!("default hotkeys conflict: {e}"));

        Self {
            failed_to_load: true,
            keys_to_actions: reverse,
            actions_to_keys: default,
        }
    }
    #[must_use]
    pub fn load_or_default(path: &std::path::Path) -> Self {
        use actions::hotkeys::{ActionsToKeys, KeysToActions};
        let mappings: anyhow::Result<(ActionsToKeys, KeysToActions)> = try_block::try_block! {
            let string = std::fs::read_to_string(path)?;
            let actions_to_keys : ActionsToKeys = toml::from_str(&string)?;
            let keys_to_actions : KeysToActions = (&actions_to_keys).try_into()?;

            Ok((actions_to_keys,keys_to_actions))
        };

        match mappings {
            Ok((actions_to_keys, keys_to_actions)) => Self {
                failed_to_load: false,
                actions_to_keys,
                keys_to_actions,
            },
            Err(e) => {
                log::debug!("could not read hotkeys from {path:?}: {e:#}");
                Self::no_path()
            }
        }
    }
    /// Return true if loading user's settings failed. This can be useful for
    /// displaying a warning.
    #[must_use]
    pub fn did_fail_to_load(&self) -> bool {
        self.failed_to_load
    }
    pub fn save(&self) -> anyhow::Result<()> {
        let string = toml::ser::to_string_pretty(&self.actions_to_keys)?;
        super::save_to_preferences(Self::FILENAME, DOCUMENTATION, &string)
    }
}

#[cfg(test)]
mod test {
    use super::Hotkeys;
    use crate::actions::{
        hotkeys::{Key, KeyboardHotkey},
        Action,
    };

    #[test]
    fn missing_file_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let hotkeys = Hotkeys::load_or_default(&dir.path().join("hotkeys.toml"));
        assert!(hotkeys.did_fail_to_load());
        assert_eq!(
            hotkeys
                .keys_to_actions
                .action_of(&KeyboardHotkey::bare(Key::KeyE)),
            Some(Action::Eraser)
        );
    }

    #[test]
    fn user_bindings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hotkeys.toml");
        std::fs::write(
            &path,
            "[NextSample]\nkeyboard = [\"KeyN\", \"shift+Period\"]\n",
        )
        .unwrap();
        let hotkeys = Hotkeys::load_or_default(&path);
        assert!(!hotkeys.did_fail_to_load());
        let shifted = "shift+Period".parse().unwrap();
        assert_eq!(
            hotkeys.keys_to_actions.action_of(&shifted),
            Some(Action::NextSample)
        );
        // Only what the user wrote is bound.
        assert_eq!(
            hotkeys
                .keys_to_actions
                .action_of(&KeyboardHotkey::bare(Key::KeyA)),
            None
        );
    }

    #[test]
    fn conflicting_bindings_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hotkeys.toml");
        std::fs::write(
            &path,
            "[Eraser]\nkeyboard = [\"KeyQ\"]\n[ClearLabel]\nkeyboard = [\"KeyQ\"]\n",
        )
        .unwrap();
        assert!(Hotkeys::load_or_default(&path).did_fail_to_load());
    }
}
