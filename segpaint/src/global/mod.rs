//! User configuration, saved and loaded from the preferences directory.

pub mod hotkeys;
pub mod preferences;

#[must_use]
pub fn preferences_dir() -> Option<std::path::PathBuf> {
    let mut base_dir = dirs::preference_dir()?;
    base_dir.push(env!("CARGO_PKG_NAME"));
    Some(base_dir)
}

/// Write `body` to `<preferences dir>/<filename>`, with `header` prefixed.
pub(crate) fn save_to_preferences(filename: &str, header: &str, body: &str) -> anyhow::Result<()> {
    let mut preferences =
        preferences_dir().ok_or_else(|| anyhow::anyhow!("No preferences dir found"))?;
    // Explicity do *not* create recursively. If not found, the user probably has a good reason.
    // Ignore errors (could already exist). Any real errors will be emitted by file access below.
    let _ = std::fs::DirBuilder::new().create(&preferences);

    preferences.push(filename);
    std::fs::write(preferences, header.to_owned() + body)?;
    Ok(())
}
