#![warn(clippy::pedantic)]

pub mod actions;
pub mod global;
pub mod session;
pub mod shell;

use anyhow::Result as AnyResult;

fn main() -> AnyResult<()> {
    let has_term = std::io::IsTerminal::is_terminal(&std::io::stdin());
    // Log to a terminal, if available. Else, log to "log.out" in the working directory.
    if has_term {
        env_logger::builder()
            .filter_level(log::LevelFilter::Debug)
            .init();
    } else {
        let _ = simple_logging::log_to_file("log.out", log::LevelFilter::Debug);
    }

    // A single argument, the working directory. Paths are OSStrings, let the system handle
    // character encoding restrictions.
    let mut args = std::env::args_os().skip(1);
    let (Some(workdir), None) = (args.next(), args.next()) else {
        anyhow::bail!("usage: {} <workdir>", env!("CARGO_PKG_NAME"));
    };
    let workdir = std::path::PathBuf::from(workdir);

    let preferences = global::preferences::Preferences::get();
    if let Err(e) = preferences.save() {
        log::warn!("Failed to save preferences:\n{e:?}");
    };
    let hotkeys = global::hotkeys::Hotkeys::get();
    if hotkeys.did_fail_to_load() {
        log::info!("Using default hotkeys.");
    }
    for action in <actions::Action as strum::IntoEnumIterator>::iter() {
        let keys: Vec<String> = hotkeys
            .actions_to_keys
            .keys_of(action)
            .iter()
            .map(ToString::to_string)
            .collect();
        log::debug!("{} = {keys:?}", action.as_ref());
    }
    if let Err(e) = hotkeys.save() {
        log::warn!("Failed to save hotkey config:\n{e:?}");
    };

    let mut session = session::Session::open(&workdir, preferences)?;
    let (generated, failures) = session.generate_missing_masks();
    for failure in &failures {
        log::error!("{failure}");
    }
    log::info!(
        "generated {generated} autoseg masks, {} failed",
        failures.len()
    );

    session.load_latest_sample()?;
    log::info!(
        "resuming at sample {} of {}",
        session.current_index() + 1,
        session.len()
    );

    let result = shell::run(&mut session, &hotkeys.keys_to_actions, std::io::stdin().lock());
    // Save even if input broke off.
    session.close()?;
    result?;
    Ok(())
}
