//! Line-oriented front end, driving a [`Session`] from text commands. One command per line:
//!
//! | Command                        | Effect                                        |
//! |--------------------------------|-----------------------------------------------|
//! | `key <hotkey>`                 | Run whatever action the hotkey is bound to    |
//! | `down <x> <y>`                 | Press at image coordinates                    |
//! | `move <x> <y>`                 | Move, held or not                             |
//! | `up`                           | Release                                       |
//! | `leave`                        | Pointer left the canvas                       |
//! | `scroll <delta>`               | Grow or shrink the brush by the delta's sign  |
//! | `size <px>`                    | Set the brush diameter                        |
//! | `class <id>`                   | Paint with a class                            |
//! | `assist on\|off`               |                                               |
//! | `eraser on\|off`               |                                               |
//! | `opacity label\|autoseg <pct>` |                                               |
//! | `threshold <luma>`             | Rebuild the current mask                      |
//! | `goto <index>`                 | Save and jump to a sample                     |
//! | `save`                         |                                               |
//! | `render <path>`                | Write the flattened layer stack as a PNG      |
//! | `status`                       | Log where we are                              |
//! | `quit`                         | Stop reading commands                         |
//!
//! Empty lines and lines starting with `#` are skipped.

use std::path::PathBuf;

use segpaint_core::{blend::Opacity, util::Point};

use crate::actions::hotkeys::{KeyboardHotkey, KeysToActions};
use crate::session::{Session, SessionError};

#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    Key(KeyboardHotkey),
    Down(Point),
    Move(Point),
    Up,
    Leave,
    Scroll(i32),
    Size(u32),
    Class(u32),
    Assist(bool),
    Eraser(bool),
    LabelOpacity(Opacity),
    AutosegOpacity(Opacity),
    Threshold(u8),
    Goto(usize),
    Save,
    Render(PathBuf),
    Status,
    Quit,
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum ParseError {
    #[error("unknown command {0:?}")]
    Unknown(String),
    #[error("{0}: missing argument")]
    MissingArgument(&'static str),
    #[error("{command}: bad argument {argument:?}")]
    BadArgument {
        command: &'static str,
        argument: String,
    },
    #[error("{0}: too many arguments")]
    TooManyArguments(&'static str),
}

/// Pulls typed arguments for one command off a line.
struct Arguments<'a> {
    command: &'static str,
    words: std::str::SplitWhitespace<'a>,
}
impl<'a> Arguments<'a> {
    fn next_str(&mut self) -> Result<&'a str, ParseError> {
        self.words
            .next()
            .ok_or(ParseError::MissingArgument(self.command))
    }
    fn next<T: std::str::FromStr>(&mut self) -> Result<T, ParseError> {
        let word = self.next_str()?;
        word.parse().map_err(|_| ParseError::BadArgument {
            command: self.command,
            argument: word.to_owned(),
        })
    }
    fn next_switch(&mut self) -> Result<bool, ParseError> {
        match self.next_str()? {
            "on" => Ok(true),
            "off" => Ok(false),
            other => Err(self.bad(other)),
        }
    }
    fn next_point(&mut self) -> Result<Point, ParseError> {
        Ok([self.next()?, self.next()?])
    }
    fn bad(&self, argument: &str) -> ParseError {
        ParseError::BadArgument {
            command: self.command,
            argument: argument.to_owned(),
        }
    }
    fn finish(mut self, command: Command) -> Result<Command, ParseError> {
        match self.words.next() {
            None => Ok(command),
            Some(_) => Err(ParseError::TooManyArguments(self.command)),
        }
    }
}

impl std::str::FromStr for Command {
    type Err = ParseError;
    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let name = words.next().unwrap_or_default();
        let command: &'static str = match name {
            "key" => "key",
            "down" => "down",
            "move" => "move",
            "up" => "up",
            "leave" => "leave",
            "scroll" => "scroll",
            "size" => "size",
            "class" => "class",
            "assist" => "assist",
            "eraser" => "eraser",
            "opacity" => "opacity",
            "threshold" => "threshold",
            "goto" => "goto",
            "save" => "save",
            "render" => "render",
            "status" => "status",
            "quit" => "quit",
            other => return Err(ParseError::Unknown(other.to_owned())),
        };
        let mut args = Arguments { command, words };
        let parsed = match command {
            "key" => Command::Key(args.next()?),
            "down" => Command::Down(args.next_point()?),
            "move" => Command::Move(args.next_point()?),
            "up" => Command::Up,
            "leave" => Command::Leave,
            "scroll" => Command::Scroll(args.next()?),
            "size" => Command::Size(args.next()?),
            "class" => Command::Class(args.next()?),
            "assist" => Command::Assist(args.next_switch()?),
            "eraser" => Command::Eraser(args.next_switch()?),
            "opacity" => {
                let layer = args.next_str()?;
                let percent: u8 = args.next()?;
                let opacity = Opacity::from_percent(percent)
                    .ok_or_else(|| args.bad(&percent.to_string()))?;
                match layer {
                    "label" => Command::LabelOpacity(opacity),
                    "autoseg" => Command::AutosegOpacity(opacity),
                    other => return Err(args.bad(other)),
                }
            }
            "threshold" => Command::Threshold(args.next()?),
            "goto" => Command::Goto(args.next()?),
            "save" => Command::Save,
            "render" => Command::Render(args.next_str()?.into()),
            "status" => Command::Status,
            _ => Command::Quit,
        };
        args.finish(parsed)
    }
}

/// Whether to keep reading commands.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Run one command against the session.
/// # Errors
/// Anything the session reports. None of them end the shell.
pub fn execute(
    session: &mut Session,
    keys: &KeysToActions,
    command: Command,
) -> anyhow::Result<Flow> {
    match command {
        Command::Key(hotkey) => match keys.action_of(&hotkey) {
            Some(action) => {
                log::debug!("{hotkey} -> {}", action.as_ref());
                session.apply(action)?;
            }
            None => log::debug!("{hotkey} is unbound"),
        },
        Command::Down(at) => {
            session.scene_mut().pointer_down(at);
        }
        Command::Move(at) => {
            session.scene_mut().pointer_move(at);
        }
        Command::Up => session.scene_mut().pointer_up(),
        Command::Leave => session.scene_mut().pointer_leave(),
        Command::Scroll(delta) => session.scroll(delta),
        Command::Size(px) => {
            session
                .scene_mut()
                .set_brush_size(px)
                .map_err(SessionError::from)?;
        }
        Command::Class(id) => {
            if !session.select_class(id) {
                anyhow::bail!("no class with id {id}");
            }
        }
        Command::Assist(on) => session.scene_mut().set_assist(on),
        Command::Eraser(on) => session.set_eraser(on),
        Command::LabelOpacity(opacity) => session.scene_mut().set_label_opacity(opacity),
        Command::AutosegOpacity(opacity) => session.scene_mut().set_autoseg_opacity(opacity),
        Command::Threshold(threshold) => session
            .scene_mut()
            .rebuild_mask(threshold)
            .map_err(SessionError::from)?,
        Command::Goto(index) => {
            session.save_current_label()?;
            session.load_sample(index)?;
        }
        Command::Save => session.save_current_label()?,
        Command::Render(path) => {
            session.scene().render().save_to(&path)?;
            log::info!("rendered to {path:?}");
        }
        Command::Status => {
            let scene = session.scene();
            let brush = scene.brush();
            let class = session
                .selected_class()
                .and_then(|id| session.classes().get(id))
                .map_or("none", |class| class.name.as_str());
            log::info!(
                "sample {}/{}, class {class}, brush {}px {} {}{}, gesture {}, {} labelled pixels",
                session.current_index() + 1,
                session.len(),
                brush.diameter.get(),
                brush.color,
                brush.mode.as_ref(),
                if brush.assist { " (assisted)" } else { "" },
                scene.gesture().as_ref(),
                scene.label().count_opaque(),
            );
        }
        Command::Quit => return Ok(Flow::Quit),
    }
    Ok(Flow::Continue)
}

/// Read and execute commands until `quit` or end of input. Bad lines are logged and skipped.
/// # Errors
/// Only if reading the input fails.
pub fn run(
    session: &mut Session,
    keys: &KeysToActions,
    input: impl std::io::BufRead,
) -> std::io::Result<()> {
    for (number, line) in input.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let command = match line.parse::<Command>() {
            Ok(command) => command,
            Err(e) => {
                log::error!("line {}: {e}", number + 1);
                continue;
            }
        };
        match execute(session, keys, command) {
            Ok(Flow::Continue) => (),
            Ok(Flow::Quit) => break,
            Err(e) => log::error!("line {}: {e:#}", number + 1),
        }
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use super::{Command, ParseError};
    use crate::actions::hotkeys::{ActionsToKeys, Key, KeyboardHotkey, KeysToActions};
    use crate::global::preferences::Preferences;
    use crate::session::{test::workdir, Session};
    use segpaint_core::blend::Opacity;

    #[test]
    fn parse() {
        assert_eq!(
            "key ctrl+KeyA".parse::<Command>(),
            Ok(Command::Key(KeyboardHotkey {
                ctrl: true,
                alt: false,
                shift: false,
                key: Key::KeyA,
            }))
        );
        assert_eq!("down 1.5 2".parse::<Command>(), Ok(Command::Down([1.5, 2.0])));
        assert_eq!("  up  ".parse::<Command>(), Ok(Command::Up));
        assert_eq!("assist on".parse::<Command>(), Ok(Command::Assist(true)));
        assert_eq!(
            "opacity autoseg 20".parse::<Command>(),
            Ok(Command::AutosegOpacity(Opacity::from_percent(20).unwrap()))
        );
        assert_eq!("scroll -120".parse::<Command>(), Ok(Command::Scroll(-120)));
    }

    #[test]
    fn parse_errors() {
        assert_eq!(
            "paint".parse::<Command>(),
            Err(ParseError::Unknown("paint".to_owned()))
        );
        assert_eq!(
            "down 1".parse::<Command>(),
            Err(ParseError::MissingArgument("down"))
        );
        assert_eq!(
            "up now".parse::<Command>(),
            Err(ParseError::TooManyArguments("up"))
        );
        assert!(matches!(
            "opacity label 101".parse::<Command>(),
            Err(ParseError::BadArgument { .. })
        ));
        assert!(matches!(
            "eraser maybe".parse::<Command>(),
            Err(ParseError::BadArgument { .. })
        ));
    }

    #[test]
    fn run_script() {
        let dir = workdir(2);
        let mut session = Session::open(dir.path(), &Preferences::default()).unwrap();
        session.load_sample(0).unwrap();
        let keys = KeysToActions::try_from(&ActionsToKeys::default()).unwrap();
        let render = dir.path().join("render.png");
        let script = format!(
            "# comment\n\
             size 6\n\
             down 2 2\n\
             move 10 2\n\
             up\n\
             bogus line\n\
             render {}\n\
             key Period\n\
             quit\n\
             key Comma\n",
            render.display()
        );
        super::run(&mut session, &keys, script.as_bytes()).unwrap();

        assert!(render.exists());
        // Period moved on, and nothing after quit ran.
        assert_eq!(session.current_index(), 1);
        assert!(dir.path().join("labels").join("000000.png").exists());
        assert_eq!(session.scene().brush().diameter.get(), 6);
    }
}
