use core::time::Duration;
use orbit_core::{Command, Core, ReadinessGate, Signal};
use std::path::Path;
use tracing::debug;

/// Cold start, a trip to the in-game menu, a trip to the background and
/// finally leaving the game.
pub const DEFAULT_SCRIPT: &str = "\
resume
surface-created
surface-changed 1280 720
focus on
wait 50
# menu opened
focus off
wait 20
focus on
# home button
pause
focus off
resume
focus on
wait 50
pause
surface-destroyed
";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Signal(Signal),
    Wait(Duration),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Record {
    pub command: Option<Command>,
    pub signal: Signal,
}

/// Parses a lifecycle script.
///
/// One step per line: a signal (`focus on`, `surface-changed 640 480`, ...)
/// or `wait <milliseconds>`. Blank lines and lines starting with `#` are
/// skipped.
///
/// # Errors
///
/// Returns the first malformed line.
pub fn parse(text: &str) -> Result<Vec<Step>, Error> {
    let mut steps = Vec::new();

    for (index, line) in text.lines().enumerate() {
        let line_number = index + 1;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let (word, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let step = if word == "wait" {
            let millis = rest.trim();
            millis
                .parse()
                .map(|millis| Step::Wait(Duration::from_millis(millis)))
                .map_err(|_err| Error::InvalidWait {
                    line: line_number,
                    value: millis.to_owned(),
                })?
        } else {
            line.parse()
                .map(Step::Signal)
                .map_err(|source| Error::Parse {
                    line: line_number,
                    source,
                })?
        };

        steps.push(step);
    }

    Ok(steps)
}

/// Reads and parses a lifecycle script file.
///
/// # Errors
///
/// Returns an error if the file can't be read or a line is malformed.
pub fn load<P: AsRef<Path>>(path: P) -> Result<Vec<Step>, Error> {
    let text = std::fs::read_to_string(path).map_err(Error::Io)?;
    parse(&text)
}

/// Feeds `steps` through `gate`, sleeping on waits.
///
/// # Errors
///
/// Stops at the first command the core fails to carry out.
pub fn replay<C: Core>(
    gate: &mut ReadinessGate,
    core: &mut C,
    steps: &[Step],
) -> Result<Vec<Record>, C::Error> {
    let mut records = Vec::new();

    for step in steps {
        match *step {
            Step::Signal(signal) => {
                let command = gate.handle(core, signal)?;
                records.push(Record { command, signal });
            }
            Step::Wait(duration) => {
                debug!(?duration, "waiting");
                spin_sleep::sleep(duration);
            }
        }
    }

    Ok(records)
}

#[derive(Debug)]
pub enum Error {
    InvalidWait { line: usize, value: String },
    Io(std::io::Error),
    Parse { line: usize, source: orbit_core::Error },
}

impl std::error::Error for Error {}
impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidWait { line, value } => {
                write!(f, "line {line}: invalid wait duration '{value}'")
            }
            Self::Io(err) => write!(f, "os error: {err}"),
            Self::Parse { line, source } => write!(f, "line {line}: {source}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use orbit_core::{EmuState, ModelCore};

    #[test]
    fn default_script_parses() {
        let steps = parse(DEFAULT_SCRIPT).unwrap();
        assert_eq!(steps[0], Step::Signal(Signal::Resumed));
        assert!(steps.contains(&Step::Wait(Duration::from_millis(50))));
        assert_eq!(steps.last(), Some(&Step::Signal(Signal::SurfaceDestroyed)));
    }

    #[test]
    fn errors_carry_line_numbers() {
        let err = parse("resume\n\n  spin\n").unwrap_err();
        assert!(matches!(err, Error::Parse { line: 3, .. }));
        assert_eq!(err.to_string(), "line 3: unknown lifecycle signal: spin");

        let err = parse("# comment\nwait soon").unwrap_err();
        assert!(matches!(err, Error::InvalidWait { line: 2, .. }));
    }

    #[test]
    fn wait_must_be_a_whole_word() {
        let err = parse("waiting 10").unwrap_err();
        assert_eq!(err.to_string(), "line 1: unknown lifecycle signal: waiting");

        assert_eq!(
            parse("wait\t25").unwrap(),
            [Step::Wait(Duration::from_millis(25))]
        );
    }

    #[test]
    fn default_script_replays_against_model() {
        let steps = parse(DEFAULT_SCRIPT).unwrap();
        let mut gate = ReadinessGate::default();
        let mut core = ModelCore::default();

        let records = replay(&mut gate, &mut core, &steps).unwrap();

        let issued: Vec<Command> = records.iter().filter_map(|record| record.command).collect();
        assert_eq!(
            issued,
            [
                Command::Start,
                Command::Pause { autosave: true },
                Command::Resume,
                Command::Pause { autosave: true },
                Command::Stop,
            ]
        );
        assert_eq!(core.emu_state(), EmuState::Stopped);
    }
}
