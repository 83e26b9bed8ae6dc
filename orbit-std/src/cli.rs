pub use clap;
use std::path::{Path, PathBuf};

pub const QUALIFIER: &str = "com.github";
pub const ORGANIZATION: &str = "orbit64";
pub const ORBIT_BIN: &str = "orbit";
pub const ORBIT_STYLIZED: &str = "Orbit";
const ABOUT: &str = "Replays platform lifecycle notifications through the emulator readiness gate.";
const AFTER_HELP: &str = "Script syntax, one step per line:

    | Step                     | Meaning                          |
    | ------------------------ | -------------------------------- |
    | focus on / focus off     | window focus gained / lost       |
    | resume / pause           | activity resumed / paused        |
    | surface-created          | rendering surface created        |
    | surface-changed W H      | surface resized to W x H         |
    | surface-destroyed        | rendering surface destroyed      |
    | wait MS                  | sleep MS milliseconds            |

Lines starting with # are comments. Without a script a built-in session is
replayed.
";

#[derive(clap::Parser, Default)]
#[command(name = ORBIT_BIN, about = ABOUT, after_help = AFTER_HELP)]
pub struct Cli {
    #[arg(short, long, help = "Settings file (JSON)")]
    config: Option<PathBuf>,
    #[arg(
        long,
        help = "Replay against an in-memory model of the emulator instead of a running thread",
        default_value_t = false
    )]
    dry_run: bool,
    #[arg(
        short,
        long,
        help = "tracing filter directive",
        default_value = "info",
        required = false
    )]
    log: String,
    #[arg(
        help = "Lifecycle script to replay",
        long_help = "Lifecycle script to replay. See below for the syntax. When omitted a \
           built-in session (cold start, menu, background, exit) is replayed.",
        required = false
    )]
    script: Option<PathBuf>,
    #[arg(short, long, help = "Emulation speed multiplier, overrides the settings file")]
    speed: Option<u32>,
    #[arg(
        short,
        long,
        help = "Write the gate decisions as a Chrome trace to this file"
    )]
    trace: Option<PathBuf>,
}

impl Cli {
    #[must_use]
    #[inline]
    pub fn config(&self) -> Option<&Path> {
        self.config.as_deref()
    }

    #[must_use]
    #[inline]
    pub const fn dry_run(&self) -> bool {
        self.dry_run
    }

    #[must_use]
    #[inline]
    pub fn log(&self) -> &str {
        &self.log
    }

    #[must_use]
    #[inline]
    pub fn script(&self) -> Option<&Path> {
        self.script.as_deref()
    }

    #[must_use]
    #[inline]
    pub const fn speed(&self) -> Option<u32> {
        self.speed
    }

    #[must_use]
    #[inline]
    pub fn trace(&self) -> Option<&Path> {
        self.trace.as_deref()
    }
}
