#[cfg(feature = "cli")]
pub mod cli;
mod config;
mod machine;
pub mod script;
mod thread;
pub mod trace;

pub use config::{Error as ConfigError, SETTINGS_FILE, Settings};
pub use machine::{FrameCounter, Machine};
pub use orbit_core::{Command, Core, EmuState, GateConfig, ModelCore, ReadinessGate, Signal};
pub use script::{Error as ScriptError, Record, Step};
pub use thread::{EmuThread, Error as ThreadError};
pub use trace::TransitionRecorder;
