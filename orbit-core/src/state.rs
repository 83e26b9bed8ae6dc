use crate::Error;
use core::fmt;

/// Run state reported by the emulator core.
///
/// The discriminants are the codes the native core uses across the FFI
/// boundary.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum EmuState {
    #[default]
    Unknown = 0,
    Stopped = 1,
    Running = 2,
    Paused = 3,
}

impl EmuState {
    #[must_use]
    #[inline]
    pub const fn code(self) -> i32 {
        self as i32
    }
}

impl TryFrom<i32> for EmuState {
    type Error = Error;

    #[inline]
    fn try_from(code: i32) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Self::Unknown),
            1 => Ok(Self::Stopped),
            2 => Ok(Self::Running),
            3 => Ok(Self::Paused),
            _ => Err(Error::InvalidStateCode { code }),
        }
    }
}

impl fmt::Display for EmuState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown => write!(f, "unknown"),
            Self::Stopped => write!(f, "stopped"),
            Self::Running => write!(f, "running"),
            Self::Paused => write!(f, "paused"),
        }
    }
}

/// A transition command sent to the emulator core.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Command {
    Start,
    Resume,
    Pause { autosave: bool },
    Stop,
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Start => write!(f, "start"),
            Self::Resume => write!(f, "resume"),
            Self::Pause { autosave: true } => write!(f, "pause (autosave)"),
            Self::Pause { autosave: false } => write!(f, "pause"),
            Self::Stop => write!(f, "stop"),
        }
    }
}
