use crate::Error;
use alloc::string::ToString;
use core::{fmt, str::FromStr};

/// A lifecycle notification delivered by the host platform.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Signal {
    FocusChanged(bool),
    Resumed,
    Paused,
    SurfaceCreated,
    SurfaceChanged { width: u32, height: u32 },
    SurfaceDestroyed,
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FocusChanged(true) => write!(f, "focus on"),
            Self::FocusChanged(false) => write!(f, "focus off"),
            Self::Resumed => write!(f, "resume"),
            Self::Paused => write!(f, "pause"),
            Self::SurfaceCreated => write!(f, "surface-created"),
            Self::SurfaceChanged { width, height } => {
                write!(f, "surface-changed {width} {height}")
            }
            Self::SurfaceDestroyed => write!(f, "surface-destroyed"),
        }
    }
}

fn dimension(signal: &'static str, value: Option<&str>) -> Result<u32, Error> {
    let value = value.ok_or(Error::MissingArgument { signal })?;
    value.parse().map_err(|_err| Error::InvalidArgument {
        signal,
        value: value.to_string(),
    })
}

impl FromStr for Signal {
    type Err = Error;

    /// Parses the textual form produced by `Display`, e.g. `focus off` or
    /// `surface-changed 1280 720`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut words = s.split_whitespace();
        let name = words.next().unwrap_or_default();

        let signal = match name {
            "focus" => match words.next() {
                Some("on") => Self::FocusChanged(true),
                Some("off") => Self::FocusChanged(false),
                Some(other) => {
                    return Err(Error::InvalidArgument {
                        signal: "focus",
                        value: other.to_string(),
                    });
                }
                None => return Err(Error::MissingArgument { signal: "focus" }),
            },
            "resume" => Self::Resumed,
            "pause" => Self::Paused,
            "surface-created" => Self::SurfaceCreated,
            "surface-changed" => Self::SurfaceChanged {
                width: dimension("surface-changed", words.next())?,
                height: dimension("surface-changed", words.next())?,
            },
            "surface-destroyed" => Self::SurfaceDestroyed,
            _ => {
                return Err(Error::UnknownSignal {
                    name: name.to_string(),
                });
            }
        };

        match words.next() {
            None => Ok(signal),
            Some(extra) => Err(Error::InvalidArgument {
                signal: signal.name(),
                value: extra.to_string(),
            }),
        }
    }
}

impl Signal {
    #[must_use]
    #[inline]
    pub const fn name(self) -> &'static str {
        match self {
            Self::FocusChanged(_) => "focus",
            Self::Resumed => "resume",
            Self::Paused => "pause",
            Self::SurfaceCreated => "surface-created",
            Self::SurfaceChanged { .. } => "surface-changed",
            Self::SurfaceDestroyed => "surface-destroyed",
        }
    }
}
