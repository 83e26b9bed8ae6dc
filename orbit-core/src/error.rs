use alloc::string::String;
use core::{error, fmt};
use fmt::Display;

#[derive(Debug, PartialEq, Eq)]
pub enum Error {
    InvalidArgument { signal: &'static str, value: String },
    InvalidStateCode { code: i32 },
    MissingArgument { signal: &'static str },
    UnknownSignal { name: String },
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidStateCode { code } => {
                write!(f, "invalid emulator state code: {code}")
            }
            Self::UnknownSignal { name } => write!(f, "unknown lifecycle signal: {name}"),
            Self::MissingArgument { signal } => {
                write!(f, "missing argument for lifecycle signal '{signal}'")
            }
            Self::InvalidArgument { signal, value } => {
                write!(f, "invalid argument for lifecycle signal '{signal}': {value}")
            }
        }
    }
}

impl error::Error for Error {}
