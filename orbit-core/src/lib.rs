//! # Orbit lifecycle core
//!
//! Decides when the N64 emulator core may run, pause or stop.
//!
//! Mobile platforms report window focus, activity resume/pause and surface
//! lifetime through independent callbacks with no ordering guarantee. The
//! [`ReadinessGate`] folds them into three readiness flags and turns each
//! notification into at most one command for a [`Core`], checking the
//! state the core reports so that commands are never duplicated.
//!
//! ## Tracing
//!
//! Every flag change and every issued or skipped command is emitted as a
//! `tracing` event with the `orbit_core::gate` target:
//!
//! ```rust,ignore
//! use tracing_subscriber::{fmt, EnvFilter};
//!
//! tracing::subscriber::with_default(
//!     fmt::Subscriber::builder()
//!         .with_env_filter(EnvFilter::new("orbit_core::gate=debug"))
//!         .finish(),
//!     || {
//!         // drive the gate here
//!     }
//! );
//! ```

extern crate alloc;

mod error;
mod gate;
mod model;
mod signal;
mod state;

pub use {
    error::Error,
    gate::{Core, GateConfig, Readiness, ReadinessGate},
    model::ModelCore,
    signal::Signal,
    state::{Command, EmuState},
};
