use crate::{Command, EmuState, Signal};
use core::fmt::Display;
use tracing::{debug, info};

/// The transition interface of the emulator core.
///
/// Implementations forward to whatever actually runs the emulator. The gate
/// treats every call as fire-and-forget and never retries a failed command.
pub trait Core {
    type Error: Display;

    fn pause(&mut self, autosave: bool) -> Result<(), Self::Error>;
    fn resume(&mut self) -> Result<(), Self::Error>;
    fn start(&mut self) -> Result<(), Self::Error>;
    fn state(&mut self) -> Result<EmuState, Self::Error>;
    fn stop(&mut self) -> Result<(), Self::Error>;
}

/// The three preconditions for running the emulator.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Readiness {
    pub focused: bool,
    pub resumed: bool,
    pub surface_available: bool,
}

impl Readiness {
    #[must_use]
    #[inline]
    pub const fn is_ready(self) -> bool {
        self.focused && self.resumed && self.surface_available
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct GateConfig {
    /// Passed to every pause the gate issues, including the one forced
    /// before a stop.
    pub autosave_on_pause: bool,
}

impl Default for GateConfig {
    #[inline]
    fn default() -> Self {
        Self {
            autosave_on_pause: true,
        }
    }
}

/// Serializes out-of-order lifecycle notifications into run, pause and stop
/// commands for the emulator core.
///
/// The platform reports window focus, activity resume/pause and surface
/// creation/destruction in no guaranteed order. The emulator may only run
/// while all three are present, so every notification updates one
/// [`Readiness`] flag and then evaluates which command, if any, to send.
/// Each evaluation checks the state reported by the core first, so repeated
/// notifications never issue duplicate commands.
///
/// The gate does not own the core: every operation borrows it, so an FFI
/// caller can wrap its per-call environment in a short-lived adapter.
#[derive(Debug, Default)]
pub struct ReadinessGate {
    config: GateConfig,
    readiness: Readiness,
    surface_size: Option<(u32, u32)>,
}

impl ReadinessGate {
    #[must_use]
    #[inline]
    pub const fn config(&self) -> GateConfig {
        self.config
    }

    /// Runs the emulator if every flag is set and it isn't already running.
    ///
    /// Starts a fresh core, resumes a paused one. A stopped core is never
    /// restarted from here.
    ///
    /// # Errors
    ///
    /// Returns the core's error if querying its state or sending the command
    /// fails.
    pub fn evaluate_for_run<C: Core>(&self, core: &mut C) -> Result<Option<Command>, C::Error> {
        if !self.readiness.is_ready() {
            debug!(target: "orbit_core::gate", readiness = ?self.readiness, "not ready to run");
            return Ok(None);
        }

        match core.state()? {
            EmuState::Unknown => {
                info!(target: "orbit_core::gate", "starting emulator");
                core.start()?;
                Ok(Some(Command::Start))
            }
            EmuState::Paused => {
                info!(target: "orbit_core::gate", "resuming emulator");
                core.resume()?;
                Ok(Some(Command::Resume))
            }
            state @ (EmuState::Running | EmuState::Stopped) => {
                debug!(target: "orbit_core::gate", %state, "run request ignored");
                Ok(None)
            }
        }
    }

    /// Pauses the emulator unless it is already paused.
    ///
    /// # Errors
    ///
    /// Returns the core's error if querying its state or pausing fails.
    pub fn evaluate_pause<C: Core>(&self, core: &mut C) -> Result<Option<Command>, C::Error> {
        let state = core.state()?;
        if state == EmuState::Paused {
            debug!(target: "orbit_core::gate", "already paused");
            return Ok(None);
        }

        let autosave = self.config.autosave_on_pause;
        info!(target: "orbit_core::gate", %state, autosave, "pausing emulator");
        core.pause(autosave)?;
        Ok(Some(Command::Pause { autosave }))
    }

    /// Stops the emulator unless it is already stopped.
    ///
    /// A pause is always sent first so that autosave completes before
    /// teardown. If that pause fails the stop is not sent.
    ///
    /// # Errors
    ///
    /// Returns the core's error if querying its state, pausing or stopping
    /// fails.
    pub fn evaluate_stop<C: Core>(&self, core: &mut C) -> Result<Option<Command>, C::Error> {
        let state = core.state()?;
        if state == EmuState::Stopped {
            debug!(target: "orbit_core::gate", "already stopped");
            return Ok(None);
        }

        let autosave = self.config.autosave_on_pause;
        info!(target: "orbit_core::gate", %state, autosave, "stopping emulator");
        core.pause(autosave)?;
        core.stop()?;
        Ok(Some(Command::Stop))
    }

    /// Dispatches a [`Signal`] to the matching notification entry point.
    ///
    /// # Errors
    ///
    /// Returns the core's error if the resulting evaluation fails.
    pub fn handle<C: Core>(
        &mut self,
        core: &mut C,
        signal: Signal,
    ) -> Result<Option<Command>, C::Error> {
        match signal {
            Signal::FocusChanged(focused) => self.on_window_focus_changed(core, focused),
            Signal::Resumed => self.on_resume(core),
            Signal::Paused => self.on_pause(core),
            Signal::SurfaceCreated => self.on_surface_created(core),
            Signal::SurfaceChanged { width, height } => {
                self.on_surface_changed(width, height);
                Ok(None)
            }
            Signal::SurfaceDestroyed => self.on_surface_destroyed(core),
        }
    }

    #[must_use]
    #[inline]
    pub fn new(config: GateConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// # Errors
    ///
    /// See [`ReadinessGate::evaluate_pause`].
    #[inline]
    pub fn on_pause<C: Core>(&mut self, core: &mut C) -> Result<Option<Command>, C::Error> {
        self.set_resumed(core, false)
    }

    /// # Errors
    ///
    /// See [`ReadinessGate::evaluate_for_run`].
    #[inline]
    pub fn on_resume<C: Core>(&mut self, core: &mut C) -> Result<Option<Command>, C::Error> {
        self.set_resumed(core, true)
    }

    /// Records the new surface dimensions. Never issues a command.
    #[inline]
    pub fn on_surface_changed(&mut self, width: u32, height: u32) {
        debug!(target: "orbit_core::gate", width, height, "surface changed");
        self.surface_size = Some((width, height));
    }

    /// # Errors
    ///
    /// See [`ReadinessGate::evaluate_for_run`].
    #[inline]
    pub fn on_surface_created<C: Core>(
        &mut self,
        core: &mut C,
    ) -> Result<Option<Command>, C::Error> {
        self.set_surface_available(core, true)
    }

    /// # Errors
    ///
    /// See [`ReadinessGate::evaluate_stop`].
    #[inline]
    pub fn on_surface_destroyed<C: Core>(
        &mut self,
        core: &mut C,
    ) -> Result<Option<Command>, C::Error> {
        self.surface_size = None;
        self.set_surface_available(core, false)
    }

    /// # Errors
    ///
    /// See [`ReadinessGate::evaluate_for_run`].
    #[inline]
    pub fn on_window_focus_changed<C: Core>(
        &mut self,
        core: &mut C,
        focused: bool,
    ) -> Result<Option<Command>, C::Error> {
        self.set_focused(core, focused)
    }

    #[must_use]
    #[inline]
    pub const fn readiness(&self) -> Readiness {
        self.readiness
    }

    /// Updates the focus flag.
    ///
    /// Losing focus never pauses: menus and dialogs take focus from the game
    /// window all the time and must not interrupt emulation.
    ///
    /// # Errors
    ///
    /// See [`ReadinessGate::evaluate_for_run`].
    pub fn set_focused<C: Core>(
        &mut self,
        core: &mut C,
        focused: bool,
    ) -> Result<Option<Command>, C::Error> {
        debug!(target: "orbit_core::gate", focused, "focus changed");
        self.readiness.focused = focused;

        if focused {
            self.evaluate_for_run(core)
        } else {
            Ok(None)
        }
    }

    /// # Errors
    ///
    /// See [`ReadinessGate::evaluate_for_run`] and
    /// [`ReadinessGate::evaluate_pause`].
    pub fn set_resumed<C: Core>(
        &mut self,
        core: &mut C,
        resumed: bool,
    ) -> Result<Option<Command>, C::Error> {
        debug!(target: "orbit_core::gate", resumed, "resumed changed");
        self.readiness.resumed = resumed;

        if resumed {
            self.evaluate_for_run(core)
        } else {
            self.evaluate_pause(core)
        }
    }

    /// Losing the surface goes straight to [`ReadinessGate::evaluate_stop`],
    /// which pauses before it stops. That forced pause takes the place of a
    /// separate [`ReadinessGate::evaluate_pause`] pass.
    ///
    /// # Errors
    ///
    /// See [`ReadinessGate::evaluate_for_run`] and
    /// [`ReadinessGate::evaluate_stop`].
    pub fn set_surface_available<C: Core>(
        &mut self,
        core: &mut C,
        available: bool,
    ) -> Result<Option<Command>, C::Error> {
        debug!(target: "orbit_core::gate", available, "surface availability changed");
        self.readiness.surface_available = available;

        if available {
            self.evaluate_for_run(core)
        } else {
            self.evaluate_stop(core)
        }
    }

    #[must_use]
    #[inline]
    pub const fn surface_size(&self) -> Option<(u32, u32)> {
        self.surface_size
    }
}
