use crate::{Command, Core, EmuState};
use alloc::vec::Vec;
use core::convert::Infallible;

/// In-memory stand-in for the emulator core.
///
/// Follows the same state machine the native core does and keeps every
/// command it receives, in order.
#[derive(Debug, Default)]
pub struct ModelCore {
    commands: Vec<Command>,
    state: EmuState,
}

impl ModelCore {
    #[inline]
    pub fn clear_commands(&mut self) {
        self.commands.clear();
    }

    #[must_use]
    #[inline]
    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    #[must_use]
    #[inline]
    pub const fn emu_state(&self) -> EmuState {
        self.state
    }

    #[must_use]
    #[inline]
    pub const fn with_state(state: EmuState) -> Self {
        Self {
            commands: Vec::new(),
            state,
        }
    }
}

impl Core for ModelCore {
    type Error = Infallible;

    #[inline]
    fn pause(&mut self, autosave: bool) -> Result<(), Self::Error> {
        self.commands.push(Command::Pause { autosave });
        if self.state == EmuState::Running {
            self.state = EmuState::Paused;
        }
        Ok(())
    }

    #[inline]
    fn resume(&mut self) -> Result<(), Self::Error> {
        self.commands.push(Command::Resume);
        if self.state == EmuState::Paused {
            self.state = EmuState::Running;
        }
        Ok(())
    }

    #[inline]
    fn start(&mut self) -> Result<(), Self::Error> {
        self.commands.push(Command::Start);
        if self.state == EmuState::Unknown {
            self.state = EmuState::Running;
        }
        Ok(())
    }

    #[inline]
    fn state(&mut self) -> Result<EmuState, Self::Error> {
        Ok(self.state)
    }

    #[inline]
    fn stop(&mut self) -> Result<(), Self::Error> {
        self.commands.push(Command::Stop);
        self.state = EmuState::Stopped;
        Ok(())
    }
}
