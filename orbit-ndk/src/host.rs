use log::{error, info};
use orbit_core::{Command, Core, GateConfig, ReadinessGate, Signal};

/// What a Java-side handle points at.
///
/// Lifecycle callbacks can't report failures back to the activity, so
/// errors from the core are logged here and dropped.
#[derive(Debug, Default)]
pub struct Host {
    gate: ReadinessGate,
}

impl Host {
    #[must_use]
    pub const fn gate(&self) -> &ReadinessGate {
        &self.gate
    }

    #[must_use]
    pub fn new(config: GateConfig) -> Self {
        Self {
            gate: ReadinessGate::new(config),
        }
    }

    pub fn notify<C: Core>(&mut self, core: &mut C, signal: Signal) -> Option<Command> {
        match self.gate.handle(core, signal) {
            Ok(Some(command)) => {
                info!("{signal}: {command}");
                Some(command)
            }
            Ok(None) => None,
            Err(err) => {
                error!("{signal}: emulator command failed: {err}");
                None
            }
        }
    }
}
