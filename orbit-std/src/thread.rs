use crate::{Settings, machine::Machine};
use core::sync::atomic::{AtomicU32, Ordering::Relaxed};
use core::time::Duration;
use orbit_core::{Core, EmuState};
use std::{
    fs::File,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
    sync::{Arc, Condvar, Mutex},
    thread::JoinHandle,
    time::Instant,
};
use thread_priority::ThreadBuilderExt;
use tracing::{debug, error, info};

type Control = (Mutex<EmuState>, Condvar);

/// Runs a [`Machine`] on its own thread and exposes it as a [`Core`].
///
/// The state follows the native emulator: `start` leaves `Unknown`, `pause`
/// and `resume` toggle between `Running` and `Paused`, and `stop` is final.
pub struct EmuThread<M: Machine> {
    autosave_path: Option<PathBuf>,
    control: Arc<Control>,
    frame_rate: u32,
    machine: Arc<Mutex<M>>,
    multiplier: Arc<AtomicU32>,
    thread_handle: Option<JoinHandle<()>>,
}

impl<M: Machine> EmuThread<M> {
    fn autosave(&self, path: &Path) -> Result<(), Error> {
        // Waits for the frame in flight
        let machine = self.machine.lock().map_err(|_err| Error::Poisoned)?;

        let mut writer = BufWriter::new(File::create(path)?);
        machine.save_state(&mut writer)?;
        writer.flush()?;

        info!(path = %path.display(), "autosaved");
        Ok(())
    }

    fn emu_loop(machine: &Mutex<M>, control: &Control, frame_rate: u32, multiplier: &AtomicU32) {
        let (state_lock, state_cvar) = control;
        let mut last_loop = Instant::now();

        loop {
            {
                let Ok(mut state) = state_lock.lock() else {
                    return;
                };
                while *state == EmuState::Paused {
                    match state_cvar.wait(state) {
                        Ok(new_state) => state = new_state,
                        Err(_err) => return,
                    }
                }
                if *state == EmuState::Stopped {
                    break;
                }
            }

            // A pause may land between the check above and here
            if let Ok(mut machine) = machine.lock()
                && state_lock
                    .lock()
                    .is_ok_and(|state| *state == EmuState::Running)
            {
                machine.run_frame();
            }

            let fps = frame_rate.max(1).saturating_mul(multiplier.load(Relaxed).max(1));
            let duration = Duration::from_secs(1) / fps;
            let elapsed = last_loop.elapsed();

            if elapsed < duration {
                spin_sleep::sleep(duration - elapsed);
            }

            last_loop = Instant::now();
        }

        debug!("emulation loop exited");
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.control
            .0
            .lock()
            .is_ok_and(|state| *state == EmuState::Running)
    }

    #[must_use]
    pub fn multiplier(&self) -> u32 {
        self.multiplier.load(Relaxed)
    }

    /// Creates a host for `machine`. Nothing runs until [`Core::start`].
    #[must_use]
    pub fn new(machine: M, settings: &Settings) -> Self {
        Self {
            autosave_path: settings.autosave_path.clone(),
            control: Arc::new((Mutex::new(EmuState::Unknown), Condvar::new())),
            frame_rate: settings.frame_rate,
            machine: Arc::new(Mutex::new(machine)),
            multiplier: Arc::new(AtomicU32::new(settings.speed_multiplier.max(1))),
            thread_handle: None,
        }
    }

    pub fn set_speed_multiplier(&self, multiplier: u32) {
        self.multiplier.store(multiplier.max(1), Relaxed);
        debug!(multiplier, "speed multiplier set");
    }

    fn set_state(&self, from: &[EmuState], to: EmuState) -> Result<bool, Error> {
        let (state_lock, state_cvar) = &*self.control;
        let mut state = state_lock.lock().map_err(|_err| Error::Poisoned)?;

        if from.contains(&*state) {
            *state = to;
            state_cvar.notify_one();
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Gives `f` access to the machine, waiting for the frame in flight.
    ///
    /// # Errors
    ///
    /// Returns an error if the emulation thread panicked while holding the
    /// machine.
    pub fn with_machine<R>(&self, f: impl FnOnce(&M) -> R) -> Result<R, Error> {
        self.machine
            .lock()
            .map(|machine| f(&machine))
            .map_err(|_err| Error::Poisoned)
    }
}

impl<M: Machine> Core for EmuThread<M> {
    type Error = Error;

    /// Parks the loop before its next frame. With `autosave` and a
    /// configured autosave path the machine state is written once the frame
    /// in flight completes, even if the loop was already paused.
    fn pause(&mut self, autosave: bool) -> Result<(), Self::Error> {
        if self.set_state(&[EmuState::Running], EmuState::Paused)? {
            debug!("emulation paused");
        }

        if autosave
            && self.thread_handle.is_some()
            && let Some(path) = &self.autosave_path
        {
            self.autosave(path)?;
        }

        Ok(())
    }

    fn resume(&mut self) -> Result<(), Self::Error> {
        if self.set_state(&[EmuState::Paused], EmuState::Running)? {
            debug!("emulation resumed");
        }
        Ok(())
    }

    fn start(&mut self) -> Result<(), Self::Error> {
        if self.thread_handle.is_some() {
            return Err(Error::AlreadyStarted);
        }

        if !self.set_state(&[EmuState::Unknown], EmuState::Running)? {
            return Err(Error::Stopped);
        }

        let thread_builder = std::thread::Builder::new().name("emu_loop".to_owned());
        let spawned = {
            let machine = Arc::clone(&self.machine);
            let control = Arc::clone(&self.control);
            let multiplier = Arc::clone(&self.multiplier);
            let frame_rate = self.frame_rate;

            thread_builder.spawn_with_priority(thread_priority::ThreadPriority::Max, move |_| {
                Self::emu_loop(&machine, &control, frame_rate, &multiplier);
            })
        };

        match spawned {
            Ok(handle) => {
                self.thread_handle = Some(handle);
                debug!("emulation thread started");
                Ok(())
            }
            Err(err) => {
                self.set_state(&[EmuState::Running], EmuState::Unknown)?;
                Err(Error::Io(err))
            }
        }
    }

    fn state(&mut self) -> Result<EmuState, Self::Error> {
        self.control
            .0
            .lock()
            .map(|state| *state)
            .map_err(|_err| Error::Poisoned)
    }

    /// Stops the loop and waits for the thread to finish.
    fn stop(&mut self) -> Result<(), Self::Error> {
        self.set_state(
            &[EmuState::Unknown, EmuState::Running, EmuState::Paused],
            EmuState::Stopped,
        )?;

        if let Some(handle) = self.thread_handle.take() {
            handle.join().map_err(|_err| Error::ThreadJoin)?;
            debug!("emulation thread joined");
        }

        Ok(())
    }
}

impl<M: Machine> Drop for EmuThread<M> {
    fn drop(&mut self) {
        if self.thread_handle.is_some()
            && let Err(err) = self.stop()
        {
            error!("error stopping emulation thread: {err}");
        }
    }
}

#[derive(Debug)]
pub enum Error {
    AlreadyStarted,
    Io(std::io::Error),
    Poisoned,
    Stopped,
    ThreadJoin,
}

impl std::error::Error for Error {}
impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AlreadyStarted => write!(f, "emulation thread already started"),
            Self::Io(err) => write!(f, "os error: {err}"),
            Self::Poisoned => write!(f, "emulation thread panicked"),
            Self::Stopped => write!(f, "emulation already stopped"),
            Self::ThreadJoin => write!(f, "thread join error"),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FrameCounter;
    use tracing_test::traced_test;

    fn fast_settings() -> Settings {
        Settings {
            frame_rate: 1000,
            ..Settings::default()
        }
    }

    fn wait_for_frames(thread: &EmuThread<FrameCounter>, frames: u64) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while thread.with_machine(FrameCounter::frames).unwrap() < frames {
            assert!(Instant::now() < deadline, "emulation thread made no progress");
            std::thread::sleep(Duration::from_millis(1));
        }
    }

    #[test]
    fn pause_freezes_frame_count() {
        let mut thread = EmuThread::new(FrameCounter::default(), &fast_settings());
        assert_eq!(thread.state().unwrap(), EmuState::Unknown);

        thread.start().unwrap();
        assert!(thread.is_running());
        wait_for_frames(&thread, 3);

        thread.pause(false).unwrap();
        assert_eq!(thread.state().unwrap(), EmuState::Paused);
        let frozen = thread.with_machine(FrameCounter::frames).unwrap();
        std::thread::sleep(Duration::from_millis(20));
        assert_eq!(thread.with_machine(FrameCounter::frames).unwrap(), frozen);

        thread.resume().unwrap();
        wait_for_frames(&thread, frozen + 3);

        thread.stop().unwrap();
        assert_eq!(thread.state().unwrap(), EmuState::Stopped);
    }

    #[test]
    fn start_twice_is_an_error() {
        let mut thread = EmuThread::new(FrameCounter::default(), &fast_settings());
        thread.start().unwrap();
        assert!(matches!(thread.start(), Err(Error::AlreadyStarted)));
    }

    #[test]
    fn stopped_thread_cannot_start() {
        let mut thread = EmuThread::new(FrameCounter::default(), &fast_settings());
        thread.stop().unwrap();
        assert!(matches!(thread.start(), Err(Error::Stopped)));
    }

    #[test]
    fn resume_before_start_does_nothing() {
        let mut thread = EmuThread::new(FrameCounter::default(), &fast_settings());
        thread.resume().unwrap();
        assert_eq!(thread.state().unwrap(), EmuState::Unknown);
    }

    #[test]
    fn stop_from_pause_exits_thread() {
        let mut thread = EmuThread::new(FrameCounter::default(), &fast_settings());
        thread.start().unwrap();
        thread.pause(false).unwrap();
        thread.stop().unwrap();

        assert!(thread.thread_handle.is_none());
        assert_eq!(thread.state().unwrap(), EmuState::Stopped);
    }

    #[test]
    fn autosave_writes_machine_state() {
        let path = std::env::temp_dir().join(format!(
            "orbit-thread-autosave-{}.json",
            std::process::id()
        ));
        let settings = Settings {
            autosave_path: Some(path.clone()),
            ..fast_settings()
        };

        let mut thread = EmuThread::new(FrameCounter::default(), &settings);
        thread.start().unwrap();
        wait_for_frames(&thread, 2);
        thread.pause(true).unwrap();

        let frames = thread.with_machine(FrameCounter::frames).unwrap();
        let saved = FrameCounter::load_state(File::open(&path).unwrap()).unwrap();
        assert_eq!(saved.frames(), frames);

        thread.stop().unwrap();
        std::fs::remove_file(path).unwrap();
    }

    #[test]
    #[traced_test]
    fn autosave_is_logged() {
        let path = std::env::temp_dir().join(format!(
            "orbit-thread-logged-{}.json",
            std::process::id()
        ));
        let settings = Settings {
            autosave_path: Some(path.clone()),
            ..fast_settings()
        };

        let mut thread = EmuThread::new(FrameCounter::default(), &settings);
        thread.start().unwrap();
        thread.pause(false).unwrap();
        assert!(!logs_contain("autosaved"));

        thread.resume().unwrap();
        thread.pause(true).unwrap();
        assert!(logs_contain("autosaved"));

        thread.stop().unwrap();
        std::fs::remove_file(path).unwrap();
    }

    #[test]
    fn no_autosave_before_start() {
        let path = std::env::temp_dir().join(format!(
            "orbit-thread-unstarted-{}.json",
            std::process::id()
        ));
        let settings = Settings {
            autosave_path: Some(path.clone()),
            ..fast_settings()
        };

        let mut thread = EmuThread::new(FrameCounter::default(), &settings);
        thread.pause(true).unwrap();
        assert!(!path.exists());
    }
}
