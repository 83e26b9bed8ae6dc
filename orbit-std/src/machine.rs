use serde::{Deserialize, Serialize};
use std::io;

/// Something that advances one video frame at a time.
pub trait Machine: Send + 'static {
    fn run_frame(&mut self);

    /// Writes enough state to resume later.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    fn save_state(&self, writer: &mut dyn io::Write) -> io::Result<()>;
}

/// A machine that only counts the frames it was asked to run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameCounter {
    frames: u64,
}

impl FrameCounter {
    #[must_use]
    pub const fn frames(&self) -> u64 {
        self.frames
    }

    /// Reads a state written by [`Machine::save_state`].
    ///
    /// # Errors
    ///
    /// Returns an error if reading fails or the data is not a saved counter.
    pub fn load_state<R: io::Read>(reader: R) -> io::Result<Self> {
        serde_json::from_reader(reader).map_err(io::Error::other)
    }
}

impl Machine for FrameCounter {
    fn run_frame(&mut self) {
        self.frames += 1;
    }

    fn save_state(&self, writer: &mut dyn io::Write) -> io::Result<()> {
        serde_json::to_writer(writer, self).map_err(io::Error::other)
    }
}
