mod bridge;
mod ffi;
mod host;

pub use bridge::{CORE_BRIDGE_CLASS, Error, JniCore};
pub use ffi::*;
pub use host::Host;

/// Routes `log` (and the gate's `tracing` events) to logcat. Safe to call
/// more than once.
pub fn init_logging() {
    #[cfg(target_os = "android")]
    android_logger::init_once(
        android_logger::Config::default()
            .with_max_level(log::LevelFilter::Info)
            .with_tag("Orbit"),
    );
}
