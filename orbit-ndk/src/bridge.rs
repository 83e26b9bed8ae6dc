use jni::{JNIEnv, objects::JValue};
use log::warn;
use orbit_core::{Core, EmuState};

/// Java class whose static methods drive the native emulator.
pub const CORE_BRIDGE_CLASS: &str = "com/github/orbit64/CoreBridge";

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("jni error: {0}")]
    Jni(#[from] jni::errors::Error),
    #[error(transparent)]
    State(#[from] orbit_core::Error),
}

/// [`Core`] backed by the static methods of [`CORE_BRIDGE_CLASS`].
///
/// Lives for a single JNI call: it borrows the environment Java handed to
/// the entry point.
pub struct JniCore<'a, 'local> {
    env: &'a mut JNIEnv<'local>,
}

impl<'a, 'local> JniCore<'a, 'local> {
    fn call_void(&mut self, name: &str, sig: &str, args: &[JValue<'_, '_>]) -> Result<(), Error> {
        let result = self
            .env
            .call_static_method(CORE_BRIDGE_CLASS, name, sig, args)
            .and_then(|value| value.v());
        self.check(result)
    }

    /// Clears a pending Java exception, which would otherwise fail every
    /// later JNI call on this thread.
    fn check<T>(&mut self, result: jni::errors::Result<T>) -> Result<T, Error> {
        if matches!(result, Err(jni::errors::Error::JavaException))
            && let Err(err) = self
                .env
                .exception_describe()
                .and_then(|()| self.env.exception_clear())
        {
            warn!("failed to clear pending Java exception: {err}");
        }

        result.map_err(Error::from)
    }

    pub const fn new(env: &'a mut JNIEnv<'local>) -> Self {
        Self { env }
    }
}

impl Core for JniCore<'_, '_> {
    type Error = Error;

    fn pause(&mut self, autosave: bool) -> Result<(), Self::Error> {
        self.call_void("emuPause", "(Z)V", &[JValue::Bool(u8::from(autosave))])
    }

    fn resume(&mut self) -> Result<(), Self::Error> {
        self.call_void("emuResume", "()V", &[])
    }

    fn start(&mut self) -> Result<(), Self::Error> {
        self.call_void("emuStart", "()V", &[])
    }

    fn state(&mut self) -> Result<EmuState, Self::Error> {
        let result = self
            .env
            .call_static_method(CORE_BRIDGE_CLASS, "emuGetState", "()I", &[])
            .and_then(|value| value.i());
        let code = self.check(result)?;
        Ok(EmuState::try_from(code)?)
    }

    fn stop(&mut self) -> Result<(), Self::Error> {
        self.call_void("emuStop", "()V", &[])
    }
}
