//! Entry points for `com.github.orbit64.LifecycleBridge`.
//!
//! Java holds the [`Host`] as an opaque `long` returned by `create` and must
//! call `destroy` exactly once when the game activity goes away. Every other
//! call runs on the UI thread.

use crate::{bridge::JniCore, host::Host};
use jni::JNIEnv;
use jni::objects::JClass;
use jni::sys::{JNI_FALSE, jboolean, jint, jlong};
use log::{info, warn};
use orbit_core::{GateConfig, Signal};

pub(crate) fn create_host(config: GateConfig) -> jlong {
    let host = Box::new(Host::new(config));
    let ptr = Box::into_raw(host);
    info!("Lifecycle host created at {ptr:p}");
    ptr as jlong
}

pub(crate) fn destroy_host(handle: jlong) {
    if handle == 0 {
        warn!("destroy called with a null lifecycle host");
        return;
    }

    // SAFETY: non-null handles come from `create_host` and Java gives each
    // one back exactly once.
    drop(unsafe { Box::from_raw(handle as *mut Host) });
    info!("Lifecycle host destroyed");
}

fn host_mut<'h>(handle: jlong) -> Option<&'h mut Host> {
    // SAFETY: see `destroy_host`; all calls arrive on the UI thread, so the
    // reference is never aliased.
    unsafe { (handle as *mut Host).as_mut() }
}

fn notify(env: &mut JNIEnv<'_>, handle: jlong, signal: Signal) {
    let Some(host) = host_mut(handle) else {
        warn!("{signal} delivered to a null lifecycle host");
        return;
    };

    host.notify(&mut JniCore::new(env), signal);
}

#[unsafe(no_mangle)]
pub extern "system" fn Java_com_github_orbit64_LifecycleBridge_create(
    _env: JNIEnv<'_>,
    _class: JClass<'_>,
    autosave: jboolean,
) -> jlong {
    crate::init_logging();
    create_host(GateConfig {
        autosave_on_pause: autosave != JNI_FALSE,
    })
}

#[unsafe(no_mangle)]
pub extern "system" fn Java_com_github_orbit64_LifecycleBridge_destroy(
    _env: JNIEnv<'_>,
    _class: JClass<'_>,
    handle: jlong,
) {
    destroy_host(handle);
}

#[unsafe(no_mangle)]
pub extern "system" fn Java_com_github_orbit64_LifecycleBridge_onWindowFocusChanged(
    mut env: JNIEnv<'_>,
    _class: JClass<'_>,
    handle: jlong,
    focused: jboolean,
) {
    notify(&mut env, handle, Signal::FocusChanged(focused != JNI_FALSE));
}

#[unsafe(no_mangle)]
pub extern "system" fn Java_com_github_orbit64_LifecycleBridge_onResume(
    mut env: JNIEnv<'_>,
    _class: JClass<'_>,
    handle: jlong,
) {
    notify(&mut env, handle, Signal::Resumed);
}

#[unsafe(no_mangle)]
pub extern "system" fn Java_com_github_orbit64_LifecycleBridge_onPause(
    mut env: JNIEnv<'_>,
    _class: JClass<'_>,
    handle: jlong,
) {
    notify(&mut env, handle, Signal::Paused);
}

#[unsafe(no_mangle)]
pub extern "system" fn Java_com_github_orbit64_LifecycleBridge_onSurfaceCreated(
    mut env: JNIEnv<'_>,
    _class: JClass<'_>,
    handle: jlong,
) {
    notify(&mut env, handle, Signal::SurfaceCreated);
}

#[unsafe(no_mangle)]
pub extern "system" fn Java_com_github_orbit64_LifecycleBridge_onSurfaceChanged(
    mut env: JNIEnv<'_>,
    _class: JClass<'_>,
    handle: jlong,
    width: jint,
    height: jint,
) {
    let signal = Signal::SurfaceChanged {
        width: u32::try_from(width).unwrap_or_default(),
        height: u32::try_from(height).unwrap_or_default(),
    };
    notify(&mut env, handle, signal);
}

#[unsafe(no_mangle)]
pub extern "system" fn Java_com_github_orbit64_LifecycleBridge_onSurfaceDestroyed(
    mut env: JNIEnv<'_>,
    _class: JClass<'_>,
    handle: jlong,
) {
    notify(&mut env, handle, Signal::SurfaceDestroyed);
}
