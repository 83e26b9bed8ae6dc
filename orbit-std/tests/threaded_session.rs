//! Drives a real emulation thread through the readiness gate.

use orbit_std::{
    Command, Core, EmuState, EmuThread, FrameCounter, ReadinessGate, Settings, Signal, script,
};
use std::time::{Duration, Instant};

fn settings(name: &str) -> Settings {
    Settings {
        autosave_path: Some(
            std::env::temp_dir().join(format!("orbit-{name}-{}.json", std::process::id())),
        ),
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
fn cold_start_then_exit_autosaves_before_stopping() {
    let settings = settings("exit");
    let autosave = settings.autosave_path.clone().unwrap();
    let mut gate = ReadinessGate::new(settings.gate_config());
    let mut thread = EmuThread::new(FrameCounter::default(), &settings);

    gate.on_surface_created(&mut thread).unwrap();
    gate.on_window_focus_changed(&mut thread, true).unwrap();
    assert_eq!(thread.state().unwrap(), EmuState::Unknown);

    assert_eq!(gate.on_resume(&mut thread).unwrap(), Some(Command::Start));
    wait_for_frames(&thread, 5);

    assert_eq!(
        gate.on_surface_destroyed(&mut thread).unwrap(),
        Some(Command::Stop)
    );
    assert_eq!(thread.state().unwrap(), EmuState::Stopped);

    let saved = FrameCounter::load_state(std::fs::File::open(&autosave).unwrap()).unwrap();
    assert_eq!(saved.frames(), thread.with_machine(FrameCounter::frames).unwrap());

    std::fs::remove_file(autosave).unwrap();
}

#[test]
fn menu_focus_loss_keeps_running() {
    let settings = settings("menu");
    let mut gate = ReadinessGate::new(settings.gate_config());
    let mut thread = EmuThread::new(FrameCounter::default(), &settings);

    for signal in [
        Signal::Resumed,
        Signal::SurfaceCreated,
        Signal::FocusChanged(true),
        Signal::FocusChanged(false),
    ] {
        gate.handle(&mut thread, signal).unwrap();
    }

    assert!(thread.is_running());
    let frames = thread.with_machine(FrameCounter::frames).unwrap();
    wait_for_frames(&thread, frames + 3);

    gate.on_pause(&mut thread).unwrap();
    assert_eq!(thread.state().unwrap(), EmuState::Paused);
}

#[test]
fn default_script_ends_stopped() {
    let settings = Settings {
        autosave_path: None,
        ..settings("script")
    };
    let steps = script::parse(script::DEFAULT_SCRIPT).unwrap();
    let mut gate = ReadinessGate::new(settings.gate_config());
    let mut thread = EmuThread::new(FrameCounter::default(), &settings);

    let records = script::replay(&mut gate, &mut thread, &steps).unwrap();

    assert_eq!(records.first().map(|record| record.signal), Some(Signal::Resumed));
    assert_eq!(records.last().and_then(|record| record.command), Some(Command::Stop));
    assert_eq!(thread.state().unwrap(), EmuState::Stopped);
    assert!(thread.with_machine(FrameCounter::frames).unwrap() > 0);
}
