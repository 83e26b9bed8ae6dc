use anyhow::Context;
use orbit_std::{
    EmuThread, FrameCounter, ModelCore, Record, ReadinessGate, SETTINGS_FILE, Settings,
    TransitionRecorder,
    cli::{Cli, ORBIT_STYLIZED, ORGANIZATION, QUALIFIER, clap::Parser},
    script,
};
use std::path::Path;

const AUTOSAVE_FILE: &str = "autosave.json";
const TRACE_CAPACITY: usize = 4096;

fn load_settings(args: &Cli, config_dir: &Path) -> anyhow::Result<Settings> {
    let default_path = config_dir.join(SETTINGS_FILE);

    match args.config() {
        Some(path) => Settings::load(path)
            .with_context(|| format!("couldn't load settings from {}", path.display())),
        None if default_path.exists() => Settings::load(&default_path)
            .with_context(|| format!("couldn't load settings from {}", default_path.display())),
        None => Ok(Settings::default()),
    }
}

fn print_records(records: &[Record]) {
    for record in records {
        match record.command {
            Some(command) => println!("{:<24} -> {command}", record.signal.to_string()),
            None => println!("{}", record.signal),
        }
    }
}

fn main() -> anyhow::Result<()> {
    let args = Cli::parse();

    let recorder = args.trace().map(|_| TransitionRecorder::new(TRACE_CAPACITY));
    orbit_std::trace::init(args.log(), recorder.clone())
        .map_err(|err| anyhow::anyhow!("couldn't set up logging: {err}"))?;

    let project_dirs = directories::ProjectDirs::from(QUALIFIER, ORGANIZATION, ORBIT_STYLIZED)
        .ok_or_else(|| anyhow::anyhow!("couldn't get project directories"))?;

    let mut settings = load_settings(&args, project_dirs.config_dir())?;
    if let Some(speed) = args.speed() {
        settings.speed_multiplier = speed;
    }

    let steps = match args.script() {
        Some(path) => script::load(path)
            .with_context(|| format!("couldn't load script {}", path.display()))?,
        None => script::parse(script::DEFAULT_SCRIPT)?,
    };

    let mut gate = ReadinessGate::new(settings.gate_config());

    let records = if args.dry_run() {
        let mut core = ModelCore::default();
        let records = script::replay(&mut gate, &mut core, &steps)?;
        tracing::info!(state = %core.emu_state(), "dry run finished");
        records
    } else {
        if settings.autosave_path.is_none() {
            std::fs::create_dir_all(project_dirs.data_dir())?;
            settings.autosave_path = Some(project_dirs.data_dir().join(AUTOSAVE_FILE));
        }

        let mut core = EmuThread::new(FrameCounter::default(), &settings);
        let records = script::replay(&mut gate, &mut core, &steps)?;
        let frames = core.with_machine(FrameCounter::frames)?;
        tracing::info!(frames, "session finished");
        records
    };

    print_records(&records);

    if let (Some(path), Some(recorder)) = (args.trace(), recorder) {
        recorder
            .flush_to_file(path)
            .with_context(|| format!("couldn't write trace to {}", path.display()))?;
    }

    Ok(())
}
