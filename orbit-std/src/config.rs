use orbit_core::GateConfig;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, BufWriter, Write},
    path::{Path, PathBuf},
};

pub const SETTINGS_FILE: &str = "settings.json";

/// User settings, stored as JSON. Missing fields take their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub autosave_on_pause: bool,
    pub autosave_path: Option<PathBuf>,
    pub frame_rate: u32,
    pub speed_multiplier: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            autosave_on_pause: true,
            autosave_path: None,
            frame_rate: 60,
            speed_multiplier: 1,
        }
    }
}

impl Settings {
    #[must_use]
    pub const fn gate_config(&self) -> GateConfig {
        GateConfig {
            autosave_on_pause: self.autosave_on_pause,
        }
    }

    /// Reads settings from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file can't be opened or isn't valid settings
    /// JSON.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let file = File::open(path).map_err(Error::Io)?;
        serde_json::from_reader(BufReader::new(file)).map_err(Error::Json)
    }

    /// Writes settings to a JSON file, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns an error if the file or its directory can't be written.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), Error> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(Error::Io)?;
        }

        let mut writer = BufWriter::new(File::create(path).map_err(Error::Io)?);
        serde_json::to_writer_pretty(&mut writer, self).map_err(Error::Json)?;
        writer.flush().map_err(Error::Io)
    }
}

#[derive(Debug)]
pub enum Error {
    Io(std::io::Error),
    Json(serde_json::Error),
}

impl std::error::Error for Error {}
impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "os error: {err}"),
            Self::Json(err) => write!(f, "invalid settings: {err}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_use_defaults() {
        let settings: Settings = serde_json::from_str(r#"{ "frame_rate": 50 }"#).unwrap();

        assert_eq!(settings.frame_rate, 50);
        assert!(settings.autosave_on_pause);
        assert_eq!(settings.speed_multiplier, 1);
        assert_eq!(settings.autosave_path, None);
    }

    #[test]
    fn gate_config_follows_autosave_flag() {
        let settings = Settings {
            autosave_on_pause: false,
            ..Settings::default()
        };
        assert!(!settings.gate_config().autosave_on_pause);
    }

    #[test]
    fn saved_settings_load_back() {
        let dir = std::env::temp_dir().join(format!("orbit-config-{}", std::process::id()));
        let path = dir.join(SETTINGS_FILE);
        let settings = Settings {
            autosave_path: Some(dir.join("autosave.json")),
            speed_multiplier: 2,
            ..Settings::default()
        };

        settings.save(&path).unwrap();
        assert_eq!(Settings::load(&path).unwrap(), settings);

        std::fs::remove_dir_all(dir).unwrap();
    }

    #[test]
    fn malformed_file_is_a_json_error() {
        let path =
            std::env::temp_dir().join(format!("orbit-config-bad-{}.json", std::process::id()));
        std::fs::write(&path, "{ frame_rate: ").unwrap();

        assert!(matches!(Settings::load(&path), Err(Error::Json(_))));

        std::fs::remove_file(path).unwrap();
    }
}
