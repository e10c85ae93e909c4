use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::app_dirs::AppDirs;
use crate::corpus::TextMode;

pub const DEFAULT_TIME_LIMIT_SECS: u32 = 30;

/// Every recognised option with its default. Missing fields in a saved
/// file fall back to these one by one.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    pub time_limit_secs: u32,
    pub text_mode: TextMode,
    pub sound_enabled: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            time_limit_secs: DEFAULT_TIME_LIMIT_SECS,
            text_mode: TextMode::Words,
            sound_enabled: true,
        }
    }
}

impl Settings {
    /// Time limits below one second are raised to one
    pub fn normalized(mut self) -> Self {
        self.time_limit_secs = self.time_limit_secs.max(1);
        self
    }

    pub fn with(mut self, overrides: &SettingsOverride) -> Self {
        overrides.apply(&mut self);
        self.normalized()
    }
}

/// Partial settings, e.g. from the command line
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SettingsOverride {
    pub time_limit_secs: Option<u32>,
    pub text_mode: Option<TextMode>,
    pub sound_enabled: Option<bool>,
}

impl SettingsOverride {
    pub fn apply(&self, settings: &mut Settings) {
        if let Some(secs) = self.time_limit_secs {
            settings.time_limit_secs = secs;
        }
        if let Some(mode) = self.text_mode {
            settings.text_mode = mode;
        }
        if let Some(sound) = self.sound_enabled {
            settings.sound_enabled = sound;
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

pub trait ConfigStore {
    fn load(&self) -> Settings;
    fn save(&self, settings: &Settings) -> std::io::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let path = AppDirs::config_path().unwrap_or_else(|| PathBuf::from("keystride_config.json"));
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Settings {
        let Ok(bytes) = fs::read(&self.path) else {
            return Settings::default();
        };
        match serde_json::from_slice::<Settings>(&bytes) {
            Ok(settings) => settings.normalized(),
            Err(e) => {
                log::warn!("ignoring unreadable config {}: {e}", self.path.display());
                Settings::default()
            }
        }
    }

    fn save(&self, settings: &Settings) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(settings)?;
        fs::write(&self.path, data)
    }
}
