use crate::{CONFIG_DIRECTORY, CONFIG_FILE, expand_tilde};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::{
    path::{Path, PathBuf},
    time::Duration,
};

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// How often the loop thread polls the clock, in milliseconds
    pub refresh_rate_ms: u64,
    /// Step for relative seeks, in seconds
    pub seek_step_secs: u64,
    /// Scanned in addition to the default music directories
    pub library_dirs: Vec<PathBuf>,
    /// `tracing` filter directive, e.g. `reprise=debug`
    pub log_filter: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            refresh_rate_ms: crate::REFRESH_RATE.as_millis() as u64,
            seek_step_secs: 5,
            library_dirs: Vec::new(),
            log_filter: None,
        }
    }
}

impl Settings {
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CONFIG_DIRECTORY).join(CONFIG_FILE))
    }

    /// Load from `path`, or from the default location when `None`. A missing
    /// file yields the defaults; a malformed one is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => match Self::default_path() {
                Some(p) => p,
                None => return Ok(Self::default()),
            },
        };

        if !path.exists() {
            tracing::debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }

        Self::load_from_file(&path)
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file_str = std::fs::read_to_string(path)
            .with_context(|| format!("Could not read config {}", path.display()))?;
        let mut settings = toml::from_str::<Settings>(&file_str)
            .with_context(|| format!("Malformed config {}", path.display()))?;

        settings.library_dirs = settings
            .library_dirs
            .iter()
            .map(expand_tilde)
            .collect::<Result<_>>()?;
        settings.refresh_rate_ms = settings.refresh_rate_ms.max(1);

        Ok(settings)
    }

    pub fn refresh_rate(&self) -> Duration {
        Duration::from_millis(self.refresh_rate_ms)
    }

    pub fn seek_step(&self) -> Duration {
        Duration::from_secs(self.seek_step_secs)
    }
}
