use anyhow::{Result, anyhow};
use std::{
    fs,
    path::{Path, PathBuf},
    time::{Duration, UNIX_EPOCH},
};
use xxhash_rust::xxh3::xxh3_64;

pub mod app_core;
pub mod config;
pub mod domain;
pub mod key_handler;
pub mod library;
pub mod looper;
pub mod player;
pub mod sections;

pub use config::Settings;
pub use library::Library;
pub use looper::{LoopController, LoopHandle, Session};
pub use sections::{SectionEditor, SectionError, SectionStore};

// ~30fps
pub const REFRESH_RATE: Duration = Duration::from_millis(33);

pub const CONFIG_DIRECTORY: &str = "reprise";
pub const CONFIG_FILE: &str = "config.toml";

/// Create a hash based on...
///  - date of last modification (millis)
///  - file size (bytes)
///  - path as str as bytes
pub fn calculate_signature<P: AsRef<Path>>(path: P) -> anyhow::Result<u64> {
    let metadata = fs::metadata(&path)?;

    let last_mod = metadata.modified()?.duration_since(UNIX_EPOCH)?.as_millis() as i64;
    let size = metadata.len();

    let mut data = Vec::with_capacity(path.as_ref().as_os_str().len() + 16);

    data.extend_from_slice(path.as_ref().as_os_str().as_encoded_bytes());
    data.extend_from_slice(&last_mod.to_le_bytes());
    data.extend_from_slice(&size.to_le_bytes());

    Ok(xxh3_64(&data))
}

pub enum DurationStyle {
    /// `m:ss`
    Compact,
    /// `h:mm:ss` once an hour is reached, `m:ss` below that
    Long,
    /// `m:ss.cc`
    CompactMillis,
}

pub fn get_readable_duration(duration: Duration, style: DurationStyle) -> String {
    let total = duration.as_secs();
    let hours = total / 3600;
    let mins = total / 60;
    let secs = total % 60;

    match style {
        DurationStyle::Compact => format!("{mins}:{secs:02}"),
        DurationStyle::Long => match hours {
            0 => format!("{mins}:{secs:02}"),
            _ => format!("{hours}:{:02}:{secs:02}", mins % 60),
        },
        DurationStyle::CompactMillis => {
            let centis = duration.subsec_millis() / 10;
            format!("{mins}:{secs:02}.{centis:02}")
        }
    }
}

pub fn format_bitrate(kbps: u32) -> String {
    format!("{kbps} kbps")
}

pub fn format_sample_rate(hz: u32) -> String {
    format!("{:.1} kHz", hz as f64 / 1000.0)
}

/// Parse user supplied seconds. Accepts `90`, `90.5` and `1:30`.
pub fn parse_timestamp(input: &str) -> Result<Duration> {
    let input = input.trim();
    let secs = match input.split_once(':') {
        Some((m, s)) => {
            let s = s.parse::<f64>()?;
            if !(0.0..60.0).contains(&s) {
                return Err(anyhow!("Seconds out of range: {input}"));
            }
            m.parse::<u64>()? as f64 * 60.0 + s
        }
        None => input.parse::<f64>()?,
    };

    Duration::try_from_secs_f64(secs).map_err(|_| anyhow!("Invalid timestamp: {input}"))
}

pub fn expand_tilde<P: AsRef<Path>>(path: P) -> Result<PathBuf> {
    let path = path.as_ref();
    let path_str = path.to_string_lossy();

    if !path_str.starts_with('~') {
        return Ok(path.to_path_buf());
    }

    let home = dirs::home_dir().ok_or_else(|| anyhow!("Could not determine home directory!"))?;

    if path_str == "~" {
        return Ok(home);
    }

    if path_str.starts_with("~/") || path_str.starts_with("~\\") {
        return Ok(home.join(&path_str[2..]));
    }

    Err(anyhow!("Error reading directory with tilde (~)"))
}
