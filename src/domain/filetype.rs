use std::{fmt::Display, path::Path};

#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Default, PartialEq, Eq, Copy, Clone)]
pub enum FileType {
    MP3,
    M4A,
    AAC,
    OGG,
    WAV,
    FLAC,
    #[default]
    ERR,
}

impl From<&str> for FileType {
    fn from(str: &str) -> Self {
        match str.to_ascii_lowercase().as_str() {
            "mp3" => Self::MP3,
            "m4a" => Self::M4A,
            "aac" => Self::AAC,
            "ogg" => Self::OGG,
            "flac" => Self::FLAC,
            "wav" => Self::WAV,
            _ => Self::ERR,
        }
    }
}

impl From<&Path> for FileType {
    fn from(path: &Path) -> Self {
        path.extension()
            .and_then(|e| e.to_str())
            .map(FileType::from)
            .unwrap_or_default()
    }
}

impl Display for FileType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match *self {
            FileType::MP3 => write!(f, "mp3"),
            FileType::M4A => write!(f, "m4a"),
            FileType::AAC => write!(f, "aac"),
            FileType::OGG => write!(f, "ogg"),
            FileType::WAV => write!(f, "wav"),
            FileType::FLAC => write!(f, "flac"),
            FileType::ERR => write!(f, "ERR"),
        }
    }
}

impl FileType {
    /// Format hint handed to the decoder
    pub fn decoder_hint(&self) -> Option<&'static str> {
        match self {
            FileType::MP3 => Some("mp3"),
            FileType::M4A => Some("audio/mp4"),
            FileType::AAC => Some("aac"),
            FileType::OGG => Some("audio/ogg"),
            FileType::WAV => Some("wav"),
            FileType::FLAC => Some("flac"),
            FileType::ERR => None,
        }
    }
}
