mod library;

pub use library::{AudioFile, Library, default_music_directories, scan_audio_files};

static LEGAL_EXTENSION: std::sync::LazyLock<std::collections::HashSet<&'static str>> =
    std::sync::LazyLock::new(|| {
        std::collections::HashSet::from(["mp3", "wav", "ogg", "m4a", "aac", "flac"])
    });
