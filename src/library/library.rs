use super::LEGAL_EXTENSION;
use crate::{calculate_signature, domain::FileType};
use anyhow::{Result, anyhow};
use fuzzy_matcher::{FuzzyMatcher, skim::SkimMatcherV2};
use indexmap::IndexMap;
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use unicode_normalization::UnicodeNormalization;
use walkdir::WalkDir;

const MATCH_THRESHOLD: i64 = 0;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioFile {
    pub id: u64,
    pub name: String,
    pub path: PathBuf,
    pub size: u64,
    pub format: FileType,
}

/// List the audio files sitting directly in `dir`, sorted by name.
///
/// A directory that does not exist is simply empty. One that exists but
/// cannot be read is logged and treated as empty too. Pointing at a file
/// is an error.
pub fn scan_audio_files(dir: impl AsRef<Path>) -> Result<Vec<AudioFile>> {
    let dir = dir.as_ref();

    if !dir.exists() {
        return Ok(Vec::new());
    }
    if !dir.is_dir() {
        return Err(anyhow!("Path is not a directory: {}", dir.display()));
    }
    if let Err(e) = dir.read_dir() {
        tracing::warn!(dir = %dir.display(), error = %e, "Failed to read directory");
        return Ok(Vec::new());
    }

    let mut files: Vec<AudioFile> = collect_valid_files(dir)
        .filter_map(|path| {
            let size = path.metadata().ok()?.len();
            let id = calculate_signature(&path).ok()?;
            let name = path.file_name()?.to_str()?.to_string();

            Some(AudioFile {
                id,
                format: FileType::from(path.as_path()),
                name,
                path,
                size,
            })
        })
        .collect();

    files.sort_by(|a, b| a.name.cmp(&b.name));
    tracing::debug!(dir = %dir.display(), found = files.len(), "Scanned directory");

    Ok(files)
}

/// Files with vetted extensions directly inside `dir`.
///
/// Folders with a `.nomedia` file will be ignored
fn collect_valid_files(dir: &Path) -> impl ParallelIterator<Item = PathBuf> {
    WalkDir::new(dir)
        .max_depth(1)
        .into_iter()
        .filter_entry(|e| !e.path().join(".nomedia").exists())
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .collect::<Vec<_>>()
        .into_par_iter()
        .filter(|entry| {
            entry
                .path()
                .extension()
                .and_then(|ext| ext.to_str())
                .map(|ext| LEGAL_EXTENSION.contains(ext.to_lowercase().as_str()))
                .unwrap_or(false)
        })
        .map(|e| e.into_path())
}

/// The usual places music lives in a home directory, the ones that exist.
/// Falls back to the home directory itself.
pub fn default_music_directories() -> Vec<PathBuf> {
    let Some(home) = dirs::home_dir() else {
        return Vec::new();
    };

    let mut dirs: Vec<PathBuf> = [
        dirs::audio_dir(),
        Some(home.join("Music")),
        dirs::download_dir(),
        Some(home.join("Downloads")),
        dirs::document_dir(),
        Some(home.join("Documents")),
    ]
    .into_iter()
    .flatten()
    .filter(|p| p.is_dir())
    .collect();

    dirs.dedup();
    if dirs.is_empty() {
        dirs.push(home);
    }
    dirs
}

/// Audio files picked up across scans, keyed by path.
pub struct Library {
    files: IndexMap<PathBuf, AudioFile>,
    matcher: SkimMatcherV2,
}

impl Default for Library {
    fn default() -> Self {
        Self::new()
    }
}

impl Library {
    pub fn new() -> Self {
        Library {
            files: IndexMap::new(),
            matcher: SkimMatcherV2::default(),
        }
    }

    /// Scan `dir` and keep any files not already known. Returns how many
    /// were new.
    pub fn scan(&mut self, dir: impl AsRef<Path>) -> Result<usize> {
        let found = scan_audio_files(dir)?;
        let before = self.files.len();

        for file in found {
            self.files.entry(file.path.clone()).or_insert(file);
        }

        Ok(self.files.len() - before)
    }

    pub fn get(&self, idx: usize) -> Option<&AudioFile> {
        self.files.get_index(idx).map(|(_, f)| f)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn remove(&mut self, id: u64) -> Option<AudioFile> {
        let idx = self.files.values().position(|f| f.id == id)?;
        self.files.shift_remove_index(idx).map(|(_, f)| f)
    }

    /// Drop the file listed at `idx`. Later files move up one place.
    pub fn forget(&mut self, idx: usize) -> Option<AudioFile> {
        let id = self.get(idx)?.id;
        self.remove(id)
    }

    pub fn clear(&mut self) {
        self.files.clear();
    }

    /// Files whose name fuzzily matches `query`, best first. Names are
    /// compared NFC-normalized so decomposed file names still match.
    /// An empty query returns everything in scan order.
    pub fn search(&self, query: &str) -> Vec<(usize, &AudioFile)> {
        let query = normalize(query);
        if query.is_empty() {
            return self.files.values().enumerate().collect();
        }

        let mut scored: Vec<(usize, &AudioFile, i64)> = self
            .files
            .values()
            .enumerate()
            .filter_map(|(idx, file)| {
                self.matcher
                    .fuzzy_match(&normalize(&file.name), &query)
                    .filter(|&score| score > MATCH_THRESHOLD)
                    .map(|score| (idx, file, score))
            })
            .collect();

        scored.sort_by(|a, b| b.2.cmp(&a.2));
        scored.into_iter().map(|(idx, f, _)| (idx, f)).collect()
    }
}

fn normalize(s: &str) -> String {
    s.nfc().collect::<String>().to_lowercase()
}
