mod action;

pub use action::{HELP, parse_line, spawn_stdin_reader};

use crate::domain::SectionId;
use std::{path::PathBuf, time::Duration};

#[derive(Debug, PartialEq, Eq, Clone)]
pub enum Action {
    // Source
    Open(PathBuf),
    Unload,
    Scan(Option<PathBuf>),
    Files(String),
    Pick(usize),
    Forget(Option<usize>),
    Info,

    // Sections
    MarkStart,
    MarkEnd,
    Commit(String),
    AddSection {
        name: String,
        start: Duration,
        end: Duration,
    },
    Delete(SectionId),
    ListSections,

    // Player Controls
    PlaySection(SectionId),
    Stop,
    TogglePause,
    Seek(Duration),
    SeekForward,
    SeekBack,
    Status,

    Help,
    QUIT,
}
