mod controller;
mod core;
mod handle;
mod session;

pub use controller::{EndOutcome, LoopController, LoopPhase, LoopState, TickOutcome};
pub use handle::LoopHandle;
pub use session::{LoadedSource, Session};

use crate::{
    domain::{Section, SectionId, TrackInfo},
    player::PlaybackState,
    sections::SectionError,
};
use std::{path::PathBuf, time::Duration};

/// Everything that can change a session. Applied one at a time by the
/// single owner of the session, so nothing interleaves with a tick.
#[derive(Debug, Clone, PartialEq)]
pub enum LoopCommand {
    Load(PathBuf),
    Unload,
    AddSection {
        name: String,
        start: Duration,
        end: Duration,
    },
    MarkStart,
    MarkEnd,
    CommitStaged(String),
    DeleteSection(SectionId),
    PlaySection(SectionId),
    Stop,
    TogglePlayback,
    Seek(Duration),
    SeekForward(Duration),
    SeekBack(Duration),
    ListSections,
    Tick(Duration),
    StreamEnded,
    Shutdown,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LoopEvent {
    SourceLoaded {
        path: PathBuf,
        duration: Duration,
        info: Box<TrackInfo>,
    },
    SourceUnavailable {
        path: PathBuf,
        reason: String,
    },
    SourceReleased,
    Marked {
        start: Duration,
        end: Duration,
    },
    SectionAdded(Section),
    SectionDeleted {
        id: SectionId,
        loop_cleared: bool,
    },
    SectionStarted(Section),
    Rewound(SectionId),
    Stopped,
    StreamEnded,
    PlaybackToggled(PlaybackState),
    Seeked(Duration),
    Sections(Vec<Section>),
    Error(SectionError),
}
