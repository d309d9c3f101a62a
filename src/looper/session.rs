use super::{EndOutcome, LoopCommand, LoopController, LoopEvent, LoopState, TickOutcome};
use crate::{
    domain::{Section, SectionId, TrackInfo},
    player::{ClockEvent, PlaybackClock, PlaybackState},
    sections::{SectionEditor, SectionError, SectionStore},
};
use std::{
    path::{Path, PathBuf},
    time::Duration,
};

/// The audio resource a session is bound to, along with its metadata and
/// artwork. Released as soon as it is replaced or the session ends.
#[derive(Debug)]
pub struct LoadedSource {
    path: PathBuf,
    info: TrackInfo,
}

impl LoadedSource {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn info(&self) -> &TrackInfo {
        &self.info
    }
}

impl Drop for LoadedSource {
    fn drop(&mut self) {
        tracing::debug!(
            path = %self.path.display(),
            artwork = self.info.thumbnail.is_some(),
            "Released source"
        );
    }
}

/// One loaded track with its sections and loop state.
pub struct Session<C: PlaybackClock> {
    clock: C,
    store: SectionStore,
    editor: SectionEditor,
    looper: LoopController,
    source: Option<LoadedSource>,
}

impl<C: PlaybackClock> Session<C> {
    pub fn new(clock: C) -> Self {
        Session {
            clock,
            store: SectionStore::new(),
            editor: SectionEditor::new(),
            looper: LoopController::new(),
            source: None,
        }
    }

    pub fn apply(&mut self, cmd: LoopCommand) -> Result<Option<LoopEvent>, SectionError> {
        let event = match cmd {
            LoopCommand::Load(path) => self.load(&path)?,
            LoopCommand::Unload => {
                self.unload();
                LoopEvent::SourceReleased
            }
            LoopCommand::AddSection { name, start, end } => {
                LoopEvent::SectionAdded(self.add_section(&name, start, end)?)
            }
            LoopCommand::MarkStart => {
                self.editor.mark_start(&self.clock);
                self.marked()
            }
            LoopCommand::MarkEnd => {
                self.editor.mark_end(&self.clock);
                self.marked()
            }
            LoopCommand::CommitStaged(name) => {
                LoopEvent::SectionAdded(self.commit_staged(&name)?)
            }
            LoopCommand::DeleteSection(id) => {
                let loop_cleared = self.looper.state().active == Some(id);
                match self.delete_section(id) {
                    Some(_) => LoopEvent::SectionDeleted { id, loop_cleared },
                    None => return Ok(None),
                }
            }
            LoopCommand::PlaySection(id) => LoopEvent::SectionStarted(self.play_section(id)?),
            LoopCommand::Stop => {
                self.stop();
                LoopEvent::Stopped
            }
            LoopCommand::TogglePlayback => LoopEvent::PlaybackToggled(self.toggle_playback()?),
            LoopCommand::Seek(pos) => LoopEvent::Seeked(self.seek(pos)?),
            LoopCommand::SeekForward(step) => {
                self.require_source()?;
                self.clock.seek_forward(step);
                LoopEvent::Seeked(self.clock.position())
            }
            LoopCommand::SeekBack(step) => {
                self.require_source()?;
                self.clock.seek_back(step);
                LoopEvent::Seeked(self.clock.position())
            }
            LoopCommand::ListSections => LoopEvent::Sections(self.store.iter().cloned().collect()),
            LoopCommand::Tick(position) => match self.on_tick(position) {
                TickOutcome::Rewound(id) => LoopEvent::Rewound(id),
                _ => return Ok(None),
            },
            LoopCommand::StreamEnded => match self.on_stream_ended() {
                EndOutcome::Rewound(id) => LoopEvent::Rewound(id),
                EndOutcome::Finished => LoopEvent::StreamEnded,
            },
            LoopCommand::Shutdown => {
                self.unload();
                return Ok(None);
            }
        };

        Ok(Some(event))
    }

    /// Feed the next clock event, if any, through the loop.
    pub fn poll(&mut self) -> Option<LoopEvent> {
        let cmd = match self.clock.poll_event()? {
            ClockEvent::Tick(position) => LoopCommand::Tick(position),
            ClockEvent::Ended => LoopCommand::StreamEnded,
        };
        self.apply(cmd).ok().flatten()
    }

    /// Swap in a new source. Whatever was loaded before is released first
    /// and the session starts over with no sections, even if the new
    /// source turns out to be unplayable.
    pub fn load(&mut self, path: &Path) -> Result<LoopEvent, SectionError> {
        self.unload();

        if let Err(e) = self.clock.load(path) {
            tracing::warn!(path = %path.display(), error = %e, "Source unavailable");
            return Ok(LoopEvent::SourceUnavailable {
                path: path.to_path_buf(),
                reason: e.to_string(),
            });
        }

        let info = TrackInfo::read(path);
        let duration = self.clock.duration();
        tracing::info!(path = %path.display(), ?duration, title = %info.title, "Source loaded");

        self.source = Some(LoadedSource {
            path: path.to_path_buf(),
            info: info.clone(),
        });

        Ok(LoopEvent::SourceLoaded {
            path: path.to_path_buf(),
            duration,
            info: Box::new(info),
        })
    }

    /// Release the current source and reset sections, staging and loop.
    pub fn unload(&mut self) {
        self.clock.unload();
        self.source = None;
        self.store.clear();
        self.editor.reset();
        self.looper.reset();
    }

    /// Add a section from explicit times. The range has to fit inside the
    /// loaded track.
    pub fn add_section(
        &mut self,
        name: &str,
        start: Duration,
        end: Duration,
    ) -> Result<Section, SectionError> {
        // the store reports blank names and reversed ranges itself
        if !name.trim().is_empty() && start < end && end > self.clock.duration() {
            return Err(SectionError::InvalidRange { start, end });
        }
        self.store.add_section(name, start, end).cloned()
    }

    pub fn commit_staged(&mut self, name: &str) -> Result<Section, SectionError> {
        self.editor.commit(name, &mut self.store).cloned()
    }

    pub fn mark_start(&mut self) -> Duration {
        self.editor.mark_start(&self.clock)
    }

    pub fn mark_end(&mut self) -> Duration {
        self.editor.mark_end(&self.clock)
    }

    /// Remove a section and drop the loop with it if it was the active one.
    pub fn delete_section(&mut self, id: SectionId) -> Option<Section> {
        let removed = self.store.delete_section(id)?;
        self.looper.on_section_deleted(id);
        Some(removed)
    }

    pub fn play_section(&mut self, id: SectionId) -> Result<Section, SectionError> {
        self.looper
            .play_section(id, &self.store, &mut self.clock)
            .cloned()
    }

    pub fn stop(&mut self) {
        self.looper.stop(&mut self.clock);
    }

    pub fn toggle_playback(&mut self) -> Result<PlaybackState, SectionError> {
        self.require_source()?;
        match self.clock.is_playing() {
            true => self.clock.pause(),
            false => self.clock.play(),
        }
        Ok(self.clock.state())
    }

    pub fn seek(&mut self, position: Duration) -> Result<Duration, SectionError> {
        self.require_source()?;
        self.clock.seek(position);
        Ok(self.clock.position())
    }

    pub fn on_tick(&mut self, position: Duration) -> TickOutcome {
        self.looper.on_tick(position, &self.store, &mut self.clock)
    }

    pub fn on_stream_ended(&mut self) -> EndOutcome {
        self.looper.on_stream_ended(&self.store, &mut self.clock)
    }

    fn marked(&self) -> LoopEvent {
        let (start, end) = self.editor.staged();
        LoopEvent::Marked { start, end }
    }

    fn require_source(&self) -> Result<(), SectionError> {
        match self.clock.is_loaded() {
            true => Ok(()),
            false => Err(SectionError::SourceUnavailable),
        }
    }
}

// ===============
//    ACCESSORS
// ===============

impl<C: PlaybackClock> Session<C> {
    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn clock_mut(&mut self) -> &mut C {
        &mut self.clock
    }

    pub fn sections(&self) -> &SectionStore {
        &self.store
    }

    pub fn staged(&self) -> (Duration, Duration) {
        self.editor.staged()
    }

    pub fn loop_state(&self) -> LoopState {
        self.looper.state()
    }

    pub fn source(&self) -> Option<&LoadedSource> {
        self.source.as_ref()
    }
}

impl<C: PlaybackClock> Drop for Session<C> {
    fn drop(&mut self) {
        if self.source.is_some() {
            self.unload();
        }
    }
}
