use crate::{domain::SectionId, player::PlaybackState};

use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, AtomicU8, AtomicU64, Ordering},
    },
    time::Duration,
};

/// Read-only projection of the track and loop state for the front-end.
/// Only the loop thread writes to it.
pub struct PlaybackMetrics {
    state: AtomicU8,
    elapsed_ms: AtomicU64,
    duration_ms: AtomicU64,
    // 0 means no active section, ids start at 1
    active_section: AtomicU64,
    repeating: AtomicBool,
    rewinds: AtomicU64,
}

impl PlaybackMetrics {
    pub fn new() -> Arc<Self> {
        Arc::new(PlaybackMetrics {
            state: AtomicU8::new(0),
            elapsed_ms: AtomicU64::new(0),
            duration_ms: AtomicU64::new(0),
            active_section: AtomicU64::new(0),
            repeating: AtomicBool::new(false),
            rewinds: AtomicU64::new(0),
        })
    }

    pub fn get_state(&self) -> PlaybackState {
        self.state
            .load(Ordering::Relaxed)
            .try_into()
            .unwrap_or(PlaybackState::Stopped)
    }

    pub fn get_elapsed(&self) -> Duration {
        Duration::from_millis(self.elapsed_ms.load(Ordering::Relaxed))
    }

    pub fn get_duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms.load(Ordering::Relaxed))
    }

    pub fn active_section(&self) -> Option<SectionId> {
        match self.active_section.load(Ordering::Relaxed) {
            0 => None,
            id => Some(id),
        }
    }

    pub fn is_repeating(&self) -> bool {
        self.repeating.load(Ordering::Relaxed)
    }

    /// Number of boundary rewinds since the last section started.
    pub fn rewinds(&self) -> u64 {
        self.rewinds.load(Ordering::Relaxed)
    }

    pub fn is_playing(&self) -> bool {
        PlaybackState::Playing == self.get_state()
    }

    pub fn is_stopped(&self) -> bool {
        PlaybackState::Stopped == self.get_state()
    }

    pub fn set_playback_state(&self, state: PlaybackState) {
        self.state.store(state.into(), Ordering::Relaxed);
    }

    pub fn set_elapsed(&self, d: Duration) {
        self.elapsed_ms
            .store(d.as_millis() as u64, Ordering::Relaxed)
    }

    pub fn set_duration(&self, d: Duration) {
        self.duration_ms
            .store(d.as_millis() as u64, Ordering::Relaxed)
    }

    pub fn set_loop(&self, active: Option<SectionId>, repeating: bool) {
        let previous = self
            .active_section
            .swap(active.unwrap_or(0), Ordering::Relaxed);
        if previous != active.unwrap_or(0) {
            self.rewinds.store(0, Ordering::Relaxed);
        }
        self.repeating.store(repeating, Ordering::Relaxed);
    }

    /// Called whenever a section (re)starts, even the one already active.
    pub fn reset_rewinds(&self) {
        self.rewinds.store(0, Ordering::Relaxed);
    }

    pub fn count_rewind(&self) {
        self.rewinds.fetch_add(1, Ordering::Relaxed);
    }

    pub fn reset(&self) {
        self.set_elapsed(Duration::ZERO);
        self.set_duration(Duration::ZERO);
        self.set_playback_state(PlaybackState::Stopped);
        self.set_loop(None, false);
    }
}
