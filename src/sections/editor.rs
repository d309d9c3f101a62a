use super::{SectionError, SectionStore};
use crate::{domain::Section, player::PlaybackClock};
use std::time::Duration;

/// Holds a candidate range captured from the clock until it is committed.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct SectionEditor {
    staged_start: Duration,
    staged_end: Duration,
}

impl SectionEditor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark_start(&mut self, clock: &impl PlaybackClock) -> Duration {
        self.staged_start = clock.position();
        self.staged_start
    }

    pub fn mark_end(&mut self, clock: &impl PlaybackClock) -> Duration {
        self.staged_end = clock.position();
        self.staged_end
    }

    pub fn staged(&self) -> (Duration, Duration) {
        (self.staged_start, self.staged_end)
    }

    /// Hand the staged range to the store. The staged values are cleared on
    /// success and kept on failure so the user can fix one end and retry.
    pub fn commit<'s>(
        &mut self,
        name: &str,
        store: &'s mut SectionStore,
    ) -> Result<&'s Section, SectionError> {
        let section = store.add_section(name, self.staged_start, self.staged_end)?;
        self.staged_start = Duration::ZERO;
        self.staged_end = Duration::ZERO;
        Ok(section)
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
