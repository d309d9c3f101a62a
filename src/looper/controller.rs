use crate::{
    domain::{Section, SectionId},
    player::PlaybackClock,
    sections::{SectionError, SectionStore},
};
use std::time::Duration;

/// Which section is looping, if any.
///
/// `repeating` is only ever true while `active` names a section that is
/// still in the store. Both fields are cleared together.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LoopState {
    pub active: Option<SectionId>,
    pub repeating: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopPhase {
    Idle,
    RepeatingSection(SectionId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Nothing is looping, or there is no source.
    Ignored,
    /// Still inside the active section.
    Inside,
    /// Hit the end boundary and jumped back to the start.
    Rewound(SectionId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndOutcome {
    Rewound(SectionId),
    /// Playback stays paused at the end of the stream.
    Finished,
}

/// The section loop state machine.
///
/// Holds section ids only. Every call gets the store and the clock it
/// works against, so the owner decides when commands and ticks run.
#[derive(Debug, Default)]
pub struct LoopController {
    state: LoopState,
}

impl LoopController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn phase(&self) -> LoopPhase {
        match self.state {
            LoopState {
                active: Some(id),
                repeating: true,
            } => LoopPhase::RepeatingSection(id),
            _ => LoopPhase::Idle,
        }
    }

    pub fn is_repeating(&self) -> bool {
        self.state.repeating
    }

    /// Start looping `id` from its start time.
    pub fn play_section<'s, C: PlaybackClock>(
        &mut self,
        id: SectionId,
        store: &'s SectionStore,
        clock: &mut C,
    ) -> Result<&'s Section, SectionError> {
        let section = store.get(id).ok_or(SectionError::SectionNotFound(id))?;
        if !clock.is_loaded() {
            return Err(SectionError::SourceUnavailable);
        }

        self.state = LoopState {
            active: Some(id),
            repeating: true,
        };

        clock.seek(section.start());
        if !clock.is_playing() {
            clock.play();
        }

        tracing::info!(id, name = section.name(), start = ?section.start(), end = ?section.end(), "Looping section");
        Ok(section)
    }

    /// Pause, return to the top of the track and drop any loop.
    pub fn stop<C: PlaybackClock>(&mut self, clock: &mut C) {
        clock.pause();
        clock.seek(Duration::ZERO);
        self.clear();
    }

    pub fn on_tick<C: PlaybackClock>(
        &mut self,
        position: Duration,
        store: &SectionStore,
        clock: &mut C,
    ) -> TickOutcome {
        let LoopPhase::RepeatingSection(id) = self.phase() else {
            return TickOutcome::Ignored;
        };
        if !clock.is_loaded() {
            return TickOutcome::Ignored;
        }
        let Some(section) = store.get(id) else {
            tracing::warn!(id, "Active section vanished from the store");
            self.clear();
            return TickOutcome::Ignored;
        };

        if !section.is_past_end(position) {
            return TickOutcome::Inside;
        }

        tracing::trace!(id, ?position, end = ?section.end(), "Section boundary reached");
        clock.seek(section.start());
        if !clock.is_playing() {
            clock.play();
        }
        TickOutcome::Rewound(id)
    }

    /// The stream ran out. A repeating section whose end lines up with the
    /// end of the track is treated like any other boundary crossing.
    pub fn on_stream_ended<C: PlaybackClock>(
        &mut self,
        store: &SectionStore,
        clock: &mut C,
    ) -> EndOutcome {
        if let LoopPhase::RepeatingSection(id) = self.phase() {
            if let Some(section) = store.get(id) {
                clock.seek(section.start());
                clock.play();
                return EndOutcome::Rewound(id);
            }
        }

        self.clear();
        clock.pause();
        EndOutcome::Finished
    }

    /// Must be called whenever a section leaves the store. Returns true if
    /// the loop was dropped because of it.
    pub fn on_section_deleted(&mut self, id: SectionId) -> bool {
        if self.state.active == Some(id) {
            tracing::info!(id, "Active section deleted, loop cleared");
            self.clear();
            return true;
        }
        false
    }

    pub fn reset(&mut self) {
        self.clear();
    }

    fn clear(&mut self) {
        self.state = LoopState::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::SimulatedClock;
    use std::path::Path;

    fn secs(s: u64) -> Duration {
        Duration::from_secs(s)
    }

    fn setup(track_secs: u64) -> (LoopController, SectionStore, SimulatedClock) {
        let mut clock = SimulatedClock::new(secs(track_secs));
        clock.load(Path::new("song.mp3")).unwrap();
        (LoopController::new(), SectionStore::new(), clock)
    }

    #[test]
    fn play_section_seeks_to_start_and_plays() {
        let (mut ctl, mut store, mut clock) = setup(60);
        let id = store.add_section("Chorus", secs(10), secs(20)).unwrap().id();

        ctl.play_section(id, &store, &mut clock).unwrap();

        assert_eq!(clock.position(), secs(10));
        assert!(clock.is_playing());
        assert!(ctl.is_repeating());
        assert_eq!(ctl.phase(), LoopPhase::RepeatingSection(id));
    }

    #[test]
    fn play_section_while_playing_does_not_restart_playback() {
        let (mut ctl, mut store, mut clock) = setup(60);
        let a = store.add_section("A", secs(10), secs(20)).unwrap().id();
        let b = store.add_section("B", secs(30), secs(40)).unwrap().id();

        ctl.play_section(a, &store, &mut clock).unwrap();
        clock.advance(secs(3));
        ctl.play_section(b, &store, &mut clock).unwrap();

        assert_eq!(clock.position(), secs(30));
        assert!(clock.is_playing());
        assert_eq!(ctl.phase(), LoopPhase::RepeatingSection(b));
    }

    #[test]
    fn unknown_section_is_rejected_without_side_effects() {
        let (mut ctl, store, mut clock) = setup(60);
        clock.seek(secs(5));

        assert_eq!(
            ctl.play_section(42, &store, &mut clock).unwrap_err(),
            SectionError::SectionNotFound(42)
        );
        assert_eq!(ctl.phase(), LoopPhase::Idle);
        assert_eq!(clock.position(), secs(5));
        assert!(!clock.is_playing());
    }

    #[test]
    fn no_source_means_source_unavailable() {
        let (mut ctl, mut store, mut clock) = setup(60);
        let id = store.add_section("A", secs(1), secs(2)).unwrap().id();
        clock.unload();

        assert_eq!(
            ctl.play_section(id, &store, &mut clock).unwrap_err(),
            SectionError::SourceUnavailable
        );
        assert_eq!(ctl.state(), LoopState::default());
    }

    #[test]
    fn tick_at_boundary_rewinds() {
        let (mut ctl, mut store, mut clock) = setup(60);
        let id = store.add_section("Chorus", secs(10), secs(20)).unwrap().id();
        ctl.play_section(id, &store, &mut clock).unwrap();

        clock.advance(Duration::from_millis(9_990));
        assert_eq!(
            ctl.on_tick(clock.position(), &store, &mut clock),
            TickOutcome::Inside
        );

        // exactly on the end boundary
        clock.advance(Duration::from_millis(10));
        assert_eq!(clock.position(), secs(20));
        assert_eq!(
            ctl.on_tick(clock.position(), &store, &mut clock),
            TickOutcome::Rewound(id)
        );
        assert_eq!(clock.position(), secs(10));
        assert!(clock.is_playing());
    }

    #[test]
    fn ticks_inside_section_never_seek() {
        let (mut ctl, mut store, mut clock) = setup(60);
        let id = store.add_section("Bridge", secs(30), secs(40)).unwrap().id();
        ctl.play_section(id, &store, &mut clock).unwrap();
        assert_eq!(clock.last_seek(), Some(secs(30)));

        clock.advance(secs(5));
        ctl.on_tick(clock.position(), &store, &mut clock);
        clock.seek(secs(35));
        ctl.on_tick(clock.position(), &store, &mut clock);
        assert_eq!(clock.last_seek(), Some(secs(35)));

        clock.advance(secs(6));
        ctl.on_tick(clock.position(), &store, &mut clock);
        assert_eq!(clock.last_seek(), Some(secs(30)));
    }

    #[test]
    fn loop_repeats_until_stopped() {
        let (mut ctl, mut store, mut clock) = setup(60);
        let id = store.add_section("Riff", secs(4), secs(6)).unwrap().id();
        ctl.play_section(id, &store, &mut clock).unwrap();

        let step = Duration::from_millis(250);
        let mut rewinds = 0;
        for _ in 0..200 {
            clock.advance(step);
            let pos = clock.position();
            assert!(pos <= secs(6) + step);
            if let TickOutcome::Rewound(_) = ctl.on_tick(pos, &store, &mut clock) {
                rewinds += 1;
                assert_eq!(clock.position(), secs(4));
            }
        }
        assert_eq!(rewinds, 25);

        ctl.stop(&mut clock);
        assert_eq!(ctl.phase(), LoopPhase::Idle);
        assert_eq!(clock.position(), Duration::ZERO);
        assert!(!clock.is_playing());
    }

    #[test]
    fn overshoot_rewinds_to_exact_start() {
        let (mut ctl, mut store, mut clock) = setup(60);
        let id = store
            .add_section("Odd", Duration::from_millis(1_234), Duration::from_millis(2_345))
            .unwrap()
            .id();
        ctl.play_section(id, &store, &mut clock).unwrap();

        clock.advance(Duration::from_millis(1_500));
        ctl.on_tick(clock.position(), &store, &mut clock);
        assert_eq!(clock.position(), Duration::from_millis(1_234));
    }

    #[test]
    fn ticks_are_ignored_when_idle() {
        let (mut ctl, mut store, mut clock) = setup(60);
        store.add_section("A", secs(1), secs(2)).unwrap();
        clock.play();
        clock.advance(secs(5));

        assert_eq!(
            ctl.on_tick(clock.position(), &store, &mut clock),
            TickOutcome::Ignored
        );
        assert_eq!(clock.position(), secs(5));
    }

    #[test]
    fn section_ending_at_track_end_loops_on_stream_end() {
        let (mut ctl, mut store, mut clock) = setup(30);
        let id = store.add_section("Outro", secs(25), secs(30)).unwrap().id();
        ctl.play_section(id, &store, &mut clock).unwrap();

        clock.advance(secs(10));
        assert!(!clock.is_playing());

        assert_eq!(ctl.on_stream_ended(&store, &mut clock), EndOutcome::Rewound(id));
        assert_eq!(clock.position(), secs(25));
        assert!(clock.is_playing());
        assert!(ctl.is_repeating());
    }

    #[test]
    fn stream_end_without_loop_goes_idle_and_paused() {
        let (mut ctl, store, mut clock) = setup(30);
        clock.play();
        clock.advance(secs(30));

        assert_eq!(ctl.on_stream_ended(&store, &mut clock), EndOutcome::Finished);
        assert_eq!(ctl.phase(), LoopPhase::Idle);
        assert!(!clock.is_playing());
        assert_eq!(clock.position(), secs(30));
    }

    #[test]
    fn deleting_active_section_clears_loop() {
        let (mut ctl, mut store, mut clock) = setup(60);
        let a = store.add_section("A", secs(1), secs(2)).unwrap().id();
        let b = store.add_section("B", secs(3), secs(4)).unwrap().id();
        ctl.play_section(a, &store, &mut clock).unwrap();

        assert!(!ctl.on_section_deleted(b));
        assert!(ctl.is_repeating());

        assert!(ctl.on_section_deleted(a));
        assert_eq!(ctl.state(), LoopState::default());
    }

    #[test]
    fn vanished_section_restores_invariant_on_tick() {
        let (mut ctl, mut store, mut clock) = setup(60);
        let id = store.add_section("A", secs(1), secs(2)).unwrap().id();
        ctl.play_section(id, &store, &mut clock).unwrap();

        store.clear();
        assert_eq!(
            ctl.on_tick(secs(3), &store, &mut clock),
            TickOutcome::Ignored
        );
        assert_eq!(ctl.state(), LoopState::default());
    }
}
