#[cfg(feature = "rodio")]
mod backend_rodio;
mod metrics;
mod simulated;

#[cfg(feature = "rodio")]
pub use backend_rodio::RodioBackend;
pub use metrics::PlaybackMetrics;
pub use simulated::SimulatedClock;

use anyhow::Result;
use std::{path::Path, time::Duration};

/// Something that happened on the clock since it was last polled.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ClockEvent {
    Tick(Duration),
    /// Playback ran into the end of the stream. Reported once until the
    /// clock is seeked or reloaded.
    Ended,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
#[repr(u8)]
pub enum PlaybackState {
    Stopped = 0,
    Playing = 1,
    Paused = 2,
}

impl From<PlaybackState> for u8 {
    fn from(state: PlaybackState) -> u8 {
        state as u8
    }
}

impl TryFrom<u8> for PlaybackState {
    type Error = ();

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(PlaybackState::Stopped),
            1 => Ok(PlaybackState::Playing),
            2 => Ok(PlaybackState::Paused),
            _ => Err(()),
        }
    }
}

/// A seekable playback primitive that reports where it is.
///
/// An unloaded clock reports a zero duration and never produces events.
/// Seeks are clamped to `[0, duration]`.
pub trait PlaybackClock {
    fn load(&mut self, path: &Path) -> Result<()>;
    fn unload(&mut self);
    fn is_loaded(&self) -> bool;

    fn play(&mut self);
    fn pause(&mut self);
    fn seek(&mut self, position: Duration);

    fn position(&self) -> Duration;
    fn duration(&self) -> Duration;
    fn is_playing(&self) -> bool;

    fn poll_event(&mut self) -> Option<ClockEvent>;

    fn state(&self) -> PlaybackState {
        match (self.is_loaded(), self.is_playing()) {
            (false, _) => PlaybackState::Stopped,
            (true, true) => PlaybackState::Playing,
            (true, false) => PlaybackState::Paused,
        }
    }

    fn seek_forward(&mut self, step: Duration) {
        let target = self.position() + step;
        self.seek(target);
    }

    fn seek_back(&mut self, step: Duration) {
        let target = self.position().saturating_sub(step);
        self.seek(target);
    }
}

impl<C: PlaybackClock + ?Sized> PlaybackClock for Box<C> {
    fn load(&mut self, path: &Path) -> Result<()> {
        (**self).load(path)
    }
    fn unload(&mut self) {
        (**self).unload()
    }
    fn is_loaded(&self) -> bool {
        (**self).is_loaded()
    }
    fn play(&mut self) {
        (**self).play()
    }
    fn pause(&mut self) {
        (**self).pause()
    }
    fn seek(&mut self, position: Duration) {
        (**self).seek(position)
    }
    fn position(&self) -> Duration {
        (**self).position()
    }
    fn duration(&self) -> Duration {
        (**self).duration()
    }
    fn is_playing(&self) -> bool {
        (**self).is_playing()
    }
    fn poll_event(&mut self) -> Option<ClockEvent> {
        (**self).poll_event()
    }
}

pub(crate) fn clamp_to(position: Duration, duration: Duration) -> Duration {
    position.min(duration)
}
