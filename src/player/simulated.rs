use super::{ClockEvent, PlaybackClock, clamp_to};
use anyhow::{Result, anyhow};
use std::{path::Path, time::Duration};

/// A clock without an audio device behind it.
///
/// Time only moves through `advance`, or by `step` on every poll when
/// auto-advance is set. Used headless (`--simulate`) and as the test double
/// for everything that drives a `PlaybackClock`.
#[derive(Debug, Clone)]
pub struct SimulatedClock {
    length: Duration,
    loaded: bool,
    playing: bool,
    position: Duration,
    ended: bool,
    ended_reported: bool,
    step: Option<Duration>,
    fail_loads: bool,
    last_seek: Option<Duration>,
}

impl SimulatedClock {
    /// Every load binds a track of `length`.
    pub fn new(length: Duration) -> Self {
        SimulatedClock {
            length,
            loaded: false,
            playing: false,
            position: Duration::ZERO,
            ended: false,
            ended_reported: false,
            step: None,
            fail_loads: false,
            last_seek: None,
        }
    }

    pub fn with_auto_advance(mut self, step: Duration) -> Self {
        self.step = Some(step);
        self
    }

    /// Make every following `load` fail as if the file were undecodable.
    pub fn failing(mut self) -> Self {
        self.fail_loads = true;
        self
    }

    /// Move the playhead forward if playing. Stops at the end of the stream.
    pub fn advance(&mut self, dt: Duration) {
        if !self.loaded || !self.playing || self.ended {
            return;
        }

        self.position = clamp_to(self.position + dt, self.length);
        if self.position >= self.length {
            self.playing = false;
            self.ended = true;
        }
    }

    /// Switch load failures on or off for a clock already in use.
    pub fn set_failing(&mut self, fail: bool) {
        self.fail_loads = fail;
    }

    /// Target of the most recent seek, after clamping.
    pub fn last_seek(&self) -> Option<Duration> {
        self.last_seek
    }
}

impl PlaybackClock for SimulatedClock {
    fn load(&mut self, path: &Path) -> Result<()> {
        self.unload();
        if self.fail_loads {
            return Err(anyhow!("Cannot decode {}", path.display()));
        }
        self.loaded = true;
        Ok(())
    }

    fn unload(&mut self) {
        self.loaded = false;
        self.playing = false;
        self.position = Duration::ZERO;
        self.ended = false;
        self.ended_reported = false;
    }

    fn is_loaded(&self) -> bool {
        self.loaded
    }

    fn play(&mut self) {
        if !self.loaded {
            return;
        }
        if self.ended {
            self.seek(Duration::ZERO);
        }
        self.playing = true;
    }

    fn pause(&mut self) {
        self.playing = false;
    }

    fn seek(&mut self, position: Duration) {
        if !self.loaded {
            return;
        }
        self.position = clamp_to(position, self.length);
        self.ended = false;
        self.ended_reported = false;
        self.last_seek = Some(self.position);
    }

    fn position(&self) -> Duration {
        self.position
    }

    fn duration(&self) -> Duration {
        match self.loaded {
            true => self.length,
            false => Duration::ZERO,
        }
    }

    fn is_playing(&self) -> bool {
        self.playing
    }

    fn poll_event(&mut self) -> Option<ClockEvent> {
        if let Some(step) = self.step {
            self.advance(step);
        }

        if self.ended {
            if self.ended_reported {
                return None;
            }
            self.ended_reported = true;
            return Some(ClockEvent::Ended);
        }

        match self.loaded && self.playing {
            true => Some(ClockEvent::Tick(self.position)),
            false => None,
        }
    }
}
