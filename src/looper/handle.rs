use super::{LoopCommand, LoopEvent, core::LoopCore};
use crate::{
    domain::SectionId,
    player::{PlaybackClock, PlaybackMetrics, PlaybackState},
};
use anyhow::{Result, anyhow};
use crossbeam_channel::{Receiver, Sender, bounded, unbounded};
use std::{
    path::PathBuf,
    sync::Arc,
    thread::{self, JoinHandle},
    time::Duration,
};

/// Front-end side of the loop thread.
pub struct LoopHandle {
    commands: Sender<LoopCommand>,
    events: Receiver<LoopEvent>,
    metrics: Arc<PlaybackMetrics>,
    thread: Option<JoinHandle<()>>,
}

impl LoopHandle {
    /// Start the loop thread. The clock is built on that thread, since audio
    /// output streams are not always allowed to cross threads.
    pub fn spawn<C, F>(make_clock: F, refresh_rate: Duration) -> Result<Self>
    where
        C: PlaybackClock + 'static,
        F: FnOnce() -> Result<C> + Send + 'static,
    {
        let (cmd_tx, cmd_rx) = unbounded();
        let (evt_tx, evt_rx) = unbounded();
        let (ready_tx, ready_rx) = bounded(1);
        let metrics = PlaybackMetrics::new();
        let core_metrics = Arc::clone(&metrics);

        let thread = thread::Builder::new()
            .name("loop-core".into())
            .spawn(move || {
                let clock = match make_clock() {
                    Ok(clock) => {
                        let _ = ready_tx.send(Ok(()));
                        clock
                    }
                    Err(e) => {
                        let _ = ready_tx.send(Err(e));
                        return;
                    }
                };
                LoopCore::new(clock, cmd_rx, evt_tx, core_metrics, refresh_rate).run();
            })?;

        ready_rx
            .recv()
            .map_err(|_| anyhow!("Loop thread exited during startup"))??;

        Ok(Self {
            commands: cmd_tx,
            events: evt_rx,
            metrics,
            thread: Some(thread),
        })
    }

    pub fn metrics(&self) -> Arc<PlaybackMetrics> {
        Arc::clone(&self.metrics)
    }

    pub fn events(&self) -> &Receiver<LoopEvent> {
        &self.events
    }

    pub fn send(&self, cmd: LoopCommand) -> Result<()> {
        self.commands.send(cmd)?;
        Ok(())
    }
}

// =====================
//    COMMAND HANDLER
// =====================
impl LoopHandle {
    pub fn load(&self, path: impl Into<PathBuf>) -> Result<()> {
        self.send(LoopCommand::Load(path.into()))
    }

    pub fn unload(&self) -> Result<()> {
        self.send(LoopCommand::Unload)
    }

    pub fn add_section(&self, name: &str, start: Duration, end: Duration) -> Result<()> {
        self.send(LoopCommand::AddSection {
            name: name.to_string(),
            start,
            end,
        })
    }

    pub fn mark_start(&self) -> Result<()> {
        self.send(LoopCommand::MarkStart)
    }

    pub fn mark_end(&self) -> Result<()> {
        self.send(LoopCommand::MarkEnd)
    }

    pub fn commit(&self, name: &str) -> Result<()> {
        self.send(LoopCommand::CommitStaged(name.to_string()))
    }

    pub fn delete_section(&self, id: SectionId) -> Result<()> {
        self.send(LoopCommand::DeleteSection(id))
    }

    pub fn play_section(&self, id: SectionId) -> Result<()> {
        self.send(LoopCommand::PlaySection(id))
    }

    pub fn stop(&self) -> Result<()> {
        self.send(LoopCommand::Stop)
    }

    pub fn toggle_playback(&self) -> Result<()> {
        self.send(LoopCommand::TogglePlayback)
    }

    pub fn seek(&self, position: Duration) -> Result<()> {
        self.send(LoopCommand::Seek(position))
    }

    pub fn seek_forward(&self, step: Duration) -> Result<()> {
        self.send(LoopCommand::SeekForward(step))
    }

    pub fn seek_back(&self, step: Duration) -> Result<()> {
        self.send(LoopCommand::SeekBack(step))
    }

    pub fn list_sections(&self) -> Result<()> {
        self.send(LoopCommand::ListSections)
    }
}

// ===============
//    ACCESSORS
// ===============

impl LoopHandle {
    pub fn elapsed(&self) -> Duration {
        self.metrics.get_elapsed()
    }

    pub fn duration(&self) -> Duration {
        self.metrics.get_duration()
    }

    pub fn get_playback_state(&self) -> PlaybackState {
        self.metrics.get_state()
    }

    pub fn active_section(&self) -> Option<SectionId> {
        self.metrics.active_section()
    }

    pub fn poll_events(&self) -> Vec<LoopEvent> {
        self.events.try_iter().collect()
    }
}

impl Drop for LoopHandle {
    fn drop(&mut self) {
        let _ = self.commands.send(LoopCommand::Shutdown);
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{player::SimulatedClock, sections::SectionError};

    fn wait_for<F: Fn(&LoopEvent) -> bool>(handle: &LoopHandle, pred: F) -> LoopEvent {
        loop {
            let event = handle
                .events()
                .recv_timeout(Duration::from_secs(5))
                .expect("timed out waiting for loop event");
            if pred(&event) {
                return event;
            }
        }
    }

    #[test]
    fn failed_clock_construction_is_reported() {
        let result = LoopHandle::spawn(
            || -> Result<SimulatedClock> { Err(anyhow!("no audio device")) },
            Duration::from_millis(5),
        );
        let err = result.err().expect("spawn should fail");
        assert_eq!(err.to_string(), "no audio device");
    }

    #[test]
    fn section_loops_on_the_loop_thread() {
        let handle = LoopHandle::spawn(
            || {
                Ok(SimulatedClock::new(Duration::from_secs(10))
                    .with_auto_advance(Duration::from_millis(100)))
            },
            Duration::from_millis(1),
        )
        .unwrap();

        handle.load("/tmp/track.wav").unwrap();
        handle
            .add_section("Hook", Duration::from_secs(2), Duration::from_secs(3))
            .unwrap();
        let LoopEvent::SectionAdded(section) =
            wait_for(&handle, |e| matches!(e, LoopEvent::SectionAdded(_)))
        else {
            unreachable!()
        };

        handle.play_section(section.id()).unwrap();
        wait_for(&handle, |e| *e == LoopEvent::Rewound(section.id()));
        wait_for(&handle, |e| *e == LoopEvent::Rewound(section.id()));

        handle.delete_section(section.id()).unwrap();
        let deleted = wait_for(&handle, |e| matches!(e, LoopEvent::SectionDeleted { .. }));
        assert_eq!(
            deleted,
            LoopEvent::SectionDeleted {
                id: section.id(),
                loop_cleared: true
            }
        );

        handle.play_section(section.id()).unwrap();
        let err = wait_for(&handle, |e| matches!(e, LoopEvent::Error(_)));
        assert_eq!(err, LoopEvent::Error(SectionError::SectionNotFound(section.id())));
    }
}
