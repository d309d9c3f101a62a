use super::{LoopCommand, LoopEvent, Session};
use crate::player::{PlaybackClock, PlaybackMetrics};
use crossbeam_channel::{Receiver, Sender, select};
use std::{sync::Arc, time::Duration};

/// Sole owner of the session. Runs commands as they arrive and polls the
/// clock for ticks in between.
pub(super) struct LoopCore<C: PlaybackClock> {
    session: Session<C>,
    commands: Receiver<LoopCommand>,
    events: Sender<LoopEvent>,
    metrics: Arc<PlaybackMetrics>,
    refresh_rate: Duration,
}

impl<C: PlaybackClock> LoopCore<C> {
    pub(super) fn new(
        clock: C,
        commands: Receiver<LoopCommand>,
        events: Sender<LoopEvent>,
        metrics: Arc<PlaybackMetrics>,
        refresh_rate: Duration,
    ) -> Self {
        LoopCore {
            session: Session::new(clock),
            commands,
            events,
            metrics,
            refresh_rate,
        }
    }

    pub(super) fn run(&mut self) {
        loop {
            let next = select! {
                recv(self.commands) -> cmd => Some(cmd),
                default(self.refresh_rate) => None,
            };

            match next {
                Some(Ok(LoopCommand::Shutdown)) | Some(Err(_)) => break,
                Some(Ok(cmd)) => self.process_command(cmd),
                None => (),
            }

            self.poll_clock();
            self.update_metrics();
        }

        self.session.unload();
        self.metrics.reset();
        tracing::debug!("Loop core stopped");
    }

    fn process_command(&mut self, cmd: LoopCommand) {
        match self.session.apply(cmd) {
            Ok(Some(event)) => {
                if let LoopEvent::SectionStarted(section) = &event {
                    self.metrics.set_loop(Some(section.id()), true);
                    self.metrics.reset_rewinds();
                }
                self.emit(event);
            }
            Ok(None) => (),
            Err(e) => {
                tracing::warn!(error = %e, "Command rejected");
                self.emit(LoopEvent::Error(e));
            }
        }
    }

    fn poll_clock(&mut self) {
        if let Some(event) = self.session.poll() {
            if let LoopEvent::Rewound(id) = event {
                self.metrics.count_rewind();
                tracing::debug!(id, rewinds = self.metrics.rewinds(), "Rewound");
            }
            self.emit(event);
        }
    }

    fn update_metrics(&self) {
        let clock = self.session.clock();
        let state = self.session.loop_state();

        self.metrics.set_playback_state(clock.state());
        self.metrics.set_elapsed(clock.position());
        self.metrics.set_duration(clock.duration());
        self.metrics.set_loop(state.active, state.repeating);
    }

    fn emit(&self, event: LoopEvent) {
        let _ = self.events.send(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::player::SimulatedClock;
    use crossbeam_channel::unbounded;
    use std::{path::PathBuf, thread};

    #[test]
    fn runs_commands_and_stops_on_shutdown() {
        let (cmd_tx, cmd_rx) = unbounded();
        let (evt_tx, evt_rx) = unbounded();
        let metrics = PlaybackMetrics::new();

        let clock = SimulatedClock::new(Duration::from_secs(60));
        let mut core = LoopCore::new(
            clock,
            cmd_rx,
            evt_tx,
            Arc::clone(&metrics),
            Duration::from_millis(1),
        );

        cmd_tx.send(LoopCommand::Load(PathBuf::from("/tmp/x.wav"))).unwrap();
        cmd_tx
            .send(LoopCommand::AddSection {
                name: "A".into(),
                start: Duration::from_secs(1),
                end: Duration::from_secs(2),
            })
            .unwrap();
        cmd_tx.send(LoopCommand::PlaySection(99)).unwrap();
        cmd_tx.send(LoopCommand::Shutdown).unwrap();

        thread::spawn(move || core.run()).join().unwrap();

        let events: Vec<_> = evt_rx.try_iter().collect();
        assert!(matches!(events[0], LoopEvent::SourceLoaded { .. }));
        assert!(matches!(events[1], LoopEvent::SectionAdded(_)));
        assert!(matches!(
            events[2],
            LoopEvent::Error(crate::SectionError::SectionNotFound(99))
        ));
        assert!(metrics.is_stopped());
    }

    #[test]
    fn replaying_a_section_restarts_the_rewind_count() {
        let (_cmd_tx, cmd_rx) = unbounded();
        let (evt_tx, evt_rx) = unbounded();
        let metrics = PlaybackMetrics::new();
        let mut core = LoopCore::new(
            SimulatedClock::new(Duration::from_secs(60)),
            cmd_rx,
            evt_tx,
            Arc::clone(&metrics),
            Duration::from_millis(1),
        );

        core.process_command(LoopCommand::Load(PathBuf::from("/tmp/x.wav")));
        core.process_command(LoopCommand::AddSection {
            name: "A".into(),
            start: Duration::from_secs(1),
            end: Duration::from_secs(2),
        });
        core.process_command(LoopCommand::PlaySection(1));

        for _ in 0..3 {
            core.session.clock_mut().advance(Duration::from_secs(1));
            core.poll_clock();
        }
        core.update_metrics();
        assert_eq!(metrics.rewinds(), 3);

        core.process_command(LoopCommand::PlaySection(1));
        assert_eq!(metrics.active_section(), Some(1));
        assert_eq!(metrics.rewinds(), 0);
        assert!(evt_rx.try_iter().any(|e| e == LoopEvent::Rewound(1)));
    }
}
