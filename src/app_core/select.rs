use crossbeam_channel::{Receiver, select};

use crate::{REFRESH_RATE, app_core::Reprise, looper::LoopEvent};

enum Next {
    Event(LoopEvent),
    Line(String),
    InputClosed,
    Idle,
}

impl Reprise {
    #[inline]
    pub(super) fn select_shortcut(&mut self, input_rx: &Receiver<String>) {
        let events = self.looper_events();

        let next = select! {
            recv(events) -> event => match event {
                Ok(event) => Next::Event(event),
                Err(_) => Next::InputClosed,
            },

            recv(input_rx) -> line => match line {
                Ok(line) => Next::Line(line),
                Err(_) => Next::InputClosed,
            },

            default(REFRESH_RATE) => Next::Idle,
        };

        match next {
            Next::Event(event) => self.handle_loop_event(event),
            Next::Line(line) => self.handle_input(&line),
            Next::InputClosed => self.request_quit(),
            Next::Idle => (),
        }
    }
}
