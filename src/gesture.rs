//! Lifecycle of a single tracked contact.
//!
//! One `Gesture` lives as long as its recognizer and is reused for every
//! swipe: `start` re-enters the active phase from any phase.

use log::trace;

use crate::clock::{Clock, MonotonicClock};
use crate::contact::Contact;

#[derive(Debug, Clone, PartialEq)]
pub struct ActiveGesture {
    pub identifier: i32,
    pub start_x: f64,
    pub start_y: f64,
    pub x: f64,
    pub y: f64,
    pub start_time: u64,
    /// Latched once the page/client offset drifts from the start baseline.
    pub scroll_x: bool,
    pub scroll_y: bool,
    baseline: (f64, f64),
}

#[derive(Debug, Clone, PartialEq)]
pub struct EndedGesture {
    pub identifier: i32,
    pub start_x: f64,
    pub start_y: f64,
    pub end_x: f64,
    pub end_y: f64,
    pub dx: f64,
    pub dy: f64,
    pub start_time: u64,
    pub end_time: u64,
    pub dt: u64,
    pub scroll_x: bool,
    pub scroll_y: bool,
    pub canceled: bool,
}

#[derive(Debug, Clone, PartialEq)]
enum Phase {
    Idle,
    Active(ActiveGesture),
    Ended(EndedGesture),
}

#[derive(Debug, Clone)]
pub struct Gesture<C = MonotonicClock> {
    phase: Phase,
    clock: C,
}

impl Default for Gesture<MonotonicClock> {
    fn default() -> Self {
        Self::new(MonotonicClock::new())
    }
}

impl<C: Clock> Gesture<C> {
    pub fn new(clock: C) -> Self {
        Self {
            phase: Phase::Idle,
            clock,
        }
    }

    pub fn is_started(&self) -> bool {
        matches!(self.phase, Phase::Active(_))
    }

    pub fn is_ended(&self) -> bool {
        matches!(self.phase, Phase::Ended(_))
    }

    pub fn is_canceled(&self) -> bool {
        matches!(&self.phase, Phase::Ended(e) if e.canceled)
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.phase, Phase::Idle)
    }

    pub fn active(&self) -> Option<&ActiveGesture> {
        match &self.phase {
            Phase::Active(a) => Some(a),
            _ => None,
        }
    }

    /// Final geometry; only present once the gesture ended.
    pub fn ended(&self) -> Option<&EndedGesture> {
        match &self.phase {
            Phase::Ended(e) => Some(e),
            _ => None,
        }
    }

    /// Identifier of the contact being tracked, or last tracked.
    pub fn identifier(&self) -> Option<i32> {
        match &self.phase {
            Phase::Idle => None,
            Phase::Active(a) => Some(a.identifier),
            Phase::Ended(e) => Some(e.identifier),
        }
    }

    pub fn is(&self, contact: &Contact) -> bool {
        self.identifier() == Some(contact.identifier)
    }

    pub fn equals(&self, contact: &Contact) -> bool {
        self.is(contact)
    }

    pub fn start(&mut self, contact: &Contact) {
        if self.is_started() {
            self.cancel();
        }
        trace!("gesture: start contact {}", contact.identifier);
        self.phase = Phase::Active(ActiveGesture {
            identifier: contact.identifier,
            start_x: contact.client_x,
            start_y: contact.client_y,
            x: contact.client_x,
            y: contact.client_y,
            start_time: self.clock.now_ms(),
            scroll_x: false,
            scroll_y: false,
            baseline: contact.scroll_offset(),
        });
    }

    pub fn set(&mut self, contact: &Contact) {
        if !self.is_started() {
            self.start(contact);
        }
        let Phase::Active(a) = &mut self.phase else {
            return;
        };
        if a.identifier != contact.identifier {
            return;
        }
        a.x = contact.client_x;
        a.y = contact.client_y;

        let (ox, oy) = contact.scroll_offset();
        if !a.scroll_x && ox != a.baseline.0 {
            trace!("gesture: x scrolled under contact {}", a.identifier);
            a.scroll_x = true;
        }
        if !a.scroll_y && oy != a.baseline.1 {
            trace!("gesture: y scrolled under contact {}", a.identifier);
            a.scroll_y = true;
        }
    }

    pub fn end(&mut self) {
        self.finish(false);
    }

    pub fn cancel(&mut self) {
        self.finish(true);
    }

    fn finish(&mut self, canceled: bool) {
        let Phase::Active(a) = &self.phase else {
            return;
        };
        let end_time = self.clock.now_ms();
        let ended = EndedGesture {
            identifier: a.identifier,
            start_x: a.start_x,
            start_y: a.start_y,
            end_x: a.x,
            end_y: a.y,
            dx: a.x - a.start_x,
            dy: a.y - a.start_y,
            start_time: a.start_time,
            end_time,
            dt: end_time.saturating_sub(a.start_time),
            scroll_x: a.scroll_x,
            scroll_y: a.scroll_y,
            canceled,
        };
        trace!(
            "gesture: {} contact {} dx={} dy={} dt={}",
            if canceled { "cancel" } else { "end" },
            ended.identifier,
            ended.dx,
            ended.dy,
            ended.dt
        );
        self.phase = Phase::Ended(ended);
    }
}
