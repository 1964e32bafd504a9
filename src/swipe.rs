//! Swipe recognition: contact events in, directional swipes out.

use std::fmt;
use std::str::FromStr;
use std::sync::mpsc::Sender;

use log::{debug, trace};
use thiserror::Error;

use crate::clock::{Clock, MonotonicClock};
use crate::contact::{ContactEvent, ContactEventKind};
use crate::gesture::{EndedGesture, Gesture};
use crate::options::SwipeOptions;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SwipeDirection {
    Up,
    Down,
    Left,
    Right,
}

impl SwipeDirection {
    pub const ALL: [SwipeDirection; 4] = [
        SwipeDirection::Up,
        SwipeDirection::Down,
        SwipeDirection::Left,
        SwipeDirection::Right,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SwipeDirection::Up => "up",
            SwipeDirection::Down => "down",
            SwipeDirection::Left => "left",
            SwipeDirection::Right => "right",
        }
    }

    /// Name of the notification announcing this swipe.
    pub fn event_name(self) -> &'static str {
        match self {
            SwipeDirection::Up => "swipe-up",
            SwipeDirection::Down => "swipe-down",
            SwipeDirection::Left => "swipe-left",
            SwipeDirection::Right => "swipe-right",
        }
    }
}

impl fmt::Display for SwipeDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown swipe direction: {0}")]
pub struct UnknownDirection(pub String);

impl FromStr for SwipeDirection {
    type Err = UnknownDirection;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "up" => Ok(SwipeDirection::Up),
            "down" => Ok(SwipeDirection::Down),
            "left" => Ok(SwipeDirection::Left),
            "right" => Ok(SwipeDirection::Right),
            other => Err(UnknownDirection(other.to_string())),
        }
    }
}

/// Receives recognized swipes.
pub trait SwipeSink {
    fn swipe(&mut self, dir: SwipeDirection);
}

impl<F: FnMut(SwipeDirection)> SwipeSink for F {
    fn swipe(&mut self, dir: SwipeDirection) {
        self(dir)
    }
}

impl SwipeSink for Vec<SwipeDirection> {
    fn swipe(&mut self, dir: SwipeDirection) {
        self.push(dir);
    }
}

impl SwipeSink for Sender<SwipeDirection> {
    fn swipe(&mut self, dir: SwipeDirection) {
        // a dropped receiver just means nobody is listening anymore
        let _ = self.send(dir);
    }
}

/// Current viewport dimensions.
pub trait Viewport {
    fn size(&self) -> (f64, f64);
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportSize {
    pub width: f64,
    pub height: f64,
}

impl ViewportSize {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

impl Viewport for ViewportSize {
    fn size(&self) -> (f64, f64) {
        (self.width, self.height)
    }
}

/// Canonical test for a right-to-left swipe; other directions are reflected
/// into this form by the caller.
fn passes(
    primary_span: f64,
    perpendicular_span: f64,
    primary_delta: f64,
    perpendicular_delta: f64,
    duration: f64,
    scrolled: bool,
    options: &SwipeOptions,
) -> bool {
    if options.scroll && scrolled {
        return false;
    }
    if primary_delta > 0.0 {
        return false;
    }
    let primary = primary_delta.abs();
    let perpendicular = perpendicular_delta.abs();

    if primary < options.threshold {
        return false;
    }
    if perpendicular >= options.false_positive_threshold {
        return false;
    }
    if options.velocity_enabled() {
        // duration over normalized distance: larger means slower, and
        // `options.velocity` is a lower bound on it
        let trace = primary * primary + perpendicular * perpendicular;
        let win = primary_span * primary_span + perpendicular_span * perpendicular_span;
        let p = (trace / win).sqrt();
        let m = p / options.threshold;
        let velocity = duration / m;
        if velocity < options.velocity {
            return false;
        }
    }
    true
}

/// Directions an ended gesture qualifies for, in up/down/left/right order.
/// Canceled gestures never qualify. More than one direction can pass with
/// degenerate options (e.g. a zero threshold).
pub fn classify(
    gesture: &EndedGesture,
    viewport: (f64, f64),
    options: &SwipeOptions,
) -> Vec<SwipeDirection> {
    if gesture.canceled {
        return Vec::new();
    }
    let (w, h) = viewport;
    let (dx, dy, dt) = (gesture.dx, gesture.dy, gesture.dt as f64);

    options
        .direction
        .iter()
        .filter(|dir| match dir {
            SwipeDirection::Up => passes(h, w, dy, dx, dt, gesture.scroll_y, options),
            SwipeDirection::Down => passes(h, w, -dy, dx, dt, gesture.scroll_y, options),
            SwipeDirection::Left => passes(w, h, dx, dy, dt, gesture.scroll_x, options),
            SwipeDirection::Right => passes(w, h, -dx, dy, dt, gesture.scroll_x, options),
        })
        .collect()
}

/// Drives one [`Gesture`] from a single input surface.
pub struct SwipeRecognizer<S, V, C = MonotonicClock> {
    options: SwipeOptions,
    gesture: Gesture<C>,
    viewport: V,
    sink: S,
}

impl<S: SwipeSink, V: Viewport> SwipeRecognizer<S, V, MonotonicClock> {
    pub fn new(options: SwipeOptions, viewport: V, sink: S) -> Self {
        Self::with_clock(options, viewport, sink, MonotonicClock::new())
    }
}

impl<S: SwipeSink, V: Viewport, C: Clock> SwipeRecognizer<S, V, C> {
    pub fn with_clock(options: SwipeOptions, viewport: V, sink: S, clock: C) -> Self {
        Self {
            options,
            gesture: Gesture::new(clock),
            viewport,
            sink,
        }
    }

    pub fn options(&self) -> &SwipeOptions {
        &self.options
    }

    pub fn gesture(&self) -> &Gesture<C> {
        &self.gesture
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    pub fn handle(&mut self, event: &ContactEvent) {
        match event.kind {
            ContactEventKind::Start => self.on_start(event),
            ContactEventKind::Move => self.on_move(event),
            ContactEventKind::End => self.on_end(event),
            ContactEventKind::Cancel => self.on_cancel(event),
        }
    }

    pub fn on_start(&mut self, event: &ContactEvent) {
        if self.gesture.is_started() {
            debug!("swipe: new contact while tracking, abandoning gesture");
            self.gesture.cancel();
            return;
        }
        match event.touches.as_slice() {
            [touch] => self.gesture.start(touch),
            [] => {}
            many => trace!("swipe: ignoring start with {} contacts", many.len()),
        }
    }

    pub fn on_move(&mut self, event: &ContactEvent) {
        if self.guard(event) {
            self.set_from(event);
        }
    }

    pub fn on_end(&mut self, event: &ContactEvent) {
        if !self.guard(event) {
            return;
        }
        self.set_from(event);
        self.gesture.end();
        self.process_gesture();
    }

    pub fn on_cancel(&mut self, event: &ContactEvent) {
        if !self.guard(event) {
            return;
        }
        self.set_from(event);
        self.gesture.cancel();
    }

    fn set_from(&mut self, event: &ContactEvent) {
        if let Some(touch) = event.single_changed() {
            self.gesture.set(touch);
        }
    }

    /// Cancels on several changed contacts or a contact other than the
    /// tracked one. Returns whether the event may proceed.
    fn guard(&mut self, event: &ContactEvent) -> bool {
        match event.single_changed() {
            Some(touch) if self.gesture.is(touch) => true,
            Some(touch) => {
                debug!(
                    "swipe: contact {} is not the tracked contact {:?}, canceling",
                    touch.identifier,
                    self.gesture.identifier()
                );
                self.gesture.cancel();
                false
            }
            None => {
                debug!(
                    "swipe: {} changed contacts on {:?}, canceling",
                    event.changed.len(),
                    event.kind
                );
                self.gesture.cancel();
                false
            }
        }
    }

    fn process_gesture(&mut self) {
        let Some(ended) = self.gesture.ended() else {
            return;
        };
        for dir in classify(ended, self.viewport.size(), &self.options) {
            debug!("swipe: {}", dir.event_name());
            self.sink.swipe(dir);
        }
    }
}
