//! Per-slot touch tracking (MT protocol B) turned into contact events.

use swipectl::{Contact, ContactEvent, ViewportSize};

use crate::input::AxisRanges;

#[derive(Debug, Clone, Copy, Default)]
struct SlotState {
    tracking_id: i32, // -1 = inactive
    raw_x: i32,
    raw_y: i32,
    active: bool,
    // state at the last SYN_REPORT
    reported: bool,
    reported_id: i32,
    reported_x: i32,
    reported_y: i32,
}

#[derive(Debug)]
pub struct Tracker {
    slots: Vec<SlotState>,
    // None while the device addresses a slot past the ones tracked
    cur_slot: Option<usize>,
    ranges: AxisRanges,
    viewport: ViewportSize,
}

impl Tracker {
    pub fn new(ranges: AxisRanges, viewport: ViewportSize) -> Self {
        Self {
            slots: vec![
                SlotState {
                    tracking_id: -1,
                    reported_id: -1,
                    ..SlotState::default()
                };
                10
            ],
            cur_slot: Some(0),
            ranges,
            viewport,
        }
    }

    pub fn viewport(&self) -> ViewportSize {
        self.viewport
    }

    pub fn on_slot(&mut self, slot: i32) {
        self.cur_slot = usize::try_from(slot)
            .ok()
            .filter(|&i| i < self.slots.len());
    }

    fn slot_mut(&mut self) -> Option<&mut SlotState> {
        self.cur_slot.map(|i| &mut self.slots[i])
    }

    pub fn on_tracking_id(&mut self, tracking_id: i32) {
        let Some(s) = self.slot_mut() else {
            return;
        };
        if tracking_id < 0 {
            // release; keep the id so the lift can be reported
            s.active = false;
        } else {
            s.tracking_id = tracking_id;
            s.active = true;
        }
    }

    pub fn on_pos_x(&mut self, raw: i32) {
        if let Some(s) = self.slot_mut() {
            s.raw_x = raw;
        }
    }

    pub fn on_pos_y(&mut self, raw: i32) {
        if let Some(s) = self.slot_mut() {
            s.raw_y = raw;
        }
    }

    fn to_viewport(&self, id: i32, raw_x: i32, raw_y: i32) -> Contact {
        let r = self.ranges;
        let nx = ((raw_x - r.x_min) as f64 / r.width() as f64).clamp(0.0, 1.0);
        let ny = ((raw_y - r.y_min) as f64 / r.height() as f64).clamp(0.0, 1.0);
        // a touchscreen never scrolls under the finger: page == client
        Contact::at(id, nx * self.viewport.width, ny * self.viewport.height)
    }

    fn contact(&self, s: &SlotState) -> Contact {
        self.to_viewport(s.tracking_id, s.raw_x, s.raw_y)
    }

    /// The contact as of the last report, for lifts.
    fn reported_contact(&self, s: &SlotState) -> Contact {
        if s.active {
            // slot reused by a new contact in the same frame
            self.to_viewport(s.reported_id, s.reported_x, s.reported_y)
        } else {
            self.to_viewport(s.reported_id, s.raw_x, s.raw_y)
        }
    }

    /// Diff the frame against the previous report: one start per new
    /// contact, one move listing every moved contact, one end listing
    /// every lifted contact.
    pub fn on_syn_report(&mut self) -> Vec<ContactEvent> {
        let mut down = vec![];
        let mut started = vec![];
        let mut moved = vec![];
        let mut lifted = vec![];

        for s in &self.slots {
            let replaced = s.reported && s.active && s.tracking_id != s.reported_id;
            if s.reported && (!s.active || replaced) {
                lifted.push(self.reported_contact(s));
            }
            if s.active && (!s.reported || replaced) {
                started.push(self.contact(s));
            } else if s.active {
                if (s.raw_x, s.raw_y) != (s.reported_x, s.reported_y) {
                    moved.push(self.contact(s));
                }
                down.push(self.contact(s));
            }
        }

        for s in self.slots.iter_mut() {
            s.reported = s.active;
            s.reported_id = s.tracking_id;
            s.reported_x = s.raw_x;
            s.reported_y = s.raw_y;
        }

        let mut out = Vec::with_capacity(started.len() + 2);
        if !lifted.is_empty() {
            out.push(ContactEvent::end(lifted));
        }
        if !moved.is_empty() {
            out.push(ContactEvent::moved(moved));
        }
        // each start lists the contacts down so far, itself included
        for c in started {
            down.push(c);
            out.push(ContactEvent::start(down.clone()));
        }
        out
    }
}
