//! Contact records and lifecycle notifications delivered by an input surface.

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    pub identifier: i32,
    /// Viewport-relative position.
    pub client_x: f64,
    pub client_y: f64,
    /// Document-relative position.
    pub page_x: f64,
    pub page_y: f64,
}

impl Contact {
    /// Contact on a surface with no scroll offset (page == client).
    pub fn at(identifier: i32, x: f64, y: f64) -> Self {
        Self {
            identifier,
            client_x: x,
            client_y: y,
            page_x: x,
            page_y: y,
        }
    }

    /// Page minus client position per axis; changes when the view scrolls
    /// under the contact.
    pub fn scroll_offset(&self) -> (f64, f64) {
        (self.page_x - self.client_x, self.page_y - self.client_y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactEventKind {
    Start,
    Move,
    End,
    Cancel,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ContactEvent {
    pub kind: ContactEventKind,
    /// Every contact currently on the surface.
    pub touches: Vec<Contact>,
    /// Contacts that changed in this notification.
    pub changed: Vec<Contact>,
}

impl ContactEvent {
    pub fn start(touches: Vec<Contact>) -> Self {
        let changed = touches.clone();
        Self {
            kind: ContactEventKind::Start,
            touches,
            changed,
        }
    }

    pub fn moved(changed: Vec<Contact>) -> Self {
        Self::with_changed(ContactEventKind::Move, changed)
    }

    pub fn end(changed: Vec<Contact>) -> Self {
        Self::with_changed(ContactEventKind::End, changed)
    }

    pub fn cancel(changed: Vec<Contact>) -> Self {
        Self::with_changed(ContactEventKind::Cancel, changed)
    }

    fn with_changed(kind: ContactEventKind, changed: Vec<Contact>) -> Self {
        Self {
            kind,
            touches: changed.clone(),
            changed,
        }
    }

    /// The sole changed contact, or `None` when zero or several changed.
    pub fn single_changed(&self) -> Option<&Contact> {
        match self.changed.as_slice() {
            [c] => Some(c),
            _ => None,
        }
    }
}
