//! Single-contact swipe recognition.
//!
//! A [`SwipeRecognizer`] owns one [`Gesture`], drives it from
//! [`ContactEvent`]s and, when a contact lifts cleanly, classifies the motion
//! against [`SwipeOptions`] and reports zero or more [`SwipeDirection`]s to a
//! [`SwipeSink`].

pub mod clock;
pub mod contact;
pub mod gesture;
pub mod options;
pub mod swipe;

pub use clock::{Clock, ManualClock, MonotonicClock};
pub use contact::{Contact, ContactEvent, ContactEventKind};
pub use gesture::{ActiveGesture, EndedGesture, Gesture};
pub use options::{DirectionSet, SwipeOptions};
pub use swipe::{SwipeDirection, SwipeRecognizer, SwipeSink, Viewport, ViewportSize, classify};
