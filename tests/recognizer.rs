use swipectl::{
    Contact, ContactEvent, DirectionSet, ManualClock, SwipeDirection, SwipeOptions,
    SwipeRecognizer, ViewportSize,
};

type Recorder = SwipeRecognizer<Vec<SwipeDirection>, ViewportSize, ManualClock>;

fn recognizer(options: SwipeOptions) -> (Recorder, ManualClock) {
    let clock = ManualClock::new(1_000);
    let r = SwipeRecognizer::with_clock(
        options,
        ViewportSize::new(400.0, 800.0),
        Vec::new(),
        clock.clone(),
    );
    (r, clock)
}

fn scrolled(id: i32, x: f64, y: f64, sx: f64, sy: f64) -> Contact {
    Contact {
        identifier: id,
        client_x: x,
        client_y: y,
        page_x: x + sx,
        page_y: y + sy,
    }
}

#[test]
fn left_swipe_is_recognized_once() {
    let (mut r, clock) = recognizer(SwipeOptions::default());
    r.handle(&ContactEvent::start(vec![Contact::at(3, 300.0, 400.0)]));
    clock.advance(50);
    r.handle(&ContactEvent::moved(vec![Contact::at(3, 250.0, 402.0)]));
    clock.advance(100);
    r.handle(&ContactEvent::end(vec![Contact::at(3, 180.0, 405.0)]));

    assert_eq!(r.sink(), &vec![SwipeDirection::Left]);
    let g = r.gesture().ended().expect("gesture ended");
    assert_eq!((g.dx, g.dy, g.dt), (-120.0, 5.0, 150));
    assert_eq!(g.dx, g.end_x - g.start_x);
    assert_eq!(g.dy, g.end_y - g.start_y);
}

#[test]
fn recognizer_is_reusable_across_swipes() {
    let (mut r, clock) = recognizer(SwipeOptions::default());
    for (id, to_x) in [(1, 180.0), (2, 420.0)] {
        r.handle(&ContactEvent::start(vec![Contact::at(id, 300.0, 400.0)]));
        clock.advance(150);
        r.handle(&ContactEvent::end(vec![Contact::at(id, to_x, 400.0)]));
    }
    assert_eq!(r.sink(), &vec![SwipeDirection::Left, SwipeDirection::Right]);
}

#[test]
fn scroll_during_gesture_suppresses_swipe() {
    let (mut r, clock) = recognizer(SwipeOptions::default());
    r.handle(&ContactEvent::start(vec![scrolled(1, 300.0, 400.0, 0.0, 0.0)]));
    clock.advance(75);
    r.handle(&ContactEvent::moved(vec![scrolled(1, 250.0, 400.0, 30.0, 0.0)]));
    clock.advance(75);
    r.handle(&ContactEvent::end(vec![scrolled(1, 180.0, 405.0, 0.0, 0.0)]));

    assert!(r.sink().is_empty());
    assert!(r.gesture().ended().unwrap().scroll_x);
}

#[test]
fn scroll_allowed_when_option_off() {
    let (mut r, clock) = recognizer(SwipeOptions::default().with_scroll(false));
    r.handle(&ContactEvent::start(vec![scrolled(1, 300.0, 400.0, 0.0, 0.0)]));
    clock.advance(150);
    r.handle(&ContactEvent::end(vec![scrolled(1, 180.0, 405.0, 30.0, 0.0)]));
    assert_eq!(r.sink(), &vec![SwipeDirection::Left]);
}

#[test]
fn cross_axis_drift_rejects() {
    let options = SwipeOptions::default().with_direction(DirectionSet::only(SwipeDirection::Left));
    let (mut r, clock) = recognizer(options);
    r.handle(&ContactEvent::start(vec![Contact::at(1, 300.0, 400.0)]));
    clock.advance(150);
    r.handle(&ContactEvent::end(vec![Contact::at(1, 180.0, 440.0)]));
    assert!(r.sink().is_empty());
}

#[test]
fn multi_contact_move_cancels() {
    let (mut r, clock) = recognizer(SwipeOptions::default());
    r.handle(&ContactEvent::start(vec![Contact::at(1, 300.0, 400.0)]));
    clock.advance(50);
    r.handle(&ContactEvent::moved(vec![
        Contact::at(1, 250.0, 400.0),
        Contact::at(2, 10.0, 10.0),
    ]));
    assert!(r.gesture().is_canceled());

    clock.advance(100);
    r.handle(&ContactEvent::end(vec![Contact::at(1, 180.0, 400.0)]));
    assert!(r.sink().is_empty());
}

#[test]
fn multi_contact_end_cancels() {
    let (mut r, clock) = recognizer(SwipeOptions::default());
    r.handle(&ContactEvent::start(vec![Contact::at(1, 300.0, 400.0)]));
    clock.advance(150);
    r.handle(&ContactEvent::end(vec![
        Contact::at(1, 180.0, 400.0),
        Contact::at(2, 10.0, 10.0),
    ]));
    assert!(r.gesture().is_canceled());
    assert!(r.sink().is_empty());
}

#[test]
fn foreign_contact_cancels() {
    let (mut r, clock) = recognizer(SwipeOptions::default());
    r.handle(&ContactEvent::start(vec![Contact::at(1, 300.0, 400.0)]));
    clock.advance(150);
    r.handle(&ContactEvent::moved(vec![Contact::at(5, 250.0, 400.0)]));
    assert!(r.gesture().is_canceled());
    r.handle(&ContactEvent::end(vec![Contact::at(5, 180.0, 400.0)]));
    assert!(r.sink().is_empty());
}

#[test]
fn surface_cancel_never_classifies() {
    let (mut r, clock) = recognizer(SwipeOptions::default());
    r.handle(&ContactEvent::start(vec![Contact::at(1, 300.0, 400.0)]));
    clock.advance(150);
    r.handle(&ContactEvent::cancel(vec![Contact::at(1, 180.0, 400.0)]));

    let g = r.gesture().ended().unwrap();
    assert!(g.canceled);
    assert_eq!(g.dx, -120.0);
    assert!(r.sink().is_empty());
}

#[test]
fn second_start_abandons_tracking() {
    let (mut r, clock) = recognizer(SwipeOptions::default());
    r.handle(&ContactEvent::start(vec![Contact::at(1, 300.0, 400.0)]));
    clock.advance(20);
    r.handle(&ContactEvent::start(vec![Contact::at(2, 100.0, 100.0)]));
    assert!(r.gesture().is_canceled());
    assert_eq!(r.gesture().identifier(), Some(1));

    // the second contact was not adopted, so its end is rejected
    clock.advance(130);
    r.handle(&ContactEvent::end(vec![Contact::at(2, 20.0, 100.0)]));
    assert!(r.sink().is_empty());

    // tracking is idle again; the next start is accepted
    r.handle(&ContactEvent::start(vec![Contact::at(3, 300.0, 400.0)]));
    assert!(r.gesture().is_started());
}

#[test]
fn multi_contact_start_is_ignored() {
    let (mut r, _clock) = recognizer(SwipeOptions::default());
    r.handle(&ContactEvent::start(vec![
        Contact::at(1, 300.0, 400.0),
        Contact::at(2, 100.0, 400.0),
    ]));
    assert!(r.gesture().is_idle());
}

#[test]
fn move_for_lifted_contact_restarts_tracking() {
    let (mut r, clock) = recognizer(SwipeOptions::default());
    r.handle(&ContactEvent::start(vec![Contact::at(1, 300.0, 400.0)]));
    r.handle(&ContactEvent::end(vec![Contact::at(1, 300.0, 400.0)]));
    assert!(r.sink().is_empty());

    clock.advance(10);
    r.handle(&ContactEvent::moved(vec![Contact::at(1, 290.0, 400.0)]));
    let a = r.gesture().active().expect("tracking resumed");
    assert_eq!((a.start_x, a.start_time), (290.0, 1_010));

    clock.advance(150);
    r.handle(&ContactEvent::end(vec![Contact::at(1, 170.0, 400.0)]));
    assert_eq!(r.sink(), &vec![SwipeDirection::Left]);
}

#[test]
fn events_before_any_start_do_nothing() {
    let (mut r, _clock) = recognizer(SwipeOptions::default());
    r.handle(&ContactEvent::moved(vec![Contact::at(1, 10.0, 10.0)]));
    r.handle(&ContactEvent::end(vec![Contact::at(1, 10.0, 10.0)]));
    r.handle(&ContactEvent::cancel(vec![]));
    assert!(r.gesture().is_idle());
    assert!(r.sink().is_empty());
}

#[test]
fn closure_sink_receives_event_names() {
    let clock = ManualClock::new(0);
    let mut names = Vec::new();
    {
        let mut r = SwipeRecognizer::with_clock(
            SwipeOptions::default(),
            ViewportSize::new(400.0, 800.0),
            |d: SwipeDirection| names.push(d.event_name()),
            clock.clone(),
        );
        r.handle(&ContactEvent::start(vec![Contact::at(1, 200.0, 600.0)]));
        clock.advance(200);
        r.handle(&ContactEvent::end(vec![Contact::at(1, 205.0, 450.0)]));
    }
    assert_eq!(names, vec!["swipe-up"]);
}
