use anyhow::{Result, anyhow};
use log::{error, info, warn};
use notify::{RecursiveMode, Watcher};
use signal_hook::consts::{SIGINT, SIGTERM};
use std::{
    io,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
        mpsc::{self, Receiver, Sender},
    },
    thread,
    time::Duration,
};

use evdev::{AbsoluteAxisCode, Device, EventType, SynchronizationCode};
use swipectl::{SwipeDirection, SwipeRecognizer, ViewportSize};

use crate::actions::UinputSink;
use crate::config::{ConfigState, Profile};
use crate::input::{self, AxisRanges};
use crate::tracker::Tracker;

pub struct RunOptions {
    pub profile: Option<String>,
    pub dry_run: bool,
}

struct TouchDevice {
    label: String,
    dev: Device,
    ranges: AxisRanges,
    tracker: Tracker,
    recognizer: SwipeRecognizer<Sender<SwipeDirection>, ViewportSize>,
}

fn viewport_for(profile: &Profile, ranges: AxisRanges) -> ViewportSize {
    match profile.viewport {
        Some(vp) => ViewportSize::new(vp.width, vp.height),
        None => {
            let (w, h) = ranges.pixel_size();
            ViewportSize::new(w, h)
        }
    }
}

/// Read errors that only mean "nothing to read right now".
fn is_transient(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted
    )
}

impl TouchDevice {
    fn new(
        label: String,
        dev: Device,
        ranges: AxisRanges,
        profile: &Profile,
        tx: Sender<SwipeDirection>,
    ) -> Self {
        let viewport = viewport_for(profile, ranges);
        Self {
            label,
            dev,
            ranges,
            tracker: Tracker::new(ranges, viewport),
            recognizer: SwipeRecognizer::new(profile.swipe.clone(), viewport, tx),
        }
    }

    /// Swap in a recognizer built from `profile`; any gesture in flight is dropped.
    fn rebuild(&mut self, profile: &Profile, tx: Sender<SwipeDirection>) {
        let viewport = viewport_for(profile, self.ranges);
        self.tracker = Tracker::new(self.ranges, viewport);
        self.recognizer = SwipeRecognizer::new(profile.swipe.clone(), viewport, tx);
    }

    /// Drain pending evdev events. Returns whether anything arrived; an
    /// error means the device is gone.
    fn pump(&mut self) -> io::Result<bool> {
        let events = match self.dev.fetch_events() {
            Ok(events) => events,
            Err(e) if is_transient(&e) => return Ok(false),
            Err(e) => return Err(e),
        };
        let mut any_event = false;
        for ev in events {
            any_event = true;
            if ev.event_type() == EventType::ABSOLUTE {
                match ev.code() {
                    c if c == AbsoluteAxisCode::ABS_MT_SLOT.0 => self.tracker.on_slot(ev.value()),
                    c if c == AbsoluteAxisCode::ABS_MT_TRACKING_ID.0 => {
                        self.tracker.on_tracking_id(ev.value())
                    }
                    c if c == AbsoluteAxisCode::ABS_MT_POSITION_X.0 => {
                        self.tracker.on_pos_x(ev.value())
                    }
                    c if c == AbsoluteAxisCode::ABS_MT_POSITION_Y.0 => {
                        self.tracker.on_pos_y(ev.value())
                    }
                    _ => {}
                }
            } else if ev.event_type() == EventType::SYNCHRONIZATION
                && ev.code() == SynchronizationCode::SYN_REPORT.0
            {
                for contact_event in self.tracker.on_syn_report() {
                    self.recognizer.handle(&contact_event);
                }
            }
        }
        Ok(any_event)
    }
}

fn open_devices(profile: &Profile, tx: &Sender<SwipeDirection>) -> Result<Vec<TouchDevice>> {
    let found = input::discover_multitouch();
    if found.is_empty() {
        return Err(anyhow!(
            "no multitouch devices detected (see `swipectl doctor`)"
        ));
    }
    let mut out = vec![];
    for d in found {
        match input::open(&d.path) {
            Ok((dev, ranges)) => {
                if profile.viewport.is_none() && !ranges.has_resolution() {
                    warn!(
                        "{} reports no resolution; assuming 1920 px along its long side (set [viewport] to override)",
                        d.label()
                    );
                }
                let td = TouchDevice::new(d.label(), dev, ranges, profile, tx.clone());
                info!(
                    "tracking {} (viewport {}x{})",
                    td.label,
                    td.tracker.viewport().width,
                    td.tracker.viewport().height
                );
                out.push(td);
            }
            Err(e) => warn!("failed to open {}: {e}", d.path),
        }
    }
    if out.is_empty() {
        return Err(anyhow!("failed to open all detected devices"));
    }
    Ok(out)
}

fn watch_profile(cfg: &ConfigState) -> Result<(notify::RecommendedWatcher, Receiver<()>)> {
    let (tx, rx) = mpsc::channel();
    let watched = cfg.profile_path(&cfg.active_name);
    let mut watcher = notify::recommended_watcher(move |res: notify::Result<notify::Event>| {
        match res {
            Ok(ev) if ev.kind.is_modify() || ev.kind.is_create() => {
                if ev.paths.iter().any(|p| *p == watched) {
                    let _ = tx.send(());
                }
            }
            Ok(_) => {}
            Err(e) => warn!("profile watch error: {e}"),
        }
    })?;
    watcher.watch(&cfg.profiles_dir, RecursiveMode::NonRecursive)?;
    Ok((watcher, rx))
}

pub fn run_pipeline(opts: RunOptions) -> Result<()> {
    let mut cfg = ConfigState::load_or_install_default()?;
    if let Some(name) = opts.profile {
        // for this run only; the active pointer is left alone
        cfg.active_name = name;
        cfg.reload()?;
    }
    info!("using profile '{}'", cfg.active_name);

    let term = Arc::new(AtomicBool::new(false));
    signal_hook::flag::register(SIGINT, Arc::clone(&term))?;
    signal_hook::flag::register(SIGTERM, Arc::clone(&term))?;

    let (swipe_tx, swipe_rx) = mpsc::channel::<SwipeDirection>();
    let mut devices = open_devices(&cfg.profile, &swipe_tx)?;
    let (_watcher, reload_rx) = watch_profile(&cfg)?;

    let mut sink = if opts.dry_run {
        UinputSink::noop()
    } else {
        UinputSink::new().unwrap_or_else(|e| {
            warn!("uinput unavailable ({e}); swipes will only be logged");
            UinputSink::noop()
        })
    };

    while !term.load(Ordering::Relaxed) {
        let mut any_event = false;
        devices.retain_mut(|td| match td.pump() {
            Ok(got) => {
                any_event |= got;
                true
            }
            Err(e) => {
                error!("{}: read failed ({e}); dropping device", td.label);
                false
            }
        });
        if devices.is_empty() {
            return Err(anyhow!("all touch devices are gone"));
        }

        while let Ok(dir) = swipe_rx.try_recv() {
            if let Err(e) = crate::dispatch::dispatch_swipe(dir, &cfg.profile, &mut sink) {
                error!("dispatch failed: {e}");
            }
        }

        if reload_rx.try_recv().is_ok() {
            while reload_rx.try_recv().is_ok() {}
            match cfg.reload() {
                Ok(()) => {
                    for td in devices.iter_mut() {
                        td.rebuild(&cfg.profile, swipe_tx.clone());
                    }
                    info!("profile '{}' reloaded", cfg.active_name);
                }
                Err(e) => error!("reload failed, keeping previous profile: {e}"),
            }
        }

        if !any_event {
            thread::sleep(Duration::from_millis(4));
        }
    }

    info!("shutting down");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ranges(res: i32) -> AxisRanges {
        AxisRanges {
            x_min: 0,
            x_max: 4064,
            y_min: 0,
            y_max: 2032,
            x_res: res,
            y_res: res,
        }
    }

    #[test]
    fn viewport_defaults_to_device_pixels() {
        let profile = Profile::parse("").unwrap();
        let vp = viewport_for(&profile, ranges(16));
        assert!((vp.width - 960.0).abs() < 1e-9);
        assert!((vp.height - 480.0).abs() < 1e-9);

        let vp = viewport_for(&profile, ranges(0));
        assert!((vp.width - 1920.0).abs() < 1e-9);
        assert!((vp.height - 960.0).abs() < 1e-9);
    }

    #[test]
    fn viewport_table_overrides_device() {
        let profile = Profile::parse("[viewport]\nwidth = 800.0\nheight = 600.0").unwrap();
        let vp = viewport_for(&profile, ranges(16));
        assert_eq!((vp.width, vp.height), (800.0, 600.0));
    }

    #[test]
    fn only_would_block_is_transient() {
        assert!(is_transient(&io::Error::from(io::ErrorKind::WouldBlock)));
        // EAGAIN
        assert!(is_transient(&io::Error::from_raw_os_error(11)));
        // ENODEV
        assert!(!is_transient(&io::Error::from_raw_os_error(19)));
        assert!(!is_transient(&io::Error::other("gone")));
    }
}
