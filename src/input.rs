//! Input device discovery & axis ranges (evdev 0.13.2 compatible)

use anyhow::Result;
use evdev::{AbsoluteAxisCode, Device, EventType};
use std::path::Path;

#[derive(Debug, Clone)]
pub struct DeviceInfo {
    pub path: String,
    pub name: String,
}

impl DeviceInfo {
    pub fn label(&self) -> String {
        format!("{} ({})", self.name, self.path)
    }
}

/// Logical pixels per millimetre at 96 dpi.
const PX_PER_MM: f64 = 96.0 / 25.4;
/// Long side, in px, assumed for a panel that reports no resolution.
const FALLBACK_LONG_SIDE_PX: f64 = 1920.0;

/// Raw range of the multitouch position axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AxisRanges {
    pub x_min: i32,
    pub x_max: i32,
    pub y_min: i32,
    pub y_max: i32,
    /// Units per mm as reported by the kernel; 0 when unknown.
    pub x_res: i32,
    pub y_res: i32,
}

impl AxisRanges {
    pub fn width(&self) -> i32 {
        (self.x_max - self.x_min).max(1)
    }

    pub fn height(&self) -> i32 {
        (self.y_max - self.y_min).max(1)
    }

    /// Surface size in logical pixels. Without a reported resolution the
    /// long side is taken as 1920 px and the aspect ratio is kept.
    pub fn pixel_size(&self) -> (f64, f64) {
        let (w, h) = (self.width() as f64, self.height() as f64);
        if self.has_resolution() {
            (
                w / self.x_res as f64 * PX_PER_MM,
                h / self.y_res as f64 * PX_PER_MM,
            )
        } else {
            let scale = FALLBACK_LONG_SIDE_PX / w.max(h);
            (w * scale, h * scale)
        }
    }

    pub fn has_resolution(&self) -> bool {
        self.x_res > 0 && self.y_res > 0
    }
}

fn is_multitouch(dev: &Device) -> bool {
    let has_abs = dev.supported_events().contains(EventType::ABSOLUTE);
    let has_mt = dev.supported_absolute_axes().is_some_and(|a| {
        a.contains(AbsoluteAxisCode::ABS_MT_SLOT)
            && a.contains(AbsoluteAxisCode::ABS_MT_TRACKING_ID)
            && a.contains(AbsoluteAxisCode::ABS_MT_POSITION_X)
            && a.contains(AbsoluteAxisCode::ABS_MT_POSITION_Y)
    });
    has_abs && has_mt
}

pub fn discover_multitouch() -> Vec<DeviceInfo> {
    let mut out = vec![];
    let Ok(rd) = std::fs::read_dir("/dev/input") else {
        return out;
    };
    for e in rd.flatten() {
        let p = e.path();
        let is_event_node = p
            .file_name()
            .and_then(|s| s.to_str())
            .is_some_and(|s| s.starts_with("event"));
        if !is_event_node {
            continue;
        }
        if let Ok(dev) = Device::open(&p) {
            if is_multitouch(&dev) {
                out.push(DeviceInfo {
                    path: p.display().to_string(),
                    name: dev.name().unwrap_or("unknown").to_string(),
                });
            }
        }
    }
    out.sort_by(|a, b| a.path.cmp(&b.path));
    out
}

pub fn open(path: impl AsRef<Path>) -> Result<(Device, AxisRanges)> {
    let mut dev = Device::open(path)?;
    dev.set_nonblocking(true)?;
    let abs = dev.get_abs_state()?;
    let x = abs[AbsoluteAxisCode::ABS_MT_POSITION_X.0 as usize];
    let y = abs[AbsoluteAxisCode::ABS_MT_POSITION_Y.0 as usize];
    let ranges = AxisRanges {
        x_min: x.minimum,
        x_max: x.maximum,
        y_min: y.minimum,
        y_max: y.maximum,
        x_res: x.resolution,
        y_res: y.resolution,
    };
    Ok((dev, ranges))
}
