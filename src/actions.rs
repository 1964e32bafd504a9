//! Binding actions and the uinput device that performs them.

use anyhow::{Result, anyhow};
use log::{info, warn};
use std::process::{Command, ExitStatus};
use std::str::FromStr;
use std::thread::{self, JoinHandle};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollAxis {
    Vertical,
    Horizontal,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Key(Vec<KeyToken>),
    Mouse(MouseButton),
    Scroll { axis: ScrollAxis, steps: i32 },
    Command(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyToken {
    Ctrl,
    Alt,
    Shift,
    Super,
    Tab,
    Minus,
    Equal,
    Left,
    Right,
    Up,
    Down,
    PageUp,
    PageDown,
    Home,
    End,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ActionError {
    #[error("empty action")]
    Empty,
    #[error("unknown action kind in '{0}' (expected key:, mouse:, scroll: or cmd:)")]
    UnknownKind(String),
    #[error("unknown mouse button: {0}")]
    UnknownButton(String),
    #[error("unsupported key token: {0}")]
    UnknownKey(String),
    #[error("invalid scroll spec '{0}' (expected vertical|horizontal@STEPS)")]
    BadScroll(String),
    #[error("cmd: action has no command")]
    EmptyCommand,
}

impl FromStr for KeyToken {
    type Err = ActionError;

    fn from_str(tok: &str) -> Result<Self, Self::Err> {
        let k = match tok.trim().to_ascii_uppercase().as_str() {
            "CTRL" | "CONTROL" => KeyToken::Ctrl,
            "ALT" => KeyToken::Alt,
            "SHIFT" => KeyToken::Shift,
            "SUPER" | "META" | "WIN" => KeyToken::Super,
            "TAB" => KeyToken::Tab,
            "MINUS" | "-" => KeyToken::Minus,
            "EQUAL" | "=" => KeyToken::Equal,
            "LEFT" => KeyToken::Left,
            "RIGHT" => KeyToken::Right,
            "UP" => KeyToken::Up,
            "DOWN" => KeyToken::Down,
            "PAGEUP" | "PGUP" => KeyToken::PageUp,
            "PAGEDOWN" | "PGDN" => KeyToken::PageDown,
            "HOME" => KeyToken::Home,
            "END" => KeyToken::End,
            other => return Err(ActionError::UnknownKey(other.to_string())),
        };
        Ok(k)
    }
}

impl FromStr for Action {
    type Err = ActionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ActionError::Empty);
        }
        if let Some(rest) = s.strip_prefix("key:") {
            let keys = rest
                .split('+')
                .map(str::parse)
                .collect::<Result<Vec<KeyToken>, _>>()?;
            return Ok(Action::Key(keys));
        }
        if let Some(rest) = s.strip_prefix("mouse:") {
            let btn = match rest.trim().to_ascii_lowercase().as_str() {
                "left" => MouseButton::Left,
                "right" => MouseButton::Right,
                "middle" => MouseButton::Middle,
                other => return Err(ActionError::UnknownButton(other.to_string())),
            };
            return Ok(Action::Mouse(btn));
        }
        if let Some(rest) = s.strip_prefix("scroll:") {
            let bad = || ActionError::BadScroll(rest.to_string());
            let (axis, steps) = rest.split_once('@').unwrap_or((rest, "+1"));
            let axis = match axis.trim().to_ascii_lowercase().as_str() {
                "vertical" => ScrollAxis::Vertical,
                "horizontal" => ScrollAxis::Horizontal,
                _ => return Err(bad()),
            };
            let steps: i32 = steps.trim().parse().map_err(|_| bad())?;
            return Ok(Action::Scroll { axis, steps });
        }
        if let Some(rest) = s.strip_prefix("cmd:") {
            if rest.trim().is_empty() {
                return Err(ActionError::EmptyCommand);
            }
            return Ok(Action::Command(rest.trim().to_string()));
        }
        Err(ActionError::UnknownKind(s.to_string()))
    }
}

pub struct UinputSink {
    dry_run: bool,
    #[allow(dead_code)]
    linux: Option<Box<LinuxUinput>>,
}

impl UinputSink {
    pub fn new() -> Result<Self> {
        #[cfg(target_os = "linux")]
        {
            let dev = LinuxUinput::create()?;
            return Ok(Self {
                dry_run: false,
                linux: Some(Box::new(dev)),
            });
        }
        #[allow(unreachable_code)]
        {
            warn!("uinput not available; running in NO-OP mode");
            Ok(Self::noop())
        }
    }

    /// Logs actions instead of performing them.
    pub fn noop() -> Self {
        Self {
            dry_run: true,
            linux: None,
        }
    }

    pub fn perform(&mut self, action: &Action) -> Result<()> {
        if self.dry_run {
            info!("dry-run: {action:?}");
            return Ok(());
        }
        match action {
            Action::Key(keys) => self.key_chord(keys),
            Action::Mouse(btn) => self.click_mouse(*btn),
            Action::Scroll { axis, steps } => self.scroll(*axis, *steps),
            Action::Command(cmd) => {
                spawn_reaped(cmd)?;
                Ok(())
            }
        }
    }

    fn scroll(&mut self, axis: ScrollAxis, steps: i32) -> Result<()> {
        #[cfg(target_os = "linux")]
        if let Some(dev) = self.linux.as_mut() {
            dev.scroll(axis, steps)?;
        }
        Ok(())
    }

    fn click_mouse(&mut self, btn: MouseButton) -> Result<()> {
        #[cfg(target_os = "linux")]
        if let Some(dev) = self.linux.as_mut() {
            dev.click(btn)?;
        }
        Ok(())
    }

    fn key_chord(&mut self, keys: &[KeyToken]) -> Result<()> {
        #[cfg(target_os = "linux")]
        if let Some(dev) = self.linux.as_mut() {
            // press in order
            for k in keys {
                dev.key_send(map_key(*k), 1)?;
            }
            dev.sync()?;
            // release in reverse
            for k in keys.iter().rev() {
                dev.key_send(map_key(*k), 0)?;
            }
            dev.sync()?;
        }
        Ok(())
    }
}

/// Run `cmd` through `sh -c` and wait on it from a detached thread.
fn spawn_reaped(cmd: &str) -> Result<JoinHandle<Option<ExitStatus>>> {
    let mut child = Command::new("sh").arg("-c").arg(cmd).spawn()?;
    let pid = child.id();
    info!("cmd: spawned '{cmd}' (pid={pid})");
    let handle = thread::Builder::new()
        .name(format!("cmd-{pid}"))
        .spawn(move || match child.wait() {
            Ok(status) => {
                if !status.success() {
                    warn!("cmd: pid {pid} exited with {status}");
                }
                Some(status)
            }
            Err(e) => {
                warn!("cmd: waiting on pid {pid} failed: {e}");
                None
            }
        })?;
    Ok(handle)
}

#[cfg(target_os = "linux")]
fn map_key(tok: KeyToken) -> uinput::event::keyboard::Key {
    use uinput::event::keyboard::Key as K;
    match tok {
        KeyToken::Ctrl => K::LeftControl,
        KeyToken::Alt => K::LeftAlt,
        KeyToken::Shift => K::LeftShift,
        KeyToken::Super => K::LeftMeta,
        KeyToken::Tab => K::Tab,
        KeyToken::Minus => K::Minus,
        KeyToken::Equal => K::Equal,
        KeyToken::Left => K::Left,
        KeyToken::Right => K::Right,
        KeyToken::Up => K::Up,
        KeyToken::Down => K::Down,
        KeyToken::PageUp => K::PageUp,
        KeyToken::PageDown => K::PageDown,
        KeyToken::Home => K::Home,
        KeyToken::End => K::End,
    }
}

#[cfg(target_os = "linux")]
fn map_button(btn: MouseButton) -> uinput::event::controller::Mouse {
    use uinput::event::controller::Mouse;
    match btn {
        MouseButton::Left => Mouse::Left,
        MouseButton::Right => Mouse::Right,
        MouseButton::Middle => Mouse::Middle,
    }
}

#[cfg(target_os = "linux")]
struct LinuxUinput {
    dev: uinput::device::Device,
}

#[cfg(target_os = "linux")]
impl LinuxUinput {
    fn create() -> Result<Self> {
        use uinput::event::{controller::Mouse, keyboard::Key, relative};

        let dev = uinput::default()
            .map_err(|e| anyhow!("cannot open /dev/uinput: {e}"))?
            .name("Swipectl Virtual Input")?
            .event(relative::Wheel::Vertical)?
            .event(relative::Wheel::Horizontal)?
            .event(Mouse::Left)?
            .event(Mouse::Right)?
            .event(Mouse::Middle)?
            .event(Key::LeftControl)?
            .event(Key::LeftAlt)?
            .event(Key::LeftShift)?
            .event(Key::LeftMeta)?
            .event(Key::Tab)?
            .event(Key::Minus)?
            .event(Key::Equal)?
            .event(Key::Left)?
            .event(Key::Right)?
            .event(Key::Up)?
            .event(Key::Down)?
            .event(Key::PageUp)?
            .event(Key::PageDown)?
            .event(Key::Home)?
            .event(Key::End)?
            .create()?;

        info!("uinput: created virtual device");
        Ok(Self { dev })
    }

    fn sync(&mut self) -> Result<()> {
        self.dev.synchronize()?;
        Ok(())
    }

    fn key_send(&mut self, key: uinput::event::keyboard::Key, val: i32) -> Result<()> {
        self.dev.send(key, val)?;
        Ok(())
    }

    fn click(&mut self, btn: MouseButton) -> Result<()> {
        self.dev.send(map_button(btn), 1)?;
        self.sync()?;
        self.dev.send(map_button(btn), 0)?;
        self.sync()
    }

    fn scroll(&mut self, axis: ScrollAxis, steps: i32) -> Result<()> {
        use uinput::event::relative::Wheel;
        let w = match axis {
            ScrollAxis::Vertical => Wheel::Vertical,
            ScrollAxis::Horizontal => Wheel::Horizontal,
        };
        self.dev.send(w, steps)?;
        self.sync()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_key_chords() {
        assert_eq!(
            "key:ctrl+PageDown".parse::<Action>(),
            Ok(Action::Key(vec![KeyToken::Ctrl, KeyToken::PageDown]))
        );
        assert_eq!(
            "key:ALT+F13".parse::<Action>(),
            Err(ActionError::UnknownKey("F13".into()))
        );
    }

    #[test]
    fn parses_scroll_and_mouse() {
        assert_eq!(
            "scroll:horizontal@-2".parse::<Action>(),
            Ok(Action::Scroll {
                axis: ScrollAxis::Horizontal,
                steps: -2
            })
        );
        assert_eq!(
            "scroll:vertical".parse::<Action>(),
            Ok(Action::Scroll {
                axis: ScrollAxis::Vertical,
                steps: 1
            })
        );
        assert!(matches!(
            "scroll:diagonal@1".parse::<Action>(),
            Err(ActionError::BadScroll(_))
        ));
        assert_eq!(
            "mouse:Right".parse::<Action>(),
            Ok(Action::Mouse(MouseButton::Right))
        );
    }

    #[test]
    fn rejects_unknown_and_empty() {
        assert_eq!("".parse::<Action>(), Err(ActionError::Empty));
        assert_eq!("cmd:  ".parse::<Action>(), Err(ActionError::EmptyCommand));
        assert!(matches!(
            "toggle".parse::<Action>(),
            Err(ActionError::UnknownKind(_))
        ));
    }

    #[test]
    fn noop_sink_accepts_everything() {
        let mut sink = UinputSink::noop();
        sink.perform(&Action::Mouse(MouseButton::Left)).unwrap();
        sink.perform(&Action::Command("true".into())).unwrap();
    }

    #[test]
    fn commands_are_waited_on() {
        let status = spawn_reaped("exit 3").unwrap().join().unwrap().unwrap();
        assert_eq!(status.code(), Some(3));
    }
}
