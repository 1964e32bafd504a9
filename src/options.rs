//! Swipe configuration.
//!
//! Options are merged once from loosely typed input: any value of the wrong
//! type falls back to its default instead of failing the whole load.

use log::warn;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::swipe::SwipeDirection;

pub const DEFAULT_THRESHOLD: f64 = 40.0;
pub const DEFAULT_VELOCITY: f64 = 1.0;
pub const DEFAULT_FALSE_POSITIVE_THRESHOLD: f64 = 40.0;
pub const DEFAULT_SCROLL: bool = true;

/// Which directions a recognizer tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirectionSet {
    up: bool,
    down: bool,
    left: bool,
    right: bool,
}

impl Default for DirectionSet {
    fn default() -> Self {
        Self::all()
    }
}

impl DirectionSet {
    pub const fn all() -> Self {
        Self {
            up: true,
            down: true,
            left: true,
            right: true,
        }
    }

    pub const fn empty() -> Self {
        Self {
            up: false,
            down: false,
            left: false,
            right: false,
        }
    }

    pub fn only(dir: SwipeDirection) -> Self {
        let mut set = Self::empty();
        set.insert(dir);
        set
    }

    pub fn insert(&mut self, dir: SwipeDirection) {
        *self.slot(dir) = true;
    }

    pub fn contains(&self, dir: SwipeDirection) -> bool {
        match dir {
            SwipeDirection::Up => self.up,
            SwipeDirection::Down => self.down,
            SwipeDirection::Left => self.left,
            SwipeDirection::Right => self.right,
        }
    }

    pub fn is_empty(&self) -> bool {
        !(self.up || self.down || self.left || self.right)
    }

    /// Members in test order: up, down, left, right.
    pub fn iter(&self) -> impl Iterator<Item = SwipeDirection> + '_ {
        SwipeDirection::ALL
            .into_iter()
            .filter(|d| self.contains(*d))
    }

    fn slot(&mut self, dir: SwipeDirection) -> &mut bool {
        match dir {
            SwipeDirection::Up => &mut self.up,
            SwipeDirection::Down => &mut self.down,
            SwipeDirection::Left => &mut self.left,
            SwipeDirection::Right => &mut self.right,
        }
    }

    /// `"all"`, a single direction name, or a list of names.
    pub fn from_value(v: &Value) -> Self {
        match v {
            Value::String(s) if s == "all" => Self::all(),
            Value::String(s) => match s.parse::<SwipeDirection>() {
                Ok(dir) => Self::only(dir),
                Err(_) => {
                    warn!("swipe options: unknown direction '{s}', testing all directions");
                    Self::all()
                }
            },
            Value::Array(items) if items.is_empty() => Self::empty(),
            Value::Array(items) => {
                let mut set = Self::empty();
                for item in items {
                    match item.as_str().map(str::parse::<SwipeDirection>) {
                        Some(Ok(dir)) => set.insert(dir),
                        _ => warn!("swipe options: ignoring direction entry {item}"),
                    }
                }
                if set.is_empty() {
                    warn!("swipe options: no known direction in {v}, testing all directions");
                    Self::all()
                } else {
                    set
                }
            }
            Value::Null => Self::all(),
            other => {
                warn!("swipe options: direction must be a string or list, got {other}");
                Self::all()
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SwipeOptions {
    pub direction: DirectionSet,
    /// Minimum displacement along the primary axis, in px.
    pub threshold: f64,
    /// 0 disables the velocity test.
    pub velocity: f64,
    /// Cross-axis displacement at which a swipe is rejected, in px.
    pub false_positive_threshold: f64,
    /// Reject a direction when its axis scrolled during the gesture.
    pub scroll: bool,
}

impl Default for SwipeOptions {
    fn default() -> Self {
        Self {
            direction: DirectionSet::all(),
            threshold: DEFAULT_THRESHOLD,
            velocity: DEFAULT_VELOCITY,
            false_positive_threshold: DEFAULT_FALSE_POSITIVE_THRESHOLD,
            scroll: DEFAULT_SCROLL,
        }
    }
}

impl SwipeOptions {
    /// Merge a loosely typed table over the defaults, one key at a time.
    /// `falsePositiveThreshold` wins over `false_positive_threshold`.
    pub fn from_value(v: &Value) -> Self {
        match v {
            Value::Object(map) => {
                let mut o = Self::default();
                if let Some(v) = map.get("direction") {
                    o.direction = DirectionSet::from_value(v);
                }
                if let Some(v) = map.get("threshold") {
                    o.threshold = number_or("threshold", v, DEFAULT_THRESHOLD);
                }
                if let Some(v) = map.get("velocity") {
                    o.velocity = number_or("velocity", v, DEFAULT_VELOCITY);
                }
                let fpt = map
                    .get("falsePositiveThreshold")
                    .or_else(|| map.get("false_positive_threshold"));
                if let Some(v) = fpt {
                    o.false_positive_threshold = number_or(
                        "false_positive_threshold",
                        v,
                        DEFAULT_FALSE_POSITIVE_THRESHOLD,
                    );
                }
                if let Some(v) = map.get("scroll") {
                    o.scroll = bool_or("scroll", v, DEFAULT_SCROLL);
                }
                o
            }
            Value::Null => Self::default(),
            other => {
                warn!("swipe options must be a table, got {other}; using defaults");
                Self::default()
            }
        }
    }

    pub fn with_direction(mut self, direction: DirectionSet) -> Self {
        self.direction = direction;
        self
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn with_velocity(mut self, velocity: f64) -> Self {
        self.velocity = velocity;
        self
    }

    pub fn with_false_positive_threshold(mut self, px: f64) -> Self {
        self.false_positive_threshold = px;
        self
    }

    pub fn with_scroll(mut self, scroll: bool) -> Self {
        self.scroll = scroll;
        self
    }

    pub(crate) fn velocity_enabled(&self) -> bool {
        self.velocity != 0.0 && !self.velocity.is_nan()
    }
}

fn number_or(key: &str, v: &Value, default: f64) -> f64 {
    match v.as_f64() {
        Some(n) => n,
        None => {
            warn!("swipe options: {key} must be a number, got {v}; using {default}");
            default
        }
    }
}

fn bool_or(key: &str, v: &Value, default: bool) -> bool {
    match v.as_bool() {
        Some(b) => b,
        None => {
            warn!("swipe options: {key} must be a boolean, got {v}; using {default}");
            default
        }
    }
}

impl<'de> Deserialize<'de> for SwipeOptions {
    fn deserialize<D: Deserializer<'de>>(de: D) -> Result<Self, D::Error> {
        Ok(Self::from_value(&Value::deserialize(de)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_table_gives_defaults() {
        let o = SwipeOptions::from_value(&json!({}));
        assert_eq!(o, SwipeOptions::default());
        assert_eq!(o.threshold, 40.0);
        assert_eq!(o.velocity, 1.0);
        assert_eq!(o.false_positive_threshold, 40.0);
        assert!(o.scroll);
        assert_eq!(o.direction, DirectionSet::all());
    }

    #[test]
    fn wrong_types_fall_back_per_field() {
        let o = SwipeOptions::from_value(&json!({
            "threshold": "far",
            "velocity": 0,
            "falsePositiveThreshold": 25,
            "scroll": "yes",
        }));
        assert_eq!(o.threshold, 40.0);
        assert_eq!(o.velocity, 0.0);
        assert!(!o.velocity_enabled());
        assert_eq!(o.false_positive_threshold, 25.0);
        assert!(o.scroll);
    }

    #[test]
    fn snake_case_key_is_accepted() {
        let o = SwipeOptions::from_value(&json!({ "false_positive_threshold": 12.5 }));
        assert_eq!(o.false_positive_threshold, 12.5);
    }

    #[test]
    fn both_false_positive_spellings_keep_the_rest() {
        let o = SwipeOptions::from_value(&json!({
            "threshold": 10,
            "velocity": 0.5,
            "direction": "up",
            "scroll": false,
            "false_positive_threshold": 5,
            "falsePositiveThreshold": 7,
        }));
        assert_eq!(o.threshold, 10.0);
        assert_eq!(o.velocity, 0.5);
        assert_eq!(o.direction, DirectionSet::only(SwipeDirection::Up));
        assert!(!o.scroll);
        assert_eq!(o.false_positive_threshold, 7.0);
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let o = SwipeOptions::from_value(&json!({ "threshold": 15, "speed": "fast" }));
        assert_eq!(o, SwipeOptions::default().with_threshold(15.0));
    }

    #[test]
    fn direction_forms() {
        use SwipeDirection::*;
        let single = DirectionSet::from_value(&json!("left"));
        assert_eq!(single.iter().collect::<Vec<_>>(), vec![Left]);

        assert_eq!(DirectionSet::from_value(&json!("all")), DirectionSet::all());
        assert_eq!(DirectionSet::from_value(&json!("sideways")), DirectionSet::all());
        assert_eq!(DirectionSet::from_value(&json!(3)), DirectionSet::all());

        let list = DirectionSet::from_value(&json!(["right", "bogus", "up"]));
        assert_eq!(list.iter().collect::<Vec<_>>(), vec![Up, Right]);

        assert!(DirectionSet::from_value(&json!([])).is_empty());
        assert_eq!(DirectionSet::from_value(&json!(["bogus"])), DirectionSet::all());
    }

    #[test]
    fn not_a_table_gives_defaults() {
        assert_eq!(SwipeOptions::from_value(&json!(42)), SwipeOptions::default());
        assert_eq!(SwipeOptions::from_value(&Value::Null), SwipeOptions::default());
    }

    #[test]
    fn loads_from_toml() {
        let o: SwipeOptions = toml::from_str(
            r#"
            direction = ["left", "right"]
            threshold = 60
            scroll = false
            "#,
        )
        .unwrap();
        assert!(o.direction.contains(SwipeDirection::Left));
        assert!(!o.direction.contains(SwipeDirection::Up));
        assert_eq!(o.threshold, 60.0);
        assert_eq!(o.velocity, 1.0);
        assert!(!o.scroll);
    }
}
