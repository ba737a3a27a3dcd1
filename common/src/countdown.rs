use chrono::{DateTime, Utc};
use log::debug;
use serde::{Deserialize, Serialize};

const UNITS: [(&str, &str, i64); 4] = [
    ("day", "days", 86_400_000),
    ("hour", "hours", 3_600_000),
    ("minute", "minutes", 60_000),
    ("second", "seconds", 1_000),
];

/// Something the countdown can write its text into, looked up by element id.
pub trait TextSurface {
    fn text_mut(&mut self, id: &str) -> Option<&mut String>;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CountdownFormat {
    pub expired_message: String,
    pub suffix: String,
    pub pluralize: bool,
}

impl Default for CountdownFormat {
    fn default() -> Self {
        Self {
            expired_message: "Time's up!".to_string(),
            suffix: "left".to_string(),
            pluralize: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Tick {
    Running(String),
    Expired,
}

/// Formats a non-negative remaining duration. Leading zero units are dropped,
/// seconds are always shown, so anything under a second reads "0 seconds".
pub fn format_remaining(millis: i64, format: &CountdownFormat) -> String {
    let millis = millis.max(0);
    let mut parts = Vec::with_capacity(UNITS.len());
    for (i, (singular, plural, unit)) in UNITS.iter().enumerate() {
        let value = if i == 0 {
            millis / unit
        } else {
            (millis / unit) % (UNITS[i - 1].2 / unit)
        };
        let last = i == UNITS.len() - 1;
        if parts.is_empty() && value == 0 && !last {
            continue;
        }
        let label = if format.pluralize && value == 1 {
            singular
        } else {
            plural
        };
        parts.push(format!("{value} {label}"));
    }

    let mut text = parts.join(" ");
    if !format.suffix.is_empty() {
        text.push(' ');
        text.push_str(&format.suffix);
    }
    text
}

/// One countdown tick: writes the time left until `target` into the `element`
/// slot of `surface`, or the expired message and a call to `on_expired` once
/// `target` is strictly in the past. A missing slot is skipped.
pub fn countdown<S>(
    surface: &mut S,
    element: &str,
    target: DateTime<Utc>,
    now: DateTime<Utc>,
    format: &CountdownFormat,
    on_expired: impl FnOnce(),
) -> Tick
where
    S: TextSurface + ?Sized,
{
    let difference = target.signed_duration_since(now).num_milliseconds();

    let tick = if difference < 0 {
        Tick::Expired
    } else {
        Tick::Running(format_remaining(difference, format))
    };

    match surface.text_mut(element) {
        Some(slot) => {
            slot.clear();
            match &tick {
                Tick::Running(text) => slot.push_str(text),
                Tick::Expired => slot.push_str(&format.expired_message),
            }
        }
        None => debug!("countdown target #{element} not present, skipping"),
    }

    if tick == Tick::Expired {
        on_expired();
    }
    tick
}
