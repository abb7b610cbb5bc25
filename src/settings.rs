use ratatui::style::Color;
use serde::{Deserialize, Serialize};

pub const MINUTE: u64 = 60;
pub const MAX_DURATION_SECS: u64 = 24 * 60 * MINUTE;
pub const SCALE_MIN: f64 = 0.5;
pub const SCALE_MAX: f64 = 1.0;
pub const SCALE_STEP: f64 = 0.05;
pub const MAX_LONG_BREAK_INTERVAL: u32 = 12;

// ============================================================================
// Mode
// ============================================================================

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum Mode {
    Focus,
    ShortBreak,
    LongBreak,
}

impl Mode {
    /// Selector order, left to right.
    pub const ORDER: [Mode; 3] = [Mode::ShortBreak, Mode::Focus, Mode::LongBreak];

    pub fn id(&self) -> &'static str {
        match self {
            Self::Focus => "focus",
            Self::ShortBreak => "shortBreak",
            Self::LongBreak => "longBreak",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Focus => "Focus",
            Self::ShortBreak => "Short Break",
            Self::LongBreak => "Long Break",
        }
    }

    pub fn is_break(&self) -> bool {
        *self != Self::Focus
    }

    pub fn position(&self) -> usize {
        Self::ORDER.iter().position(|m| m == self).unwrap_or(1)
    }

    pub fn left(self) -> Self {
        let idx = self.position();
        Self::ORDER[(idx + Self::ORDER.len() - 1) % Self::ORDER.len()]
    }

    pub fn right(self) -> Self {
        Self::ORDER[(self.position() + 1) % Self::ORDER.len()]
    }
}

// ============================================================================
// Settings
// ============================================================================

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Durations {
    pub focus: u64,
    pub short_break: u64,
    pub long_break: u64,
}

impl Durations {
    pub fn get(&self, mode: Mode) -> u64 {
        match mode {
            Mode::Focus => self.focus,
            Mode::ShortBreak => self.short_break,
            Mode::LongBreak => self.long_break,
        }
    }

    pub fn set(&mut self, mode: Mode, secs: u64) {
        match mode {
            Mode::Focus => self.focus = secs,
            Mode::ShortBreak => self.short_break = secs,
            Mode::LongBreak => self.long_break = secs,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Colors {
    pub background: String,
    pub primary: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub durations: Durations,
    pub colors: Colors,
    pub long_break_interval: u32,
    #[serde(default = "default_scale")]
    pub scale: f64,
}

fn default_scale() -> f64 {
    1.0
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            durations: Durations {
                focus: 25 * MINUTE,
                short_break: 5 * MINUTE,
                long_break: 15 * MINUTE,
            },
            colors: Colors {
                background: "#FDF0E9".into(),
                primary: "#E85B5B".into(),
            },
            long_break_interval: 4,
            scale: default_scale(),
        }
    }
}

impl Settings {
    /// Brings hand-edited or legacy values back inside the supported ranges.
    pub fn sanitized(mut self) -> Self {
        self.long_break_interval = self.long_break_interval.max(1);
        self.scale = if self.scale.is_finite() {
            self.scale.clamp(SCALE_MIN, SCALE_MAX)
        } else {
            default_scale()
        };
        self
    }

    pub fn background(&self) -> Color {
        parse_hex_color(&self.colors.background).unwrap_or(Color::Reset)
    }

    pub fn primary(&self) -> Color {
        parse_hex_color(&self.colors.primary).unwrap_or(Color::LightRed)
    }

    /// Moves the scale slider one step, staying on the 0.05 grid.
    pub fn step_scale(&mut self, up: bool) {
        let steps = (self.scale / SCALE_STEP).round();
        let next = if up { steps + 1.0 } else { steps - 1.0 };
        self.scale = (next * SCALE_STEP).clamp(SCALE_MIN, SCALE_MAX);
    }
}

/// Parses `#RRGGBB` (or `#RGB`) into a terminal colour.
pub fn parse_hex_color(s: &str) -> Option<Color> {
    let hex = s.trim().strip_prefix('#')?;
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    match hex.len() {
        6 => {
            let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
            let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
            let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
            Some(Color::Rgb(r, g, b))
        }
        3 => {
            let digit = |i: usize| u8::from_str_radix(&hex[i..=i], 16).ok().map(|v| v * 17);
            Some(Color::Rgb(digit(0)?, digit(1)?, digit(2)?))
        }
        _ => None,
    }
}

pub fn format_clock(secs: u64) -> String {
    format!("{:02}:{:02}", secs / MINUTE, secs % MINUTE)
}

pub fn format_mins(secs: u64) -> String {
    if secs % MINUTE == 0 {
        format!("{}", secs / MINUTE)
    } else {
        format!("{:.2}", secs as f64 / MINUTE as f64)
    }
}
