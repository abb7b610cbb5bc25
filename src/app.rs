use std::time::Instant;

use chrono::NaiveDate;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::{
    notify::Alerts,
    session::Session,
    settings::{MAX_DURATION_SECS, MAX_LONG_BREAK_INTERVAL, MINUTE, Mode, Settings, format_mins, parse_hex_color},
    store::Store,
};

#[derive(PartialEq, Clone, Copy, Debug)]
pub enum View {
    Timer,
    Settings,
    Help,
}

#[derive(PartialEq, Clone, Copy, Debug)]
pub enum SettingsField {
    FocusDuration,
    ShortBreakDuration,
    LongBreakDuration,
    LongBreakInterval,
    Background,
    Primary,
    Scale,
}

impl SettingsField {
    pub const ALL: [SettingsField; 7] = [
        Self::FocusDuration,
        Self::ShortBreakDuration,
        Self::LongBreakDuration,
        Self::LongBreakInterval,
        Self::Background,
        Self::Primary,
        Self::Scale,
    ];

    fn index(self) -> usize {
        Self::ALL.iter().position(|f| *f == self).unwrap_or(0)
    }

    fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    fn prev(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::FocusDuration => "Focus",
            Self::ShortBreakDuration => "Short Break",
            Self::LongBreakDuration => "Long Break",
            Self::LongBreakInterval => "Long Break Interval",
            Self::Background => "Background",
            Self::Primary => "Primary",
            Self::Scale => "Scale",
        }
    }

    fn duration_mode(self) -> Option<Mode> {
        match self {
            Self::FocusDuration => Some(Mode::Focus),
            Self::ShortBreakDuration => Some(Mode::ShortBreak),
            Self::LongBreakDuration => Some(Mode::LongBreak),
            _ => None,
        }
    }
}

/// Working copy of the settings while the panel is open. Nothing reaches
/// the session until the draft is saved.
pub struct SettingsForm {
    pub draft: Settings,
    pub field: SettingsField,
    pub editing: bool,
    pub input: String,
}

impl SettingsForm {
    pub fn new(current: &Settings) -> Self {
        Self {
            draft: current.clone(),
            field: SettingsField::FocusDuration,
            editing: false,
            input: String::new(),
        }
    }

    pub fn value(&self, field: SettingsField) -> String {
        match field {
            SettingsField::LongBreakInterval => self.draft.long_break_interval.to_string(),
            SettingsField::Background => self.draft.colors.background.clone(),
            SettingsField::Primary => self.draft.colors.primary.clone(),
            SettingsField::Scale => format!("{}%", (self.draft.scale * 100.0).round() as u32),
            f => f
                .duration_mode()
                .map(|m| format_mins(self.draft.durations.get(m)))
                .unwrap_or_default(),
        }
    }

    fn start_editing(&mut self) {
        if self.field == SettingsField::Scale {
            return;
        }
        self.input = self.value(self.field);
        self.editing = true;
    }

    /// Commits the text input into the draft. Invalid input is dropped and
    /// the previous value stays.
    fn apply_input(&mut self) {
        let input = self.input.trim();
        match self.field {
            SettingsField::LongBreakInterval => {
                if let Ok(n) = input.parse::<u32>() {
                    if (1..=MAX_LONG_BREAK_INTERVAL).contains(&n) {
                        self.draft.long_break_interval = n;
                    }
                }
            }
            SettingsField::Background => {
                if parse_hex_color(input).is_some() {
                    self.draft.colors.background = input.to_owned();
                }
            }
            SettingsField::Primary => {
                if parse_hex_color(input).is_some() {
                    self.draft.colors.primary = input.to_owned();
                }
            }
            SettingsField::Scale => {}
            f => {
                // an untouched field keeps its exact seconds
                if let Some(mode) = f.duration_mode().filter(|_| input != self.value(f)) {
                    if let Some(secs) = parse_minutes(input) {
                        self.draft.durations.set(mode, secs);
                    }
                }
            }
        }
        self.editing = false;
        self.input.clear();
    }

    fn adjust(&mut self, up: bool) {
        match self.field {
            SettingsField::Scale => self.draft.step_scale(up),
            SettingsField::LongBreakInterval => {
                let n = self.draft.long_break_interval;
                self.draft.long_break_interval = if up {
                    (n + 1).min(MAX_LONG_BREAK_INTERVAL)
                } else {
                    n.saturating_sub(1).max(1)
                };
            }
            _ => {}
        }
    }
}

/// Minutes as typed in the form, possibly fractional, rounded to whole
/// seconds. Anything negative or above a day is rejected.
fn parse_minutes(input: &str) -> Option<u64> {
    let mins = input.parse::<f64>().ok()?;
    let secs = (mins * MINUTE as f64).round();
    (secs.is_finite() && (0.0..=MAX_DURATION_SECS as f64).contains(&secs)).then_some(secs as u64)
}

// ============================================================================
// Application State
// ============================================================================

pub struct App<S: Store> {
    pub session: Session<S>,
    pub view: View,
    pub form: Option<SettingsForm>,
    pub alerts: Alerts,
}

impl<S: Store> App<S> {
    pub fn new(session: Session<S>, alerts: Alerts) -> Self {
        Self {
            session,
            view: View::Timer,
            form: None,
            alerts,
        }
    }

    pub fn update(&mut self, now: Instant, today: NaiveDate) {
        if let Some(transition) = self.session.update(now, today) {
            self.alerts.announce(&transition);
        }
    }

    /// Returns true when the user asked to quit.
    pub fn handle_input(&mut self, key: KeyEvent, now: Instant) -> bool {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return true;
        }
        match self.view {
            View::Settings => {
                self.handle_settings_view(key);
                false
            }
            View::Help => {
                if matches!(key.code, KeyCode::Esc | KeyCode::Char('q' | 'h' | '?')) {
                    self.view = View::Timer;
                }
                false
            }
            View::Timer => self.handle_timer_view(key, now),
        }
    }

    fn handle_timer_view(&mut self, key: KeyEvent, now: Instant) -> bool {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Char(' ') | KeyCode::Enter => self.session.toggle(now),
            KeyCode::Char('r') => self.session.reset(),
            KeyCode::Char('1') => self.session.select_mode(Mode::ORDER[0]),
            KeyCode::Char('2') => self.session.select_mode(Mode::ORDER[1]),
            KeyCode::Char('3') => self.session.select_mode(Mode::ORDER[2]),
            KeyCode::Left => self.session.select_mode(self.session.mode().left()),
            KeyCode::Right | KeyCode::Tab => self.session.select_mode(self.session.mode().right()),
            KeyCode::Char('d') | KeyCode::Char(',') => self.open_settings(),
            KeyCode::Char('h') | KeyCode::Char('?') => self.view = View::Help,
            _ => {}
        }
        false
    }

    fn open_settings(&mut self) {
        self.form = Some(SettingsForm::new(self.session.settings()));
        self.view = View::Settings;
    }

    fn close_settings(&mut self) {
        self.form = None;
        self.view = View::Timer;
    }

    fn handle_settings_view(&mut self, key: KeyEvent) {
        let Some(form) = self.form.as_mut() else {
            self.view = View::Timer;
            return;
        };

        if form.editing {
            match key.code {
                KeyCode::Char(c) => form.input.push(c),
                KeyCode::Backspace => {
                    form.input.pop();
                }
                KeyCode::Enter => form.apply_input(),
                KeyCode::Esc => {
                    form.editing = false;
                    form.input.clear();
                }
                _ => {}
            }
            return;
        }

        match key.code {
            KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('c') => self.close_settings(),
            KeyCode::Char('s') => {
                let draft = form.draft.clone();
                self.session.save_settings(draft);
                self.close_settings();
            }
            KeyCode::Down | KeyCode::Char('j') | KeyCode::Tab => form.field = form.field.next(),
            KeyCode::Up | KeyCode::Char('k') | KeyCode::BackTab => form.field = form.field.prev(),
            KeyCode::Enter | KeyCode::Char('e') => form.start_editing(),
            KeyCode::Left | KeyCode::Char('h') | KeyCode::Char('-') => form.adjust(false),
            KeyCode::Right | KeyCode::Char('l') | KeyCode::Char('+') => form.adjust(true),
            _ => {}
        }
    }
}
