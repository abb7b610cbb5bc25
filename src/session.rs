//! Mode cycling, daily progress and settings on top of the countdown.

use std::time::{Duration, Instant};

use chrono::NaiveDate;

use crate::{
    countdown::Countdown,
    progress::DailyProgress,
    settings::{Mode, Settings},
    store::{self, Store},
};

pub const IDLE_TITLE: &str = "Pomodoro Timer";
pub const TIMES_UP_TITLE: &str = "Time's up! - Pomodoro";
const TIMES_UP_HOLD: Duration = Duration::from_secs(3);

/// A completed countdown and the mode it handed over to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: Mode,
    pub to: Mode,
    pub count: u32,
}

pub struct Session<S: Store> {
    store: S,
    settings: Settings,
    mode: Mode,
    progress: DailyProgress,
    countdown: Countdown,
    times_up_until: Option<Instant>,
}

impl<S: Store> Session<S> {
    /// Restores settings and today's progress; always starts idle in focus.
    pub fn load(store: S, today: NaiveDate) -> Self {
        let settings = store::load_settings(&store);
        let progress = store::load_progress(&store, today);
        let countdown = Countdown::new(settings.durations.get(Mode::Focus));
        Self {
            store,
            settings,
            mode: Mode::Focus,
            progress,
            countdown,
            times_up_until: None,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn countdown(&self) -> &Countdown {
        &self.countdown
    }

    pub fn today_count(&self) -> u32 {
        self.progress.count
    }

    pub fn is_active(&self) -> bool {
        self.countdown.is_active()
    }

    pub fn toggle(&mut self, now: Instant) {
        self.times_up_until = None;
        if self.countdown.is_active() {
            self.countdown.pause();
        } else {
            self.countdown.start(now);
        }
    }

    pub fn reset(&mut self) {
        self.times_up_until = None;
        self.countdown.reset(Some(self.settings.durations.get(self.mode)));
    }

    /// Switches mode by hand. A running countdown is paused first and the
    /// new mode waits for an explicit start.
    pub fn select_mode(&mut self, mode: Mode) {
        self.times_up_until = None;
        if self.countdown.is_active() {
            self.countdown.pause();
        }
        if mode == self.mode {
            return;
        }
        tracing::info!(from = self.mode.id(), to = mode.id(), "mode selected");
        self.mode = mode;
        self.countdown.set_initial(self.settings.durations.get(mode));
    }

    /// Replaces all settings at once. Only a change to the current mode's
    /// duration touches the countdown.
    pub fn save_settings(&mut self, settings: Settings) {
        let settings = settings.sanitized();
        let old = self.settings.durations.get(self.mode);
        let new = settings.durations.get(self.mode);

        self.settings = settings;
        store::save_settings(&mut self.store, &self.settings);
        tracing::info!(mode = self.mode.id(), old, new, "settings saved");

        if new != old {
            self.countdown.set_initial(new);
            self.countdown.reset(None);
        }
    }

    /// Drives the countdown to `now`, handling a completion if one is due.
    /// Also starts a fresh daily count once the date moves on.
    pub fn update(&mut self, now: Instant, today: NaiveDate) -> Option<Transition> {
        let current = self.progress.for_day(today);
        if current != self.progress {
            tracing::info!(date = %today, "new day, daily count reset");
            self.progress = current;
            store::save_progress(&mut self.store, &self.progress);
        }

        let before = self.countdown.remaining();
        let completed = self.countdown.poll(now);
        let ticked = !completed && self.countdown.remaining() != before;
        if ticked || self.times_up_until.is_some_and(|until| now >= until) {
            self.times_up_until = None;
        }
        completed.then(|| self.complete(now, today))
    }

    fn complete(&mut self, now: Instant, today: NaiveDate) -> Transition {
        let from = self.mode;
        let to = match from {
            Mode::Focus => {
                let count = self.progress.record(today);
                store::save_progress(&mut self.store, &self.progress);
                if count % self.settings.long_break_interval.max(1) == 0 {
                    Mode::LongBreak
                } else {
                    Mode::ShortBreak
                }
            }
            Mode::ShortBreak | Mode::LongBreak => Mode::Focus,
        };
        tracing::info!(from = from.id(), to = to.id(), count = self.progress.count, "countdown complete");

        self.mode = to;
        self.countdown.set_initial(self.settings.durations.get(to));
        self.countdown.reset(None);
        if to.is_break() {
            self.countdown.start(now);
        }
        self.times_up_until = Some(now + TIMES_UP_HOLD);

        Transition { from, to, count: self.progress.count }
    }

    /// Cancels the pending tick; nothing fires after this.
    pub fn shutdown(&mut self) {
        self.countdown.pause();
    }

    pub fn title(&self) -> String {
        if self.times_up_until.is_some() {
            return TIMES_UP_TITLE.into();
        }
        if self.countdown.is_active() {
            let secs = self.countdown.remaining();
            format!("{}:{:02} - {}", secs / 60, secs % 60, self.mode.id())
        } else {
            IDLE_TITLE.into()
        }
    }

    #[cfg(test)]
    pub(crate) fn store(&self) -> &S {
        &self.store
    }
}
