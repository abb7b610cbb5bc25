//! One-second countdown with a single cancellable schedule.
//!
//! The engine never reads the clock itself; callers pass the current
//! [`Instant`] so the main loop and the tests drive it the same way.

use std::time::{Duration, Instant};

pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug, Clone)]
pub struct Countdown {
    initial: u64,
    remaining: u64,
    active: bool,
    next_tick: Option<Instant>,
}

impl Countdown {
    pub fn new(initial: u64) -> Self {
        Self {
            initial,
            remaining: initial,
            active: false,
            next_tick: None,
        }
    }

    pub fn remaining(&self) -> u64 {
        self.remaining
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn progress_ratio(&self) -> f64 {
        if self.initial == 0 {
            return 0.0;
        }
        (1.0 - self.remaining as f64 / self.initial as f64).clamp(0.0, 1.0)
    }

    /// Cannot start at zero. Starting while already running keeps the
    /// existing schedule.
    pub fn start(&mut self, now: Instant) {
        if self.remaining == 0 || self.active {
            return;
        }
        self.active = true;
        self.next_tick = Some(now + TICK_INTERVAL);
    }

    pub fn pause(&mut self) {
        self.active = false;
        self.next_tick = None;
    }

    pub fn reset(&mut self, duration: Option<u64>) {
        self.pause();
        self.remaining = duration.unwrap_or(self.initial);
    }

    /// Re-arms with a new initial duration, keeping the active flag. A zero
    /// duration leaves nothing to count, so the countdown stops.
    pub fn set_initial(&mut self, duration: u64) {
        self.initial = duration;
        self.remaining = duration;
        if duration == 0 {
            self.pause();
        }
    }

    /// Advances by one second. Returns true exactly once, on the tick that
    /// reaches zero.
    pub fn tick(&mut self) -> bool {
        if !self.active {
            return false;
        }
        if self.remaining <= 1 {
            self.remaining = 0;
            self.pause();
            return true;
        }
        self.remaining -= 1;
        false
    }

    /// Runs every tick that is due at `now`. Returns true if the countdown
    /// completed during this poll.
    pub fn poll(&mut self, now: Instant) -> bool {
        while let Some(due) = self.next_tick {
            if due > now {
                break;
            }
            self.next_tick = Some(due + TICK_INTERVAL);
            if self.tick() {
                return true;
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secs(n: u64) -> Duration {
        Duration::from_secs(n)
    }

    #[test]
    fn test_reset_with_duration_is_inactive() {
        let now = Instant::now();
        for d in [0, 1, 59, 1500] {
            let mut countdown = Countdown::new(300);
            countdown.start(now);
            countdown.reset(Some(d));

            assert_eq!(countdown.remaining(), d);
            assert!(!countdown.is_active());
        }
    }

    #[test]
    fn test_reset_without_duration_uses_initial() {
        let now = Instant::now();
        let mut countdown = Countdown::new(120);
        countdown.start(now);
        countdown.poll(now + secs(30));
        countdown.reset(None);

        assert_eq!(countdown.remaining(), 120);
        assert!(!countdown.is_active());
    }

    #[test]
    fn test_cannot_start_at_zero() {
        let mut countdown = Countdown::new(0);
        countdown.start(Instant::now());

        assert!(!countdown.is_active());
    }

    #[test]
    fn test_ticks_down_and_completes_once() {
        let start = Instant::now();
        let s = 5;
        let mut countdown = Countdown::new(s);
        countdown.start(start);

        let mut completions = 0;
        for n in 1..=8u64 {
            if countdown.tick() {
                completions += 1;
                assert_eq!(n, s);
            }
            assert_eq!(countdown.remaining(), s.saturating_sub(n));
            assert_eq!(countdown.is_active(), n < s);
        }
        assert_eq!(completions, 1);
    }

    #[test]
    fn test_poll_fires_once_per_elapsed_second() {
        let start = Instant::now();
        let mut countdown = Countdown::new(10);
        countdown.start(start);

        assert!(!countdown.poll(start + Duration::from_millis(999)));
        assert_eq!(countdown.remaining(), 10);

        assert!(!countdown.poll(start + secs(1)));
        assert_eq!(countdown.remaining(), 9);

        // a slow frame catches up on every missed second
        assert!(!countdown.poll(start + Duration::from_millis(4500)));
        assert_eq!(countdown.remaining(), 6);
    }

    #[test]
    fn test_poll_stops_at_completion() {
        let start = Instant::now();
        let mut countdown = Countdown::new(3);
        countdown.start(start);

        assert!(countdown.poll(start + secs(60)));
        assert_eq!(countdown.remaining(), 0);
        assert!(!countdown.is_active());
        assert!(!countdown.poll(start + secs(120)));
    }

    #[test]
    fn test_pause_cancels_pending_ticks() {
        let start = Instant::now();
        let mut countdown = Countdown::new(10);
        countdown.start(start);
        countdown.pause();
        countdown.pause();

        assert!(!countdown.poll(start + secs(5)));
        assert_eq!(countdown.remaining(), 10);
    }

    #[test]
    fn test_restart_schedules_from_resume_time() {
        let start = Instant::now();
        let mut countdown = Countdown::new(10);
        countdown.start(start);
        countdown.poll(start + secs(2));
        countdown.pause();

        let resumed = start + secs(100);
        countdown.start(resumed);
        countdown.poll(resumed + Duration::from_millis(500));
        assert_eq!(countdown.remaining(), 8);
        countdown.poll(resumed + secs(1));
        assert_eq!(countdown.remaining(), 7);
    }

    #[test]
    fn test_start_while_active_keeps_schedule() {
        let start = Instant::now();
        let mut countdown = Countdown::new(10);
        countdown.start(start);
        countdown.start(start + Duration::from_millis(900));

        countdown.poll(start + secs(1));
        assert_eq!(countdown.remaining(), 9);
    }

    #[test]
    fn test_set_initial_rearms_regardless_of_state() {
        let start = Instant::now();
        let mut countdown = Countdown::new(10);
        countdown.start(start);
        countdown.poll(start + secs(3));

        countdown.set_initial(600);
        assert_eq!(countdown.remaining(), 600);
        assert!(countdown.is_active());
        countdown.reset(None);
        assert_eq!(countdown.remaining(), 600);
        countdown.start(start);

        countdown.set_initial(0);
        assert!(!countdown.is_active());
        assert!(!countdown.poll(start + secs(10)));
    }

    #[test]
    fn test_progress_ratio() {
        let start = Instant::now();
        let mut countdown = Countdown::new(4);
        assert_eq!(countdown.progress_ratio(), 0.0);

        countdown.start(start);
        countdown.poll(start + secs(2));
        assert_eq!(countdown.progress_ratio(), 0.5);

        assert_eq!(Countdown::new(0).progress_ratio(), 0.0);
    }
}
