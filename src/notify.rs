use std::{path::Path, process::{Command, Stdio}, thread};

use notify_rust::{Notification, Urgency};

use crate::{session::Transition, settings::Mode};

const SOUNDS: [(&str, &str); 3] = [
    ("paplay", "/usr/share/sounds/freedesktop/stereo/complete.oga"),
    ("aplay", "/usr/share/sounds/sound-icons/guitar-11.wav"),
    ("aplay", "/usr/share/sounds/generic.wav"),
];

#[derive(Clone, Copy)]
pub struct Alerts {
    pub desktop: bool,
    pub sound: bool,
}

impl Alerts {
    pub fn announce(&self, transition: &Transition) {
        let (title, body) = message(transition);
        if self.desktop {
            notify(title, &body);
        }
        if self.sound {
            play_sound();
        }
    }
}

fn message(transition: &Transition) -> (&'static str, String) {
    match transition.to {
        Mode::LongBreak => (
            "Long Break Time!",
            format!("{} pomodoros today. Take a longer break.", transition.count),
        ),
        Mode::ShortBreak => (
            "Break Time!",
            format!("{} pomodoros today. Time for a short break.", transition.count),
        ),
        Mode::Focus => (
            "Back to Focus!",
            format!("{} is over. Press Space when you're ready.", transition.from.label()),
        ),
    }
}

fn notify(title: &str, body: &str) {
    let shown = Notification::new()
        .summary(title)
        .body(body)
        .appname(env!("CARGO_PKG_NAME"))
        .icon("alarm-clock")
        .urgency(Urgency::Critical)
        .show();
    if let Err(e) = shown {
        tracing::debug!(error = %e, "desktop notification unavailable");
    }
}

fn play_sound() {
    thread::spawn(|| {
        let Some((cmd, file)) = SOUNDS.iter().find(|(_, file)| Path::new(file).exists()) else {
            return;
        };
        let _ = Command::new(cmd)
            .arg(file)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn();
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_mentions_count_for_breaks() {
        let (title, body) = message(&Transition { from: Mode::Focus, to: Mode::LongBreak, count: 8 });

        assert_eq!(title, "Long Break Time!");
        assert!(body.starts_with("8 pomodoros"));
    }

    #[test]
    fn test_message_for_focus() {
        let (title, body) = message(&Transition { from: Mode::ShortBreak, to: Mode::Focus, count: 1 });

        assert_eq!(title, "Back to Focus!");
        assert!(body.starts_with("Short Break is over"));
    }
}
