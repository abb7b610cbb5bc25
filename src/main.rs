mod app;
mod countdown;
mod notify;
mod progress;
mod session;
mod settings;
mod store;
mod ui;

use clap::Parser;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, SetTitle, disable_raw_mode, enable_raw_mode},
};
use ratatui::prelude::*;
use std::{
    fs::{self, OpenOptions},
    io,
    path::{Path, PathBuf},
    sync::Mutex,
    time::{Duration, Instant},
};
use tracing_subscriber::EnvFilter;

use crate::{
    app::App,
    notify::Alerts,
    session::{IDLE_TITLE, Session},
    settings::{MAX_DURATION_SECS, MINUTE},
    store::{FileStore, Store},
};

// ============================================================================
// Type Aliases & Constants
// ============================================================================

type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;
const TICK_RATE: Duration = Duration::from_millis(50);
const LOG_FILE: &str = "pomo.log";
const LOG_ENV: &str = "POMO_LOG";

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Clone, Debug)]
#[command(author, version, about = "pomo - a terminal Pomodoro timer")]
struct Args {
    /// Focus length, e.g. 25m, 1h, 90s
    #[arg(short, long, value_parser = parse_duration)]
    focus: Option<u64>,
    /// Short break length
    #[arg(short, long, value_parser = parse_duration)]
    short_break: Option<u64>,
    /// Long break length
    #[arg(short, long, value_parser = parse_duration)]
    long_break: Option<u64>,
    /// Focus sessions between long breaks
    #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..))]
    interval: Option<u32>,
    /// Where settings, progress and the log live
    #[arg(long)]
    data_dir: Option<PathBuf>,
    /// Skip desktop notifications when a countdown ends
    #[arg(long)]
    no_notify: bool,
    /// Skip the completion sound
    #[arg(long)]
    no_sound: bool,
}

/// Parses `1h30m`, `25m`, `90s` or a bare number of minutes into seconds.
fn parse_duration(s: &str) -> std::result::Result<u64, String> {
    let s = s.trim().to_lowercase();
    let mut total = 0.0;
    let mut num = String::new();

    for c in s.chars() {
        match c {
            '0'..='9' | '.' => num.push(c),
            'h' => { total += num.parse::<f64>().map_err(|_| "Invalid hours")? * 3600.0; num.clear(); }
            'm' => { total += num.parse::<f64>().map_err(|_| "Invalid minutes")? * 60.0; num.clear(); }
            's' => { total += num.parse::<f64>().map_err(|_| "Invalid seconds")?; num.clear(); }
            _ => return Err("Invalid format".into()),
        }
    }
    if !num.is_empty() {
        total += num.parse::<f64>().map_err(|_| "Invalid minutes")? * MINUTE as f64;
    }

    if total < 1.0 {
        return Err("Duration must be at least 1s".into());
    }
    if total > MAX_DURATION_SECS as f64 {
        return Err("Duration must be at most 24h".into());
    }
    Ok(total.round() as u64)
}

fn init_logging(dir: &Path) {
    let file = fs::create_dir_all(dir)
        .and_then(|_| OpenOptions::new().create(true).append(true).open(dir.join(LOG_FILE)));
    let Ok(file) = file else {
        return;
    };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init();
}

/// CLI overrides go through the regular save path so they persist.
fn apply_overrides<S: Store>(session: &mut Session<S>, args: &Args) {
    let mut settings = session.settings().clone();
    if let Some(f) = args.focus { settings.durations.focus = f; }
    if let Some(s) = args.short_break { settings.durations.short_break = s; }
    if let Some(l) = args.long_break { settings.durations.long_break = l; }
    if let Some(i) = args.interval { settings.long_break_interval = i; }

    if &settings != session.settings() {
        session.save_settings(settings);
    }
}

fn today() -> chrono::NaiveDate {
    chrono::Local::now().date_naive()
}

// ============================================================================
// Main
// ============================================================================

fn main() -> Result<()> {
    let args = Args::parse();
    let data_dir = args.data_dir.clone().unwrap_or_else(store::default_data_dir);
    init_logging(&data_dir);

    let store = FileStore::open(&data_dir);
    tracing::info!(path = %store.path().display(), "store opened");

    let mut session = Session::load(store, today());
    apply_overrides(&mut session, &args);

    let alerts = Alerts { desktop: !args.no_notify, sound: !args.no_sound };
    let mut app = App::new(session, alerts);

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run(&mut terminal, &mut app);
    app.session.shutdown();

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture, SetTitle(IDLE_TITLE))?;
    terminal.show_cursor()?;

    if let Err(e) = &res {
        tracing::error!(error = %e, "terminal loop failed");
    }
    res
}

fn run<S: Store>(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut App<S>) -> Result<()> {
    let mut title = String::new();

    loop {
        app.update(Instant::now(), today());

        let next_title = app.session.title();
        if next_title != title {
            execute!(terminal.backend_mut(), SetTitle(&next_title))?;
            title = next_title;
        }

        terminal.draw(|f| ui::render_ui(f, app))?;

        if event::poll(TICK_RATE)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press && app.handle_input(key, Instant::now()) {
                    return Ok(());
                }
            }
        }
    }
}
