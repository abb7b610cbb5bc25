use ratatui::{prelude::*, widgets::*};

use crate::{
    app::{App, SettingsField, View},
    settings::{Mode, format_clock},
    store::Store,
};

pub fn render_ui<S: Store>(f: &mut Frame, app: &App<S>) {
    let settings = app.session.settings();
    f.render_widget(
        Block::default().style(Style::default().bg(settings.background()).fg(settings.primary())),
        f.size(),
    );

    let pct = (settings.scale * 100.0).round().clamp(50.0, 100.0) as u16;
    let area = centered_rect(pct, pct, f.size());
    render_timer(f, app, area);

    match app.view {
        View::Timer => {}
        View::Settings => render_settings(f, app),
        View::Help => render_help(f, app),
    }
}

fn render_timer<S: Store>(f: &mut Frame, app: &App<S>, area: Rect) {
    let session = &app.session;
    let primary = session.settings().primary();

    let sections = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(15),
            Constraint::Length(1), Constraint::Length(1),
            Constraint::Length(3), Constraint::Length(1),
            Constraint::Length(3), Constraint::Length(1),
            Constraint::Length(3), Constraint::Length(1),
            Constraint::Length(2),
            Constraint::Percentage(15),
        ])
        .split(area);

    f.render_widget(
        Paragraph::new(format!("POMODOROS TODAY: {}", session.today_count()))
            .style(Style::default().add_modifier(Modifier::BOLD))
            .alignment(Alignment::Center),
        sections[1],
    );

    let titles: Vec<Line> = Mode::ORDER.iter().map(|m| Line::from(format!(" {} ", m.label()))).collect();
    let selector_width = 45.min(sections[3].width);
    f.render_widget(
        Tabs::new(titles)
            .select(session.mode().position())
            .divider(" ")
            .highlight_style(Style::default().fg(Color::White).bg(primary).add_modifier(Modifier::BOLD))
            .block(Block::default().borders(Borders::ALL).border_type(BorderType::Rounded)),
        centered_width(selector_width, sections[3]),
    );

    f.render_widget(
        Paragraph::new(format_clock(session.countdown().remaining()))
            .style(Style::default().fg(primary).add_modifier(Modifier::BOLD))
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::NONE)),
        sections[5],
    );

    f.render_widget(
        Gauge::default()
            .block(Block::default().borders(Borders::ALL).border_type(BorderType::Rounded))
            .gauge_style(Style::default().fg(primary))
            .label("")
            .ratio(session.countdown().progress_ratio()),
        centered_width(selector_width, sections[7]),
    );

    let action = if session.is_active() { " PAUSE" } else { " START" };
    let controls = vec![
        Line::from(vec![
            span_key("Space", primary), Span::raw(action), Span::raw("  •  "),
            span_key("R", primary), Span::raw(" Reset  •  "),
            span_key("D", primary), Span::raw(" Settings"),
        ]),
        Line::from(vec![
            span_key("1 2 3", primary), Span::raw(" Mode  •  "),
            span_key("H", primary), Span::raw(" Help  •  "),
            span_key("Q", primary), Span::raw(" Quit"),
        ]),
    ];
    f.render_widget(Paragraph::new(controls).alignment(Alignment::Center), sections[9]);
}

fn span_key(text: &str, color: Color) -> Span<'_> {
    Span::styled(text, Style::default().fg(color).add_modifier(Modifier::BOLD))
}

fn render_settings<S: Store>(f: &mut Frame, app: &App<S>) {
    let Some(form) = app.form.as_ref() else {
        return;
    };
    let primary = app.session.settings().primary();
    let area = centered_rect(60, 80, f.size());

    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled("  ↑↓/jk: Navigate  •  Enter: Edit  •  ←→/hl: Adjust  •  s: Save  •  Esc: Cancel",
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC))),
    ];

    for field in SettingsField::ALL {
        let selected = form.field == field;
        let suffix = match field {
            SettingsField::FocusDuration | SettingsField::ShortBreakDuration | SettingsField::LongBreakDuration => " min",
            _ => "",
        };

        lines.push(Line::from(""));
        if selected && form.editing {
            lines.push(Line::from(vec![
                Span::styled("  > ", Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)),
                Span::styled(field.label(), Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)),
            ]));
            lines.push(Line::from(vec![
                Span::raw("    "),
                Span::styled(form.input.as_str(), Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)),
                Span::styled("█", Style::default().fg(Color::Green)),
            ]));
            continue;
        }

        let (prefix, label_style, value_style) = if selected {
            ("  > ", Style::default().fg(primary).add_modifier(Modifier::BOLD),
             Style::default().fg(Color::White).add_modifier(Modifier::BOLD))
        } else {
            ("    ", Style::default().fg(Color::Gray), Style::default().fg(Color::DarkGray))
        };
        let value = match field {
            SettingsField::Scale => format!("{} {}", slider(form.draft.scale), form.value(field)),
            _ => form.value(field) + suffix,
        };
        lines.push(Line::from(vec![Span::styled(prefix, label_style), Span::styled(field.label(), label_style)]));
        lines.push(Line::from(vec![Span::raw("    "), Span::styled(value, value_style)]));
    }

    f.render_widget(Clear, area);
    f.render_widget(
        Paragraph::new(lines)
            .style(Style::default().bg(Color::Black).fg(Color::White))
            .block(Block::default()
                .title(" Settings ")
                .title_alignment(Alignment::Center)
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(primary))),
        area,
    );
}

/// Ten-cell bar for the 0.5..=1.0 scale range.
fn slider(scale: f64) -> String {
    let filled = (((scale - 0.5) / 0.05).round() as usize).min(10);
    format!("[{}{}]", "█".repeat(filled), "░".repeat(10 - filled))
}

fn render_help<S: Store>(f: &mut Frame, app: &App<S>) {
    let primary = app.session.settings().primary();
    let area = centered_rect(60, 70, f.size());

    let help_text = vec![
        Line::from(""),
        Line::from("  Timer:"),
        help_line("Space / Enter", "Start or pause"),
        help_line("R", "Reset current mode"),
        help_line("1 / 2 / 3", "Short break / Focus / Long break"),
        help_line("← → / Tab", "Previous / next mode"),
        Line::from(""),
        Line::from("  Settings:"),
        help_line("D", "Open settings"),
        help_line("S", "Save settings"),
        help_line("Esc", "Discard changes"),
        Line::from(""),
        Line::from("  General:"),
        help_line("H / ?", "Toggle help"),
        help_line("Q / Esc", "Quit"),
        help_line("Ctrl+C", "Force quit"),
        Line::from(""),
        Line::from(Span::styled("  Breaks start on their own; focus waits for you.",
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC))),
    ];

    f.render_widget(Clear, area);
    f.render_widget(
        Paragraph::new(help_text)
            .style(Style::default().bg(Color::Black).fg(Color::White))
            .block(Block::default()
                .title(" Help ")
                .title_alignment(Alignment::Center)
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(primary))),
        area,
    );
}

fn help_line<'a>(key: &'a str, desc: &'a str) -> Line<'a> {
    Line::from(vec![
        Span::raw("    "),
        Span::styled(key, Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
        Span::raw(format!("  {}", desc)),
    ])
}

fn centered_width(width: u16, r: Rect) -> Rect {
    let width = width.min(r.width);
    Rect {
        x: r.x + (r.width - width) / 2,
        width,
        ..r
    }
}

fn centered_rect(w: u16, h: u16, r: Rect) -> Rect {
    let v = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - h) / 2),
            Constraint::Percentage(h),
            Constraint::Percentage((100 - h) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - w) / 2),
            Constraint::Percentage(w),
            Constraint::Percentage((100 - w) / 2),
        ])
        .split(v[1])[1]
}
