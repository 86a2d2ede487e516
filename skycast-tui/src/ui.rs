//! Pure rendering of the view state. Everything here is a function of
//! [`AppState`]; no IO, no mutation.

use chrono::Local;
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use skycast_core::WeatherSnapshot;

use crate::app::{AppState, FetchState};

const SPINNER_FRAMES: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

pub fn draw(frame: &mut Frame, state: &AppState) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(frame.area());

    draw_header(frame, rows[0], state);

    match state.fetch_state() {
        FetchState::Pending => draw_pending(frame, rows[1], state),
        FetchState::Error(message) => draw_error(frame, rows[1], message),
        FetchState::Success(snapshot) => draw_dashboard(frame, rows[1], snapshot),
    }

    draw_footer(frame, rows[2], state);
}

fn draw_header(frame: &mut Frame, area: Rect, state: &AppState) {
    let block = Block::default().borders(Borders::ALL).title(" Skycast ");

    let line = if let Some(input) = state.search_input() {
        Line::from(vec![
            Span::styled("Search: ", Style::default().fg(Color::Blue)),
            Span::raw(input.to_string()),
            Span::styled("▏", Style::default().add_modifier(Modifier::SLOW_BLINK)),
        ])
    } else {
        let location = match state.fetch_state() {
            FetchState::Success(snapshot) => snapshot.location_label(),
            _ => state.target().to_string(),
        };
        Line::from(vec![
            Span::styled(location, Style::default().add_modifier(Modifier::BOLD)),
            Span::styled(
                format!("  {}", Local::now().format("%A, %B %-d")),
                Style::default().fg(Color::DarkGray),
            ),
        ])
    };

    frame.render_widget(Paragraph::new(line).block(block), area);
}

fn draw_pending(frame: &mut Frame, area: Rect, state: &AppState) {
    let spinner = SPINNER_FRAMES[state.spinner_frame() % SPINNER_FRAMES.len()];
    let text = vec![
        Line::default(),
        Line::from(Span::styled(spinner, Style::default().fg(Color::Blue))),
        Line::from(Span::styled(
            "Loading weather data...",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    frame.render_widget(Paragraph::new(text).alignment(Alignment::Center), area);
}

fn draw_error(frame: &mut Frame, area: Rect, message: &str) {
    let text = vec![
        Line::default(),
        Line::from(Span::styled(
            capitalize(message),
            Style::default().fg(Color::Red),
        )),
        Line::default(),
        Line::from(Span::styled(
            "r retry   / search another city",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    frame.render_widget(Paragraph::new(text).alignment(Alignment::Center), area);
}

fn draw_dashboard(frame: &mut Frame, area: Rect, snapshot: &WeatherSnapshot) {
    let has_sun = snapshot.sunrise.is_some() && snapshot.sunset.is_some();

    let mut constraints = vec![Constraint::Length(6), Constraint::Length(4), Constraint::Length(3)];
    if has_sun {
        constraints.push(Constraint::Length(3));
    }
    constraints.push(Constraint::Min(0));

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area);

    draw_hero(frame, rows[0], snapshot);
    draw_stats(frame, rows[1], snapshot);
    draw_range(frame, rows[2], snapshot);
    if has_sun {
        draw_sun(frame, rows[3], snapshot);
    }
}

fn draw_hero(frame: &mut Frame, area: Rect, snapshot: &WeatherSnapshot) {
    let text = vec![
        Line::from(vec![
            Span::styled(
                format!("{}  ", snapshot.condition.glyph()),
                Style::default().fg(Color::Yellow),
            ),
            Span::styled(
                format_temp(snapshot.temperature_c),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::raw("   "),
            Span::raw(capitalize(&snapshot.description)),
        ]),
        Line::from(Span::styled(
            format!("Feels like {}", format_temp(snapshot.feels_like_c)),
            Style::default().fg(Color::DarkGray),
        )),
        Line::from(Span::styled(
            Local::now().format("%-I:%M %p, %B %-d, %Y").to_string(),
            Style::default().fg(Color::DarkGray),
        )),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" {} ", snapshot.condition.label()));

    frame.render_widget(Paragraph::new(text).block(block), area);
}

fn draw_stats(frame: &mut Frame, area: Rect, snapshot: &WeatherSnapshot) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Ratio(1, 5),
            Constraint::Ratio(1, 5),
            Constraint::Ratio(1, 5),
            Constraint::Ratio(1, 5),
            Constraint::Ratio(1, 5),
        ])
        .split(area);

    draw_stat(frame, columns[0], "Humidity", format!("{}%", snapshot.humidity_pct));
    draw_stat(frame, columns[1], "Wind", format_wind(snapshot.wind_speed_mps));
    draw_stat(frame, columns[2], "Pressure", format!("{} hPa", snapshot.pressure_hpa));
    draw_stat(frame, columns[3], "Visibility", format_visibility(snapshot.visibility_m));
    draw_stat(frame, columns[4], "Clouds", format_pct(snapshot.cloud_cover_pct));
}

fn draw_stat(frame: &mut Frame, area: Rect, title: &str, value: String) {
    let block = Block::default().borders(Borders::ALL).title(format!(" {title} "));
    let line = Line::from(Span::styled(value, Style::default().add_modifier(Modifier::BOLD)));

    frame.render_widget(
        Paragraph::new(line).alignment(Alignment::Center).block(block),
        area,
    );
}

fn draw_range(frame: &mut Frame, area: Rect, snapshot: &WeatherSnapshot) {
    let block = Block::default().borders(Borders::ALL).title(" Temperature range ");
    let line = Line::from(vec![
        Span::raw("High "),
        Span::styled(
            format_temp(snapshot.temp_max_c),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw("    Low "),
        Span::styled(
            format_temp(snapshot.temp_min_c),
            Style::default().add_modifier(Modifier::BOLD),
        ),
    ]);

    frame.render_widget(Paragraph::new(line).block(block), area);
}

fn draw_sun(frame: &mut Frame, area: Rect, snapshot: &WeatherSnapshot) {
    // Guarded by the caller; both timestamps are present here.
    let (Some(sunrise), Some(sunset)) = (snapshot.sunrise, snapshot.sunset) else {
        return;
    };

    let block = Block::default().borders(Borders::ALL).title(" Sun ");
    let line = Line::from(vec![
        Span::raw("Sunrise "),
        Span::styled(
            sunrise.with_timezone(&Local).format("%H:%M").to_string(),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw("    Sunset "),
        Span::styled(
            sunset.with_timezone(&Local).format("%H:%M").to_string(),
            Style::default().add_modifier(Modifier::BOLD),
        ),
    ]);

    frame.render_widget(Paragraph::new(line).block(block), area);
}

fn draw_footer(frame: &mut Frame, area: Rect, state: &AppState) {
    let hints = if state.search_input().is_some() {
        "Enter submit   Esc cancel"
    } else {
        "/ search   r refresh   q quit"
    };

    frame.render_widget(
        Paragraph::new(Span::styled(hints, Style::default().fg(Color::DarkGray))),
        area,
    );
}

/// Temperature rounded to the nearest integer, e.g. "22°".
fn format_temp(celsius: f64) -> String {
    format!("{}°", celsius.round() as i64)
}

/// Wind speed with one decimal, e.g. "4.1 m/s".
fn format_wind(mps: f64) -> String {
    format!("{mps:.1} m/s")
}

/// Visibility in kilometers with one decimal; blank when the upstream omits it.
fn format_visibility(meters: Option<u32>) -> String {
    match meters {
        Some(m) => format!("{:.1} km", f64::from(m) / 1000.0),
        None => String::new(),
    }
}

fn format_pct(value: Option<u8>) -> String {
    match value {
        Some(v) => format!("{v}%"),
        None => String::new(),
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
