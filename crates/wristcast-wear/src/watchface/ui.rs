//! Watch face draw step. Pure rendering over the display state; no
//! suspend points.

use chrono::{DateTime, FixedOffset};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Paragraph},
    Frame,
};

use wristcast_protocol::IconBitmap;

use super::state::{DisplayState, Visibility};

/// Fixed icon display size, in pixels (two pixel rows per cell row).
const ICON_PIXELS: u8 = 16;

const INTERACTIVE_BG: Color = Color::Rgb(33, 150, 243);
const DATE_FG: Color = Color::Rgb(187, 222, 251);

pub fn render(f: &mut Frame, state: &DisplayState, now: DateTime<FixedOffset>) {
    let area = f.area();
    match state.visibility {
        Visibility::Invisible => render_off(f, area),
        Visibility::Ambient => render_ambient(f, state, now, area),
        Visibility::Interactive => render_interactive(f, state, now, area),
    }
}

fn render_off(f: &mut Frame, area: Rect) {
    let hint = Paragraph::new(vec![
        Line::from(""),
        Line::from(Span::styled(
            "display off",
            Style::default().fg(Color::DarkGray),
        )),
        Line::from(Span::styled(
            "v wake  q quit",
            Style::default().fg(Color::DarkGray),
        )),
    ])
    .alignment(Alignment::Center);
    f.render_widget(hint, area);
}

fn render_ambient(f: &mut Frame, state: &DisplayState, now: DateTime<FixedOffset>, area: Rect) {
    let bg = Style::default().bg(Color::Black);
    f.render_widget(Block::default().style(bg), area);

    let mut time_style = bg.fg(Color::White);
    if !state.low_color {
        time_style = time_style.add_modifier(Modifier::BOLD);
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(area.height / 3),
            Constraint::Length(1),
            Constraint::Min(0),
        ])
        .split(area);

    let time = Paragraph::new(Line::from(Span::styled(
        now.format("%-H:%M").to_string(),
        time_style,
    )))
    .style(bg)
    .alignment(Alignment::Center);
    f.render_widget(time, chunks[1]);
}

fn render_interactive(f: &mut Frame, state: &DisplayState, now: DateTime<FixedOffset>, area: Rect) {
    let bg = Style::default().bg(INTERACTIVE_BG);
    f.render_widget(Block::default().style(bg), area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(area.height / 5),
            Constraint::Length(1), // time
            Constraint::Length(1), // date
            Constraint::Length(1),
            Constraint::Length(ICON_PIXELS as u16 / 2), // icon
            Constraint::Length(1),                      // temperatures
            Constraint::Min(0),
        ])
        .split(area);

    let time = Paragraph::new(Line::from(Span::styled(
        now.format("%-H:%M:%S").to_string(),
        bg.fg(Color::White).add_modifier(Modifier::BOLD),
    )))
    .style(bg)
    .alignment(Alignment::Center);
    f.render_widget(time, chunks[1]);

    let date = Paragraph::new(Line::from(Span::styled(
        now.format("%a, %b %d %Y").to_string(),
        bg.fg(DATE_FG),
    )))
    .style(bg)
    .alignment(Alignment::Center);
    f.render_widget(date, chunks[2]);

    // Weather block renders only once an icon is cached, as in the
    // source face.
    if let Some(icon) = &state.icon {
        let lines: Vec<Line> = icon_lines(icon)
            .into_iter()
            .map(|l| Line::from(Span::styled(l, bg.fg(Color::White))))
            .collect();
        let icon_widget = Paragraph::new(lines).style(bg).alignment(Alignment::Center);
        f.render_widget(icon_widget, chunks[4]);

        if let (Some(high), Some(low)) = (state.high, state.low) {
            let temps = Paragraph::new(Line::from(vec![
                Span::styled(
                    format_temp(high),
                    bg.fg(Color::White).add_modifier(Modifier::BOLD),
                ),
                Span::styled("  ", bg),
                Span::styled(format_temp(low), bg.fg(DATE_FG)),
            ]))
            .style(bg)
            .alignment(Alignment::Center);
            f.render_widget(temps, chunks[5]);
        }
    }
}

/// Whole degrees, truncated toward zero as the source face displayed
/// them.
fn format_temp(value: f64) -> String {
    format!("{}º", value as i64)
}

/// Rasterize an icon into half-block character rows at the fixed
/// display size.
fn icon_lines(icon: &IconBitmap) -> Vec<String> {
    let scaled = match icon.scaled(ICON_PIXELS, ICON_PIXELS) {
        Ok(scaled) => scaled,
        Err(_) => return Vec::new(),
    };
    let mut lines = Vec::with_capacity(ICON_PIXELS as usize / 2);
    for y in (0..ICON_PIXELS).step_by(2) {
        let mut line = String::new();
        for x in 0..ICON_PIXELS {
            let top = scaled.pixel(x, y);
            let bottom = scaled.pixel(x, y + 1);
            line.push(match (top, bottom) {
                (true, true) => '█',
                (true, false) => '▀',
                (false, true) => '▄',
                (false, false) => ' ',
            });
        }
        lines.push(line);
    }
    lines
}
