use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Gauge, Paragraph, Widget, Wrap},
};
use unicode_width::UnicodeWidthStr;

use crate::app::{App, Screen};

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 2;

/// Color choices driven by the persisted dark-mode preference
struct Palette {
    base: Style,
    dim: Style,
    accent: Style,
    good: Style,
    bad: Style,
}

fn palette(dark_mode: bool) -> Palette {
    let bold = Style::default().add_modifier(Modifier::BOLD);
    if dark_mode {
        Palette {
            base: bold.fg(Color::White),
            dim: Style::default().fg(Color::DarkGray),
            accent: bold.fg(Color::LightCyan),
            good: bold.fg(Color::LightGreen),
            bad: bold.fg(Color::LightRed),
        }
    } else {
        Palette {
            base: bold,
            dim: Style::default().add_modifier(Modifier::DIM),
            accent: bold.fg(Color::Cyan),
            good: bold.fg(Color::Green),
            bad: bold.fg(Color::Red),
        }
    }
}

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        match self.screen() {
            Screen::Menu => render_menu(self, area, buf),
            Screen::Active => render_active(self, area, buf),
            Screen::Summary => render_summary(self, area, buf),
        }
    }
}

fn render_menu(app: &App, area: Rect, buf: &mut Buffer) {
    let pal = palette(app.prefs.dark_mode);
    let italic = Style::default().add_modifier(Modifier::ITALIC);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Min(1),
            Constraint::Length(2), // title
            Constraint::Length(2), // modes
            Constraint::Length(2), // lifetime stats
            Constraint::Length(1), // confirmation / padding
            Constraint::Min(1),
            Constraint::Length(1), // legend
        ])
        .split(area);

    let title = Paragraph::new(vec![
        Line::from(Span::styled("MATHFLOW", pal.accent.patch(italic))),
        Line::from(Span::styled("race against yourself", pal.dim)),
    ])
    .alignment(Alignment::Center);
    title.render(chunks[1], buf);

    let modes = Paragraph::new(Line::from(Span::styled(
        "(1) addition   (2) subtraction   (3) multiplication   (4) mixed",
        pal.base,
    )))
    .alignment(Alignment::Center)
    .wrap(Wrap { trim: true });
    modes.render(chunks[2], buf);

    let stats = Paragraph::new(Line::from(vec![
        Span::styled(format!("{}", app.lifetime.high_score), pal.accent),
        Span::styled(" best streak    ", pal.dim),
        Span::styled(format!("{}", app.lifetime.total_solved), pal.accent),
        Span::styled(" solved all time", pal.dim),
    ]))
    .alignment(Alignment::Center);
    stats.render(chunks[3], buf);

    if app.confirm_reset {
        let confirm = Paragraph::new(Span::styled(
            "reset all progress? (y) to confirm, any other key cancels",
            pal.bad,
        ))
        .alignment(Alignment::Center);
        confirm.render(chunks[4], buf);
    }

    let legend = Paragraph::new(Span::styled(
        "(d)ark mode / (r)eset progress / (esc)ape",
        pal.dim.patch(italic),
    ))
    .alignment(Alignment::Center);
    legend.render(chunks[6], buf);
}

fn render_active(app: &App, area: Rect, buf: &mut Buffer) {
    let Some(drill) = app.drill.as_ref() else {
        return;
    };
    let pal = palette(app.prefs.dark_mode);
    let italic = Style::default().add_modifier(Modifier::ITALIC);

    let question = drill
        .problem
        .as_ref()
        .map(|p| p.question.as_str())
        .unwrap_or_default();

    let max_chars_per_line = area.width.saturating_sub(HORIZONTAL_MARGIN * 2);
    let question_lines = if question.width() <= max_chars_per_line as usize {
        1
    } else {
        ((question.width() as f64 / max_chars_per_line as f64).ceil() + 1.0) as u16
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .constraints([
            Constraint::Length(1), // progress bar
            Constraint::Length(1), // header
            Constraint::Min(1),
            Constraint::Length(1),              // problem counter
            Constraint::Length(question_lines), // question
            Constraint::Length(2),              // input
            Constraint::Min(1),
            Constraint::Length(1), // footer
        ])
        .split(area);

    let progress = Gauge::default()
        .gauge_style(pal.accent)
        .ratio(drill.progress().clamp(0.0, 1.0))
        .label("");
    progress.render(chunks[0], buf);

    let header = Paragraph::new(Line::from(vec![
        Span::styled(format!("{} qpm", drill.qpm), pal.accent),
        Span::styled("   ", pal.dim),
        Span::styled(format!("{} streak", drill.combo), pal.base),
    ]))
    .alignment(Alignment::Center);
    header.render(chunks[1], buf);

    let counter = Paragraph::new(Span::styled(
        format!("problem {} / {}", drill.correct_count + 1, drill.target),
        pal.dim,
    ))
    .alignment(Alignment::Center);
    counter.render(chunks[3], buf);

    // Correct flash briefly recolors the question green
    let question_style = if drill.flash.is_active() {
        pal.good
    } else {
        pal.base
    };
    let question_widget = Paragraph::new(Span::styled(question, question_style))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    question_widget.render(chunks[4], buf);

    // Shake recolors the typed digits red until the pulse clears
    let (input_style, marker) = if drill.shake.is_active() {
        (pal.bad, "✗")
    } else {
        (pal.base, "_")
    };
    let input_widget = Paragraph::new(Line::from(vec![
        Span::styled(drill.input.clone(), input_style),
        Span::styled(marker, pal.dim),
    ]))
    .alignment(Alignment::Center);
    input_widget.render(chunks[5], buf);

    let footer = Paragraph::new(Span::styled(
        format!(
            "accuracy {}%   best streak {}   (esc) menu",
            drill.accuracy(),
            app.lifetime.high_score
        ),
        pal.dim.patch(italic),
    ))
    .alignment(Alignment::Center);
    footer.render(chunks[7], buf);
}

fn render_summary(app: &App, area: Rect, buf: &mut Buffer) {
    let Some(drill) = app.drill.as_ref() else {
        return;
    };
    let pal = palette(app.prefs.dark_mode);
    let italic = Style::default().add_modifier(Modifier::ITALIC);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Min(1),
            Constraint::Length(2), // headline
            Constraint::Length(1), // stats
            Constraint::Length(1), // lifetime
            Constraint::Min(1),
            Constraint::Length(1), // legend
        ])
        .split(area);

    let headline = Paragraph::new(vec![
        Line::from(Span::styled("SESSION CLEAR", pal.good.patch(italic))),
        Line::from(Span::styled(drill.mode().to_string(), pal.dim)),
    ])
    .alignment(Alignment::Center);
    headline.render(chunks[1], buf);

    let stats = Paragraph::new(Span::styled(
        format!(
            "{}% acc   {} qpm   {}s   {} final streak",
            drill.accuracy(),
            drill.qpm,
            drill.elapsed_secs(),
            drill.combo
        ),
        pal.base,
    ))
    .alignment(Alignment::Center);
    stats.render(chunks[2], buf);

    let lifetime = Paragraph::new(Span::styled(
        format!(
            "best streak {}   solved all time {}",
            app.lifetime.high_score, app.lifetime.total_solved
        ),
        pal.dim,
    ))
    .alignment(Alignment::Center);
    lifetime.render(chunks[3], buf);

    let legend = Paragraph::new(Span::styled(
        "(r)eplay / (m)enu / (esc)ape",
        pal.dim.patch(italic),
    ))
    .alignment(Alignment::Center);
    legend.render(chunks[5], buf);
}
