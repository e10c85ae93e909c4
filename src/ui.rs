pub mod charting;
pub mod history;
pub mod screen;

use keystride::{
    store::MistakeFrequency, CharacterState, EndReason, Mistake, SessionResult, SessionState,
};
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Axis, Chart, Dataset, GraphType, Paragraph, Widget, Wrap},
    Frame,
};
use unicode_width::UnicodeWidthStr;

use crate::App;

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 2;
const MAX_LISTED_MISTAKES: usize = 8;

pub fn draw(app: &App, f: &mut Frame) {
    screen::current_screen(app.screen).render(app, f);
}

fn bold_style() -> Style {
    Style::default().add_modifier(Modifier::BOLD)
}

fn dim_bold_style() -> Style {
    bold_style().add_modifier(Modifier::DIM)
}

/// How a char is drawn when it has to stay visible
pub fn display_char(c: Option<char>) -> String {
    match c {
        Some(' ') => "·".to_owned(),
        Some(c) => c.to_string(),
        None => "∅".to_owned(),
    }
}

pub fn format_mistake(mistake: &Mistake) -> String {
    format!(
        "{}→{}",
        display_char(mistake.expected),
        display_char(mistake.typed)
    )
}

pub fn format_mistakes(ranking: &[MistakeFrequency]) -> String {
    ranking
        .iter()
        .map(|m| {
            format!(
                "{}→{} ×{}",
                display_char(m.expected),
                display_char(m.typed),
                m.count
            )
        })
        .collect::<Vec<_>>()
        .join("   ")
}

/// One span per prompt char, styled by its live state
fn prompt_spans(target: &[char], typed: &[char], states: &[CharacterState]) -> Vec<Span<'static>> {
    let green_bold_style = bold_style().fg(Color::Green);
    let red_bold_style = bold_style().fg(Color::Red);
    let underlined_dim_bold_style = dim_bold_style().add_modifier(Modifier::UNDERLINED);

    states
        .iter()
        .enumerate()
        .map(|(idx, state)| {
            let expected = target.get(idx).copied();
            let typed = typed.get(idx).copied();
            match state {
                CharacterState::Correct => Span::styled(display_char(expected), green_bold_style),
                CharacterState::Incorrect | CharacterState::Extra => {
                    Span::styled(display_char(typed), red_bold_style)
                }
                CharacterState::Missed => Span::styled(
                    display_char(expected),
                    red_bold_style.add_modifier(Modifier::DIM),
                ),
                CharacterState::Current => Span::styled(
                    expected.map(String::from).unwrap_or_default(),
                    underlined_dim_bold_style,
                ),
                CharacterState::Pending => Span::styled(
                    expected.map(String::from).unwrap_or_default(),
                    dim_bold_style(),
                ),
            }
        })
        .collect()
}

fn status_line(app: &App) -> String {
    let session = &app.session;
    let stats = session.live_stats();

    match session.state() {
        SessionState::Idle => "press tab to start".to_owned(),
        SessionState::Paused => format!(
            "{:.1}   paused, type or ctrl+p to resume",
            session.remaining_secs()
        ),
        SessionState::Running if session.is_counting_down() => "get ready...".to_owned(),
        _ => format!(
            "{:.1}   {} wpm   {}% acc   {:.0}%",
            session.remaining_secs(),
            stats.wpm,
            stats.accuracy,
            stats.progress_percent
        ),
    }
}

fn render_typing(app: &App, area: Rect, buf: &mut Buffer) {
    let session = &app.session;
    let prompt = session.target_text();
    let max_chars_per_line = area.width.saturating_sub(HORIZONTAL_MARGIN * 2).max(1);

    let prompt_occupied_lines = if prompt.width() <= max_chars_per_line as usize {
        1
    } else {
        ((prompt.width() as f64 / max_chars_per_line as f64).ceil() + 1.0) as u16
    };
    let padding = area.height.saturating_sub(prompt_occupied_lines) / 2;

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .constraints([
            Constraint::Length(padding.saturating_sub(2)),
            Constraint::Length(2),
            Constraint::Length(prompt_occupied_lines),
            Constraint::Length(padding),
        ])
        .split(area);

    let typed: Vec<char> = session.typed_text().chars().collect();
    let spans = prompt_spans(session.target(), &typed, &session.character_states());

    Paragraph::new(Line::from(spans))
        .alignment(if prompt_occupied_lines == 1 {
            // short prompts read better centered
            Alignment::Center
        } else {
            Alignment::Left
        })
        .wrap(Wrap { trim: true })
        .render(chunks[2], buf);

    Paragraph::new(Span::styled(status_line(app), dim_bold_style()))
        .alignment(Alignment::Center)
        .render(chunks[1], buf);
}

fn summary_line(result: &SessionResult, reason: Option<EndReason>) -> String {
    let mut line = format!(
        "{} wpm   {} net   {}% acc   {} mistakes   {:.1}s",
        result.wpm, result.net_wpm, result.accuracy, result.mistakes, result.time_elapsed
    );
    if reason == Some(EndReason::Time) {
        line.push_str("   time's up");
    }
    line
}

fn mistakes_line(result: &SessionResult) -> String {
    if result.mistake_details.is_empty() {
        return "no mistakes".to_owned();
    }
    let listed = result
        .mistake_details
        .iter()
        .take(MAX_LISTED_MISTAKES)
        .map(format_mistake)
        .collect::<Vec<_>>()
        .join("  ");
    let hidden = result.mistake_details.len().saturating_sub(MAX_LISTED_MISTAKES);
    if hidden > 0 {
        format!("{listed}  (+{hidden} more)")
    } else {
        listed
    }
}

fn render_results(app: &App, area: Rect, buf: &mut Buffer) {
    let session = &app.session;
    let Some(result) = session.result() else {
        return;
    };
    let bold_style = bold_style();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(HORIZONTAL_MARGIN)
        .vertical_margin(VERTICAL_MARGIN)
        .constraints([
            Constraint::Min(1),    // chart
            Constraint::Length(1), // stats
            Constraint::Length(1), // mistakes
            Constraint::Length(1), // padding
            Constraint::Length(1), // legend
        ])
        .split(area);

    let (overall_duration, highest_wpm) =
        charting::compute_chart_params(session.wpm_series(), result.time_elapsed);

    let tuples: Vec<(f64, f64)> = session
        .wpm_samples()
        .iter()
        .copied()
        .map(Into::into)
        .collect();
    let datasets = vec![Dataset::default()
        .marker(ratatui::symbols::Marker::Braille)
        .style(Style::default().fg(Color::Magenta))
        .graph_type(GraphType::Line)
        .data(&tuples)];

    Chart::new(datasets)
        .x_axis(
            Axis::default()
                .title("seconds")
                .bounds([1.0, overall_duration])
                .labels(vec![
                    Span::styled("1", bold_style),
                    Span::styled(charting::format_label(overall_duration), bold_style),
                ]),
        )
        .y_axis(
            Axis::default()
                .title("wpm")
                .bounds([0.0, highest_wpm])
                .labels(vec![
                    Span::styled("0", bold_style),
                    Span::styled(charting::format_label(highest_wpm), bold_style),
                ]),
        )
        .render(chunks[0], buf);

    Paragraph::new(Span::styled(
        summary_line(result, session.end_reason()),
        bold_style,
    ))
    .alignment(Alignment::Center)
    .render(chunks[1], buf);

    Paragraph::new(Span::styled(
        mistakes_line(result),
        Style::default().fg(Color::Red),
    ))
    .alignment(Alignment::Center)
    .render(chunks[2], buf);

    Paragraph::new(Span::styled(
        "(r)estart / (a)gain / (h)istory / (esc)ape",
        Style::default().add_modifier(Modifier::ITALIC),
    ))
    .render(chunks[4], buf);
}

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if self.session.state() == SessionState::Complete {
            render_results(self, area, buf);
        } else {
            render_typing(self, area, buf);
        }
    }
}

#[cfg(test)]
pub(crate) fn rendered_text(buffer: &Buffer) -> String {
    buffer
        .content()
        .iter()
        .map(|c| c.symbol())
        .collect::<String>()
}
