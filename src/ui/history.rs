use chrono::{DateTime, Utc};
use keystride::{
    store::{age_label, MistakeFrequency, ResultStore, Statistics, StoreError},
    StoredResult,
};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, Wrap},
    Frame,
};

use crate::{ui::format_mistakes, App};

const RECENT_ROWS: usize = 50;
const RANKED_MISTAKES: usize = 6;

/// Pure presenter for one past session
pub fn present_row(stored: &StoredResult, now: DateTime<Utc>) -> Row<'static> {
    let result = &stored.result;

    let accuracy_color = if result.accuracy >= 98.0 {
        Color::Green
    } else if result.accuracy >= 90.0 {
        Color::Yellow
    } else {
        Color::Red
    };

    Row::new(vec![
        Cell::from(age_label(result.timestamp, now)),
        Cell::from(result.wpm.to_string()).style(Style::default().add_modifier(Modifier::BOLD)),
        Cell::from(result.net_wpm.to_string()),
        Cell::from(format!("{:.1}", result.accuracy))
            .style(Style::default().fg(accuracy_color)),
        Cell::from(format!("{}s", result.time_limit)),
        Cell::from(result.text_mode.to_string()),
    ])
}

fn summary_text(stats: &Statistics) -> String {
    if stats.total_tests == 0 {
        return "No sessions yet. Finish a test to start your history.".to_owned();
    }
    format!(
        "{} tests   {:.1} avg wpm   {} best   {:.1}% avg acc   {:.2} sd   {:.0}s typed",
        stats.total_tests,
        stats.average_wpm,
        stats.best_wpm,
        stats.average_accuracy,
        stats.wpm_std_dev,
        stats.total_time_secs
    )
}

/// Snapshot of the store, taken when the history screen opens
#[derive(Debug, Clone)]
pub struct HistoryData {
    pub stats: Statistics,
    pub recent: Vec<StoredResult>,
    pub ranking: Vec<MistakeFrequency>,
}

impl HistoryData {
    pub fn load(store: &dyn ResultStore) -> Result<Self, StoreError> {
        Ok(Self {
            stats: store.statistics()?,
            recent: store.recent(RECENT_ROWS)?,
            ranking: store.mistake_ranking(RANKED_MISTAKES)?,
        })
    }
}

/// Render the history screen
pub fn render_history(app: &App, f: &mut Frame) {
    let area = f.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(2)
        .constraints([
            Constraint::Length(3), // summary
            Constraint::Min(0),    // recent sessions
            Constraint::Length(3), // mistakes
            Constraint::Length(1), // instructions
        ])
        .split(area);

    let instructions = Paragraph::new("(b/backspace) back  (r) restart  (esc) quit")
        .alignment(Alignment::Center);
    f.render_widget(instructions, chunks[3]);

    let data = match &app.history {
        Some(Ok(data)) => data,
        Some(Err(e)) => {
            let error = Paragraph::new(format!("History unavailable: {e}"))
                .alignment(Alignment::Center)
                .style(Style::default().fg(Color::Red));
            f.render_widget(error, chunks[1]);
            return;
        }
        None => return,
    };

    let summary = Paragraph::new(summary_text(&data.stats))
        .block(Block::default().borders(Borders::ALL).title("History"))
        .style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .alignment(Alignment::Center);
    f.render_widget(summary, chunks[0]);

    let header = Row::new(vec!["When", "WPM", "Net", "Acc %", "Limit", "Mode"]).style(
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
    );

    let now = Utc::now();
    let table_height = chunks[1].height.saturating_sub(3) as usize;
    let rows: Vec<Row> = data
        .recent
        .iter()
        .take(table_height)
        .map(|stored| present_row(stored, now))
        .collect();

    let widths = [
        Constraint::Length(10),
        Constraint::Length(6),
        Constraint::Length(6),
        Constraint::Length(8),
        Constraint::Length(7),
        Constraint::Min(9),
    ];
    let table = Table::new(rows, widths)
        .header(header)
        .block(Block::default().borders(Borders::ALL).title("Recent"))
        .column_spacing(2);
    f.render_widget(table, chunks[1]);

    let mistakes_text = if data.ranking.is_empty() {
        "none recorded".to_owned()
    } else {
        format_mistakes(&data.ranking)
    };
    let mistakes = Paragraph::new(mistakes_text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Frequent mistakes"),
        )
        .style(Style::default().fg(Color::Red))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    f.render_widget(mistakes, chunks[2]);
}
