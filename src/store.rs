use std::path::{Path, PathBuf};

use chrono::{DateTime, SecondsFormat, Utc};
use itertools::Itertools;
use log::{debug, warn};
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::app_dirs::AppDirs;
use crate::corpus::TextMode;
use crate::result::{SessionResult, StoredResult};
use crate::util::{mean, std_dev};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("unable to encode result: {0}")]
    Json(#[from] serde_json::Error),
    #[error("csv export failed: {0}")]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Roll-up across every stored session
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    pub total_tests: usize,
    pub average_wpm: f64,
    pub best_wpm: u32,
    pub average_accuracy: f64,
    pub total_time_secs: f64,
    pub wpm_std_dev: f64,
}

/// How often one expected/typed pair went wrong
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MistakeFrequency {
    pub expected: Option<char>,
    pub typed: Option<char>,
    pub count: usize,
}

#[derive(Serialize)]
struct CsvRow<'a> {
    id: i64,
    timestamp: String,
    wpm: u32,
    net_wpm: u32,
    accuracy: f64,
    mistakes: usize,
    time_elapsed: f64,
    time_limit: u32,
    text_mode: TextMode,
    preview: &'a str,
}

/// Persistence for finished sessions. The engine only calls `save`; the
/// rest serves the history views.
pub trait ResultStore {
    fn save(&mut self, result: SessionResult) -> Result<StoredResult, StoreError>;

    /// Every result, oldest first
    fn all(&self) -> Result<Vec<StoredResult>, StoreError>;

    fn clear(&mut self) -> Result<(), StoreError>;

    /// Newest first
    fn recent(&self, limit: usize) -> Result<Vec<StoredResult>, StoreError> {
        Ok(self
            .all()?
            .into_iter()
            .sorted_by(|a, b| {
                b.result
                    .timestamp
                    .cmp(&a.result.timestamp)
                    .then(b.id.cmp(&a.id))
            })
            .take(limit)
            .collect())
    }

    fn statistics(&self) -> Result<Statistics, StoreError> {
        Ok(summarize(&self.all()?))
    }

    fn mistake_ranking(&self, limit: usize) -> Result<Vec<MistakeFrequency>, StoreError> {
        Ok(rank_mistakes(&self.all()?, limit))
    }

    fn export_csv(&self, path: &Path) -> Result<usize, StoreError> {
        let results = self.all()?;
        let mut writer = csv::Writer::from_path(path)?;
        for stored in &results {
            let r = &stored.result;
            writer.serialize(CsvRow {
                id: stored.id,
                timestamp: r.timestamp.to_rfc3339(),
                wpm: r.wpm,
                net_wpm: r.net_wpm,
                accuracy: r.accuracy,
                mistakes: r.mistakes,
                time_elapsed: r.time_elapsed,
                time_limit: r.time_limit,
                text_mode: r.text_mode,
                preview: &r.test_text_preview,
            })?;
        }
        writer.flush()?;
        Ok(results.len())
    }
}

pub fn summarize(results: &[StoredResult]) -> Statistics {
    if results.is_empty() {
        return Statistics::default();
    }

    let wpms: Vec<f64> = results.iter().map(|r| r.result.wpm as f64).collect();
    let accuracies: Vec<f64> = results.iter().map(|r| r.result.accuracy).collect();

    Statistics {
        total_tests: results.len(),
        average_wpm: mean(&wpms).unwrap_or(0.0),
        best_wpm: results.iter().map(|r| r.result.wpm).max().unwrap_or(0),
        average_accuracy: mean(&accuracies).unwrap_or(0.0),
        total_time_secs: results.iter().map(|r| r.result.time_elapsed).sum(),
        wpm_std_dev: std_dev(&wpms).unwrap_or(0.0),
    }
}

pub fn rank_mistakes(results: &[StoredResult], limit: usize) -> Vec<MistakeFrequency> {
    results
        .iter()
        .flat_map(|r| r.result.mistake_details.iter())
        .map(|m| (m.expected, m.typed))
        .counts()
        .into_iter()
        .map(|((expected, typed), count)| MistakeFrequency {
            expected,
            typed,
            count,
        })
        .sorted_by(|a, b| {
            b.count
                .cmp(&a.count)
                .then(a.expected.cmp(&b.expected))
                .then(a.typed.cmp(&b.typed))
        })
        .take(limit)
        .collect()
}

/// Keeps results for the lifetime of the process
#[derive(Debug, Default)]
pub struct MemoryResultStore {
    results: Vec<StoredResult>,
    next_id: i64,
}

impl MemoryResultStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ResultStore for MemoryResultStore {
    fn save(&mut self, result: SessionResult) -> Result<StoredResult, StoreError> {
        self.next_id += 1;
        let stored = StoredResult {
            id: self.next_id,
            result,
        };
        self.results.push(stored.clone());
        Ok(stored)
    }

    fn all(&self) -> Result<Vec<StoredResult>, StoreError> {
        Ok(self.results.clone())
    }

    fn clear(&mut self) -> Result<(), StoreError> {
        self.results.clear();
        Ok(())
    }
}

/// SQLite backed history. Each row keeps the full result as JSON; the
/// timestamp column only serves ordering.
#[derive(Debug)]
pub struct SqliteResultStore {
    conn: Connection,
}

impl SqliteResultStore {
    /// Opens the store under the user's state directory
    pub fn open_default() -> Result<Self, StoreError> {
        let path = AppDirs::db_path().unwrap_or_else(|| PathBuf::from("keystride_results.db"));
        Self::open(path)
    }

    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)?;
        }
        debug!("opening result store at {}", path.as_ref().display());
        Self::with_connection(Connection::open(path)?)
    }

    pub fn in_memory() -> Result<Self, StoreError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, StoreError> {
        conn.execute(
            r#"
            CREATE TABLE IF NOT EXISTS results (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                timestamp TEXT NOT NULL,
                payload TEXT NOT NULL
            )
            "#,
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_results_timestamp ON results(timestamp)",
            [],
        )?;

        Ok(Self { conn })
    }

    /// Rows whose payload no longer decodes are logged and skipped
    fn query<P: rusqlite::Params>(
        &self,
        sql: &str,
        args: P,
    ) -> Result<Vec<StoredResult>, StoreError> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map(args, |row| {
            Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut results = Vec::new();
        for row in rows {
            let (id, payload) = row?;
            match serde_json::from_str::<SessionResult>(&payload) {
                Ok(result) => results.push(StoredResult { id, result }),
                Err(e) => warn!("skipping unreadable result row {id}: {e}"),
            }
        }

        Ok(results)
    }
}

/// Fixed width, so text order matches time order
fn timestamp_key(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

impl ResultStore for SqliteResultStore {
    fn save(&mut self, result: SessionResult) -> Result<StoredResult, StoreError> {
        let payload = serde_json::to_string(&result)?;
        self.conn.execute(
            "INSERT INTO results (timestamp, payload) VALUES (?1, ?2)",
            params![timestamp_key(result.timestamp), payload],
        )?;

        Ok(StoredResult {
            id: self.conn.last_insert_rowid(),
            result,
        })
    }

    fn all(&self) -> Result<Vec<StoredResult>, StoreError> {
        self.query("SELECT id, payload FROM results ORDER BY id", params![])
    }

    fn recent(&self, limit: usize) -> Result<Vec<StoredResult>, StoreError> {
        self.query(
            "SELECT id, payload FROM results ORDER BY timestamp DESC, id DESC LIMIT ?1",
            params![i64::try_from(limit).unwrap_or(i64::MAX)],
        )
    }

    fn clear(&mut self) -> Result<(), StoreError> {
        self.conn.execute("DELETE FROM results", [])?;
        Ok(())
    }
}

/// Relative age of `timestamp`, e.g. "just now" or "3m ago"
pub fn age_label(timestamp: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let secs = (now - timestamp).num_seconds().max(0);
    match secs {
        0..=59 => "just now".to_string(),
        60..=3599 => format!("{}m ago", secs / 60),
        3600..=86_399 => format!("{}h ago", secs / 3600),
        _ => format!("{}d ago", secs / 86_400),
    }
}
