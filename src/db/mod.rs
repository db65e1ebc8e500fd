use anyhow::Result;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};
use std::sync::{Arc, Mutex};

pub mod models;
pub use models::{Game, GameStatus, ResultRecord, ResultsSummary};

const SCHEMA_SQL: &str = "
CREATE TABLE IF NOT EXISTS prediction_results (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    game        TEXT NOT NULL,
    predicted   REAL NOT NULL,
    actual      INTEGER NOT NULL,
    correct     INTEGER NOT NULL,
    recorded_at TEXT NOT NULL
);
";

/// Thread-safe SQLite handle (single connection behind a mutex). Writes are
/// serialized by the lock, so concurrent record calls cannot interleave.
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Open (or create) the SQLite database at the given path. Pass
    /// `":memory:"` for an ephemeral database in tests.
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
        let db = Database {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.run_migrations()?;
        Ok(db)
    }

    /// Run schema migrations (idempotent).
    fn run_migrations(&self) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute_batch(SCHEMA_SQL)?;
        Ok(())
    }

    // ── Prediction results ─────────────────────────────────────────────

    /// Insert a graded outcome. `correct` is derived here, at insertion
    /// time: the prediction favored home iff `predicted >= 0.5`, and it was
    /// correct iff that matches `actual == 1`.
    pub fn record_result(&self, game: &str, predicted: f64, actual: i32) -> Result<ResultRecord> {
        let correct = (predicted >= 0.5) == (actual == 1);
        let recorded_at = Utc::now();
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO prediction_results (game, predicted, actual, correct, recorded_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![game, predicted, actual, correct as i32, recorded_at.to_rfc3339()],
        )?;
        let id = conn.last_insert_rowid();
        Ok(ResultRecord {
            id: Some(id),
            game: game.to_string(),
            predicted,
            actual,
            correct,
            recorded_at,
        })
    }

    /// All recorded results in insertion order.
    pub fn list_results(&self) -> Result<Vec<ResultRecord>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT id, game, predicted, actual, correct, recorded_at
             FROM prediction_results ORDER BY id ASC",
        )?;
        let rows = stmt.query_map([], row_to_result)?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    /// Accuracy and count over everything recorded so far. An empty table
    /// yields accuracy 0.0, not a division error.
    pub fn summary(&self) -> Result<ResultsSummary> {
        let conn = self.conn.lock().unwrap();
        let (total, correct): (i64, i64) = conn.query_row(
            "SELECT COUNT(*), COALESCE(SUM(correct), 0) FROM prediction_results",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;
        let accuracy = if total == 0 {
            0.0
        } else {
            correct as f64 / total as f64
        };
        Ok(ResultsSummary {
            accuracy,
            total_predictions: total,
        })
    }

    pub fn result_count(&self) -> Result<i64> {
        let conn = self.conn.lock().unwrap();
        let count = conn.query_row("SELECT COUNT(*) FROM prediction_results", [], |row| {
            row.get(0)
        })?;
        Ok(count)
    }

    /// Seed the demo outcomes shipped with a fresh install so `/results`
    /// has something to show before real games are graded.
    pub fn seed_demo_records(&self) -> Result<()> {
        let demo: [(&str, f64, i32); 3] = [
            ("LAL vs GSW", 0.72, 1),
            ("BOS vs MIA", 0.65, 1),
            ("PHX vs DEN", 0.48, 0),
        ];
        for (game, predicted, actual) in demo {
            self.record_result(game, predicted, actual)?;
        }
        Ok(())
    }
}

fn row_to_result(row: &Row<'_>) -> rusqlite::Result<ResultRecord> {
    let recorded_at: String = row.get(5)?;
    // A timestamp that fails to parse is a corrupt row, not data to repair.
    let recorded_at = DateTime::parse_from_rfc3339(&recorded_at)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|err| {
            rusqlite::Error::FromSqlConversionFailure(5, rusqlite::types::Type::Text, Box::new(err))
        })?;
    Ok(ResultRecord {
        id: Some(row.get(0)?),
        game: row.get(1)?,
        predicted: row.get(2)?,
        actual: row.get(3)?,
        correct: row.get::<_, i32>(4)? != 0,
        recorded_at,
    })
}
