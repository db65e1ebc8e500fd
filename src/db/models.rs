use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A scheduled, live or finished NBA game as served by the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Game {
    /// Provider game id, also used for `/predict/{game_id}` lookups.
    pub id: i64,
    pub home_team: String,
    pub home_team_name: String,
    pub away_team: String,
    pub away_team_name: String,
    /// Calendar date, YYYY-MM-DD.
    pub game_date: String,
    pub status: GameStatus,
    /// Present once the game has started.
    pub home_score: Option<i32>,
    pub away_score: Option<i32>,
}

impl Game {
    /// Winner abbreviation for a finished game; `None` while in progress or
    /// when scores are absent.
    pub fn winner(&self) -> Option<&str> {
        if self.status != GameStatus::Final {
            return None;
        }
        match (self.home_score, self.away_score) {
            (Some(h), Some(a)) if h > a => Some(&self.home_team),
            (Some(h), Some(a)) if a > h => Some(&self.away_team),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameStatus {
    Scheduled,
    InProgress,
    Final,
}

/// A graded prediction outcome, one row per recorded game.
///
/// `correct` is computed once at insertion time from the predicted
/// probability and the actual outcome and never recomputed, so historical
/// accuracy is stable even if the grading rule ever changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultRecord {
    pub id: Option<i64>,
    /// Matchup label, e.g. "LAL vs GSW".
    pub game: String,
    /// Predicted home-win probability at the time of the call.
    pub predicted: f64,
    /// Actual outcome: 1 for a home win, 0 otherwise.
    pub actual: i32,
    pub correct: bool,
    pub recorded_at: DateTime<Utc>,
}

/// Aggregate over all recorded results.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ResultsSummary {
    /// Fraction of correct predictions; 0.0 when nothing is recorded yet.
    pub accuracy: f64,
    pub total_predictions: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn game(status: GameStatus, home: Option<i32>, away: Option<i32>) -> Game {
        Game {
            id: 1,
            home_team: "LAL".into(),
            home_team_name: "Los Angeles Lakers".into(),
            away_team: "BOS".into(),
            away_team_name: "Boston Celtics".into(),
            game_date: "2025-01-15".into(),
            status,
            home_score: home,
            away_score: away,
        }
    }

    #[test]
    fn winner_requires_a_final_game_with_scores() {
        assert_eq!(game(GameStatus::Final, Some(110), Some(102)).winner(), Some("LAL"));
        assert_eq!(game(GameStatus::Final, Some(99), Some(104)).winner(), Some("BOS"));
        assert_eq!(game(GameStatus::InProgress, Some(50), Some(44)).winner(), None);
        assert_eq!(game(GameStatus::Final, None, None).winner(), None);
    }

    #[test]
    fn game_status_serializes_snake_case() {
        let g = game(GameStatus::InProgress, Some(50), Some(44));
        let v = serde_json::to_value(&g).unwrap();
        assert_eq!(v["status"], "in_progress");
    }
}
