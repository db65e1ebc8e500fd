//! BallDontLie API client.
//!
//! Free-tier REST API for NBA schedules, teams and rosters. Responses are
//! parsed leniently: a malformed entry is skipped rather than failing the
//! whole batch, since partial data still serves the fallback chain well.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use crate::db::{Game, GameStatus};

use super::{GameProvider, Player, TeamInfo};

pub const DEFAULT_BASE_URL: &str = "https://api.balldontlie.io/v1";

pub struct BallDontLie {
    http: Client,
    api_key: Option<String>,
    base_url: String,
}

impl BallDontLie {
    pub fn new(
        api_key: Option<&str>,
        base_url: Option<&str>,
        timeout: Duration,
    ) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(BallDontLie {
            http,
            api_key: api_key.map(str::to_string),
            base_url: base_url.unwrap_or(DEFAULT_BASE_URL).trim_end_matches('/').to_string(),
        })
    }

    async fn get_json(&self, url: &str) -> Result<Value> {
        let mut req = self.http.get(url);
        if let Some(key) = &self.api_key {
            req = req.header("Authorization", key);
        }
        let resp = req.send().await.context("Request failed")?;
        let status = resp.status();
        if !status.is_success() {
            anyhow::bail!("Upstream returned {}", status);
        }
        resp.json().await.context("Invalid JSON from upstream")
    }
}

/// Map the provider's free-form status strings onto our three states.
fn status_from_str(s: &str) -> GameStatus {
    let lower = s.to_ascii_lowercase();
    if lower.contains("final") {
        GameStatus::Final
    } else if lower.contains("qtr") || lower.contains("halftime") || lower.contains("ot") {
        GameStatus::InProgress
    } else {
        // scheduled games carry an ISO start timestamp as their status
        GameStatus::Scheduled
    }
}

fn parse_game(entry: &Value) -> Option<Game> {
    let id = entry["id"].as_i64()?;
    let home = &entry["home_team"];
    let away = &entry["visitor_team"];
    let status = status_from_str(entry["status"].as_str().unwrap_or(""));
    let date = entry["date"].as_str()?;
    let (home_score, away_score) = if status == GameStatus::Scheduled {
        (None, None)
    } else {
        (
            entry["home_team_score"].as_i64().map(|s| s as i32),
            entry["visitor_team_score"].as_i64().map(|s| s as i32),
        )
    };
    Some(Game {
        id,
        home_team: home["abbreviation"].as_str()?.to_string(),
        home_team_name: home["full_name"].as_str()?.to_string(),
        away_team: away["abbreviation"].as_str()?.to_string(),
        away_team_name: away["full_name"].as_str()?.to_string(),
        game_date: date.chars().take(10).collect(),
        status,
        home_score,
        away_score,
    })
}

fn parse_team(entry: &Value) -> Option<TeamInfo> {
    Some(TeamInfo {
        id: entry["id"].as_i64()?,
        abbreviation: entry["abbreviation"].as_str()?.to_string(),
        city: entry["city"].as_str().unwrap_or("").to_string(),
        full_name: entry["full_name"].as_str()?.to_string(),
        conference: entry["conference"].as_str().unwrap_or("").to_string(),
        division: entry["division"].as_str().unwrap_or("").to_string(),
        logo_url: None,
    })
}

fn parse_player(entry: &Value) -> Option<Player> {
    let first = entry["first_name"].as_str()?;
    let last = entry["last_name"].as_str()?;
    Some(Player {
        id: entry["id"].as_i64()?,
        full_name: format!("{} {}", first, last),
        position: entry["position"].as_str().unwrap_or("").to_string(),
        jersey_number: entry["jersey_number"].as_str().map(str::to_string),
    })
}

#[async_trait]
impl GameProvider for BallDontLie {
    async fn fetch_games(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<Game>> {
        let url = format!(
            "{}/games?start_date={}&end_date={}&per_page=100",
            self.base_url, start, end
        );
        let body = self.get_json(&url).await?;
        let data = body["data"].as_array().context("Missing data array")?;
        let games: Vec<Game> = data.iter().filter_map(parse_game).collect();
        debug!(count = games.len(), "Fetched games from BallDontLie");
        Ok(games)
    }

    async fn fetch_game(&self, game_id: i64) -> Result<Option<Game>> {
        let url = format!("{}/games/{}", self.base_url, game_id);
        let mut req = self.http.get(&url);
        if let Some(key) = &self.api_key {
            req = req.header("Authorization", key);
        }
        let resp = req.send().await.context("Request failed")?;
        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !resp.status().is_success() {
            anyhow::bail!("Upstream returned {}", resp.status());
        }
        let body: Value = resp.json().await.context("Invalid JSON from upstream")?;
        Ok(parse_game(&body["data"]))
    }

    async fn fetch_teams(&self) -> Result<Vec<TeamInfo>> {
        let url = format!("{}/teams", self.base_url);
        let body = self.get_json(&url).await?;
        let data = body["data"].as_array().context("Missing data array")?;
        Ok(data.iter().filter_map(parse_team).collect())
    }

    async fn fetch_roster(&self, team_id: i64) -> Result<Vec<Player>> {
        let url = format!(
            "{}/players?team_ids[]={}&per_page=50",
            self.base_url, team_id
        );
        let body = self.get_json(&url).await?;
        let data = body["data"].as_array().context("Missing data array")?;
        Ok(data.iter().filter_map(parse_player).collect())
    }

    fn name(&self) -> &str {
        "balldontlie"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn status_strings_map_to_game_states() {
        assert_eq!(status_from_str("Final"), GameStatus::Final);
        assert_eq!(status_from_str("Final/OT"), GameStatus::Final);
        assert_eq!(status_from_str("3rd Qtr"), GameStatus::InProgress);
        assert_eq!(status_from_str("Halftime"), GameStatus::InProgress);
        assert_eq!(status_from_str("2024-11-02T00:00:00Z"), GameStatus::Scheduled);
        assert_eq!(status_from_str(""), GameStatus::Scheduled);
    }

    #[test]
    fn parses_a_finished_game() {
        let entry = json!({
            "id": 1234,
            "date": "2025-01-15T00:00:00.000Z",
            "status": "Final",
            "home_team": {"abbreviation": "LAL", "full_name": "Los Angeles Lakers"},
            "visitor_team": {"abbreviation": "BOS", "full_name": "Boston Celtics"},
            "home_team_score": 112,
            "visitor_team_score": 104
        });
        let game = parse_game(&entry).unwrap();
        assert_eq!(game.id, 1234);
        assert_eq!(game.game_date, "2025-01-15");
        assert_eq!(game.status, GameStatus::Final);
        assert_eq!(game.home_score, Some(112));
        assert_eq!(game.winner(), Some("LAL"));
    }

    #[test]
    fn scheduled_games_carry_no_scores() {
        let entry = json!({
            "id": 99,
            "date": "2025-02-01",
            "status": "2025-02-01T19:30:00Z",
            "home_team": {"abbreviation": "PHX", "full_name": "Phoenix Suns"},
            "visitor_team": {"abbreviation": "DEN", "full_name": "Denver Nuggets"},
            "home_team_score": 0,
            "visitor_team_score": 0
        });
        let game = parse_game(&entry).unwrap();
        assert_eq!(game.status, GameStatus::Scheduled);
        assert_eq!(game.home_score, None);
        assert_eq!(game.away_score, None);
    }

    #[test]
    fn malformed_entries_are_skipped() {
        assert!(parse_game(&json!({"id": "not-a-number"})).is_none());
        assert!(parse_game(&json!({})).is_none());
    }
}
