//! Game data providers and the fallback chain.
//!
//! Every read goes live first, falls back to the in-process cache, and
//! finally to the static bundled schedule. The tier that actually answered
//! is reported in the response `source` field so clients can judge
//! freshness.

pub mod balldontlie;
pub mod cache;

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::db::{Game, GameStatus};
use crate::error::ApiError;
use crate::teams::{self, Team};

pub use balldontlie::BallDontLie;
pub use cache::GameCache;

/// Which fallback tier produced a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DataSource {
    BalldontlieApi,
    Cache,
    Static,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamInfo {
    pub id: i64,
    pub abbreviation: String,
    pub city: String,
    pub full_name: String,
    pub conference: String,
    pub division: String,
    pub logo_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub id: i64,
    pub full_name: String,
    pub position: String,
    pub jersey_number: Option<String>,
}

/// A live upstream source of NBA data. One implementation talks to
/// BallDontLie; tests substitute an offline stub.
#[async_trait]
pub trait GameProvider: Send + Sync {
    async fn fetch_games(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<Game>>;
    async fn fetch_game(&self, game_id: i64) -> Result<Option<Game>>;
    async fn fetch_teams(&self) -> Result<Vec<TeamInfo>>;
    async fn fetch_roster(&self, team_id: i64) -> Result<Vec<Player>>;
    fn name(&self) -> &str;
}

/// Serves game reads through the live -> cache -> static chain.
#[derive(Clone)]
pub struct GameService {
    live: Arc<dyn GameProvider>,
    cache: GameCache,
    static_games: Arc<Vec<Game>>,
}

impl GameService {
    pub fn new(live: Arc<dyn GameProvider>, static_games: Vec<Game>) -> Self {
        GameService {
            live,
            cache: GameCache::new(),
            static_games: Arc::new(static_games),
        }
    }

    fn today() -> NaiveDate {
        Utc::now().date_naive()
    }

    /// Games from today through `days` ahead.
    pub async fn upcoming_games(&self, days: i64) -> (DataSource, Vec<Game>) {
        let start = Self::today();
        let end = start + Duration::days(days);
        match self.live.fetch_games(start, end).await {
            Ok(games) => {
                self.cache.store(&games).await;
                (DataSource::BalldontlieApi, games)
            }
            Err(err) => {
                warn!(provider = self.live.name(), error = %err, "Live fetch failed, falling back");
                let cached = self.cache.list().await;
                if !cached.is_empty() {
                    (DataSource::Cache, cached)
                } else {
                    (DataSource::Static, self.static_games.as_ref().clone())
                }
            }
        }
    }

    /// Today's games only.
    pub async fn today_games(&self) -> (DataSource, Vec<Game>) {
        let today = Self::today();
        match self.live.fetch_games(today, today).await {
            Ok(games) => {
                self.cache.store(&games).await;
                (DataSource::BalldontlieApi, games)
            }
            Err(err) => {
                warn!(provider = self.live.name(), error = %err, "Live fetch failed, falling back");
                let date = today.format("%Y-%m-%d").to_string();
                let cached = self.cache.list_for_date(&date).await;
                if !cached.is_empty() {
                    (DataSource::Cache, cached)
                } else {
                    let from_static: Vec<Game> = self
                        .static_games
                        .iter()
                        .filter(|g| g.game_date == date)
                        .cloned()
                        .collect();
                    (DataSource::Static, from_static)
                }
            }
        }
    }

    /// Finished games from the last `days` days, most recent first.
    pub async fn past_games(&self, days: i64) -> (DataSource, Vec<Game>) {
        let end = Self::today() - Duration::days(1);
        let start = end - Duration::days(days - 1);
        match self.live.fetch_games(start, end).await {
            Ok(games) => {
                self.cache.store(&games).await;
                let mut finals: Vec<Game> = games
                    .into_iter()
                    .filter(|g| g.status == GameStatus::Final)
                    .collect();
                finals.sort_by(|a, b| b.game_date.cmp(&a.game_date).then(a.id.cmp(&b.id)));
                (DataSource::BalldontlieApi, finals)
            }
            Err(err) => {
                warn!(provider = self.live.name(), error = %err, "Live fetch failed, falling back");
                let mut finals: Vec<Game> = self
                    .cache
                    .list()
                    .await
                    .into_iter()
                    .filter(|g| g.status == GameStatus::Final)
                    .collect();
                finals.sort_by(|a, b| b.game_date.cmp(&a.game_date).then(a.id.cmp(&b.id)));
                (DataSource::Cache, finals)
            }
        }
    }

    /// Look up one game by id through the full chain. Exhausting every tier
    /// is a 404, not a 502: an id no tier knows is treated as nonexistent.
    pub async fn game_by_id(&self, id: i64) -> Result<(DataSource, Game), ApiError> {
        match self.live.fetch_game(id).await {
            Ok(Some(game)) => {
                self.cache.store(std::slice::from_ref(&game)).await;
                return Ok((DataSource::BalldontlieApi, game));
            }
            Ok(None) => {}
            Err(err) => {
                warn!(provider = self.live.name(), error = %err, game_id = id, "Live lookup failed, falling back");
            }
        }
        if let Some(game) = self.cache.get(id).await {
            return Ok((DataSource::Cache, game));
        }
        if let Some(game) = self.static_games.iter().find(|g| g.id == id) {
            return Ok((DataSource::Static, game.clone()));
        }
        Err(ApiError::GameNotFound)
    }

    /// Team directory, falling straight to the built-in registry when the
    /// provider is down (the registry is complete, so no cache tier here).
    pub async fn teams(&self) -> (DataSource, Vec<TeamInfo>) {
        match self.live.fetch_teams().await {
            Ok(mut infos) => {
                for info in &mut infos {
                    if let Some(team) = teams::lookup(&info.abbreviation) {
                        info.logo_url = Some(team.logo_url("L"));
                    }
                }
                (DataSource::BalldontlieApi, infos)
            }
            Err(err) => {
                warn!(provider = self.live.name(), error = %err, "Live fetch failed, using registry");
                (DataSource::Static, registry_teams())
            }
        }
    }

    /// Roster for a registry team. There is no offline tier for player data,
    /// so a provider failure surfaces as an upstream error.
    pub async fn roster(&self, team: &Team) -> Result<Vec<Player>, ApiError> {
        self.live
            .fetch_roster(team.provider_id)
            .await
            .map_err(|err| ApiError::Upstream(err.to_string()))
    }
}

/// The static registry rendered in the provider's team shape.
pub fn registry_teams() -> Vec<TeamInfo> {
    teams::TEAMS
        .iter()
        .map(|t| TeamInfo {
            id: t.provider_id,
            abbreviation: t.abbreviation.to_string(),
            city: t.city.to_string(),
            full_name: t.name.to_string(),
            conference: t.conference.as_str().to_string(),
            division: t.division.as_str().to_string(),
            logo_url: Some(t.logo_url("L")),
        })
        .collect()
}

/// Load the bundled static schedule. Missing or malformed files degrade to
/// an empty schedule with a warning; the service still boots.
pub fn load_static_games(path: &str) -> Vec<Game> {
    match std::fs::read_to_string(path) {
        Ok(raw) => match serde_json::from_str(&raw) {
            Ok(games) => games,
            Err(err) => {
                warn!(path, error = %err, "Static games file is malformed, starting empty");
                Vec::new()
            }
        },
        Err(err) => {
            warn!(path, error = %err, "Static games file not readable, starting empty");
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    struct Offline;

    #[async_trait]
    impl GameProvider for Offline {
        async fn fetch_games(&self, _: NaiveDate, _: NaiveDate) -> Result<Vec<Game>> {
            Err(anyhow!("offline"))
        }
        async fn fetch_game(&self, _: i64) -> Result<Option<Game>> {
            Err(anyhow!("offline"))
        }
        async fn fetch_teams(&self) -> Result<Vec<TeamInfo>> {
            Err(anyhow!("offline"))
        }
        async fn fetch_roster(&self, _: i64) -> Result<Vec<Player>> {
            Err(anyhow!("offline"))
        }
        fn name(&self) -> &str {
            "offline"
        }
    }

    fn static_game(id: i64) -> Game {
        Game {
            id,
            home_team: "LAL".into(),
            home_team_name: "Los Angeles Lakers".into(),
            away_team: "BOS".into(),
            away_team_name: "Boston Celtics".into(),
            game_date: "2025-01-15".into(),
            status: GameStatus::Scheduled,
            home_score: None,
            away_score: None,
        }
    }

    #[tokio::test]
    async fn offline_provider_falls_back_to_static() {
        let svc = GameService::new(Arc::new(Offline), vec![static_game(101)]);
        let (source, games) = svc.upcoming_games(7).await;
        assert_eq!(source, DataSource::Static);
        assert_eq!(games.len(), 1);
    }

    #[tokio::test]
    async fn cache_tier_beats_static_once_populated() {
        let svc = GameService::new(Arc::new(Offline), vec![static_game(101)]);
        svc.cache.store(&[static_game(202)]).await;
        let (source, games) = svc.upcoming_games(7).await;
        assert_eq!(source, DataSource::Cache);
        assert_eq!(games[0].id, 202);
    }

    #[tokio::test]
    async fn unknown_game_id_is_not_found_after_all_tiers() {
        let svc = GameService::new(Arc::new(Offline), vec![static_game(101)]);
        let err = svc.game_by_id(55555).await.unwrap_err();
        assert!(matches!(err, ApiError::GameNotFound));
    }

    #[tokio::test]
    async fn static_tier_answers_id_lookups() {
        let svc = GameService::new(Arc::new(Offline), vec![static_game(101)]);
        let (source, game) = svc.game_by_id(101).await.unwrap();
        assert_eq!(source, DataSource::Static);
        assert_eq!(game.home_team, "LAL");
    }

    #[tokio::test]
    async fn teams_fall_back_to_the_full_registry() {
        let svc = GameService::new(Arc::new(Offline), Vec::new());
        let (source, infos) = svc.teams().await;
        assert_eq!(source, DataSource::Static);
        assert_eq!(infos.len(), 30);
        assert!(infos.iter().any(|t| t.abbreviation == "LAL"));
    }

    #[tokio::test]
    async fn roster_surfaces_upstream_failures() {
        let svc = GameService::new(Arc::new(Offline), Vec::new());
        let team = teams::lookup("LAL").unwrap();
        let err = svc.roster(team).await.unwrap_err();
        assert!(matches!(err, ApiError::Upstream(_)));
    }

    #[test]
    fn data_source_serializes_snake_case() {
        assert_eq!(
            serde_json::to_value(DataSource::BalldontlieApi).unwrap(),
            "balldontlie_api"
        );
        assert_eq!(serde_json::to_value(DataSource::Static).unwrap(), "static");
    }
}
