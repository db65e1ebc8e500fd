//! In-process game cache.
//!
//! Holds the last successfully fetched games so the API can keep answering
//! when the upstream provider goes down. Entries are upserted by game id and
//! never expire; a restart starts cold.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::db::Game;

#[derive(Clone, Default)]
pub struct GameCache {
    inner: Arc<RwLock<HashMap<i64, Game>>>,
}

impl GameCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Upsert a batch of games keyed by id.
    pub async fn store(&self, games: &[Game]) {
        let mut inner = self.inner.write().await;
        for game in games {
            inner.insert(game.id, game.clone());
        }
    }

    pub async fn get(&self, id: i64) -> Option<Game> {
        self.inner.read().await.get(&id).cloned()
    }

    /// All cached games ordered by date, then id for a stable layout.
    pub async fn list(&self) -> Vec<Game> {
        let inner = self.inner.read().await;
        let mut games: Vec<Game> = inner.values().cloned().collect();
        games.sort_by(|a, b| a.game_date.cmp(&b.game_date).then(a.id.cmp(&b.id)));
        games
    }

    pub async fn list_for_date(&self, date: &str) -> Vec<Game> {
        self.list()
            .await
            .into_iter()
            .filter(|g| g.game_date == date)
            .collect()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::GameStatus;

    fn game(id: i64, date: &str) -> Game {
        Game {
            id,
            home_team: "LAL".into(),
            home_team_name: "Los Angeles Lakers".into(),
            away_team: "BOS".into(),
            away_team_name: "Boston Celtics".into(),
            game_date: date.into(),
            status: GameStatus::Scheduled,
            home_score: None,
            away_score: None,
        }
    }

    #[tokio::test]
    async fn store_upserts_by_id() {
        let cache = GameCache::new();
        cache.store(&[game(1, "2025-01-10")]).await;
        cache.store(&[game(1, "2025-01-11")]).await;
        assert_eq!(cache.len().await, 1);
        assert_eq!(cache.get(1).await.unwrap().game_date, "2025-01-11");
    }

    #[tokio::test]
    async fn list_orders_by_date_then_id() {
        let cache = GameCache::new();
        cache
            .store(&[game(3, "2025-01-12"), game(1, "2025-01-10"), game(2, "2025-01-10")])
            .await;
        let ids: Vec<i64> = cache.list().await.iter().map(|g| g.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn list_for_date_filters() {
        let cache = GameCache::new();
        cache.store(&[game(1, "2025-01-10"), game(2, "2025-01-11")]).await;
        let hits = cache.list_for_date("2025-01-11").await;
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, 2);
    }
}
