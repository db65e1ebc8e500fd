//! HTTP surface: route table, shared state, request handlers.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::db::{Database, Game, ResultRecord};
use crate::error::ApiError;
use crate::model::{Prediction, PredictionEngine};
use crate::provider::{DataSource, GameService, Player, TeamInfo};
use crate::teams;

#[derive(Clone)]
pub struct AppState {
    pub engine: PredictionEngine,
    pub games: GameService,
    pub db: Database,
    pub api_key_configured: bool,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/games", get(upcoming_games))
        .route("/games/today", get(today_games))
        .route("/games/past", get(past_games))
        .route("/games/:game_id", get(game_by_id))
        .route("/predict/:game_id", post(predict_game))
        .route("/predict/teams/:home/:away", get(predict_matchup))
        .route("/results", get(list_results).post(record_result))
        .route("/teams", get(list_teams))
        .route("/teams/:abbr/roster", get(team_roster))
        .layer(CorsLayer::permissive())
        .with_state(Arc::new(state))
}

// ── Responses ──────────────────────────────────────────────────────────

#[derive(Serialize)]
struct GamesResponse {
    source: DataSource,
    count: usize,
    games: Vec<Game>,
}

#[derive(Serialize)]
struct GameDetailResponse {
    source: DataSource,
    #[serde(flatten)]
    game: Game,
}

#[derive(Serialize)]
struct PastGame {
    #[serde(flatten)]
    game: Game,
    winner: Option<String>,
}

#[derive(Serialize)]
struct PastGamesResponse {
    source: DataSource,
    count: usize,
    games: Vec<PastGame>,
}

#[derive(Serialize)]
struct TeamsResponse {
    source: DataSource,
    count: usize,
    teams: Vec<TeamInfo>,
}

#[derive(Serialize)]
struct RosterResponse {
    team: String,
    count: usize,
    players: Vec<Player>,
}

#[derive(Serialize)]
struct ResultsResponse {
    accuracy: f64,
    total_predictions: i64,
    records: Vec<ResultRecord>,
}

// ── Handlers ───────────────────────────────────────────────────────────

async fn root(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "message": "NBA Game Outcome Predictor",
        "model_loaded": state.engine.is_loaded(),
        "api_key_configured": state.api_key_configured,
        "endpoints": {
            "games": "/games?days=N",
            "games_today": "/games/today",
            "games_past": "/games/past?days=N",
            "game": "/games/{game_id}",
            "predict_game": "POST /predict/{game_id}",
            "predict_matchup": "/predict/teams/{home}/{away}",
            "results": "/results",
            "teams": "/teams",
            "roster": "/teams/{abbr}/roster",
        },
    }))
}

#[derive(Deserialize)]
struct GamesQuery {
    days: Option<i64>,
}

impl GamesQuery {
    fn days_or(&self, default: i64) -> Result<i64, ApiError> {
        let days = self.days.unwrap_or(default);
        if !(1..=365).contains(&days) {
            return Err(ApiError::InvalidInput(format!(
                "days must be between 1 and 365, got {}",
                days
            )));
        }
        Ok(days)
    }
}

async fn upcoming_games(
    State(state): State<Arc<AppState>>,
    Query(query): Query<GamesQuery>,
) -> Result<Json<GamesResponse>, ApiError> {
    let days = query.days_or(7)?;
    let (source, games) = state.games.upcoming_games(days).await;
    Ok(Json(GamesResponse {
        source,
        count: games.len(),
        games,
    }))
}

async fn today_games(State(state): State<Arc<AppState>>) -> Json<GamesResponse> {
    let (source, games) = state.games.today_games().await;
    Json(GamesResponse {
        source,
        count: games.len(),
        games,
    })
}

async fn past_games(
    State(state): State<Arc<AppState>>,
    Query(query): Query<GamesQuery>,
) -> Result<Json<PastGamesResponse>, ApiError> {
    let days = query.days_or(7)?;
    let (source, games) = state.games.past_games(days).await;
    let games: Vec<PastGame> = games
        .into_iter()
        .map(|game| PastGame {
            winner: game.winner().map(str::to_string),
            game,
        })
        .collect();
    Ok(Json(PastGamesResponse {
        source,
        count: games.len(),
        games,
    }))
}

async fn game_by_id(
    State(state): State<Arc<AppState>>,
    Path(game_id): Path<i64>,
) -> Result<Json<GameDetailResponse>, ApiError> {
    let (source, game) = state.games.game_by_id(game_id).await?;
    Ok(Json(GameDetailResponse { source, game }))
}

/// Predict a scheduled game by id. The model precondition is checked before
/// the game lookup so an unconfigured deployment reports 500 consistently
/// instead of leaking 404s for ids it never looked at.
async fn predict_game(
    State(state): State<Arc<AppState>>,
    Path(game_id): Path<i64>,
) -> Result<Json<Prediction>, ApiError> {
    if !state.engine.is_loaded() {
        return Err(ApiError::ModelUnavailable);
    }
    let (_, game) = state.games.game_by_id(game_id).await?;
    let prediction = state
        .engine
        .predict(game.id, &game.home_team, &game.away_team)?;
    info!(
        game_id,
        winner = %prediction.predicted_winner,
        p_home = prediction.home_win_probability,
        "Predicted game"
    );
    Ok(Json(prediction))
}

/// Predict an ad-hoc matchup. Both abbreviations must be registry teams;
/// validation happens before any model work so unknown codes are a clean
/// 400 regardless of model state below the precondition check. Any pair of
/// valid teams is accepted, scheduled or not, including a team against
/// itself.
async fn predict_matchup(
    State(state): State<Arc<AppState>>,
    Path((home, away)): Path<(String, String)>,
) -> Result<Json<Prediction>, ApiError> {
    if !state.engine.is_loaded() {
        return Err(ApiError::ModelUnavailable);
    }
    let home = teams::lookup(&home)
        .ok_or_else(|| ApiError::TeamNotFound(home.trim().to_ascii_uppercase()))?;
    let away = teams::lookup(&away)
        .ok_or_else(|| ApiError::TeamNotFound(away.trim().to_ascii_uppercase()))?;
    let prediction = state
        .engine
        .predict(0, home.abbreviation, away.abbreviation)?;
    Ok(Json(prediction))
}

async fn list_results(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ResultsResponse>, ApiError> {
    let summary = state
        .db
        .summary()
        .map_err(|err| ApiError::InvalidInput(err.to_string()))?;
    let records = state
        .db
        .list_results()
        .map_err(|err| ApiError::InvalidInput(err.to_string()))?;
    Ok(Json(ResultsResponse {
        accuracy: summary.accuracy,
        total_predictions: summary.total_predictions,
        records,
    }))
}

#[derive(Deserialize)]
struct RecordRequest {
    game: String,
    predicted: f64,
    actual: i32,
}

async fn record_result(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RecordRequest>,
) -> Result<Json<ResultRecord>, ApiError> {
    if req.game.trim().is_empty() {
        return Err(ApiError::InvalidInput("game must not be empty".to_string()));
    }
    if !(0.0..=1.0).contains(&req.predicted) || !req.predicted.is_finite() {
        return Err(ApiError::InvalidInput(format!(
            "predicted must be a probability in [0, 1], got {}",
            req.predicted
        )));
    }
    if req.actual != 0 && req.actual != 1 {
        return Err(ApiError::InvalidInput(format!(
            "actual must be 0 or 1, got {}",
            req.actual
        )));
    }
    let record = state
        .db
        .record_result(req.game.trim(), req.predicted, req.actual)
        .map_err(|err| ApiError::InvalidInput(err.to_string()))?;
    Ok(Json(record))
}

async fn list_teams(State(state): State<Arc<AppState>>) -> Json<TeamsResponse> {
    let (source, teams) = state.games.teams().await;
    Json(TeamsResponse {
        source,
        count: teams.len(),
        teams,
    })
}

async fn team_roster(
    State(state): State<Arc<AppState>>,
    Path(abbr): Path<String>,
) -> Result<Json<RosterResponse>, ApiError> {
    let team = teams::lookup(&abbr)
        .ok_or_else(|| ApiError::TeamNotFound(abbr.trim().to_ascii_uppercase()))?;
    let players = state.games.roster(team).await?;
    Ok(Json(RosterResponse {
        team: team.abbreviation.to_string(),
        count: players.len(),
        players,
    }))
}
