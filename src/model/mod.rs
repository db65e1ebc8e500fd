//! Prediction pipeline: model bundle, feature assembly, and the engine that
//! turns a matchup into a `Prediction`.

pub mod logistic;
pub mod schema;

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::teams;
use logistic::LogisticModel;
use schema::{FeatureVector, TeamSplit, FEATURE_COLUMNS};

/// Everything the serving path needs, written by the train-model binary as a
/// single JSON artifact: the classifier, the column list it was trained on,
/// and the per-team statistical splits the feature builder reads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelBundle {
    pub model: LogisticModel,
    pub feature_columns: Vec<String>,
    /// Per-team averages when playing at home, keyed by abbreviation.
    pub home_splits: HashMap<String, TeamSplit>,
    /// Per-team averages when playing away.
    pub away_splits: HashMap<String, TeamSplit>,
}

impl ModelBundle {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read model bundle at {}", path.display()))?;
        let bundle: ModelBundle =
            serde_json::from_str(&raw).context("Failed to parse model bundle JSON")?;

        if bundle.model.n_features() != FEATURE_COLUMNS.len() {
            anyhow::bail!(
                "Model expects {} features, schema has {}",
                bundle.model.n_features(),
                FEATURE_COLUMNS.len()
            );
        }
        if bundle.feature_columns != FEATURE_COLUMNS {
            // Same count, different order or names: the bundle came from an
            // incompatible trainer build. Predictions from it would be
            // silently wrong, which is worse than refusing to serve.
            anyhow::bail!(
                "Model bundle column order does not match the compiled schema: {:?}",
                bundle.feature_columns
            );
        }
        Ok(bundle)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let raw = serde_json::to_string_pretty(self).context("Failed to serialize model bundle")?;
        std::fs::write(path, raw)
            .with_context(|| format!("Failed to write model bundle at {}", path.display()))?;
        Ok(())
    }

    /// Resolve both teams' splits and assemble the features in training
    /// order. A team is "missing stats" iff its abbreviation has no entry in
    /// the split map for the side it plays; zero-valued fields in a present
    /// entry are data, not absence.
    pub fn build_features(&self, home: &str, away: &str) -> Result<FeatureVector, Vec<String>> {
        match (self.home_splits.get(home), self.away_splits.get(away)) {
            (Some(h), Some(a)) => Ok(FeatureVector::from_splits(h, a)),
            (h, a) => {
                let mut missing = Vec::new();
                if h.is_none() {
                    missing.push(home.to_string());
                }
                if a.is_none() {
                    missing.push(away.to_string());
                }
                Err(missing)
            }
        }
    }
}

/// Coarse bucketing of the winning side's probability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Confidence {
    High,
    Medium,
    Low,
}

impl Confidence {
    /// `p_win` is the probability of whichever side the model favors.
    pub fn from_winning_prob(p_win: f64) -> Self {
        if p_win >= 0.70 {
            Confidence::High
        } else if p_win >= 0.55 {
            Confidence::Medium
        } else {
            Confidence::Low
        }
    }
}

/// The response payload for both prediction endpoints.
///
/// Winner and confidence are decided on the unrounded probability; the
/// probabilities shown here are rounded to 3 decimals afterwards. A raw
/// value just under 0.5 can therefore render as 0.5/0.5 with the away team
/// as winner.
#[derive(Debug, Clone, Serialize)]
pub struct Prediction {
    /// 0 for ad-hoc matchups not backed by a scheduled game.
    pub game_id: i64,
    pub home_team: String,
    pub home_team_name: Option<String>,
    pub away_team: String,
    pub away_team_name: Option<String>,
    pub home_win_probability: f64,
    pub away_win_probability: f64,
    pub predicted_winner: String,
    pub confidence: Confidence,
}

fn round3(p: f64) -> f64 {
    (p * 1000.0).round() / 1000.0
}

/// Owns the loaded classifier. Pure: a prediction is a function of its
/// inputs plus the immutable bundle, so the engine is shared freely across
/// request handlers.
#[derive(Clone)]
pub struct PredictionEngine {
    bundle: Option<Arc<ModelBundle>>,
}

impl PredictionEngine {
    pub fn new(bundle: Option<ModelBundle>) -> Self {
        PredictionEngine {
            bundle: bundle.map(Arc::new),
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.bundle.is_some()
    }

    /// Predict a matchup. Team abbreviations are canonicalized to uppercase.
    ///
    /// Fails with `ModelUnavailable` when no bundle is loaded (a deployment
    /// precondition, surfaced as a server error) and with `MissingStats`
    /// when either team has no splits (incomplete upstream data, a client
    /// error).
    pub fn predict(&self, game_id: i64, home: &str, away: &str) -> Result<Prediction, ApiError> {
        let bundle = self.bundle.as_deref().ok_or(ApiError::ModelUnavailable)?;
        let home = home.to_ascii_uppercase();
        let away = away.to_ascii_uppercase();

        let features = bundle
            .build_features(&home, &away)
            .map_err(ApiError::MissingStats)?;
        let home_p = bundle.model.predict_proba(&features.to_array());

        // Exact tie at 0.5 favors the home team by convention.
        let (predicted_winner, p_win) = if home_p >= 0.5 {
            (home.clone(), home_p)
        } else {
            (away.clone(), 1.0 - home_p)
        };
        let confidence = Confidence::from_winning_prob(p_win);

        let home_win_probability = round3(home_p);
        let away_win_probability = round3(1.0 - home_win_probability);

        Ok(Prediction {
            game_id,
            home_team_name: teams::full_name(&home).map(str::to_string),
            away_team_name: teams::full_name(&away).map(str::to_string),
            home_team: home,
            away_team: away,
            home_win_probability,
            away_win_probability,
            predicted_winner,
            confidence,
        })
    }
}

/// Build a bundle whose classifier always outputs `sigmoid(intercept)` and
/// which has splits for the given teams on both sides. Test scaffolding.
#[doc(hidden)]
pub fn stub_bundle(intercept: f64, team_abbrs: &[&str]) -> ModelBundle {
    let split = TeamSplit {
        off_rating: 112.0,
        def_rating: 110.0,
        net_rating: 2.0,
        pace: 99.0,
        rest_days: 1.5,
        last10_win_pct: 0.6,
        starters_out: 0.0,
    };
    let mut home_splits = HashMap::new();
    let mut away_splits = HashMap::new();
    for abbr in team_abbrs {
        home_splits.insert(abbr.to_string(), split);
        away_splits.insert(abbr.to_string(), split);
    }
    ModelBundle {
        model: LogisticModel {
            weights: vec![0.0; FEATURE_COLUMNS.len()],
            intercept,
            means: vec![0.0; FEATURE_COLUMNS.len()],
            stds: vec![1.0; FEATURE_COLUMNS.len()],
        },
        feature_columns: FEATURE_COLUMNS.iter().map(|s| s.to_string()).collect(),
        home_splits,
        away_splits,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn confidence_boundaries_on_both_sides() {
        assert_eq!(Confidence::from_winning_prob(0.70), Confidence::High);
        assert_eq!(Confidence::from_winning_prob(0.699_999), Confidence::Medium);
        assert_eq!(Confidence::from_winning_prob(0.85), Confidence::High);
        assert_eq!(Confidence::from_winning_prob(0.55), Confidence::Medium);
        assert_eq!(Confidence::from_winning_prob(0.549_999), Confidence::Low);
        assert_eq!(Confidence::from_winning_prob(0.50), Confidence::Low);
    }

    #[test]
    fn probabilities_sum_to_one() {
        // intercept 1.0 -> P(home) = sigmoid(1.0) ~ 0.731
        let engine = PredictionEngine::new(Some(stub_bundle(1.0, &["LAL", "BOS"])));
        let p = engine.predict(0, "LAL", "BOS").unwrap();
        assert_relative_eq!(
            p.home_win_probability + p.away_win_probability,
            1.0,
            epsilon = 1e-9
        );
        assert_eq!(p.predicted_winner, "LAL");
        assert_eq!(p.confidence, Confidence::High);
    }

    #[test]
    fn away_team_wins_when_home_probability_is_low() {
        let engine = PredictionEngine::new(Some(stub_bundle(-0.4, &["LAL", "BOS"])));
        let p = engine.predict(0, "LAL", "BOS").unwrap();
        assert!(p.home_win_probability < 0.5);
        assert_eq!(p.predicted_winner, "BOS");
        // winning side ~ sigmoid(0.4) ~ 0.599 -> Medium
        assert_eq!(p.confidence, Confidence::Medium);
    }

    #[test]
    fn exact_tie_favors_home_team() {
        let engine = PredictionEngine::new(Some(stub_bundle(0.0, &["PHX", "DEN"])));
        let p = engine.predict(0, "PHX", "DEN").unwrap();
        assert_relative_eq!(p.home_win_probability, 0.5, epsilon = 1e-9);
        assert_eq!(p.predicted_winner, "PHX");
        assert_eq!(p.confidence, Confidence::Low);
    }

    #[test]
    fn winner_follows_the_unrounded_probability() {
        // sigmoid(-0.0008) ~ 0.4998: rounds to an even 0.5/0.5 display, but
        // the away team is still the winner.
        let engine = PredictionEngine::new(Some(stub_bundle(-0.0008, &["LAL", "BOS"])));
        let p = engine.predict(0, "LAL", "BOS").unwrap();
        assert_relative_eq!(p.home_win_probability, 0.5, epsilon = 1e-9);
        assert_relative_eq!(p.away_win_probability, 0.5, epsilon = 1e-9);
        assert_eq!(p.predicted_winner, "BOS");
    }

    #[test]
    fn input_abbreviations_are_canonicalized() {
        let engine = PredictionEngine::new(Some(stub_bundle(1.0, &["LAL", "BOS"])));
        let p = engine.predict(0, "lal", "bos").unwrap();
        assert_eq!(p.home_team, "LAL");
        assert_eq!(p.home_team_name.as_deref(), Some("Los Angeles Lakers"));
    }

    #[test]
    fn missing_stats_names_the_offending_teams() {
        let engine = PredictionEngine::new(Some(stub_bundle(1.0, &["LAL"])));
        let err = engine.predict(0, "LAL", "MIA").unwrap_err();
        match err {
            ApiError::MissingStats(teams) => assert_eq!(teams, vec!["MIA".to_string()]),
            other => panic!("expected MissingStats, got {:?}", other),
        }

        let err = engine.predict(0, "SAC", "MIA").unwrap_err();
        match err {
            ApiError::MissingStats(teams) => {
                assert_eq!(teams, vec!["SAC".to_string(), "MIA".to_string()])
            }
            other => panic!("expected MissingStats, got {:?}", other),
        }
    }

    #[test]
    fn unloaded_engine_reports_model_unavailable() {
        let engine = PredictionEngine::new(None);
        let err = engine.predict(0, "LAL", "BOS").unwrap_err();
        assert!(matches!(err, ApiError::ModelUnavailable));
    }

    #[test]
    fn bundle_roundtrips_through_json() {
        let bundle = stub_bundle(0.3, &["LAL", "BOS"]);
        let raw = serde_json::to_string(&bundle).unwrap();
        let back: ModelBundle = serde_json::from_str(&raw).unwrap();
        assert_eq!(back.feature_columns, bundle.feature_columns);
        assert_relative_eq!(back.model.intercept, 0.3, epsilon = 1e-12);
        assert!(back.home_splits.contains_key("LAL"));
    }
}
