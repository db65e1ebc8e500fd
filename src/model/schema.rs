//! Feature schema shared by the training and serving paths.
//!
//! The classifier has no self-describing schema: it sees a positional slice
//! of floats. Any drift between the order used at training time and the
//! order assembled at serving time silently produces wrong predictions, so
//! both paths go through this module and nothing else re-derives the order.

use serde::{Deserialize, Serialize};

/// Feature column order used at training time. `FeatureVector::to_array`
/// must emit fields in exactly this order.
pub const FEATURE_COLUMNS: [&str; 14] = [
    "off_rating_home",
    "off_rating_away",
    "def_rating_home",
    "def_rating_away",
    "net_rating_home",
    "net_rating_away",
    "pace_home",
    "pace_away",
    "home_rest_days",
    "away_rest_days",
    "home_last10_win_pct",
    "away_last10_win_pct",
    "home_starters_out",
    "away_starters_out",
];

/// One team's average statistics on one side (home or away) of a matchup.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TeamSplit {
    pub off_rating: f64,
    pub def_rating: f64,
    pub net_rating: f64,
    pub pace: f64,
    pub rest_days: f64,
    pub last10_win_pct: f64,
    pub starters_out: f64,
}

/// The assembled model input for a single matchup.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureVector {
    pub off_rating_home: f64,
    pub off_rating_away: f64,
    pub def_rating_home: f64,
    pub def_rating_away: f64,
    pub net_rating_home: f64,
    pub net_rating_away: f64,
    pub pace_home: f64,
    pub pace_away: f64,
    pub home_rest_days: f64,
    pub away_rest_days: f64,
    pub home_last10_win_pct: f64,
    pub away_last10_win_pct: f64,
    pub home_starters_out: f64,
    pub away_starters_out: f64,
}

impl FeatureVector {
    /// Interleave two team splits into the trained layout.
    pub fn from_splits(home: &TeamSplit, away: &TeamSplit) -> Self {
        FeatureVector {
            off_rating_home: home.off_rating,
            off_rating_away: away.off_rating,
            def_rating_home: home.def_rating,
            def_rating_away: away.def_rating,
            net_rating_home: home.net_rating,
            net_rating_away: away.net_rating,
            pace_home: home.pace,
            pace_away: away.pace,
            home_rest_days: home.rest_days,
            away_rest_days: away.rest_days,
            home_last10_win_pct: home.last10_win_pct,
            away_last10_win_pct: away.last10_win_pct,
            home_starters_out: home.starters_out,
            away_starters_out: away.starters_out,
        }
    }

    /// Positional layout. Field order matches `FEATURE_COLUMNS` exactly.
    pub fn to_array(&self) -> [f64; 14] {
        [
            self.off_rating_home,
            self.off_rating_away,
            self.def_rating_home,
            self.def_rating_away,
            self.net_rating_home,
            self.net_rating_away,
            self.pace_home,
            self.pace_away,
            self.home_rest_days,
            self.away_rest_days,
            self.home_last10_win_pct,
            self.away_last10_win_pct,
            self.home_starters_out,
            self.away_starters_out,
        ]
    }
}
