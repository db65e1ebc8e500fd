//! Offline trainer. Reads a CSV of historical matchups, fits the logistic
//! classifier on a shuffled 80/20 split, aggregates per-team home/away
//! averages, and writes the whole bundle as one JSON artifact for the
//! serving binary.

use std::collections::HashMap;

use anyhow::{Context, Result};
use clap::Parser;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::Deserialize;
use tracing::{info, warn};

use nba_predictor::model::logistic;
use nba_predictor::model::schema::{TeamSplit, FEATURE_COLUMNS};
use nba_predictor::model::ModelBundle;

/// Train the NBA outcome model from historical game data
#[derive(Parser, Debug)]
#[command(name = "train-model", version, about)]
struct Args {
    /// Training data CSV
    #[arg(long, default_value = "data/nba_training_data.csv")]
    data: String,

    /// Output path for the model bundle
    #[arg(long, default_value = "model/nba_model.json")]
    out: String,

    /// Gradient descent iterations
    #[arg(long, default_value = "500")]
    iters: usize,

    /// Initial learning rate
    #[arg(long, default_value = "0.5")]
    learning_rate: f64,

    /// L2 regularization strength
    #[arg(long, default_value = "0.0001")]
    l2: f64,

    /// Shuffle seed for the train/test split
    #[arg(long, default_value = "42")]
    seed: u64,
}

/// One CSV row. Column names match the feature schema plus the team codes
/// and the label.
#[derive(Debug, Deserialize)]
struct TrainingRow {
    home_team: String,
    away_team: String,
    off_rating_home: f64,
    off_rating_away: f64,
    def_rating_home: f64,
    def_rating_away: f64,
    net_rating_home: f64,
    net_rating_away: f64,
    pace_home: f64,
    pace_away: f64,
    home_rest_days: f64,
    away_rest_days: f64,
    home_last10_win_pct: f64,
    away_last10_win_pct: f64,
    home_starters_out: f64,
    away_starters_out: f64,
    home_win: i32,
}

impl TrainingRow {
    /// Feature values in schema order.
    fn features(&self) -> Vec<f64> {
        vec![
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

    fn home_split(&self) -> TeamSplit {
        TeamSplit {
            off_rating: self.off_rating_home,
            def_rating: self.def_rating_home,
            net_rating: self.net_rating_home,
            pace: self.pace_home,
            rest_days: self.home_rest_days,
            last10_win_pct: self.home_last10_win_pct,
            starters_out: self.home_starters_out,
        }
    }

    fn away_split(&self) -> TeamSplit {
        TeamSplit {
            off_rating: self.off_rating_away,
            def_rating: self.def_rating_away,
            net_rating: self.net_rating_away,
            pace: self.pace_away,
            rest_days: self.away_rest_days,
            last10_win_pct: self.away_last10_win_pct,
            starters_out: self.away_starters_out,
        }
    }
}

/// Load the CSV, skipping rows that fail to parse.
fn load_rows(path: &str) -> Result<Vec<TrainingRow>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .with_context(|| format!("Failed to open training data at {}", path))?;
    let mut rows = Vec::new();
    for (i, record) in reader.deserialize::<TrainingRow>().enumerate() {
        match record {
            Ok(row) => rows.push(row),
            Err(err) => warn!("Skipping malformed row {}: {}", i + 2, err),
        }
    }
    Ok(rows)
}

/// Average the observed splits per team, separately for home and away
/// appearances. Abbreviations are canonicalized to uppercase.
fn aggregate_splits(
    rows: &[TrainingRow],
    side: fn(&TrainingRow) -> (&str, TeamSplit),
) -> HashMap<String, TeamSplit> {
    let mut sums: HashMap<String, (TeamSplit, usize)> = HashMap::new();
    for row in rows {
        let (team, split) = side(row);
        let team = team.trim().to_ascii_uppercase();
        let entry = sums.entry(team).or_insert((
            TeamSplit {
                off_rating: 0.0,
                def_rating: 0.0,
                net_rating: 0.0,
                pace: 0.0,
                rest_days: 0.0,
                last10_win_pct: 0.0,
                starters_out: 0.0,
            },
            0,
        ));
        entry.0.off_rating += split.off_rating;
        entry.0.def_rating += split.def_rating;
        entry.0.net_rating += split.net_rating;
        entry.0.pace += split.pace;
        entry.0.rest_days += split.rest_days;
        entry.0.last10_win_pct += split.last10_win_pct;
        entry.0.starters_out += split.starters_out;
        entry.1 += 1;
    }
    sums.into_iter()
        .map(|(team, (sum, n))| {
            let n = n as f64;
            (
                team,
                TeamSplit {
                    off_rating: sum.off_rating / n,
                    def_rating: sum.def_rating / n,
                    net_rating: sum.net_rating / n,
                    pace: sum.pace / n,
                    rest_days: sum.rest_days / n,
                    last10_win_pct: sum.last10_win_pct / n,
                    starters_out: sum.starters_out / n,
                },
            )
        })
        .collect()
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let rows = load_rows(&args.data)?;
    info!("Loaded {} training rows from {}", rows.len(), args.data);
    if rows.len() < 10 {
        anyhow::bail!("Not enough training rows ({}); need at least 10", rows.len());
    }

    // Shuffled 80/20 split, reproducible via --seed.
    let mut indices: Vec<usize> = (0..rows.len()).collect();
    let mut rng = StdRng::seed_from_u64(args.seed);
    indices.shuffle(&mut rng);
    let cut = (rows.len() * 4) / 5;

    let features: Vec<Vec<f64>> = rows.iter().map(TrainingRow::features).collect();
    let labels: Vec<f64> = rows.iter().map(|r| r.home_win as f64).collect();

    let train_x: Vec<Vec<f64>> = indices[..cut].iter().map(|&i| features[i].clone()).collect();
    let train_y: Vec<f64> = indices[..cut].iter().map(|&i| labels[i]).collect();
    let test_x: Vec<Vec<f64>> = indices[cut..].iter().map(|&i| features[i].clone()).collect();
    let test_y: Vec<f64> = indices[cut..].iter().map(|&i| labels[i]).collect();

    let model = logistic::fit(&train_x, &train_y, args.iters, args.learning_rate, args.l2)
        .context("Training failed: data is too small, single-class, or diverged")?;

    let train_metrics = logistic::evaluate(&model, &train_x, &train_y);
    let test_metrics = logistic::evaluate(&model, &test_x, &test_y);
    info!(
        "Train: accuracy {:.3}, logloss {:.3}",
        train_metrics.accuracy, train_metrics.logloss
    );
    info!(
        "Held-out: accuracy {:.3}, logloss {:.3}",
        test_metrics.accuracy, test_metrics.logloss
    );

    let home_splits = aggregate_splits(&rows, |r| (r.home_team.as_str(), r.home_split()));
    let away_splits = aggregate_splits(&rows, |r| (r.away_team.as_str(), r.away_split()));
    info!(
        "Aggregated splits for {} home / {} away teams",
        home_splits.len(),
        away_splits.len()
    );

    let bundle = ModelBundle {
        model,
        feature_columns: FEATURE_COLUMNS.iter().map(|s| s.to_string()).collect(),
        home_splits,
        away_splits,
    };
    bundle.save(&args.out)?;
    info!("Model bundle written to {}", args.out);

    Ok(())
}
