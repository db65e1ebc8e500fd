//! Logistic regression with per-feature standardization.
//!
//! Inference is `p = sigmoid(w · z + b)` where `z_i = (x_i - mean_i) / std_i`.
//! Fitting is plain gradient descent with L2 on the weights; the feature
//! count is small enough that nothing fancier is warranted.

use serde::{Deserialize, Serialize};

const EPS: f64 = 1e-9;
/// Floor for per-feature standard deviations so constant columns don't blow up.
const STD_FLOOR: f64 = 1e-6;

/// A fitted classifier plus the standardization statistics captured at fit
/// time. Persisted as part of the model bundle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogisticModel {
    pub weights: Vec<f64>,
    pub intercept: f64,
    pub means: Vec<f64>,
    pub stds: Vec<f64>,
}

#[derive(Debug, Clone, Copy)]
pub struct TrainMetrics {
    pub accuracy: f64,
    pub logloss: f64,
}

impl LogisticModel {
    pub fn n_features(&self) -> usize {
        self.weights.len()
    }

    /// P(home win) for one feature row. The row must have the trained field
    /// count and order; the schema module is the only sanctioned producer.
    pub fn predict_proba(&self, features: &[f64]) -> f64 {
        debug_assert_eq!(features.len(), self.weights.len());
        let mut z = self.intercept;
        for ((x, w), (mean, std)) in features
            .iter()
            .zip(&self.weights)
            .zip(self.means.iter().zip(&self.stds))
        {
            z += w * (x - mean) / std.max(STD_FLOOR);
        }
        sigmoid(z)
    }
}

/// Numerically stable logistic sigmoid.
fn sigmoid(x: f64) -> f64 {
    if x >= 0.0 {
        let z = (-x).exp();
        1.0 / (1.0 + z)
    } else {
        let z = x.exp();
        z / (1.0 + z)
    }
}

fn clamp_prob(p: f64) -> f64 {
    p.clamp(EPS, 1.0 - EPS)
}

fn logloss(p: f64, y: f64) -> f64 {
    let p = clamp_prob(p);
    -(y * p.ln() + (1.0 - y) * (1.0 - p).ln())
}

/// Fit a logistic model with gradient descent. Labels are 0.0 / 1.0.
///
/// Returns `None` when the data cannot support a fit: too few rows, a single
/// class, ragged rows, or a diverging run.
pub fn fit(
    rows: &[Vec<f64>],
    labels: &[f64],
    max_iters: usize,
    learning_rate: f64,
    l2: f64,
) -> Option<LogisticModel> {
    if rows.len() < 8 || rows.len() != labels.len() {
        return None;
    }
    let p = rows[0].len();
    if p == 0 || rows.iter().any(|r| r.len() != p) {
        return None;
    }
    let positives = labels.iter().filter(|y| **y > 0.5).count();
    if positives == 0 || positives == rows.len() {
        return None;
    }

    let n = rows.len() as f64;

    let mut means = vec![0.0; p];
    for row in rows {
        for (m, x) in means.iter_mut().zip(row) {
            *m += x;
        }
    }
    for m in &mut means {
        *m /= n;
    }
    let mut stds = vec![0.0; p];
    for row in rows {
        for ((s, x), m) in stds.iter_mut().zip(row).zip(&means) {
            *s += (x - m).powi(2);
        }
    }
    for s in &mut stds {
        *s = (*s / n).sqrt().max(STD_FLOOR);
    }

    // Standardize once up front; the GD loop then only does dot products.
    let z_rows: Vec<Vec<f64>> = rows
        .iter()
        .map(|row| {
            row.iter()
                .zip(means.iter().zip(&stds))
                .map(|(x, (m, s))| (x - m) / s)
                .collect()
        })
        .collect();

    let mut weights = vec![0.0; p];
    let mut intercept = 0.0;

    for i in 0..max_iters.max(1) {
        let lr = learning_rate / (1.0 + 0.01 * i as f64);
        let mut grad_w = vec![0.0; p];
        let mut grad_b = 0.0;
        for (z, y) in z_rows.iter().zip(labels) {
            let mut logit = intercept;
            for (w, zj) in weights.iter().zip(z) {
                logit += w * zj;
            }
            let err = sigmoid(logit) - y;
            for (g, zj) in grad_w.iter_mut().zip(z) {
                *g += err * zj;
            }
            grad_b += err;
        }
        for (w, g) in weights.iter_mut().zip(&grad_w) {
            *w -= lr * (g / n + l2 * *w);
        }
        intercept -= lr * grad_b / n;
        if !intercept.is_finite() || weights.iter().any(|w| !w.is_finite()) {
            return None;
        }
    }

    Some(LogisticModel {
        weights,
        intercept,
        means,
        stds,
    })
}

/// Held-out accuracy (0.5 threshold) and mean log-loss.
pub fn evaluate(model: &LogisticModel, rows: &[Vec<f64>], labels: &[f64]) -> TrainMetrics {
    if rows.is_empty() {
        return TrainMetrics {
            accuracy: 0.0,
            logloss: 0.0,
        };
    }
    let mut correct = 0usize;
    let mut ll = 0.0;
    for (row, y) in rows.iter().zip(labels) {
        let p = model.predict_proba(row);
        if (p >= 0.5) == (*y >= 0.5) {
            correct += 1;
        }
        ll += logloss(p, *y);
    }
    let n = rows.len() as f64;
    TrainMetrics {
        accuracy: correct as f64 / n,
        logloss: ll / n,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn sigmoid_properties() {
        assert_relative_eq!(sigmoid(0.0), 0.5, epsilon = 1e-12);
        assert!(sigmoid(10.0) > 0.999);
        assert!(sigmoid(-10.0) < 0.001);
        // stable at extremes
        assert!(sigmoid(-800.0) >= 0.0);
        assert!(sigmoid(800.0) <= 1.0);
    }

    fn separable_dataset() -> (Vec<Vec<f64>>, Vec<f64>) {
        // One informative feature, one constant feature.
        let mut rows = Vec::new();
        let mut labels = Vec::new();
        for i in 0..40 {
            let x = -2.0 + i as f64 * 0.1;
            rows.push(vec![x, 7.0]);
            labels.push(if x > 0.0 { 1.0 } else { 0.0 });
        }
        (rows, labels)
    }

    #[test]
    fn fit_recovers_a_separable_boundary() {
        let (rows, labels) = separable_dataset();
        let model = fit(&rows, &labels, 500, 0.5, 1e-4).expect("fit should succeed");
        let metrics = evaluate(&model, &rows, &labels);
        assert!(metrics.accuracy > 0.9, "accuracy {}", metrics.accuracy);
        assert!(metrics.logloss < 0.5, "logloss {}", metrics.logloss);
        // the informative feature should carry the weight
        assert!(model.weights[0].abs() > model.weights[1].abs());
    }

    #[test]
    fn fit_rejects_single_class_data() {
        let rows = vec![vec![1.0]; 20];
        let labels = vec![1.0; 20];
        assert!(fit(&rows, &labels, 100, 0.1, 0.0).is_none());
    }

    #[test]
    fn fit_rejects_tiny_or_ragged_data() {
        let rows = vec![vec![1.0], vec![0.0]];
        assert!(fit(&rows, &[1.0, 0.0], 100, 0.1, 0.0).is_none());

        let ragged = vec![vec![1.0, 2.0]; 4]
            .into_iter()
            .chain(vec![vec![1.0]; 4])
            .collect::<Vec<_>>();
        let labels: Vec<f64> = (0..8).map(|i| (i % 2) as f64).collect();
        assert!(fit(&ragged, &labels, 100, 0.1, 0.0).is_none());
    }

    #[test]
    fn constant_columns_do_not_produce_nan() {
        let (rows, labels) = separable_dataset();
        let model = fit(&rows, &labels, 200, 0.5, 1e-4).unwrap();
        let p = model.predict_proba(&[0.7, 7.0]);
        assert!(p.is_finite() && (0.0..=1.0).contains(&p));
    }

    #[test]
    fn zero_weights_predict_even_odds() {
        let model = LogisticModel {
            weights: vec![0.0; 3],
            intercept: 0.0,
            means: vec![0.0; 3],
            stds: vec![1.0; 3],
        };
        assert_relative_eq!(model.predict_proba(&[5.0, -3.0, 0.1]), 0.5, epsilon = 1e-12);
    }
}
