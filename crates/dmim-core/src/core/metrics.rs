use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MetricsError {
    #[error("Cannot compute metrics on empty label vectors")]
    Empty,
    #[error("Label vectors differ in length (true: {truth}, predicted: {predicted})")]
    LengthMismatch { truth: usize, predicted: usize },
}

/// Standard regression summary for predicted collision cross sections.
#[derive(Debug, Clone, PartialEq)]
pub struct RegressionMetrics {
    pub r2: f64,
    /// Mean absolute error.
    pub mae: f64,
    /// Median absolute error.
    pub mdae: f64,
    /// Mean relative error, percent.
    pub mre: f64,
    /// Median relative error, percent.
    pub mdre: f64,
    pub rmse: f64,
    /// Cumulative share (percent) of predictions within 1, 3, 5 and 10 % relative error.
    pub ce135a: [f64; 4],
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

fn median(values: &[f64]) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

impl RegressionMetrics {
    /// Computes all metrics from true and predicted labels.
    ///
    /// Relative errors are histogrammed on integer percent bins `[0, 1), [1, 2) .. [99, 100]`;
    /// errors above 100 % fall outside the histogram and are excluded from the cumulative shares.
    pub fn compute(y_true: &[f64], y_pred: &[f64]) -> Result<Self, MetricsError> {
        if y_true.len() != y_pred.len() {
            return Err(MetricsError::LengthMismatch {
                truth: y_true.len(),
                predicted: y_pred.len(),
            });
        }
        if y_true.is_empty() {
            return Err(MetricsError::Empty);
        }

        let abs_err: Vec<f64> = y_true
            .iter()
            .zip(y_pred)
            .map(|(t, p)| (p - t).abs())
            .collect();
        let rel_err: Vec<f64> = abs_err
            .iter()
            .zip(y_true)
            .map(|(e, t)| 100.0 * e / t)
            .collect();

        let y_mean = mean(y_true);
        let ss_res: f64 = abs_err.iter().map(|e| e * e).sum();
        let ss_tot: f64 = y_true.iter().map(|t| (t - y_mean).powi(2)).sum();
        let r2 = if ss_tot > 0.0 {
            1.0 - ss_res / ss_tot
        } else if ss_res == 0.0 {
            1.0
        } else {
            0.0
        };

        Ok(Self {
            r2,
            mae: mean(&abs_err),
            mdae: median(&abs_err),
            mre: mean(&rel_err),
            mdre: median(&rel_err),
            rmse: (ss_res / y_true.len() as f64).sqrt(),
            ce135a: cumulative_error_shares(&rel_err),
        })
    }
}

fn cumulative_error_shares(rel_err: &[f64]) -> [f64; 4] {
    let mut hist = [0usize; 100];
    for &e in rel_err {
        if (0.0..100.0).contains(&e) {
            hist[e.floor() as usize] += 1;
        } else if e == 100.0 {
            hist[99] += 1;
        }
    }
    let total: usize = hist.iter().sum();
    if total == 0 {
        return [0.0; 4];
    }
    let mut cumulative = [0usize; 100];
    let mut running = 0;
    for (i, &h) in hist.iter().enumerate() {
        running += h;
        cumulative[i] = running;
    }
    let share = |bin: usize| 100.0 * cumulative[bin] as f64 / total as f64;
    [share(0), share(2), share(4), share(9)]
}
