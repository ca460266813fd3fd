use super::error::DatasetError;
use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ScalerIoError {
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("TOML parsing error for '{path}': {source}")]
    Toml {
        path: String,
        source: toml::de::Error,
    },
    #[error("Failed to serialize scaler: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Per-column standardization `(x - mean) / std`, fitted on one matrix and applied
/// unchanged to any other.
///
/// The standard deviation is the population value. Columns whose deviation is
/// numerically zero are only centered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StandardScaler {
    feature_names: Vec<String>,
    mean: Vec<f64>,
    std: Vec<f64>,
}

impl StandardScaler {
    /// Fits column means and standard deviations of `x`.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError::Empty`] when `x` has no rows and
    /// [`DatasetError::DimensionMismatch`] when `feature_names` does not match its width.
    pub fn fit(x: &DMatrix<f64>, feature_names: &[String]) -> Result<Self, DatasetError> {
        if x.nrows() == 0 {
            return Err(DatasetError::Empty(
                "cannot fit a scaler on zero rows".to_string(),
            ));
        }
        if feature_names.len() != x.ncols() {
            return Err(DatasetError::DimensionMismatch {
                expected: x.ncols(),
                found: feature_names.len(),
            });
        }

        // nalgebra's variance divides by n, which is the population value.
        let (mean, std): (Vec<f64>, Vec<f64>) = x
            .column_iter()
            .map(|column| (column.mean(), column.variance().sqrt()))
            .unzip();
        debug!(
            columns = x.ncols(),
            rows = x.nrows(),
            "Fitted standard scaler."
        );

        Ok(Self {
            feature_names: feature_names.to_vec(),
            mean,
            std,
        })
    }

    pub fn n_features(&self) -> usize {
        self.mean.len()
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    pub fn mean(&self) -> &[f64] {
        &self.mean
    }

    pub fn std(&self) -> &[f64] {
        &self.std
    }

    /// Checks that `names` are the fitted feature names in the fitted order.
    ///
    /// Transforms only see column positions, so a vector built from the same
    /// descriptors in another order would otherwise be scaled with the wrong
    /// column statistics.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError::DimensionMismatch`] when the counts differ and
    /// [`DatasetError::FeatureNameMismatch`] at the first differing column.
    pub fn check_feature_names<S: AsRef<str>>(&self, names: &[S]) -> Result<(), DatasetError> {
        if names.len() != self.n_features() {
            return Err(DatasetError::DimensionMismatch {
                expected: self.n_features(),
                found: names.len(),
            });
        }
        match self
            .feature_names
            .iter()
            .zip(names)
            .position(|(fitted, given)| fitted != given.as_ref())
        {
            Some(column) => Err(DatasetError::FeatureNameMismatch {
                column,
                expected: self.feature_names[column].clone(),
                found: names[column].as_ref().to_string(),
            }),
            None => Ok(()),
        }
    }

    fn divisor(&self, column: usize) -> f64 {
        let s = self.std[column];
        // Constant columns accumulate rounding noise in their deviation.
        if s < 10.0 * f64::EPSILON * self.mean[column].abs().max(1.0) {
            1.0
        } else {
            s
        }
    }

    pub fn transform(&self, x: &DMatrix<f64>) -> Result<DMatrix<f64>, DatasetError> {
        if x.ncols() != self.n_features() {
            return Err(DatasetError::DimensionMismatch {
                expected: self.n_features(),
                found: x.ncols(),
            });
        }
        Ok(DMatrix::from_fn(x.nrows(), x.ncols(), |i, j| {
            (x[(i, j)] - self.mean[j]) / self.divisor(j)
        }))
    }

    /// Transforms a single feature vector, e.g. one novel compound.
    pub fn transform_row(&self, row: &[f64]) -> Result<Vec<f64>, DatasetError> {
        if row.len() != self.n_features() {
            return Err(DatasetError::DimensionMismatch {
                expected: self.n_features(),
                found: row.len(),
            });
        }
        Ok(row
            .iter()
            .enumerate()
            .map(|(j, &v)| (v - self.mean[j]) / self.divisor(j))
            .collect())
    }

    pub fn inverse_transform_row(&self, row: &[f64]) -> Result<Vec<f64>, DatasetError> {
        if row.len() != self.n_features() {
            return Err(DatasetError::DimensionMismatch {
                expected: self.n_features(),
                found: row.len(),
            });
        }
        Ok(row
            .iter()
            .enumerate()
            .map(|(j, &v)| v * self.divisor(j) + self.mean[j])
            .collect())
    }

    pub fn to_toml_string(&self) -> Result<String, ScalerIoError> {
        Ok(toml::to_string(self)?)
    }

    pub fn save(&self, path: &Path) -> Result<(), ScalerIoError> {
        let content = self.to_toml_string()?;
        std::fs::write(path, content).map_err(|e| ScalerIoError::Io {
            path: path.to_string_lossy().to_string(),
            source: e,
        })
    }

    pub fn load(path: &Path) -> Result<Self, ScalerIoError> {
        let path_str = path.to_string_lossy().to_string();
        let content = std::fs::read_to_string(path).map_err(|e| ScalerIoError::Io {
            path: path_str.clone(),
            source: e,
        })?;
        toml::from_str(&content).map_err(|e| ScalerIoError::Toml {
            path: path_str,
            source: e,
        })
    }
}
