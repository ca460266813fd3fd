use super::config::FeatureSet;
use super::scaling::StandardScaler;
use super::split::SplitIndices;
use crate::core::models::record::RecordMeta;
use nalgebra::{DMatrix, DVector};
use std::fmt;

/// Progress of a dataset through featurize, split and scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DatasetStage {
    Uninitialized,
    Featurized,
    Split,
    Scaled,
}

impl fmt::Display for DatasetStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DatasetStage::Uninitialized => "uninitialized",
            DatasetStage::Featurized => "featurized",
            DatasetStage::Split => "split",
            DatasetStage::Scaled => "scaled",
        })
    }
}

/// Records dropped while featurizing, by reason.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Exclusions {
    /// Records without a descriptor family the feature set reads.
    pub missing_descriptors: usize,
    /// Records whose label or a selected feature is NaN or infinite.
    pub non_finite: usize,
}

impl Exclusions {
    pub fn total(&self) -> usize {
        self.missing_descriptors + self.non_finite
    }
}

/// Full feature matrix with its labels and per-row metadata.
#[derive(Debug, Clone)]
pub struct FeaturizedData {
    pub feature_set: FeatureSet,
    pub feature_names: Vec<String>,
    pub x: DMatrix<f64>,
    pub y: DVector<f64>,
    pub meta: Vec<RecordMeta>,
    pub excluded: Exclusions,
}

impl FeaturizedData {
    pub fn n_rows(&self) -> usize {
        self.x.nrows()
    }

    pub fn n_features(&self) -> usize {
        self.x.ncols()
    }

    pub fn n_parent(&self) -> usize {
        self.meta.iter().filter(|m| m.is_parent()).count()
    }

    pub fn n_metab(&self) -> usize {
        self.meta.len() - self.n_parent()
    }

    pub fn rows(&self, indices: &[usize]) -> DMatrix<f64> {
        self.x.select_rows(indices.iter())
    }

    pub fn labels(&self, indices: &[usize]) -> DVector<f64> {
        self.y.select_rows(indices.iter())
    }
}

#[derive(Debug, Clone)]
pub struct ScaledData {
    pub scaler: StandardScaler,
    pub x_train: DMatrix<f64>,
    pub x_test: DMatrix<f64>,
}

/// The builder's state; each variant carries everything produced so far.
#[derive(Debug, Clone, Default)]
pub enum DatasetState {
    #[default]
    Uninitialized,
    Featurized(FeaturizedData),
    Split {
        data: FeaturizedData,
        split: SplitIndices,
    },
    Scaled {
        data: FeaturizedData,
        split: SplitIndices,
        scaled: ScaledData,
    },
}

impl DatasetState {
    pub fn stage(&self) -> DatasetStage {
        match self {
            DatasetState::Uninitialized => DatasetStage::Uninitialized,
            DatasetState::Featurized(_) => DatasetStage::Featurized,
            DatasetState::Split { .. } => DatasetStage::Split,
            DatasetState::Scaled { .. } => DatasetStage::Scaled,
        }
    }

    pub fn data(&self) -> Option<&FeaturizedData> {
        match self {
            DatasetState::Uninitialized => None,
            DatasetState::Featurized(data)
            | DatasetState::Split { data, .. }
            | DatasetState::Scaled { data, .. } => Some(data),
        }
    }

    pub fn split(&self) -> Option<&SplitIndices> {
        match self {
            DatasetState::Split { split, .. } | DatasetState::Scaled { split, .. } => Some(split),
            _ => None,
        }
    }

    pub fn scaled(&self) -> Option<&ScaledData> {
        match self {
            DatasetState::Scaled { scaled, .. } => Some(scaled),
            _ => None,
        }
    }
}
