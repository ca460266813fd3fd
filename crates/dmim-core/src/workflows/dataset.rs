use crate::core::descriptors::assembler::{self, NameSelection};
use crate::core::descriptors::names::{FEATURE_COUNT, MD3D_COUNT, MQN_COUNT};
use crate::core::io::records::RecordSource;
use crate::core::models::record::{FeatureRecord, RecordMeta};
use crate::engine::config::{DatasetConfig, FeatureSet};
use crate::engine::error::DatasetError;
use crate::engine::progress::{DatasetStep, Progress, ProgressReporter};
use crate::engine::scaling::StandardScaler;
use crate::engine::split::{SplitIndices, stratified_shuffle_split, stratify};
use crate::engine::state::{DatasetStage, DatasetState, Exclusions, FeaturizedData, ScaledData};
use nalgebra::{DMatrix, DVector};
use tracing::{debug, info, instrument, warn};

const MZ_FEATURE: &str = "mz";

/// Builds a train/test dataset from a record source in three ordered steps.
///
/// `featurize` → `split` → `scale`. Each step requires the previous one and none
/// can be repeated; a different configuration needs a new builder.
pub struct DatasetBuilder<S: RecordSource> {
    source: S,
    state: DatasetState,
}

impl<S: RecordSource> DatasetBuilder<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            state: DatasetState::Uninitialized,
        }
    }

    pub fn stage(&self) -> DatasetStage {
        self.state.stage()
    }

    pub fn state(&self) -> &DatasetState {
        &self.state
    }

    pub fn into_state(self) -> DatasetState {
        self.state
    }

    fn precedence(&self, operation: &'static str, required: DatasetStage) -> DatasetError {
        DatasetError::Precedence {
            operation,
            required,
            current: self.stage(),
        }
    }

    /// Loads records and assembles the feature matrix for `feature_set`.
    ///
    /// Only records carrying the descriptor families the feature set needs are
    /// kept, and of those only the ones whose label and selected feature values
    /// are all finite. Both exclusions are counted in [`FeaturizedData::excluded`].
    /// Custom selections are required for [`FeatureSet::Custom`] and ignored
    /// (with a warning) otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError::Precedence`] unless the builder is uninitialized,
    /// [`DatasetError::InvalidConfiguration`] when a custom selection is missing or
    /// empty, [`DatasetError::Feature`] for unknown names, and
    /// [`DatasetError::Empty`] when no record qualifies.
    #[instrument(skip_all, name = "featurize", fields(feature_set = %feature_set))]
    pub fn featurize(
        &mut self,
        feature_set: FeatureSet,
        custom_2d: Option<&NameSelection>,
        custom_3d: Option<&NameSelection>,
    ) -> Result<(), DatasetError> {
        if self.stage() != DatasetStage::Uninitialized {
            return Err(self.precedence("featurize", DatasetStage::Uninitialized));
        }

        let columns = match feature_set {
            FeatureSet::Custom => {
                let (Some(custom_2d), Some(custom_3d)) = (custom_2d, custom_3d) else {
                    return Err(DatasetError::InvalidConfiguration(
                        "custom feature set requires both custom_2d and custom_3d".to_string(),
                    ));
                };
                let columns = assembler::custom_columns(custom_2d, custom_3d)?;
                if columns.is_empty() {
                    return Err(DatasetError::InvalidConfiguration(
                        "custom feature set selects no columns".to_string(),
                    ));
                }
                Some(columns)
            }
            _ => {
                if custom_2d.is_some() || custom_3d.is_some() {
                    warn!(
                        "Custom descriptor selections are ignored for feature set '{}'.",
                        feature_set
                    );
                }
                match feature_set {
                    FeatureSet::Mqn => Some((0..MQN_COUNT).collect()),
                    FeatureSet::Md3d => Some((MQN_COUNT..FEATURE_COUNT).collect()),
                    FeatureSet::Combined => Some((0..FEATURE_COUNT).collect()),
                    _ => None,
                }
            }
        };

        let records = self.source.load()?;
        let total = records.len();
        let mut excluded = Exclusions::default();
        let usable: Vec<FeatureRecord> = records
            .into_iter()
            .filter(|r| {
                if !has_required_descriptors(r, feature_set) {
                    excluded.missing_descriptors += 1;
                    false
                } else if !has_finite_values(r, columns.as_deref()) {
                    excluded.non_finite += 1;
                    false
                } else {
                    true
                }
            })
            .collect();
        if excluded.missing_descriptors > 0 {
            info!(
                "Excluded {} of {} records lacking descriptors for feature set '{}'.",
                excluded.missing_descriptors, total, feature_set
            );
        }
        if excluded.non_finite > 0 {
            warn!(
                "Excluded {} of {} records with a non-finite label or feature value.",
                excluded.non_finite, total
            );
        }
        if usable.is_empty() {
            return Err(DatasetError::Empty(format!(
                "no records available for feature set '{}'",
                feature_set
            )));
        }

        let mut data = match columns {
            None => mz_features(usable),
            Some(columns) => descriptor_features(feature_set, usable, &columns)?,
        };
        data.excluded = excluded;
        info!(
            n = data.n_rows(),
            n_features = data.n_features(),
            n_parent = data.n_parent(),
            n_metab = data.n_metab(),
            "Featurized dataset."
        );
        self.state = DatasetState::Featurized(data);
        Ok(())
    }

    /// Partitions rows into train and test sets stratified on the label quartiles.
    #[instrument(skip(self), name = "split")]
    pub fn split(&mut self, test_fraction: f64, seed: u64) -> Result<(), DatasetError> {
        let split = match &self.state {
            DatasetState::Featurized(data) => {
                let classes = stratify(data.y.as_slice())?;
                stratified_shuffle_split(&classes, test_fraction, seed)?
            }
            _ => return Err(self.precedence("split", DatasetStage::Featurized)),
        };
        info!(
            n_train = split.train.len(),
            n_test = split.test.len(),
            "Split dataset."
        );
        self.state = match std::mem::take(&mut self.state) {
            DatasetState::Featurized(data) => DatasetState::Split { data, split },
            other => other,
        };
        Ok(())
    }

    /// Fits a standard scaler on the training rows and applies it to both partitions.
    #[instrument(skip_all, name = "scale")]
    pub fn scale(&mut self) -> Result<(), DatasetError> {
        let scaled = match &self.state {
            DatasetState::Split { data, split } => {
                let x_train = data.rows(&split.train);
                let x_test = data.rows(&split.test);
                let scaler = StandardScaler::fit(&x_train, &data.feature_names)?;
                ScaledData {
                    x_train: scaler.transform(&x_train)?,
                    x_test: scaler.transform(&x_test)?,
                    scaler,
                }
            }
            _ => return Err(self.precedence("scale", DatasetStage::Split)),
        };
        debug!(columns = scaled.scaler.n_features(), "Scaled train and test features.");
        self.state = match std::mem::take(&mut self.state) {
            DatasetState::Split { data, split } => DatasetState::Scaled {
                data,
                split,
                scaled,
            },
            other => other,
        };
        Ok(())
    }

    fn data(&self, operation: &'static str) -> Result<&FeaturizedData, DatasetError> {
        self.state
            .data()
            .ok_or_else(|| self.precedence(operation, DatasetStage::Featurized))
    }

    fn split_indices(&self, operation: &'static str) -> Result<&SplitIndices, DatasetError> {
        self.state
            .split()
            .ok_or_else(|| self.precedence(operation, DatasetStage::Split))
    }

    fn scaled(&self, operation: &'static str) -> Result<&ScaledData, DatasetError> {
        self.state
            .scaled()
            .ok_or_else(|| self.precedence(operation, DatasetStage::Scaled))
    }

    pub fn feature_set(&self) -> Result<FeatureSet, DatasetError> {
        Ok(self.data("read the feature set of")?.feature_set)
    }

    pub fn n(&self) -> Result<usize, DatasetError> {
        Ok(self.data("count rows of")?.n_rows())
    }

    pub fn n_features(&self) -> Result<usize, DatasetError> {
        Ok(self.data("count features of")?.n_features())
    }

    pub fn n_parent(&self) -> Result<usize, DatasetError> {
        Ok(self.data("count parent compounds of")?.n_parent())
    }

    pub fn n_metab(&self) -> Result<usize, DatasetError> {
        Ok(self.data("count metabolites of")?.n_metab())
    }

    /// Records dropped by `featurize`, by reason.
    pub fn excluded(&self) -> Result<Exclusions, DatasetError> {
        Ok(self.data("count excluded records of")?.excluded)
    }

    pub fn feature_names(&self) -> Result<&[String], DatasetError> {
        Ok(&self.data("read feature names of")?.feature_names)
    }

    pub fn x(&self) -> Result<&DMatrix<f64>, DatasetError> {
        Ok(&self.data("read features of")?.x)
    }

    pub fn y(&self) -> Result<&DVector<f64>, DatasetError> {
        Ok(&self.data("read labels of")?.y)
    }

    pub fn meta(&self) -> Result<&[RecordMeta], DatasetError> {
        Ok(&self.data("read metadata of")?.meta)
    }

    pub fn train_indices(&self) -> Result<&[usize], DatasetError> {
        Ok(&self.split_indices("read training rows of")?.train)
    }

    pub fn test_indices(&self) -> Result<&[usize], DatasetError> {
        Ok(&self.split_indices("read test rows of")?.test)
    }

    pub fn n_train(&self) -> Result<usize, DatasetError> {
        Ok(self.train_indices()?.len())
    }

    pub fn n_test(&self) -> Result<usize, DatasetError> {
        Ok(self.test_indices()?.len())
    }

    /// Unscaled training features.
    pub fn x_train(&self) -> Result<DMatrix<f64>, DatasetError> {
        let split = self.split_indices("read training features of")?;
        Ok(self.data("read training features of")?.rows(&split.train))
    }

    pub fn y_train(&self) -> Result<DVector<f64>, DatasetError> {
        let split = self.split_indices("read training labels of")?;
        Ok(self.data("read training labels of")?.labels(&split.train))
    }

    /// Unscaled test features.
    pub fn x_test(&self) -> Result<DMatrix<f64>, DatasetError> {
        let split = self.split_indices("read test features of")?;
        Ok(self.data("read test features of")?.rows(&split.test))
    }

    pub fn y_test(&self) -> Result<DVector<f64>, DatasetError> {
        let split = self.split_indices("read test labels of")?;
        Ok(self.data("read test labels of")?.labels(&split.test))
    }

    pub fn x_train_scaled(&self) -> Result<&DMatrix<f64>, DatasetError> {
        Ok(&self.scaled("read scaled training features of")?.x_train)
    }

    pub fn x_test_scaled(&self) -> Result<&DMatrix<f64>, DatasetError> {
        Ok(&self.scaled("read scaled test features of")?.x_test)
    }

    pub fn scaler(&self) -> Result<&StandardScaler, DatasetError> {
        Ok(&self.scaled("read the scaler of")?.scaler)
    }

    /// Applies the fitted scaler to an external feature vector.
    pub fn transform(&self, features: &[f64]) -> Result<Vec<f64>, DatasetError> {
        self.scaler()?.transform_row(features)
    }
}

fn has_required_descriptors(record: &FeatureRecord, feature_set: FeatureSet) -> bool {
    (!feature_set.needs_mqn() || record.mqn.is_some())
        && (!feature_set.needs_md3d() || record.md3d.is_some())
}

/// `columns` is `None` for the m/z baseline.
fn has_finite_values(record: &FeatureRecord, columns: Option<&[usize]>) -> bool {
    if !record.ccs.is_finite() {
        return false;
    }
    match columns {
        None => record.meta.mz.is_finite(),
        Some(columns) => columns
            .iter()
            .all(|&column| descriptor_value(record, column).is_none_or(f64::is_finite)),
    }
}

fn descriptor_value(record: &FeatureRecord, column: usize) -> Option<f64> {
    if column < MQN_COUNT {
        record.mqn.as_ref()?.get(column).copied()
    } else {
        record
            .md3d
            .and_then(|d| d.to_array().get(column - MQN_COUNT).copied())
    }
}

fn mz_features(records: Vec<FeatureRecord>) -> FeaturizedData {
    let n = records.len();
    let mut x = DMatrix::zeros(n, 1);
    let mut y = DVector::zeros(n);
    let mut meta = Vec::with_capacity(n);
    for (i, record) in records.into_iter().enumerate() {
        x[(i, 0)] = record.meta.mz;
        y[i] = record.ccs;
        meta.push(record.meta);
    }
    FeaturizedData {
        feature_set: FeatureSet::Mz,
        feature_names: vec![MZ_FEATURE.to_string()],
        x,
        y,
        meta,
        excluded: Exclusions::default(),
    }
}

fn descriptor_features(
    feature_set: FeatureSet,
    records: Vec<FeatureRecord>,
    columns: &[usize],
) -> Result<FeaturizedData, DatasetError> {
    let n = records.len();
    let mut x = DMatrix::zeros(n, columns.len());
    let mut y = DVector::zeros(n);
    let mut meta = Vec::with_capacity(n);
    for (i, record) in records.into_iter().enumerate() {
        // families the feature set does not read are zero-filled
        let md3d = record
            .md3d
            .map(|d| d.to_array())
            .unwrap_or([0.0; MD3D_COUNT]);
        let full = match &record.mqn {
            Some(mqn) => assembler::assemble(mqn, &md3d)?,
            None => assembler::assemble(&[0.0; MQN_COUNT], &md3d)?,
        };
        for (j, &column) in columns.iter().enumerate() {
            x[(i, j)] = full[column];
        }
        y[i] = record.ccs;
        meta.push(record.meta);
    }
    Ok(FeaturizedData {
        feature_set,
        feature_names: assembler::column_names(columns),
        x,
        y,
        meta,
        excluded: Exclusions::default(),
    })
}

/// Runs featurize, split and scale for `config` and returns the finished builder.
#[instrument(skip_all, name = "dataset_workflow", fields(feature_set = %config.feature_set))]
pub fn prepare<S: RecordSource>(
    source: S,
    config: &DatasetConfig,
    reporter: &ProgressReporter,
) -> Result<DatasetBuilder<S>, DatasetError> {
    let mut builder = DatasetBuilder::new(source);

    reporter.report(Progress::StepStart {
        step: DatasetStep::Featurize,
    });
    builder.featurize(
        config.feature_set,
        config.custom_2d.as_ref(),
        config.custom_3d.as_ref(),
    )?;
    let excluded = builder.excluded()?;
    if excluded.total() > 0 {
        reporter.report(Progress::Message(format!(
            "Excluded {} records ({} missing descriptors, {} non-finite values)",
            excluded.total(),
            excluded.missing_descriptors,
            excluded.non_finite
        )));
    }
    reporter.report(Progress::StepFinish {
        step: DatasetStep::Featurize,
    });

    reporter.report(Progress::StepStart {
        step: DatasetStep::Split,
    });
    builder.split(config.test_fraction, config.seed)?;
    reporter.report(Progress::StepFinish {
        step: DatasetStep::Split,
    });

    reporter.report(Progress::StepStart {
        step: DatasetStep::Scale,
    });
    builder.scale()?;
    reporter.report(Progress::StepFinish {
        step: DatasetStep::Scale,
    });

    let (n_train, n_test) = (builder.n_train()?, builder.n_test()?);
    info!(n_train, n_test, "Dataset preparation finished.");
    Ok(builder)
}
