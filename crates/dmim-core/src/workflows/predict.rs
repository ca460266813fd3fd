use crate::core::descriptors::assembler::{self, FeatureError, NameSelection};
use crate::core::descriptors::md3d::{DescriptorError, compute_3d_descriptors};
use crate::engine::error::DatasetError;
use crate::engine::scaling::StandardScaler;
use nalgebra::DMatrix;
use thiserror::Error;
use tracing::{debug, instrument};

#[derive(Debug, Error)]
pub enum PredictError {
    #[error("Compound {index}: {source}")]
    Descriptor {
        index: usize,
        source: DescriptorError,
    },
    #[error("Compound {index}: {source}")]
    Assembly { index: usize, source: FeatureError },
    #[error("Invalid feature selection: {0}")]
    Selection(#[from] FeatureError),
    #[error("Scaling failed: {0}")]
    Scaling(#[from] DatasetError),
}

/// A compound that has no measured label: its MQN vector and its xyzmq structure.
#[derive(Debug, Clone, PartialEq)]
pub struct NovelCompound {
    pub mqn: Vec<f64>,
    pub structure: String,
}

/// Builds the feature matrix for novel compounds with a custom selection.
///
/// Column order is the 2D selection followed by the 3D selection, the same as a
/// custom dataset built with these selections. Unlike a training batch, a compound
/// whose structure cannot be featurized is an error rather than a skipped row.
#[instrument(skip_all, name = "featurize_novel", fields(n = compounds.len()))]
pub fn featurize_novel(
    compounds: &[NovelCompound],
    custom_2d: &NameSelection,
    custom_3d: &NameSelection,
) -> Result<DMatrix<f64>, PredictError> {
    let columns = assembler::custom_columns(custom_2d, custom_3d)?;
    feature_matrix(compounds, &columns)
}

/// [`featurize_novel`] followed by a fitted scaler's transform.
///
/// The selected column names must equal the scaler's feature names in order.
pub fn featurize_and_scale(
    compounds: &[NovelCompound],
    custom_2d: &NameSelection,
    custom_3d: &NameSelection,
    scaler: &StandardScaler,
) -> Result<DMatrix<f64>, PredictError> {
    let columns = assembler::custom_columns(custom_2d, custom_3d)?;
    scaler.check_feature_names(&assembler::column_names(&columns))?;
    let x = feature_matrix(compounds, &columns)?;
    Ok(scaler.transform(&x)?)
}

fn feature_matrix(
    compounds: &[NovelCompound],
    columns: &[usize],
) -> Result<DMatrix<f64>, PredictError> {
    let mut x = DMatrix::zeros(compounds.len(), columns.len());
    for (index, compound) in compounds.iter().enumerate() {
        let md3d = compute_3d_descriptors(&compound.structure)
            .map_err(|source| PredictError::Descriptor { index, source })?;
        let full = assembler::assemble(&compound.mqn, &md3d.to_array())
            .map_err(|source| PredictError::Assembly { index, source })?;
        for (j, &column) in columns.iter().enumerate() {
            x[(index, j)] = full[column];
        }
    }
    debug!(columns = columns.len(), "Featurized novel compounds.");
    Ok(x)
}
