use crate::core::geometry::inertia::{self, DiagonalizationPass};
use crate::core::geometry::radial::{self, RMD_BIN_COUNT};
use crate::core::io::xyzmq::{StructureParseError, XyzmqFile};
use crate::core::models::structure::AtomicStructure;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::names::MD3D_COUNT;

/// Failure to derive 3D descriptors for one structure.
///
/// These errors are local to a single record: batch callers count them and move on.
#[derive(Debug, Error)]
pub enum DescriptorError {
    #[error("Malformed structure: {0}")]
    Structure(#[from] StructureParseError),
    #[error("Inertia tensor eigendecomposition did not converge ({pass} pass)")]
    EigenNotConverged { pass: DiagonalizationPass },
    #[error("Non-finite value encountered in {what}")]
    NonFinite { what: &'static str },
}

/// The 3D shape descriptor vector of one structure.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Descriptor3D {
    /// Principal moments of inertia, ascending.
    pub pmi: [f64; 3],
    /// Density-normalized radial mass distribution.
    pub rmd: [f64; RMD_BIN_COUNT],
}

impl Descriptor3D {
    /// Flattens to canonical column order `pmi1, pmi2, pmi3, rmd02, rmd24, rmd46, rmd68, rmd8p`.
    pub fn to_array(&self) -> [f64; MD3D_COUNT] {
        let mut out = [0.0; MD3D_COUNT];
        out[..3].copy_from_slice(&self.pmi);
        out[3..].copy_from_slice(&self.rmd);
        out
    }

    pub fn from_array(values: [f64; MD3D_COUNT]) -> Self {
        let mut pmi = [0.0; 3];
        let mut rmd = [0.0; RMD_BIN_COUNT];
        pmi.copy_from_slice(&values[..3]);
        rmd.copy_from_slice(&values[3..]);
        Self { pmi, rmd }
    }

    pub fn is_finite(&self) -> bool {
        self.pmi.iter().chain(self.rmd.iter()).all(|v| v.is_finite())
    }
}

/// Computes the 3D descriptors of a parsed structure.
///
/// # Errors
///
/// Returns [`DescriptorError`] if either diagonalization fails or any intermediate
/// value is non-finite.
pub fn descriptors_for_structure(
    structure: &AtomicStructure,
) -> Result<Descriptor3D, DescriptorError> {
    let geometry = inertia::center_on_mass(structure);
    if geometry.coordinates().iter().any(|v| !v.is_finite()) {
        return Err(DescriptorError::NonFinite {
            what: "centered coordinates",
        });
    }
    let pmi = inertia::principal_moments(&geometry)?;
    let rmd = radial::radial_mass_distribution(&radial::radial_distances(&geometry));

    let descriptor = Descriptor3D { pmi, rmd };
    if !descriptor.is_finite() {
        return Err(DescriptorError::NonFinite {
            what: "descriptor vector",
        });
    }
    Ok(descriptor)
}

/// Parses an `xyzmq` text block and computes its 3D descriptors.
pub fn compute_3d_descriptors(text: &str) -> Result<Descriptor3D, DescriptorError> {
    let structure = XyzmqFile::parse_str(text)?;
    descriptors_for_structure(&structure)
}
