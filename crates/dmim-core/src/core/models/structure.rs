use nalgebra::{DVector, Matrix3xX, Vector3};
use thiserror::Error;

/// Errors raised when per-atom arrays do not describe a valid structure.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum StructureError {
    #[error("Structure contains no atoms")]
    Empty,
    #[error("Per-atom arrays differ in length (coordinates: {coordinates}, masses: {masses}, charges: {charges})")]
    LengthMismatch {
        coordinates: usize,
        masses: usize,
        charges: usize,
    },
    #[error("Atom {index} has non-positive mass {mass}")]
    NonPositiveMass { index: usize, mass: f64 },
}

/// A single 3D structure as parallel per-atom arrays.
///
/// Coordinates are stored column-wise (one column per atom) so that the
/// geometry routines can apply 3x3 rotations to the whole structure at once.
/// The struct is immutable once built; all arrays share the same length `N >= 1`.
#[derive(Debug, Clone, PartialEq)]
pub struct AtomicStructure {
    coordinates: Matrix3xX<f64>,
    masses: DVector<f64>,
    charges: DVector<f64>,
}

impl AtomicStructure {
    /// Builds a structure from parallel arrays, validating their lengths and masses.
    ///
    /// # Errors
    ///
    /// Returns [`StructureError`] if there are no atoms, if the arrays disagree in
    /// length, or if any mass is not strictly positive.
    pub fn new(
        coordinates: Matrix3xX<f64>,
        masses: DVector<f64>,
        charges: DVector<f64>,
    ) -> Result<Self, StructureError> {
        let n = coordinates.ncols();
        if n != masses.len() || n != charges.len() {
            return Err(StructureError::LengthMismatch {
                coordinates: n,
                masses: masses.len(),
                charges: charges.len(),
            });
        }
        if n == 0 {
            return Err(StructureError::Empty);
        }
        if let Some((index, &mass)) = masses.iter().enumerate().find(|(_, m)| !(**m > 0.0)) {
            return Err(StructureError::NonPositiveMass { index, mass });
        }
        Ok(Self {
            coordinates,
            masses,
            charges,
        })
    }

    /// Builds a structure from per-atom `(x, y, z, mass, charge)` rows.
    pub fn from_rows(rows: &[[f64; 5]]) -> Result<Self, StructureError> {
        let coordinates = Matrix3xX::from_iterator(
            rows.len(),
            rows.iter().flat_map(|r| [r[0], r[1], r[2]]),
        );
        let masses = DVector::from_iterator(rows.len(), rows.iter().map(|r| r[3]));
        let charges = DVector::from_iterator(rows.len(), rows.iter().map(|r| r[4]));
        Self::new(coordinates, masses, charges)
    }

    pub fn n_atoms(&self) -> usize {
        self.coordinates.ncols()
    }

    pub fn coordinates(&self) -> &Matrix3xX<f64> {
        &self.coordinates
    }

    pub fn masses(&self) -> &DVector<f64> {
        &self.masses
    }

    /// Partial charges. Not used by any descriptor yet.
    pub fn charges(&self) -> &DVector<f64> {
        &self.charges
    }

    pub fn total_mass(&self) -> f64 {
        self.masses.sum()
    }
}

/// Coordinates translated so that the mass-weighted centroid sits at the origin.
#[derive(Debug, Clone, PartialEq)]
pub struct CenteredGeometry {
    coordinates: Matrix3xX<f64>,
    masses: DVector<f64>,
    center_of_mass: Vector3<f64>,
}

impl CenteredGeometry {
    pub(crate) fn new(
        coordinates: Matrix3xX<f64>,
        masses: DVector<f64>,
        center_of_mass: Vector3<f64>,
    ) -> Self {
        Self {
            coordinates,
            masses,
            center_of_mass,
        }
    }

    pub fn n_atoms(&self) -> usize {
        self.coordinates.ncols()
    }

    pub fn coordinates(&self) -> &Matrix3xX<f64> {
        &self.coordinates
    }

    pub fn masses(&self) -> &DVector<f64> {
        &self.masses
    }

    /// The centroid that was subtracted, in the original coordinate frame.
    pub fn center_of_mass(&self) -> &Vector3<f64> {
        &self.center_of_mass
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_rows_builds_parallel_arrays() {
        let structure =
            AtomicStructure::from_rows(&[[1.0, 2.0, 3.0, 12.0, -0.5], [4.0, 5.0, 6.0, 1.0, 0.5]])
                .unwrap();

        assert_eq!(structure.n_atoms(), 2);
        assert_eq!(structure.coordinates().column(1), Vector3::new(4.0, 5.0, 6.0));
        assert_eq!(structure.masses().as_slice(), &[12.0, 1.0]);
        assert_eq!(structure.charges().as_slice(), &[-0.5, 0.5]);
        assert_eq!(structure.total_mass(), 13.0);
    }

    #[test]
    fn new_rejects_empty_structure() {
        let result = AtomicStructure::from_rows(&[]);
        assert_eq!(result, Err(StructureError::Empty));
    }

    #[test]
    fn new_rejects_mismatched_lengths() {
        let result = AtomicStructure::new(
            Matrix3xX::zeros(2),
            DVector::from_vec(vec![1.0]),
            DVector::from_vec(vec![0.0, 0.0]),
        );
        assert!(matches!(
            result,
            Err(StructureError::LengthMismatch {
                coordinates: 2,
                masses: 1,
                charges: 2
            })
        ));
    }

    #[test]
    fn new_rejects_zero_and_nan_masses() {
        let zero = AtomicStructure::from_rows(&[[0.0, 0.0, 0.0, 1.0, 0.0], [1.0, 0.0, 0.0, 0.0, 0.0]]);
        assert!(matches!(
            zero,
            Err(StructureError::NonPositiveMass { index: 1, .. })
        ));

        let nan = AtomicStructure::from_rows(&[[0.0, 0.0, 0.0, f64::NAN, 0.0]]);
        assert!(matches!(
            nan,
            Err(StructureError::NonPositiveMass { index: 0, .. })
        ));
    }
}
