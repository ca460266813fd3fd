use crate::core::descriptors::md3d::DescriptorError;
use crate::core::models::structure::{AtomicStructure, CenteredGeometry};
use nalgebra::{DVector, Matrix3, Matrix3xX, SymmetricEigen, Vector3};
use std::fmt;
use tracing::trace;

/// Upper bound on QR sweeps for a 3x3 symmetric eigendecomposition. Real inputs
/// converge in a handful of sweeps; hitting this limit signals degenerate data.
const MAX_EIGEN_ITERATIONS: usize = 1000;

/// Which of the two diagonalizations in [`principal_moments`] failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagonalizationPass {
    /// Diagonalization of the centered structure, used to find the principal axes.
    Alignment,
    /// Diagonalization of the aligned structure, yielding the moments.
    Moments,
}

impl fmt::Display for DiagonalizationPass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagonalizationPass::Alignment => write!(f, "alignment"),
            DiagonalizationPass::Moments => write!(f, "moments"),
        }
    }
}

/// Eigenvalues in ascending order with the matching eigenvectors as columns.
#[derive(Debug, Clone, PartialEq)]
pub struct PrincipalAxes {
    pub moments: Vector3<f64>,
    pub axes: Matrix3<f64>,
}

/// Translates a structure so its mass-weighted centroid is at the origin.
pub fn center_on_mass(structure: &AtomicStructure) -> CenteredGeometry {
    let coords = structure.coordinates();
    let masses = structure.masses();
    let center_of_mass: Vector3<f64> = (coords * masses) / structure.total_mass();

    let mut centered = coords.clone();
    for mut column in centered.column_iter_mut() {
        column -= &center_of_mass;
    }
    CenteredGeometry::new(centered, masses.clone(), center_of_mass)
}

/// Computes the inertia tensor of point masses about the origin.
///
/// Diagonal entries are `sum(m * (b^2 + c^2))` over the two perpendicular axes;
/// off-diagonal entries are `-sum(m * a * b)`. Each off-diagonal sum is computed
/// once and written to both halves, so the result is exactly symmetric.
pub fn inertia_tensor(coords: &Matrix3xX<f64>, masses: &DVector<f64>) -> Matrix3<f64> {
    let (mut ixx, mut iyy, mut izz) = (0.0, 0.0, 0.0);
    let (mut ixy, mut ixz, mut iyz) = (0.0, 0.0, 0.0);
    for (p, &m) in coords.column_iter().zip(masses.iter()) {
        let (x, y, z) = (p[0], p[1], p[2]);
        ixx += m * (y * y + z * z);
        iyy += m * (x * x + z * z);
        izz += m * (x * x + y * y);
        ixy -= m * x * y;
        ixz -= m * x * z;
        iyz -= m * y * z;
    }
    Matrix3::new(
        ixx, ixy, ixz, //
        ixy, iyy, iyz, //
        ixz, iyz, izz,
    )
}

/// Diagonalizes a symmetric tensor, returning eigenpairs sorted by ascending eigenvalue.
///
/// # Errors
///
/// Returns [`DescriptorError::EigenNotConverged`] if the iterative solver does not
/// converge, or [`DescriptorError::NonFinite`] if the tensor holds NaN or infinity.
pub fn principal_axes(
    tensor: &Matrix3<f64>,
    pass: DiagonalizationPass,
) -> Result<PrincipalAxes, DescriptorError> {
    if tensor.iter().any(|v| !v.is_finite()) {
        return Err(DescriptorError::NonFinite {
            what: "inertia tensor",
        });
    }
    let eigen = SymmetricEigen::try_new(*tensor, f64::EPSILON, MAX_EIGEN_ITERATIONS)
        .ok_or(DescriptorError::EigenNotConverged { pass })?;

    let mut order = [0usize, 1, 2];
    order.sort_by(|&a, &b| eigen.eigenvalues[a].total_cmp(&eigen.eigenvalues[b]));

    let moments = Vector3::new(
        eigen.eigenvalues[order[0]],
        eigen.eigenvalues[order[1]],
        eigen.eigenvalues[order[2]],
    );
    let axes = Matrix3::from_columns(&[
        eigen.eigenvectors.column(order[0]).into_owned(),
        eigen.eigenvectors.column(order[1]).into_owned(),
        eigen.eigenvectors.column(order[2]).into_owned(),
    ]);
    Ok(PrincipalAxes { moments, axes })
}

/// Rotates centered coordinates into the principal-axis frame of their inertia tensor.
///
/// Each atom position `p` becomes `A^T p`, where the columns of `A` are the principal
/// axes in ascending-moment order.
pub fn align_to_principal_axes(
    geometry: &CenteredGeometry,
) -> Result<Matrix3xX<f64>, DescriptorError> {
    let tensor = inertia_tensor(geometry.coordinates(), geometry.masses());
    let principal = principal_axes(&tensor, DiagonalizationPass::Alignment)?;
    Ok(principal.axes.transpose() * geometry.coordinates())
}

/// Computes the principal moments of inertia `[PMI1, PMI2, PMI3]` in ascending order.
///
/// The structure is first aligned to its principal axes, then the tensor of the aligned
/// coordinates is diagonalized a second time. The second pass removes any dependence
/// on the ordering and sign of the eigenvectors returned by the first.
pub fn principal_moments(geometry: &CenteredGeometry) -> Result<[f64; 3], DescriptorError> {
    let aligned = align_to_principal_axes(geometry)?;
    let tensor = inertia_tensor(&aligned, geometry.masses());
    let principal = principal_axes(&tensor, DiagonalizationPass::Moments)?;
    trace!(moments = ?principal.moments, "Principal moments computed.");
    Ok([
        principal.moments[0],
        principal.moments[1],
        principal.moments[2],
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::io::xyzmq::XyzmqFile;
    use nalgebra::Rotation3;

    const TOL: f64 = 1e-9;

    fn structure(text: &str) -> AtomicStructure {
        XyzmqFile::parse_str(text).unwrap()
    }

    fn asymmetric_structure() -> AtomicStructure {
        structure(
            "0.0 0.0 0.0 12.011 0\n\
             1.54 0.0 0.0 12.011 0\n\
             2.1 1.4 0.3 15.999 0\n\
             -0.6 -0.9 0.8 1.008 0\n\
             3.0 -1.1 -1.7 14.007 0\n",
        )
    }

    fn transformed(original: &AtomicStructure, rotation: &Rotation3<f64>, shift: Vector3<f64>) -> AtomicStructure {
        let mut coords = rotation.matrix() * original.coordinates();
        for mut column in coords.column_iter_mut() {
            column += &shift;
        }
        AtomicStructure::new(coords, original.masses().clone(), original.charges().clone()).unwrap()
    }

    #[test]
    fn centered_geometry_has_zero_weighted_centroid() {
        let geometry = center_on_mass(&asymmetric_structure());
        let weighted: Vector3<f64> = geometry.coordinates() * geometry.masses();
        assert!(weighted.norm() < TOL, "weighted centroid {:?}", weighted);
    }

    #[test]
    fn center_of_mass_is_mass_weighted() {
        let geometry = center_on_mass(&structure("0 0 0 3.0 0\n4 0 0 1.0 0\n"));
        assert!((geometry.center_of_mass() - Vector3::new(1.0, 0.0, 0.0)).norm() < TOL);
        assert!((geometry.coordinates()[(0, 0)] + 1.0).abs() < TOL);
        assert!((geometry.coordinates()[(0, 1)] - 3.0).abs() < TOL);
    }

    #[test]
    fn inertia_tensor_is_exactly_symmetric() {
        let geometry = center_on_mass(&asymmetric_structure());
        let tensor = inertia_tensor(geometry.coordinates(), geometry.masses());
        for i in 0..3 {
            for j in 0..3 {
                assert_eq!(tensor[(i, j)], tensor[(j, i)]);
            }
        }
    }

    #[test]
    fn inertia_tensor_of_single_atom_at_origin_is_zero() {
        let geometry = center_on_mass(&structure("5 -3 2 1.0 0\n"));
        let tensor = inertia_tensor(geometry.coordinates(), geometry.masses());
        assert_eq!(tensor, Matrix3::zeros());
    }

    #[test]
    fn principal_axes_are_sorted_ascending_and_orthonormal() {
        let tensor = Matrix3::new(5.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 3.0);
        let principal = principal_axes(&tensor, DiagonalizationPass::Alignment).unwrap();

        assert!((principal.moments - Vector3::new(1.0, 3.0, 5.0)).norm() < TOL);
        let identity = principal.axes.transpose() * principal.axes;
        assert!((identity - Matrix3::identity()).norm() < TOL);
        assert!((principal.axes.column(0).abs() - Vector3::y()).norm() < TOL);
        assert!((principal.axes.column(2).abs() - Vector3::x()).norm() < TOL);
    }

    #[test]
    fn principal_axes_rejects_non_finite_tensor() {
        let mut tensor = Matrix3::identity();
        tensor[(0, 1)] = f64::NAN;
        tensor[(1, 0)] = f64::NAN;
        let result = principal_axes(&tensor, DiagonalizationPass::Moments);
        assert!(matches!(result, Err(DescriptorError::NonFinite { .. })));
    }

    #[test]
    fn aligned_tensor_is_diagonal() {
        let geometry = center_on_mass(&asymmetric_structure());
        let aligned = align_to_principal_axes(&geometry).unwrap();
        let tensor = inertia_tensor(&aligned, geometry.masses());
        let scale = tensor.norm();
        for i in 0..3 {
            for j in 0..3 {
                if i != j {
                    assert!(tensor[(i, j)].abs() < 1e-9 * scale);
                }
            }
        }
    }

    #[test]
    fn two_atom_rod_has_moments_zero_two_two() {
        let geometry = center_on_mass(&structure("-1 0 0 1.0 0\n1 0 0 1.0 0\n"));
        let pmi = principal_moments(&geometry).unwrap();
        assert!(pmi[0].abs() < TOL);
        assert!((pmi[1] - 2.0).abs() < TOL);
        assert!((pmi[2] - 2.0).abs() < TOL);
    }

    #[test]
    fn moments_are_ordered_and_invariant_to_rigid_motion() {
        let original = asymmetric_structure();
        let reference = principal_moments(&center_on_mass(&original)).unwrap();
        assert!(reference[0] <= reference[1] && reference[1] <= reference[2]);

        let rotation = Rotation3::from_euler_angles(0.3, -1.1, 2.4);
        let moved = transformed(&original, &rotation, Vector3::new(10.0, -4.0, 7.5));
        let moved_pmi = principal_moments(&center_on_mass(&moved)).unwrap();
        for k in 0..3 {
            assert!(
                (reference[k] - moved_pmi[k]).abs() < 1e-8 * reference[2],
                "moment {} differs: {} vs {}",
                k,
                reference[k],
                moved_pmi[k]
            );
        }
    }

    #[test]
    fn mirror_image_has_identical_moments() {
        let original = asymmetric_structure();
        let mut mirrored_coords = original.coordinates().clone();
        mirrored_coords.row_mut(2).neg_mut();
        let mirrored = AtomicStructure::new(
            mirrored_coords,
            original.masses().clone(),
            original.charges().clone(),
        )
        .unwrap();

        let a = principal_moments(&center_on_mass(&original)).unwrap();
        let b = principal_moments(&center_on_mass(&mirrored)).unwrap();
        for k in 0..3 {
            assert!((a[k] - b[k]).abs() < 1e-8 * a[2]);
        }
    }
}
