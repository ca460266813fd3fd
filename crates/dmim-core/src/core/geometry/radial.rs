use crate::core::models::structure::CenteredGeometry;

pub const RMD_BIN_COUNT: usize = 5;

/// Lower edges of the radial bins in Angstroms. The last bin is open-ended.
pub const RMD_BIN_LOWER_EDGES: [f64; RMD_BIN_COUNT] = [0.0, 2.0, 4.0, 6.0, 8.0];

/// Normalization widths of the radial bins in Angstroms. The open last bin is
/// normalized as if it ended at 20 A, the upper edge used when the descriptor
/// values in existing archives were generated.
pub const RMD_BIN_WIDTHS: [f64; RMD_BIN_COUNT] = [2.0, 2.0, 2.0, 2.0, 12.0];

/// Euclidean distance of every atom from the center of mass.
pub fn radial_distances(geometry: &CenteredGeometry) -> Vec<f64> {
    geometry
        .coordinates()
        .column_iter()
        .map(|p| p.norm())
        .collect()
}

/// Index of the bin a (non-negative) distance falls into.
pub fn bin_index(distance: f64) -> usize {
    RMD_BIN_LOWER_EDGES
        .iter()
        .rposition(|&edge| distance >= edge)
        .unwrap_or(0)
}

/// Density-normalized histogram of radial distances.
///
/// Each bin holds `count / (N * width)`, so `sum(density * width) == 1` and the
/// per-bin atom counts can be recovered as `density * N * width`.
pub fn radial_mass_distribution(distances: &[f64]) -> [f64; RMD_BIN_COUNT] {
    let mut counts = [0usize; RMD_BIN_COUNT];
    for &d in distances {
        counts[bin_index(d)] += 1;
    }
    let n = distances.len() as f64;
    let mut density = [0.0; RMD_BIN_COUNT];
    if distances.is_empty() {
        return density;
    }
    for (k, &count) in counts.iter().enumerate() {
        density[k] = count as f64 / (n * RMD_BIN_WIDTHS[k]);
    }
    density
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::geometry::inertia::center_on_mass;
    use crate::core::io::xyzmq::XyzmqFile;

    #[test]
    fn bin_edges_are_half_open() {
        assert_eq!(bin_index(0.0), 0);
        assert_eq!(bin_index(1.999), 0);
        assert_eq!(bin_index(2.0), 1);
        assert_eq!(bin_index(5.5), 2);
        assert_eq!(bin_index(6.0), 3);
        assert_eq!(bin_index(8.0), 4);
        assert_eq!(bin_index(150.0), 4);
    }

    #[test]
    fn single_atom_lands_in_first_bin() {
        let geometry = center_on_mass(&XyzmqFile::parse_str("0 0 0 1.0 0\n").unwrap());
        let distances = radial_distances(&geometry);
        assert_eq!(distances, vec![0.0]);
        assert_eq!(
            radial_mass_distribution(&distances),
            [0.5, 0.0, 0.0, 0.0, 0.0]
        );
    }

    #[test]
    fn symmetric_pair_is_one_angstrom_from_center() {
        let geometry =
            center_on_mass(&XyzmqFile::parse_str("-1 0 0 1.0 0\n1 0 0 1.0 0\n").unwrap());
        let distances = radial_distances(&geometry);
        assert!(distances.iter().all(|d| (d - 1.0).abs() < 1e-12));
        // both atoms share the first bin: 2 / (2 * 2)
        assert_eq!(
            radial_mass_distribution(&distances),
            [0.5, 0.0, 0.0, 0.0, 0.0]
        );
    }

    #[test]
    fn density_inverts_to_atom_counts() {
        let distances = [0.5, 1.0, 2.5, 3.9, 4.0, 7.2, 9.0, 25.0, 13.0];
        let density = radial_mass_distribution(&distances);
        let n = distances.len() as f64;

        assert!(density.iter().all(|&d| d >= 0.0));
        let counts: Vec<f64> = density
            .iter()
            .zip(RMD_BIN_WIDTHS)
            .map(|(d, w)| d * n * w)
            .collect();
        let expected = [2.0, 2.0, 1.0, 1.0, 3.0];
        for (c, e) in counts.iter().zip(expected) {
            assert!((c - e).abs() < 1e-12);
        }
        assert!((counts.iter().sum::<f64>() - n).abs() < 1e-12);
    }

    #[test]
    fn empty_distance_list_yields_zero_density() {
        assert_eq!(radial_mass_distribution(&[]), [0.0; RMD_BIN_COUNT]);
    }
}
