//! Classical multidimensional scaling over precomputed distances.

use nalgebra::DMatrix;
use ndarray::{Array2, ArrayView2};
use prism_core::{PrismError, Projector, Result};

/// Classical (Torgerson) MDS.
///
/// Double-centres the squared distance matrix and embeds each item using
/// the leading eigenvectors scaled by the square roots of their
/// eigenvalues. Negative eigenvalues (non-Euclidean distances) contribute
/// zero-valued coordinates.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClassicalMds;

impl Projector for ClassicalMds {
    fn project(&self, distances: ArrayView2<'_, f64>, dims: usize) -> Result<Array2<f64>> {
        let n = distances.nrows();
        if distances.ncols() != n {
            return Err(PrismError::validation(format!(
                "projection needs a square matrix, got {}x{}",
                n,
                distances.ncols()
            )));
        }
        if distances.iter().any(|d| !d.is_finite()) {
            return Err(PrismError::numerical("distance matrix contains non-finite values"));
        }

        let mut coords = Array2::<f64>::zeros((n, dims));
        if n == 0 || dims == 0 {
            return Ok(coords);
        }

        let sq = distances.mapv(|d| d * d);
        let row_means: Vec<f64> = sq.rows().into_iter().map(|r| r.sum() / n as f64).collect();
        let grand_mean = row_means.iter().sum::<f64>() / n as f64;

        let centred = DMatrix::from_fn(n, n, |i, j| {
            -0.5 * (sq[[i, j]] - row_means[i] - row_means[j] + grand_mean)
        });
        let eig = centred.symmetric_eigen();

        let mut eigen_pairs: Vec<(f64, usize)> = eig
            .eigenvalues
            .iter()
            .enumerate()
            .map(|(i, &e)| (e, i))
            .collect();
        eigen_pairs.sort_by(|a, b| b.0.total_cmp(&a.0));

        for (axis, &(value, idx)) in eigen_pairs.iter().take(dims).enumerate() {
            if value <= 0.0 {
                continue;
            }
            let scale = value.sqrt();
            let vector = eig.eigenvectors.column(idx);
            for i in 0..n {
                coords[[i, axis]] = vector[i] * scale;
            }
        }

        Ok(coords)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    fn euclid(a: &[f64], b: &[f64]) -> f64 {
        a.iter().zip(b).map(|(x, y)| (x - y).powi(2)).sum::<f64>().sqrt()
    }

    #[test]
    fn recovers_planar_distances() {
        let points = [[0.0, 0.0], [3.0, 0.0], [0.0, 4.0], [3.0, 4.0]];
        let d = ndarray::Array2::from_shape_fn((4, 4), |(i, j)| euclid(&points[i], &points[j]));

        let coords = ClassicalMds.project(d.view(), 2).unwrap();
        assert_eq!(coords.dim(), (4, 2));
        for i in 0..4 {
            for j in 0..4 {
                let ci = coords.row(i).to_vec();
                let cj = coords.row(j).to_vec();
                assert_relative_eq!(euclid(&ci, &cj), d[[i, j]], epsilon = 1e-8);
            }
        }
    }

    #[test]
    fn extra_dimensions_are_zero() {
        let d = array![[0.0, 1.0], [1.0, 0.0]];
        let coords = ClassicalMds.project(d.view(), 3).unwrap();
        assert_relative_eq!((coords[[0, 0]] - coords[[1, 0]]).abs(), 1.0, epsilon = 1e-10);
        assert_relative_eq!(coords[[0, 2]], 0.0);
        assert_relative_eq!(coords[[1, 2]], 0.0);
    }

    #[test]
    fn rejects_bad_input() {
        let rect = array![[0.0, 1.0]];
        assert!(ClassicalMds.project(rect.view(), 2).is_err());
        let nan = array![[0.0, f64::NAN], [f64::NAN, 0.0]];
        assert!(ClassicalMds.project(nan.view(), 2).is_err());
    }
}
