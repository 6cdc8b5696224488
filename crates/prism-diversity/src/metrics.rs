//! Vector distance metrics and pairwise distance matrices.

use ndarray::{Array2, ArrayView1, ArrayView2};
use prism_core::{PrismError, Result, VectorMetric};

/// Distance between two equal-length feature vectors.
pub fn vector_distance(metric: VectorMetric, u: ArrayView1<'_, f64>, v: ArrayView1<'_, f64>) -> f64 {
    let pairs = || u.iter().zip(v.iter());
    match metric {
        VectorMetric::Euclidean => pairs().map(|(x, y)| (x - y).powi(2)).sum::<f64>().sqrt(),
        VectorMetric::SqEuclidean => pairs().map(|(x, y)| (x - y).powi(2)).sum(),
        VectorMetric::Cityblock => pairs().map(|(x, y)| (x - y).abs()).sum(),
        VectorMetric::Chebyshev => pairs().map(|(x, y)| (x - y).abs()).fold(0.0, f64::max),
        VectorMetric::Minkowski { p } => pairs()
            .map(|(x, y)| (x - y).abs().powf(p))
            .sum::<f64>()
            .powf(1.0 / p),
        VectorMetric::Cosine => 1.0 - cosine_similarity(u, v),
        VectorMetric::Correlation => {
            let mu = u.mean().unwrap_or(0.0);
            let mv = v.mean().unwrap_or(0.0);
            let cu = u.mapv(|x| x - mu);
            let cv = v.mapv(|x| x - mv);
            1.0 - cosine_similarity(cu.view(), cv.view())
        }
        VectorMetric::Canberra => pairs()
            .map(|(x, y)| {
                let denom = x.abs() + y.abs();
                if denom == 0.0 {
                    0.0
                } else {
                    (x - y).abs() / denom
                }
            })
            .sum(),
        VectorMetric::BrayCurtis => {
            let (num, denom) = pairs().fold((0.0, 0.0), |(n, d), (x, y)| {
                (n + (x - y).abs(), d + (x + y).abs())
            });
            if denom == 0.0 {
                0.0
            } else {
                num / denom
            }
        }
    }
}

/// Cosine similarity. Returns 0.0 if either vector is the zero vector.
fn cosine_similarity(u: ArrayView1<'_, f64>, v: ArrayView1<'_, f64>) -> f64 {
    let denom = u.dot(&u).sqrt() * v.dot(&v).sqrt();
    if denom == 0.0 {
        return 0.0;
    }
    u.dot(&v) / denom
}

/// Symmetric within-collection distance matrix with a zero diagonal.
pub fn pairwise(features: ArrayView2<'_, f64>, metric: VectorMetric) -> Array2<f64> {
    let n = features.nrows();
    let mut dist = Array2::<f64>::zeros((n, n));
    for i in 0..n {
        for j in (i + 1)..n {
            let d = vector_distance(metric, features.row(i), features.row(j));
            dist[[i, j]] = d;
            dist[[j, i]] = d;
        }
    }
    dist
}

/// Cross distance matrix, `a.nrows() x b.nrows()`.
pub fn cross(
    a: ArrayView2<'_, f64>,
    b: ArrayView2<'_, f64>,
    metric: VectorMetric,
) -> Result<Array2<f64>> {
    if a.ncols() != b.ncols() {
        return Err(PrismError::numerical(format!(
            "feature length mismatch: {} vs {}",
            a.ncols(),
            b.ncols()
        )));
    }
    Ok(Array2::from_shape_fn((a.nrows(), b.nrows()), |(i, j)| {
        vector_distance(metric, a.row(i), b.row(j))
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::{array, Array1};

    fn d(metric: VectorMetric, u: Array1<f64>, v: Array1<f64>) -> f64 {
        vector_distance(metric, u.view(), v.view())
    }

    #[test]
    fn basic_metrics() {
        let u = array![0.0, 0.0];
        let v = array![3.0, 4.0];
        assert_relative_eq!(d(VectorMetric::Euclidean, u.clone(), v.clone()), 5.0);
        assert_relative_eq!(d(VectorMetric::SqEuclidean, u.clone(), v.clone()), 25.0);
        assert_relative_eq!(d(VectorMetric::Cityblock, u.clone(), v.clone()), 7.0);
        assert_relative_eq!(d(VectorMetric::Chebyshev, u.clone(), v.clone()), 4.0);
        assert_relative_eq!(
            d(VectorMetric::Minkowski { p: 1.0 }, u.clone(), v.clone()),
            7.0,
            epsilon = 1e-12
        );
        assert_relative_eq!(
            d(VectorMetric::Minkowski { p: 2.0 }, u, v),
            5.0,
            epsilon = 1e-12
        );
    }

    #[test]
    fn angular_metrics() {
        let u = array![1.0, 0.0];
        let v = array![0.0, 1.0];
        assert_relative_eq!(d(VectorMetric::Cosine, u.clone(), v), 1.0);
        assert_relative_eq!(d(VectorMetric::Cosine, u.clone(), u * 3.0), 0.0, epsilon = 1e-12);

        let a = array![1.0, 2.0, 3.0];
        let b = array![2.0, 4.0, 6.0];
        assert_relative_eq!(d(VectorMetric::Correlation, a.clone(), b), 0.0, epsilon = 1e-12);
        let c = array![3.0, 2.0, 1.0];
        assert_relative_eq!(d(VectorMetric::Correlation, a, c), 2.0, epsilon = 1e-12);
    }

    #[test]
    fn ratio_metrics() {
        let u = array![1.0, 0.0, 2.0];
        let v = array![3.0, 0.0, 2.0];
        // |1-3|/(1+3) + 0 + 0
        assert_relative_eq!(d(VectorMetric::Canberra, u.clone(), v.clone()), 0.5);
        // (2 + 0 + 0) / (4 + 0 + 4)
        assert_relative_eq!(d(VectorMetric::BrayCurtis, u, v), 0.25);
    }

    #[test]
    fn pairwise_is_symmetric_with_zero_diagonal() {
        let features = array![[0.0, 1.0], [2.0, 3.0], [5.0, -1.0]];
        let dist = pairwise(features.view(), VectorMetric::Euclidean);
        assert_eq!(dist.dim(), (3, 3));
        for i in 0..3 {
            assert_eq!(dist[[i, i]], 0.0);
            for j in 0..3 {
                assert_eq!(dist[[i, j]], dist[[j, i]]);
            }
        }
    }

    #[test]
    fn cross_rejects_mismatched_features() {
        let a = array![[0.0, 1.0]];
        let b = array![[0.0, 1.0, 2.0]];
        assert!(cross(a.view(), b.view(), VectorMetric::Cityblock).is_err());

        let c = array![[1.0, 1.0], [0.0, 0.0]];
        let m = cross(a.view(), c.view(), VectorMetric::Cityblock).unwrap();
        assert_eq!(m.dim(), (1, 2));
        assert_relative_eq!(m[[0, 0]], 1.0);
        assert_relative_eq!(m[[0, 1]], 1.0);
    }
}
