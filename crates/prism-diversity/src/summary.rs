//! Summary reducer.
//!
//! Collapses engine output into nearest/farthest neighbor lists, averages
//! of the nearest `k`, or returns it unreduced.

use ndarray::{Array1, ArrayView1};
use prism_core::{CalcMode, ComputedDistances, Distances, PrismError, Result};
use serde::Serialize;

/// One selected neighbor: column index and distance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Neighbor {
    pub index: usize,
    pub distance: f64,
}

/// Reducer output.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Summary {
    /// `all`: the engine output, untouched
    Unreduced(Distances),
    /// Nearest/farthest selection of a vector
    Neighbors(Vec<Neighbor>),
    /// Nearest/farthest selection of each matrix row
    RowNeighbors(Vec<Vec<Neighbor>>),
    /// Mean of the nearest `k` of a vector
    Mean(f64),
    /// Mean of the nearest `k` of each matrix row
    RowMeans(Array1<f64>),
}

impl Summary {
    /// Selected distances, flattened row by row.
    pub fn values(&self) -> Vec<f64> {
        match self {
            Summary::Unreduced(Distances::Matrix(m)) => m.iter().copied().collect(),
            Summary::Unreduced(Distances::Vector(v)) => v.to_vec(),
            Summary::Neighbors(ns) => ns.iter().map(|n| n.distance).collect(),
            Summary::RowNeighbors(rows) => rows.iter().flatten().map(|n| n.distance).collect(),
            Summary::Mean(m) => vec![*m],
            Summary::RowMeans(means) => means.to_vec(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Order {
    Ascending,
    Descending,
}

/// Reduces a distance matrix or vector.
///
/// When `within_dataset` is set, entry `(i, i)` of each matrix row is the
/// self comparison and is never selected. Rows with fewer than `k`
/// comparable entries yield all of them; a row with none averages to NaN.
/// Ties keep their original column order.
pub fn summarize(
    distances: &Distances,
    mode: CalcMode,
    k: usize,
    within_dataset: bool,
) -> Result<Summary> {
    if mode == CalcMode::All {
        return Ok(Summary::Unreduced(distances.clone()));
    }
    if k == 0 {
        return Err(PrismError::validation(format!(
            "'{}' needs at least one neighbor (k = 0)",
            mode
        )));
    }

    let order = match mode {
        CalcMode::Farthest => Order::Descending,
        _ => Order::Ascending,
    };

    let summary = match distances {
        Distances::Vector(v) => {
            let picked = select(v.view(), None, k, order);
            match mode {
                CalcMode::Average => Summary::Mean(mean(&picked)),
                _ => Summary::Neighbors(picked),
            }
        }
        Distances::Matrix(m) => {
            let rows: Vec<Vec<Neighbor>> = m
                .outer_iter()
                .enumerate()
                .map(|(i, row)| select(row, within_dataset.then_some(i), k, order))
                .collect();
            match mode {
                CalcMode::Average => Summary::RowMeans(rows.iter().map(|r| mean(r)).collect()),
                _ => Summary::RowNeighbors(rows),
            }
        }
    };
    Ok(summary)
}

/// Reduces engine output using its own within-dataset flag.
pub fn summarize_computed(computed: &ComputedDistances, mode: CalcMode, k: usize) -> Result<Summary> {
    summarize(&computed.distances, mode, k, computed.within_dataset)
}

fn select(row: ArrayView1<'_, f64>, skip: Option<usize>, k: usize, order: Order) -> Vec<Neighbor> {
    let mut candidates: Vec<Neighbor> = row
        .iter()
        .enumerate()
        .filter(|&(j, _)| Some(j) != skip)
        .map(|(index, &distance)| Neighbor { index, distance })
        .collect();

    // Stable sorts keep lower indices first among equal distances
    match order {
        Order::Ascending => candidates.sort_by(|a, b| a.distance.total_cmp(&b.distance)),
        Order::Descending => candidates.sort_by(|a, b| b.distance.total_cmp(&a.distance)),
    }
    candidates.truncate(k);
    candidates
}

fn mean(neighbors: &[Neighbor]) -> f64 {
    if neighbors.is_empty() {
        return f64::NAN;
    }
    neighbors.iter().map(|n| n.distance).sum::<f64>() / neighbors.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    #[test]
    fn average_of_three_nearest() {
        let v = Distances::Vector(array![0.1, 0.4, 0.2, 0.9, 0.05]);
        let summary = summarize(&v, CalcMode::Average, 3, false).unwrap();
        match summary {
            Summary::Mean(m) => assert_relative_eq!(m, (0.05 + 0.1 + 0.2) / 3.0, epsilon = 1e-12),
            other => panic!("unexpected summary {:?}", other),
        }
    }

    #[test]
    fn all_returns_input_untouched() {
        let m = Distances::Matrix(array![[0.0, 0.3], [0.3, 0.0]]);
        assert_eq!(
            summarize(&m, CalcMode::All, 5, true).unwrap(),
            Summary::Unreduced(m.clone())
        );
    }

    #[test]
    fn nearest_skips_self_in_within_matrix() {
        let m = Distances::Matrix(array![[0.0, 0.5, 0.2], [0.5, 0.0, 0.7], [0.2, 0.7, 0.0]]);
        let Summary::RowNeighbors(rows) = summarize(&m, CalcMode::Nearest, 1, true).unwrap() else {
            panic!("expected row neighbors");
        };
        assert_eq!(rows[0], vec![Neighbor { index: 2, distance: 0.2 }]);
        assert_eq!(rows[1], vec![Neighbor { index: 0, distance: 0.5 }]);
        assert_eq!(rows[2], vec![Neighbor { index: 0, distance: 0.2 }]);
    }

    #[test]
    fn farthest_orders_descending() {
        let v = Distances::Vector(array![0.1, 0.4, 0.2, 0.9]);
        let summary = summarize(&v, CalcMode::Farthest, 2, false).unwrap();
        assert_eq!(summary.values(), vec![0.9, 0.4]);
    }

    #[test]
    fn ties_keep_lowest_index_first() {
        let v = Distances::Vector(array![0.3, 0.1, 0.3, 0.1]);
        let Summary::Neighbors(near) = summarize(&v, CalcMode::Nearest, 3, false).unwrap() else {
            panic!("expected neighbors");
        };
        let idx: Vec<usize> = near.iter().map(|n| n.index).collect();
        assert_eq!(idx, vec![1, 3, 0]);

        let Summary::Neighbors(far) = summarize(&v, CalcMode::Farthest, 3, false).unwrap() else {
            panic!("expected neighbors");
        };
        let idx: Vec<usize> = far.iter().map(|n| n.index).collect();
        assert_eq!(idx, vec![0, 2, 1]);
    }

    #[test]
    fn k_larger_than_available_returns_everything() {
        let m = Distances::Matrix(array![[0.0, 0.4], [0.4, 0.0]]);
        let Summary::RowNeighbors(rows) = summarize(&m, CalcMode::Nearest, 5, true).unwrap() else {
            panic!("expected row neighbors");
        };
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r.len() == 1));

        let v = Distances::Vector(array![0.2, 0.1]);
        let summary = summarize(&v, CalcMode::Average, 10, false).unwrap();
        assert_eq!(summary, Summary::Mean((0.2 + 0.1) / 2.0));
    }

    #[test]
    fn singleton_within_matrix_averages_to_nan() {
        let m = Distances::Matrix(array![[0.0]]);
        let Summary::RowMeans(means) = summarize(&m, CalcMode::Average, 1, true).unwrap() else {
            panic!("expected row means");
        };
        assert!(means[0].is_nan());
    }

    #[test]
    fn zero_k_is_rejected() {
        let v = Distances::Vector(array![0.2]);
        assert!(summarize(&v, CalcMode::Nearest, 0, false).is_err());
        assert!(summarize(&v, CalcMode::All, 0, false).is_ok());
    }
}
