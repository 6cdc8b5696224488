//! Complete-linkage agglomerative clustering for heatmap ordering.

use ndarray::ArrayView2;
use prism_core::{PrismError, Result};
use serde::Serialize;

/// One agglomeration step.
///
/// Leaves are numbered `0..n`; the cluster created by step `s` is `n + s`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Merge {
    pub left: usize,
    pub right: usize,
    pub distance: f64,
    pub size: usize,
}

/// Clustering result: merge list plus dendrogram leaf order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dendrogram {
    pub merges: Vec<Merge>,
    pub leaf_order: Vec<usize>,
}

/// Complete-linkage clustering of a square distance matrix.
///
/// The closest pair of active clusters is merged at each step; ties go to
/// the pair with the lowest `(smaller id, larger id)`. The distance between clusters is the
/// largest member distance.
pub fn complete_linkage(distances: ArrayView2<'_, f64>) -> Result<Dendrogram> {
    let n = distances.nrows();
    if distances.ncols() != n {
        return Err(PrismError::validation(format!(
            "linkage needs a square matrix, got {}x{}",
            n,
            distances.ncols()
        )));
    }
    if n == 0 {
        return Ok(Dendrogram {
            merges: Vec::new(),
            leaf_order: Vec::new(),
        });
    }

    // Active clusters: (cluster id, size); `link[a][b]` between slots
    let mut active: Vec<(usize, usize)> = (0..n).map(|i| (i, 1)).collect();
    let mut link: Vec<Vec<f64>> = (0..n)
        .map(|i| (0..n).map(|j| distances[[i, j]]).collect())
        .collect();
    let mut merges = Vec::with_capacity(n.saturating_sub(1));

    while active.len() > 1 {
        let pair_ids = |a: usize, b: usize| {
            let (x, y) = (active[a].0, active[b].0);
            (x.min(y), x.max(y))
        };
        let mut best = (0usize, 1usize, f64::INFINITY);
        for a in 0..active.len() {
            for b in (a + 1)..active.len() {
                let d = link[a][b];
                if d < best.2 || (d == best.2 && pair_ids(a, b) < pair_ids(best.0, best.1)) {
                    best = (a, b, d);
                }
            }
        }
        let (a, b, distance) = best;

        let (id_a, size_a) = active[a];
        let (id_b, size_b) = active[b];
        merges.push(Merge {
            left: id_a.min(id_b),
            right: id_a.max(id_b),
            distance,
            size: size_a + size_b,
        });

        // Fold slot `b` into slot `a`
        for c in 0..active.len() {
            let merged = link[a][c].max(link[b][c]);
            link[a][c] = merged;
            link[c][a] = merged;
        }
        link[a][a] = 0.0;
        active[a] = (n + merges.len() - 1, size_a + size_b);
        active.remove(b);
        link.remove(b);
        for row in &mut link {
            row.remove(b);
        }
    }

    let leaf_order = leaf_order(n, &merges);
    Ok(Dendrogram { merges, leaf_order })
}

fn leaf_order(n: usize, merges: &[Merge]) -> Vec<usize> {
    let Some(root) = merges.len().checked_sub(1).map(|s| n + s) else {
        return (0..n).collect();
    };

    let mut order = Vec::with_capacity(n);
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        if node < n {
            order.push(node);
        } else {
            let merge = &merges[node - n];
            stack.push(merge.right);
            stack.push(merge.left);
        }
    }
    order
}
